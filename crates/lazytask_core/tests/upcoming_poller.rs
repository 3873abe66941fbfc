use lazytask_core::clock::{HOUR_MS, MINUTE_MS};
use lazytask_core::reminder::{WatchedTask, UPCOMING_TITLE, UPCOMING_WINDOW_MS};
use lazytask_core::{
    check_upcoming, FixedClock, InMemoryNotificationGateway, Reminder, ReminderStatus,
    RepoError, UpcomingPoller,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

const NOW: i64 = 1_770_976_800_000;
const FAST_TICK: Duration = Duration::from_millis(10);

fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn check_upcoming_honours_window_and_status() {
    let task_id = Uuid::new_v4();
    let soon = Reminder::new_pending(task_id, NOW + 3 * MINUTE_MS, None, None, NOW);
    let later = Reminder::new_pending(task_id, NOW + 10 * MINUTE_MS, None, None, NOW);

    assert_eq!(
        check_upcoming(std::slice::from_ref(&soon), NOW, UPCOMING_WINDOW_MS),
        Some(&soon)
    );
    assert_eq!(
        check_upcoming(std::slice::from_ref(&later), NOW, UPCOMING_WINDOW_MS),
        None
    );

    let mut sent = soon.clone();
    sent.status = ReminderStatus::Sent;
    assert_eq!(check_upcoming(&[sent], NOW, UPCOMING_WINDOW_MS), None);
}

#[test]
fn poller_presents_heads_up_once_per_reminder() {
    let clock = Arc::new(FixedClock::new(NOW));
    let gateway = Arc::new(InMemoryNotificationGateway::new(Arc::clone(&clock)));
    let task = WatchedTask {
        task_id: Uuid::new_v4(),
        title: "Dentist".to_string(),
    };
    let reminders = vec![Reminder::new_pending(
        task.task_id,
        NOW + 3 * MINUTE_MS,
        Some("bring card"),
        None,
        NOW,
    )];
    let ticks = Arc::new(AtomicUsize::new(0));
    let source_ticks = Arc::clone(&ticks);

    let poller = UpcomingPoller::spawn(
        task.clone(),
        move || {
            source_ticks.fetch_add(1, Ordering::SeqCst);
            Ok::<_, RepoError>(reminders.clone())
        },
        Arc::clone(&gateway),
        Arc::clone(&clock),
        FAST_TICK,
        UPCOMING_WINDOW_MS,
    )
    .unwrap();

    assert!(wait_until(Duration::from_secs(2), || ticks.load(Ordering::SeqCst) >= 5));
    poller.stop();

    let presented = gateway.presented();
    assert_eq!(presented.len(), 1);
    assert_eq!(presented[0].title, UPCOMING_TITLE);
    assert_eq!(presented[0].body, "Dentist\nbring card");
    assert_eq!(presented[0].payload.task_id, task.task_id);
}

#[test]
fn first_tick_runs_immediately() {
    let clock = Arc::new(FixedClock::new(NOW));
    let gateway = Arc::new(InMemoryNotificationGateway::new(Arc::clone(&clock)));
    let ticks = Arc::new(AtomicUsize::new(0));
    let source_ticks = Arc::clone(&ticks);

    let poller = UpcomingPoller::spawn(
        WatchedTask {
            task_id: Uuid::new_v4(),
            title: "Standup".to_string(),
        },
        move || {
            source_ticks.fetch_add(1, Ordering::SeqCst);
            Ok::<Vec<Reminder>, RepoError>(Vec::new())
        },
        gateway,
        clock,
        Duration::from_secs(3_600),
        UPCOMING_WINDOW_MS,
    )
    .unwrap();

    assert!(wait_until(Duration::from_secs(2), || ticks.load(Ordering::SeqCst) == 1));
    let stop_started = Instant::now();
    drop(poller);
    assert!(stop_started.elapsed() < Duration::from_secs(1));
    assert_eq!(ticks.load(Ordering::SeqCst), 1);
}

#[test]
fn dropping_the_poller_stops_ticking() {
    let clock = Arc::new(FixedClock::new(NOW));
    let gateway = Arc::new(InMemoryNotificationGateway::new(Arc::clone(&clock)));
    let ticks = Arc::new(AtomicUsize::new(0));
    let source_ticks = Arc::clone(&ticks);

    let poller = UpcomingPoller::spawn(
        WatchedTask {
            task_id: Uuid::new_v4(),
            title: "Gym".to_string(),
        },
        move || {
            source_ticks.fetch_add(1, Ordering::SeqCst);
            Err::<Vec<Reminder>, _>(RepoError::InvalidData("store offline".to_string()))
        },
        Arc::clone(&gateway),
        clock,
        FAST_TICK,
        HOUR_MS,
    )
    .unwrap();

    assert!(wait_until(Duration::from_secs(2), || ticks.load(Ordering::SeqCst) >= 2));
    drop(poller);
    let after_drop = ticks.load(Ordering::SeqCst);
    thread::sleep(FAST_TICK * 5);
    assert_eq!(ticks.load(Ordering::SeqCst), after_drop);
    assert!(gateway.presented().is_empty());
}
