use lazytask_core::clock::DAY_MS;
use lazytask_core::priority::fallback_priority;
use lazytask_core::{
    FixedClock, LanguageModelClient, ModelError, PriorityInferenceEngine, PriorityLabel,
    PrioritySource, Task,
};
use std::cell::Cell;

const NOW: i64 = 1_770_976_800_000;

struct StubModel {
    reply: Result<&'static str, ModelError>,
    calls: Cell<usize>,
}

impl StubModel {
    fn new(reply: Result<&'static str, ModelError>) -> Self {
        Self {
            reply,
            calls: Cell::new(0),
        }
    }
}

impl LanguageModelClient for StubModel {
    fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        assert!(prompt.starts_with("Task Title: "));
        self.calls.set(self.calls.get() + 1);
        self.reply.clone().map(str::to_string)
    }
}

fn task_due_in(days: Option<i64>) -> Task {
    let mut task = Task::new("Prepare slides", NOW);
    task.due_date = days.map(|days| NOW + days * DAY_MS);
    task
}

#[test]
fn fallback_maps_due_dates_to_labels() {
    assert_eq!(fallback_priority(Some(NOW + DAY_MS), NOW), PriorityLabel::High);
    assert_eq!(fallback_priority(Some(NOW + 5 * DAY_MS), NOW), PriorityLabel::Medium);
    assert_eq!(fallback_priority(Some(NOW + 30 * DAY_MS), NOW), PriorityLabel::Low);
    assert_eq!(fallback_priority(None, NOW), PriorityLabel::Medium);
}

#[test]
fn model_answer_is_used_when_exact() {
    let model = StubModel::new(Ok("HIGH"));
    let engine = PriorityInferenceEngine::new(Some(&model), FixedClock::new(NOW));

    let decision = engine.decide(&task_due_in(Some(30)));
    assert_eq!(decision.label, PriorityLabel::High);
    assert_eq!(decision.source, PrioritySource::Model);
}

#[test]
fn unparseable_answer_falls_back_to_due_date() {
    let model = StubModel::new(Ok("urgent!!"));
    let engine = PriorityInferenceEngine::new(Some(&model), FixedClock::new(NOW));

    let decision = engine.decide(&task_due_in(Some(1)));
    assert_eq!(decision.label, PriorityLabel::High);
    assert_eq!(decision.source, PrioritySource::Fallback);
    assert_eq!(model.calls.get(), 1);
}

#[test]
fn network_error_without_due_date_is_medium() {
    let model = StubModel::new(Err(ModelError::Network("connection refused".to_string())));
    let engine = PriorityInferenceEngine::new(Some(&model), FixedClock::new(NOW));

    assert_eq!(engine.classify(&task_due_in(None)), PriorityLabel::Medium);
    assert_eq!(model.calls.get(), 1);
}

#[test]
fn every_model_error_kind_is_absorbed() {
    for err in [
        ModelError::Network("timeout".to_string()),
        ModelError::Auth("HTTP 401".to_string()),
        ModelError::RateLimited,
        ModelError::InvalidResponse("not json".to_string()),
    ] {
        let model = StubModel::new(Err(err));
        let engine = PriorityInferenceEngine::new(Some(&model), FixedClock::new(NOW));
        let decision = engine.decide(&task_due_in(Some(5)));
        assert_eq!(decision.label, PriorityLabel::Medium);
        assert_eq!(decision.source, PrioritySource::Fallback);
    }
}

#[test]
fn empty_answer_falls_back() {
    let model = StubModel::new(Ok("   "));
    let engine = PriorityInferenceEngine::new(Some(&model), FixedClock::new(NOW));
    assert_eq!(engine.classify(&task_due_in(Some(30))), PriorityLabel::Low);
}
