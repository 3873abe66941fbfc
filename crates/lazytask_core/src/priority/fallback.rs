//! Deterministic due-date priority rule.

use crate::clock::{EpochMs, DAY_MS};
use crate::model::priority::PriorityLabel;

const HIGH_MAX_DAYS: i64 = 2;
const MEDIUM_MAX_DAYS: i64 = 7;

/// Whole days until `due`, rounded up (`ceil((due - now) / 1 day)`).
///
/// Overdue instants yield zero or a negative count.
pub fn days_until_due(due: EpochMs, now: EpochMs) -> i64 {
    let diff = due.saturating_sub(now);
    let days = diff.div_euclid(DAY_MS);
    if diff.rem_euclid(DAY_MS) > 0 {
        days + 1
    } else {
        days
    }
}

/// Maps a due date onto a label: `<= 2` days HIGH, `<= 7` MEDIUM, else LOW.
///
/// Tasks without a due date are MEDIUM; overdue tasks are HIGH.
pub fn fallback_priority(due: Option<EpochMs>, now: EpochMs) -> PriorityLabel {
    let Some(due) = due else {
        return PriorityLabel::Medium;
    };
    match days_until_due(due, now) {
        days if days <= HIGH_MAX_DAYS => PriorityLabel::High,
        days if days <= MEDIUM_MAX_DAYS => PriorityLabel::Medium,
        _ => PriorityLabel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::{days_until_due, fallback_priority};
    use crate::clock::{DAY_MS, HOUR_MS};
    use crate::model::priority::PriorityLabel;

    const NOW: i64 = 1_770_976_800_000;

    #[test]
    fn days_round_up_partial_days() {
        assert_eq!(days_until_due(NOW + HOUR_MS, NOW), 1);
        assert_eq!(days_until_due(NOW + DAY_MS, NOW), 1);
        assert_eq!(days_until_due(NOW + DAY_MS + 1, NOW), 2);
        assert_eq!(days_until_due(NOW, NOW), 0);
        assert_eq!(days_until_due(NOW - HOUR_MS, NOW), 0);
        assert_eq!(days_until_due(NOW - DAY_MS - HOUR_MS, NOW), -1);
    }

    #[test]
    fn boundaries_between_labels() {
        assert_eq!(fallback_priority(Some(NOW + 2 * DAY_MS), NOW), PriorityLabel::High);
        assert_eq!(
            fallback_priority(Some(NOW + 2 * DAY_MS + 1), NOW),
            PriorityLabel::Medium
        );
        assert_eq!(fallback_priority(Some(NOW + 7 * DAY_MS), NOW), PriorityLabel::Medium);
        assert_eq!(
            fallback_priority(Some(NOW + 7 * DAY_MS + 1), NOW),
            PriorityLabel::Low
        );
    }

    #[test]
    fn missing_due_date_is_medium_and_overdue_is_high() {
        assert_eq!(fallback_priority(None, NOW), PriorityLabel::Medium);
        assert_eq!(fallback_priority(Some(NOW - 3 * DAY_MS), NOW), PriorityLabel::High);
    }
}
