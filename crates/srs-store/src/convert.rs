//! Conversions between the wire/storage representations (plain strings and
//! nanosecond integers, per `spec.md` §6) and the strongly typed domain
//! enums. Kept in one place so the row-mapping code in `sqlite.rs` stays
//! declarative.

use chrono::Duration;
use srs_domain::{CardState, CoreError, TaskType};

pub(crate) fn card_state_to_str(state: CardState) -> &'static str {
    match state {
        CardState::New => "new",
        CardState::Learning => "learning",
        CardState::Review => "review",
        CardState::Relearning => "relearning",
    }
}

pub(crate) fn card_state_from_str(value: &str) -> Result<CardState, CoreError> {
    match value {
        "new" => Ok(CardState::New),
        "learning" => Ok(CardState::Learning),
        "review" => Ok(CardState::Review),
        "relearning" => Ok(CardState::Relearning),
        other => Err(CoreError::Internal(format!("unknown card state {other:?} in store"))),
    }
}

pub(crate) fn task_type_to_str(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::VocabRecall => "vocab_recall",
        TaskType::SentenceTranslation => "sentence_translation",
        TaskType::Audio => "audio",
    }
}

pub(crate) fn task_type_from_str(value: &str) -> Result<TaskType, CoreError> {
    match value {
        "vocab_recall" => Ok(TaskType::VocabRecall),
        "sentence_translation" => Ok(TaskType::SentenceTranslation),
        "audio" => Ok(TaskType::Audio),
        other => Err(CoreError::Internal(format!("unknown task type {other:?} in store"))),
    }
}

/// Durations round-trip as signed nanosecond integers (`spec.md` §6).
pub(crate) fn duration_to_nanos(duration: Duration) -> i64 {
    duration.num_nanoseconds().unwrap_or(i64::MAX)
}

pub(crate) fn nanos_to_duration(nanos: i64) -> Duration {
    Duration::nanoseconds(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_state_round_trips() {
        for state in [
            CardState::New,
            CardState::Learning,
            CardState::Review,
            CardState::Relearning,
        ] {
            let s = card_state_to_str(state);
            assert_eq!(card_state_from_str(s).unwrap(), state);
        }
    }

    #[test]
    fn task_type_round_trips() {
        for task_type in TaskType::ALL {
            let s = task_type_to_str(task_type);
            assert_eq!(task_type_from_str(s).unwrap(), task_type);
        }
    }

    #[test]
    fn duration_round_trips_through_nanos() {
        let d = Duration::days(3650);
        assert_eq!(nanos_to_duration(duration_to_nanos(d)), d);
    }

    #[test]
    fn unknown_card_state_is_an_internal_error() {
        let err = card_state_from_str("bogus").unwrap_err();
        assert!(matches!(err, CoreError::Internal(_)));
    }
}
