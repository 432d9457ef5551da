//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`WakeLampError`] via `From` when crossing a port boundary.

/// Top-level error carried across port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum WakeLampError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("parse error")]
    Parse(#[from] ParseError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The lighting gateway could not be reached or rejected a request.
    #[error("gateway error")]
    Gateway(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The event store could not be read or written.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// An event definition breaks a domain invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("event name must not be empty")]
    EmptyName,

    #[error("color change requires both start_color and end_color")]
    MissingColor,

    #[error("chromaticity {axis} = {value} is outside 0.0..=1.0")]
    ChromaticityOutOfRange { axis: &'static str, value: f64 },

    #[error("recurrence day list must not be empty")]
    EmptyDayList,
}

/// A persisted textual field could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid time of day {0:?}, expected HH:MM")]
    TimeOfDay(String),

    #[error("invalid recurrence {0:?}")]
    Recurrence(String),

    #[error("invalid weekday {0:?}")]
    Weekday(String),

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    Date(String),
}

/// A named record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {name:?} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_wrap_validation_error() {
        let err: WakeLampError = ValidationError::MissingColor.into();
        assert!(matches!(
            err,
            WakeLampError::Validation(ValidationError::MissingColor)
        ));
    }

    #[test]
    fn should_display_not_found_with_name() {
        let err = NotFoundError {
            entity: "Event",
            name: "wake".to_string(),
        };
        assert_eq!(err.to_string(), "Event \"wake\" not found");
    }

    #[test]
    fn should_display_time_of_day_parse_error() {
        let err = ParseError::TimeOfDay("25:99".to_string());
        assert_eq!(
            err.to_string(),
            "invalid time of day \"25:99\", expected HH:MM"
        );
    }

    #[test]
    fn should_keep_source_for_boxed_storage_error() {
        let io = std::io::Error::other("disk on fire");
        let err = WakeLampError::Storage(Box::new(io));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "disk on fire");
    }
}
