use thiserror::Error;

/// Engine error types.
///
/// Missing history is not an error: windowed indicators report it as
/// `None` in their field and the row is still written.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Division by zero in {indicator}: {detail}")]
    DivisionByZero {
        indicator: &'static str,
        detail: String,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn division_by_zero(indicator: &'static str, detail: impl Into<String>) -> Self {
        EngineError::DivisionByZero {
            indicator,
            detail: detail.into(),
        }
    }

    /// True for the failure kinds that abort a single row but should not
    /// stop a batch of other rows.
    pub fn is_row_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_) | EngineError::DivisionByZero { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_by_zero_message_names_indicator() {
        let err = EngineError::division_by_zero("advance_decline_ratio", "declines is 0");
        assert_eq!(
            err.to_string(),
            "Division by zero in advance_decline_ratio: declines is 0"
        );
    }

    #[test]
    fn test_row_rejection_kinds() {
        assert!(EngineError::validation("bad date").is_row_rejection());
        assert!(EngineError::division_by_zero("ra_buy", "close is 0").is_row_rejection());
        assert!(!EngineError::Store("lock poisoned".into()).is_row_rejection());
    }
}
