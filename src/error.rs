use thiserror::Error;

/// Main error type for ieval
#[derive(Error, Debug)]
pub enum EvalError {
    /// `update` called on a measure that was already finalized
    #[error("Contract violation: update after finalize (topic {topic})")]
    UpdateAfterFinalize { topic: String },

    /// `finalize` called a second time
    #[error("Contract violation: finalize called twice (topic {topic})")]
    AlreadyFinalized { topic: String },

    /// More judgment events than the topic declared
    #[error("Contract violation: more than {expected} updates (topic {topic})")]
    TooManyUpdates { topic: String, expected: usize },

    /// `finalize` reached before every rank was delivered
    #[error("Contract violation: finalize after {received} of {expected} updates (topic {topic})")]
    IncompleteStream {
        topic: String,
        expected: usize,
        received: usize,
    },

    /// Event carried an explicit rank that is not the next one
    #[error("Contract violation: expected rank {expected}, got {got} (topic {topic})")]
    OutOfOrder {
        topic: String,
        expected: usize,
        got: usize,
    },

    /// A derived field was read before `finalize`
    #[error("Contract violation: {field} read before finalize (topic {topic})")]
    NotFinalized { topic: String, field: String },

    /// Field is not part of the measure's manifest
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Run file parse errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EvalError {
    /// True for caller bugs (as opposed to bad input files or I/O).
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            EvalError::UpdateAfterFinalize { .. }
                | EvalError::AlreadyFinalized { .. }
                | EvalError::TooManyUpdates { .. }
                | EvalError::IncompleteStream { .. }
                | EvalError::OutOfOrder { .. }
                | EvalError::NotFinalized { .. }
        )
    }
}

/// Convenient Result type using EvalError
pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EvalError::IncompleteStream {
            topic: "T1".to_string(),
            expected: 4,
            received: 2,
        };
        assert!(err.to_string().contains("Contract violation"));
        assert!(err.to_string().contains("2 of 4"));
        assert!(err.to_string().contains("T1"));
    }

    #[test]
    fn test_contract_classification() {
        let err = EvalError::AlreadyFinalized {
            topic: "T1".to_string(),
        };
        assert!(err.is_contract_violation());
        assert!(!EvalError::InvalidInput("x".to_string()).is_contract_violation());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EvalError = io_err.into();
        assert!(matches!(err, EvalError::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: EvalError = json_err.into();
        assert!(matches!(err, EvalError::Json(_)));
    }
}
