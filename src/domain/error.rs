//! Domain error types.

/// Top-level error type for optbench.
#[derive(Debug, thiserror::Error)]
pub enum OptbenchError {
    #[error("invalid input: {reason}")]
    Input { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("retrieval failed for {symbol}: {reason}")]
    Retrieval { symbol: String, reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl OptbenchError {
    pub fn input(reason: impl Into<String>) -> Self {
        OptbenchError::Input {
            reason: reason.into(),
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, OptbenchError::Input { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            OptbenchError::ConfigParse { .. }
                | OptbenchError::ConfigMissing { .. }
                | OptbenchError::ConfigInvalid { .. }
        )
    }
}

impl From<&OptbenchError> for std::process::ExitCode {
    fn from(err: &OptbenchError) -> Self {
        let code: u8 = match err {
            OptbenchError::Io(_) | OptbenchError::Report { .. } => 1,
            OptbenchError::ConfigParse { .. }
            | OptbenchError::ConfigMissing { .. }
            | OptbenchError::ConfigInvalid { .. } => 2,
            OptbenchError::Retrieval { .. } => 3,
            OptbenchError::Input { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_message() {
        let err = OptbenchError::input("bar sequence is empty");
        assert_eq!(err.to_string(), "invalid input: bar sequence is empty");
        assert!(err.is_input());
        assert!(!err.is_config());
    }

    #[test]
    fn config_invalid_message() {
        let err = OptbenchError::ConfigInvalid {
            section: "backtest".into(),
            key: "initial_cash".into(),
            reason: "initial_cash must be non-negative".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [backtest] initial_cash: initial_cash must be non-negative"
        );
        assert!(err.is_config());
    }

    #[test]
    fn retrieval_message() {
        let err = OptbenchError::Retrieval {
            symbol: "AAPL".into(),
            reason: "no rows".into(),
        };
        assert_eq!(err.to_string(), "retrieval failed for AAPL: no rows");
    }

    #[test]
    fn io_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: OptbenchError = io.into();
        assert!(matches!(err, OptbenchError::Io(_)));
    }
}
