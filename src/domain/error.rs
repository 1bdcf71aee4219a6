//! Domain error types.

/// Top-level error type for kumo.
#[derive(Debug, thiserror::Error)]
pub enum KumoError {
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

    #[error("strategy parse error: {0}")]
    StrategyParse(#[from] serde_json::Error),

    #[error("invalid strategy: {reason}")]
    StrategyInvalid { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol} ({timeframe})")]
    NoData { symbol: String, timeframe: String },

    #[error("failed to write report: {reason}")]
    ReportWrite { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl KumoError {
    pub(crate) fn strategy_invalid(reason: impl Into<String>) -> Self {
        KumoError::StrategyInvalid {
            reason: reason.into(),
        }
    }
}

impl From<&KumoError> for std::process::ExitCode {
    fn from(err: &KumoError) -> Self {
        let code: u8 = match err {
            KumoError::Io(_) | KumoError::ReportWrite { .. } => 1,
            KumoError::ConfigParse { .. }
            | KumoError::ConfigMissing { .. }
            | KumoError::ConfigInvalid { .. } => 2,
            KumoError::StrategyParse(_) | KumoError::StrategyInvalid { .. } => 4,
            KumoError::Data { .. } | KumoError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
