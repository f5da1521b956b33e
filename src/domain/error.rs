//! Domain error types.
//!
//! Short input windows and degenerate portfolios are not errors: they yield
//! empty indicator output or the basic optimization result respectively.

/// Top-level error type for signalfolio.
#[derive(Debug, thiserror::Error)]
pub enum SignalfolioError {
    #[error("{indicator}: input series have mismatched lengths (expected {expected}, got {actual})")]
    LengthMismatch {
        indicator: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid asset {symbol}: {reason}")]
    InvalidAsset { symbol: String, reason: String },

    #[error("invalid correlation {left}/{right} = {value}")]
    InvalidCorrelation {
        left: String,
        right: String,
        value: f64,
    },

    #[error("unknown stress scenario: {name}")]
    UnknownScenario { name: String },

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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol} ({interval})")]
    NoData { symbol: String, interval: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignalfolioError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SignalfolioError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&SignalfolioError> for std::process::ExitCode {
    fn from(err: &SignalfolioError) -> Self {
        let code: u8 = match err {
            SignalfolioError::Io(_) => 1,
            SignalfolioError::ConfigParse { .. }
            | SignalfolioError::ConfigMissing { .. }
            | SignalfolioError::ConfigInvalid { .. } => 2,
            SignalfolioError::Data { .. } | SignalfolioError::NoData { .. } => 3,
            SignalfolioError::LengthMismatch { .. }
            | SignalfolioError::InvalidAsset { .. }
            | SignalfolioError::InvalidCorrelation { .. }
            | SignalfolioError::UnknownScenario { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

/// Fails with [`SignalfolioError::LengthMismatch`] unless every slice has `expected` elements.
pub(crate) fn ensure_same_len(
    indicator: &str,
    expected: usize,
    others: &[usize],
) -> Result<(), SignalfolioError> {
    match others.iter().find(|&&len| len != expected) {
        Some(&actual) => Err(SignalfolioError::LengthMismatch {
            indicator: indicator.to_string(),
            expected,
            actual,
        }),
        None => Ok(()),
    }
}
