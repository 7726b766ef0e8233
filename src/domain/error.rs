//! Domain error types.

/// Top-level error type for rebalancer.
#[derive(Debug, thiserror::Error)]
pub enum RebalanceError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("market data contains no tickers, nothing to allocate across")]
    EmptyMarket,

    #[error("portfolio parse error: {reason}")]
    PortfolioParse { reason: String },

    #[error("market parse error: {reason}")]
    MarketParse { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no saved portfolio at {path} and no portfolio file given")]
    MissingPortfolio { path: String },

    #[error("portfolio store error: {reason}")]
    Store { reason: String },

    #[error("cannot sell {need} {ticker}: only {have} held")]
    InsufficientShares {
        ticker: String,
        have: i64,
        need: i64,
    },

    #[error("cannot buy {ticker}: need {need:.2}, have {have:.2}")]
    InsufficientCash {
        ticker: String,
        need: f64,
        have: f64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&RebalanceError> for std::process::ExitCode {
    fn from(err: &RebalanceError) -> Self {
        let code: u8 = match err {
            RebalanceError::Io(_) => 1,
            RebalanceError::InvalidInput { .. }
            | RebalanceError::EmptyMarket
            | RebalanceError::PortfolioParse { .. }
            | RebalanceError::MarketParse { .. }
            | RebalanceError::ConfigParse { .. }
            | RebalanceError::ConfigInvalid { .. } => 2,
            RebalanceError::MissingPortfolio { .. } | RebalanceError::Store { .. } => 3,
            RebalanceError::InsufficientShares { .. }
            | RebalanceError::InsufficientCash { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
