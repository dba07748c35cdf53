use thiserror::Error;

use crate::indicators::IndicatorKind;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown interval: {0}")]
    UnknownInterval(String),

    #[error("Settings error: {source}")]
    Settings {
        #[from]
        source: config::ConfigError,
    },

    #[error("Insufficient data for {indicator}: need {required} values, got {available}")]
    InsufficientData {
        indicator: IndicatorKind,
        required: usize,
        available: usize,
    },

    #[error("{indicator} produced a non-finite value")]
    NonFinite { indicator: IndicatorKind },

    #[error("Malformed market data: {0}")]
    MalformedData(String),

    #[error("Market data fetch failed: {0}")]
    Fetch(String),

    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Analysis task for {symbol} did not complete: {reason}")]
    Task { symbol: String, reason: String },
}

impl AnalysisError {
    /// Errors that only affect the symbol being analyzed
    pub fn is_symbol_scoped(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientData { .. }
                | AnalysisError::NonFinite { .. }
                | AnalysisError::MalformedData(_)
                | AnalysisError::Fetch(_)
                | AnalysisError::Http { .. }
                | AnalysisError::Task { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
