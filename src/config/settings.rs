use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use super::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::models::Interval;

const DEFAULT_SYMBOLS: &[&str] = &[
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "XRPUSDT", "ADAUSDT", "DOGEUSDT", "AVAXUSDT",
    "DOTUSDT", "LINKUSDT",
];

/// Exchange client settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BinanceSettings {
    pub base_url: String,
    /// Candles requested per symbol
    pub candle_limit: u32,
    pub timeout_secs: u64,
    pub requests_per_minute: u32,
}

impl Default for BinanceSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            candle_limit: 1000,
            timeout_secs: 30,
            requests_per_minute: 1200,
        }
    }
}

/// Application settings
///
/// Loaded from an optional `imugi.toml` in the working directory, then
/// overridden by `IMUGI__*` environment variables
/// (e.g. `IMUGI__INTERVAL=4h`, `IMUGI__BINANCE__CANDLE_LIMIT=500`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub symbols: Vec<String>,
    pub interval: Interval,
    pub binance: BinanceSettings,
    pub analysis: AnalysisConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            interval: Interval::default(),
            binance: BinanceSettings::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from("imugi")
    }

    /// Load settings from `<file_stem>.{toml,json,yaml}` (optional) and the environment
    pub fn load_from(file_stem: &str) -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name(file_stem).required(false))
            .add_source(
                Environment::with_prefix("IMUGI")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("symbols")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(AnalysisError::Config("no symbols configured".into()));
        }
        if self.binance.candle_limit == 0 {
            return Err(AnalysisError::Config("candle_limit must be > 0".into()));
        }
        if self.binance.requests_per_minute == 0 {
            return Err(AnalysisError::Config(
                "requests_per_minute must be > 0".into(),
            ));
        }
        self.analysis.validate()
    }
}
