// Core modules
pub mod api;
pub mod bot;
pub mod config;
pub mod error;
pub mod indicators;
pub mod models;
pub mod pair;
pub mod risk;
pub mod strategy;

// Re-export commonly used types
pub use api::{BinanceClient, MarketDataProvider};
pub use bot::{compute_sentiment, sort_trades, BatchReport, MarketBot};
pub use config::{AnalysisConfig, Settings};
pub use models::*;
pub use pair::{PendingPair, TradingPair};
pub use risk::TradeAnalysisEngine;
pub use strategy::SignalSynthesizer;

// Error handling
pub use error::{AnalysisError, Result};
