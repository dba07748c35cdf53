// Trade levels and confidence scoring
pub mod engine;

pub use engine::{agreement_weight, clamp_score, volatility_factor, TradeAnalysisEngine};
