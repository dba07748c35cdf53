// Analysis configuration
// Per-interval indicator tables, signal thresholds and risk settings

pub mod params;
pub mod settings;
pub mod thresholds;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AnalysisError, Result};
use crate::models::Interval;

pub use params::{
    BollingerParams, IchimokuParams, IndicatorParams, IndicatorWeights, MacdParams,
    PeriodParams, StochRsiParams,
};
pub use settings::{BinanceSettings, Settings};
pub use thresholds::{
    AdxThresholds, OscillatorThresholds, ReliabilityThresholds, SignalThresholds, SignalWeights,
};

/// Indicator parameters and weights used for one interval
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IntervalProfile {
    pub params: IndicatorParams,
    pub weights: IndicatorWeights,
}

impl IntervalProfile {
    pub fn for_interval(interval: Interval) -> Self {
        Self {
            params: IndicatorParams::for_interval(interval),
            weights: IndicatorWeights::for_interval(interval),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        self.weights.validate()
    }
}

/// Settings for take-profit, stop-loss and confidence scoring
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    /// Reward-to-risk ratio: stop distance = take-profit distance / ratio
    pub risk_reward_ratio: f64,
    /// Scales band width / ATR into the volatility factor
    pub volatility_smoothing: f64,
    /// Applied to the raw score before clamping to [0, 100]
    pub score_multiplier: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_reward_ratio: 2.0,
            volatility_smoothing: 1.0 / 3.0,
            score_multiplier: 10.0,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.risk_reward_ratio.is_finite() && self.risk_reward_ratio > 0.0) {
            return Err(AnalysisError::Config(format!(
                "risk/reward ratio must be positive, got {}",
                self.risk_reward_ratio
            )));
        }
        if !(self.volatility_smoothing.is_finite() && self.volatility_smoothing >= 0.0) {
            return Err(AnalysisError::Config(format!(
                "volatility smoothing must be non-negative, got {}",
                self.volatility_smoothing
            )));
        }
        if !(self.score_multiplier.is_finite() && self.score_multiplier > 0.0) {
            return Err(AnalysisError::Config(format!(
                "score multiplier must be positive, got {}",
                self.score_multiplier
            )));
        }
        Ok(())
    }
}

/// Everything the analysis core needs besides market data
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub thresholds: SignalThresholds,
    pub signal_weights: SignalWeights,
    pub reliability: ReliabilityThresholds,
    pub risk: RiskConfig,
    /// Replaces the built-in table for the given intervals
    pub profiles: HashMap<Interval, IntervalProfile>,
}

impl AnalysisConfig {
    pub fn with_profile(mut self, interval: Interval, profile: IntervalProfile) -> Self {
        self.profiles.insert(interval, profile);
        self
    }

    pub fn profile(&self, interval: Interval) -> IntervalProfile {
        self.profiles
            .get(&interval)
            .copied()
            .unwrap_or_else(|| IntervalProfile::for_interval(interval))
    }

    /// Validate thresholds, weights and the profile of every interval
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.signal_weights.validate()?;
        self.reliability.validate()?;
        self.risk.validate()?;

        for interval in Interval::ALL {
            self.profile(interval).validate().map_err(|e| {
                AnalysisError::Config(format!("interval {}: {}", interval, e))
            })?;
        }

        Ok(())
    }
}
