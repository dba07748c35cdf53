use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::models::Signal;

/// Oscillator bands: `strong_buy < buy <= sell < strong_sell`.
///
/// A reading at or below `strong_buy` is a strong buy, at or below `buy`
/// a buy, and symmetrically on the sell side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OscillatorThresholds {
    pub strong_buy: f64,
    pub buy: f64,
    pub sell: f64,
    pub strong_sell: f64,
}

impl OscillatorThresholds {
    pub const RSI: Self = Self {
        strong_buy: 25.0,
        buy: 35.0,
        sell: 65.0,
        strong_sell: 75.0,
    };

    pub const STOCH_RSI: Self = Self {
        strong_buy: 10.0,
        buy: 25.0,
        sell: 75.0,
        strong_sell: 90.0,
    };

    pub fn validate(&self, name: &str) -> Result<()> {
        let ordered = self.strong_buy < self.buy
            && self.buy <= self.sell
            && self.sell < self.strong_sell;
        let finite = [self.strong_buy, self.buy, self.sell, self.strong_sell]
            .iter()
            .all(|v| v.is_finite());

        if !(ordered && finite) {
            return Err(AnalysisError::Config(format!(
                "{} thresholds must satisfy strong_buy < buy <= sell < strong_sell, got {} / {} / {} / {}",
                name, self.strong_buy, self.buy, self.sell, self.strong_sell
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AdxThresholds {
    pub strong_trend: f64,
    pub moderate_trend: f64,
}

impl Default for AdxThresholds {
    fn default() -> Self {
        Self {
            strong_trend: 40.0,
            moderate_trend: 30.0,
        }
    }
}

/// Thresholds every indicator signal rule reads
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalThresholds {
    pub rsi: OscillatorThresholds,
    pub stoch_rsi: OscillatorThresholds,
    pub adx: AdxThresholds,
    /// Histogram magnitude separating strong from weak MACD signals
    pub macd_histogram: f64,
    /// EMA distance threshold as a fraction of price
    pub ema_distance_pct: f64,
    /// Fraction of the band width treated as "near" a Bollinger band
    pub bollinger_zone: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi: OscillatorThresholds::RSI,
            stoch_rsi: OscillatorThresholds::STOCH_RSI,
            adx: AdxThresholds::default(),
            macd_histogram: 0.05,
            ema_distance_pct: 0.02,
            bollinger_zone: 0.1,
        }
    }
}

impl SignalThresholds {
    pub fn validate(&self) -> Result<()> {
        self.rsi.validate("RSI")?;
        self.stoch_rsi.validate("Stochastic RSI")?;

        if !(self.adx.moderate_trend < self.adx.strong_trend) {
            return Err(AnalysisError::Config(format!(
                "ADX moderate trend ({}) must be below strong trend ({})",
                self.adx.moderate_trend, self.adx.strong_trend
            )));
        }

        if !(self.macd_histogram.is_finite() && self.macd_histogram >= 0.0) {
            return Err(AnalysisError::Config(format!(
                "MACD histogram threshold must be non-negative, got {}",
                self.macd_histogram
            )));
        }

        if !(self.ema_distance_pct.is_finite() && self.ema_distance_pct > 0.0) {
            return Err(AnalysisError::Config(format!(
                "EMA distance threshold must be positive, got {}",
                self.ema_distance_pct
            )));
        }

        if !(0.0..=0.5).contains(&self.bollinger_zone) {
            return Err(AnalysisError::Config(format!(
                "Bollinger zone must be within [0, 0.5], got {}",
                self.bollinger_zone
            )));
        }

        Ok(())
    }
}

/// Base weight of each signal value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalWeights {
    pub strong_buy: f64,
    pub buy: f64,
    pub hold: f64,
    pub sell: f64,
    pub strong_sell: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            strong_buy: 2.5,
            buy: 2.0,
            hold: 1.0,
            sell: 2.0,
            strong_sell: 2.5,
        }
    }
}

impl SignalWeights {
    pub fn weight(&self, signal: Signal) -> f64 {
        match signal {
            Signal::StrongBuy => self.strong_buy,
            Signal::Buy => self.buy,
            Signal::Hold => self.hold,
            Signal::Sell => self.sell,
            Signal::StrongSell => self.strong_sell,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for signal in Signal::ALL {
            let weight = self.weight(signal);
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(AnalysisError::Config(format!(
                    "{} weight must be non-negative, got {}",
                    signal, weight
                )));
            }
        }
        Ok(())
    }
}

/// Minimum normalized score a strong / moderate signal needs to win
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReliabilityThresholds {
    pub strong: f64,
    pub moderate: f64,
}

impl Default for ReliabilityThresholds {
    fn default() -> Self {
        Self {
            strong: 0.7,
            moderate: 0.55,
        }
    }
}

impl ReliabilityThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(self.moderate.is_finite() && self.strong.is_finite() && self.moderate <= self.strong)
        {
            return Err(AnalysisError::Config(format!(
                "reliability thresholds must satisfy moderate <= strong, got {} / {}",
                self.moderate, self.strong
            )));
        }
        Ok(())
    }
}
