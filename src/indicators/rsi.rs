use serde::{Deserialize, Serialize};

use super::{ensure_finite, require_len, Indicator, IndicatorKind, IndicatorResult, SignalContext};
use crate::config::{OscillatorThresholds, PeriodParams};
use crate::error::Result;
use crate::models::{PriceSeries, Signal};

/// Calculate Relative Strength Index (RSI)
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
pub fn calculate_rsi(prices: &[f64], period: usize) -> Option<f64> {
    rsi_series(prices, period).last().copied()
}

/// RSI for every bar from index `period` on, using Wilder's smoothing.
///
/// A window with no losses reads 100; a window with no movement at all
/// reads 50.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period + 1 {
        return Vec::new();
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);

    // Calculate price changes
    for pair in prices.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let p = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / p;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / p;

    let mut series = Vec::with_capacity(gains.len() - period + 1);
    series.push(rsi_from_averages(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (p - 1.0) + gains[i]) / p;
        avg_loss = (avg_loss * (p - 1.0) + losses[i]) / p;
        series.push(rsi_from_averages(avg_gain, avg_loss));
    }

    series
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Relative Strength Index of closes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rsi {
    pub value: f64,
}

impl Rsi {
    /// Lower readings are never less bullish than higher ones
    pub fn signal_with(&self, thresholds: &OscillatorThresholds) -> Signal {
        let rsi = self.value;

        if rsi <= thresholds.strong_buy {
            Signal::StrongBuy
        } else if rsi <= thresholds.buy {
            Signal::Buy
        } else if rsi >= thresholds.strong_sell {
            Signal::StrongSell
        } else if rsi >= thresholds.sell {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

impl Indicator for Rsi {
    type Params = PeriodParams;

    const KIND: IndicatorKind = IndicatorKind::Rsi;

    fn compute(series: &PriceSeries, params: &PeriodParams) -> Result<Self> {
        require_len(Self::KIND, params.period + 1, series.len())?;

        let value = calculate_rsi(series.closes(), params.period).unwrap_or(f64::NAN);
        ensure_finite(Self::KIND, &[value])?;

        Ok(Self { value })
    }

    fn signal(&self, ctx: &SignalContext<'_>) -> Option<Signal> {
        Some(self.signal_with(&ctx.thresholds.rsi))
    }

    fn result(&self) -> IndicatorResult {
        IndicatorResult::Rsi(*self)
    }
}
