use serde::{Deserialize, Serialize};

use super::{
    ensure_finite, require_len, rsi_series, sma_series, Indicator, IndicatorKind, IndicatorResult,
    SignalContext,
};
use crate::config::{OscillatorThresholds, StochRsiParams};
use crate::error::Result;
use crate::models::{PriceSeries, Signal};

/// Stochastic oscillator applied to RSI, with %K and %D smoothing.
///
/// All three values are on a 0-100 scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StochasticRsi {
    pub stoch_rsi: f64,
    pub k: f64,
    pub d: f64,
}

/// Returns (stoch_rsi, k, d) for the newest bar, or None if insufficient data
pub fn calculate_stochastic_rsi(
    prices: &[f64],
    params: &StochRsiParams,
) -> Option<(f64, f64, f64)> {
    let rsi = rsi_series(prices, params.rsi_period);
    if params.stochastic_period == 0 || rsi.len() < params.stochastic_period {
        return None;
    }

    let stoch: Vec<f64> = rsi
        .windows(params.stochastic_period)
        .map(|window| {
            let current = window[window.len() - 1];
            let lowest = window.iter().copied().fold(f64::INFINITY, f64::min);
            let highest = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let range = highest - lowest;

            // RSI did not move over the window
            if range == 0.0 {
                50.0
            } else {
                (current - lowest) / range * 100.0
            }
        })
        .collect();

    let k = sma_series(&stoch, params.k_period);
    let d = sma_series(&k, params.d_period);

    Some((*stoch.last()?, *k.last()?, *d.last()?))
}

impl StochasticRsi {
    /// Required closes for the full RSI -> stochastic -> %K -> %D chain
    pub fn lookback(params: &StochRsiParams) -> usize {
        (params.rsi_period + params.stochastic_period + params.k_period + params.d_period)
            .saturating_sub(2)
    }

    /// Oversold/overbought readings only count when the %K/%D crossover agrees
    pub fn signal_with(&self, thresholds: &OscillatorThresholds) -> Signal {
        let bullish_momentum = self.k > self.d;
        let bearish_momentum = self.k < self.d;

        if bullish_momentum && self.stoch_rsi <= thresholds.strong_buy {
            Signal::StrongBuy
        } else if bullish_momentum && self.stoch_rsi <= thresholds.buy {
            Signal::Buy
        } else if bearish_momentum && self.stoch_rsi >= thresholds.strong_sell {
            Signal::StrongSell
        } else if bearish_momentum && self.stoch_rsi >= thresholds.sell {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

impl Indicator for StochasticRsi {
    type Params = StochRsiParams;

    const KIND: IndicatorKind = IndicatorKind::StochRsi;

    fn compute(series: &PriceSeries, params: &StochRsiParams) -> Result<Self> {
        require_len(Self::KIND, Self::lookback(params), series.len())?;

        let (stoch_rsi, k, d) = calculate_stochastic_rsi(series.closes(), params)
            .unwrap_or((f64::NAN, f64::NAN, f64::NAN));
        ensure_finite(Self::KIND, &[stoch_rsi, k, d])?;

        Ok(Self { stoch_rsi, k, d })
    }

    fn signal(&self, ctx: &SignalContext<'_>) -> Option<Signal> {
        Some(self.signal_with(&ctx.thresholds.stoch_rsi))
    }

    fn result(&self) -> IndicatorResult {
        IndicatorResult::StochRsi(*self)
    }
}
