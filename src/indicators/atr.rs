//! Average True Range (ATR) indicator
//!
//! Measures market volatility by calculating the average of true ranges over a period.
//! True Range is the greatest of:
//! - Current High - Current Low
//! - Abs(Current High - Previous Close)
//! - Abs(Current Low - Previous Close)
//!
//! Uses Wilder's smoothing (same as RSI and ADX) for the moving average.

use serde::{Deserialize, Serialize};

use super::{ensure_finite, require_len, Indicator, IndicatorKind, IndicatorResult, SignalContext};
use crate::config::PeriodParams;
use crate::error::Result;
use crate::models::{PriceSeries, Signal};

/// True range of every bar after the first
pub(crate) fn true_ranges(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    (1..closes.len())
        .map(|i| {
            let high = highs[i];
            let low = lows[i];
            let prev_close = closes[i - 1];

            (high - low)
                .max((high - prev_close).abs())
                .max((low - prev_close).abs())
        })
        .collect()
}

/// Wilder's smoothing for every bar from index `period - 1` on.
///
/// The first value is the simple average of the first `period` values.
pub(crate) fn wilder_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let p = period as f64;
    let first_smooth: f64 = values[..period].iter().sum::<f64>() / p;

    let mut series = Vec::with_capacity(values.len() - period + 1);
    let mut smoothed = first_smooth;
    series.push(smoothed);
    for value in &values[period..] {
        smoothed = (smoothed * (p - 1.0) + value) / p;
        series.push(smoothed);
    }

    series
}

/// Calculate ATR for the given price series
///
/// Returns the current ATR value, or None if insufficient data
pub fn calculate_atr(series: &PriceSeries, period: usize) -> Option<f64> {
    if series.len() < period + 1 {
        return None;
    }

    let ranges = true_ranges(series.highs(), series.lows(), series.closes());
    wilder_series(&ranges, period).last().copied()
}

/// Average true range; a volatility input only, it never signals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Atr {
    pub value: f64,
}

impl Indicator for Atr {
    type Params = PeriodParams;

    const KIND: IndicatorKind = IndicatorKind::Atr;

    fn compute(series: &PriceSeries, params: &PeriodParams) -> Result<Self> {
        require_len(Self::KIND, params.period + 1, series.len())?;

        let value = calculate_atr(series, params.period).unwrap_or(f64::NAN);
        ensure_finite(Self::KIND, &[value])?;

        Ok(Self { value })
    }

    fn signal(&self, _ctx: &SignalContext<'_>) -> Option<Signal> {
        None
    }

    fn result(&self) -> IndicatorResult {
        IndicatorResult::Atr(*self)
    }
}
