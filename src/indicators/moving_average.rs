use serde::{Deserialize, Serialize};

use super::{ensure_finite, require_len, Indicator, IndicatorKind, IndicatorResult, SignalContext};
use crate::config::PeriodParams;
use crate::error::Result;
use crate::models::{PriceSeries, Signal};

/// Calculate Simple Moving Average (SMA) of the last `period` values
pub fn calculate_sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let sum: f64 = prices.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// SMA for every full window, oldest first
pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    values
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Calculate Exponential Moving Average (EMA)
pub fn calculate_ema(prices: &[f64], period: usize) -> Option<f64> {
    ema_series(prices, period).last().copied()
}

/// EMA seeded with the SMA of the first `period` values.
///
/// Output has `len - period + 1` values; element 0 lines up with input
/// index `period - 1`.
pub fn ema_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    // Start with SMA
    let initial_sma = prices[..period].iter().sum::<f64>() / period as f64;

    let mut series = Vec::with_capacity(prices.len() - period + 1);
    let mut ema = initial_sma;
    series.push(ema);
    for price in &prices[period..] {
        ema = (price - ema) * multiplier + ema;
        series.push(ema);
    }

    series
}

/// Exponential moving average of closes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Ema {
    pub value: f64,
}

impl Ema {
    /// Price far below the EMA reads as oversold, far above as overbought.
    ///
    /// `threshold` is an absolute price distance; half of it separates a
    /// weak signal from noise around the average.
    pub fn signal_at(&self, price: f64, threshold: f64) -> Signal {
        let diff = price - self.value;

        if diff <= -threshold {
            Signal::StrongBuy
        } else if diff <= -threshold / 2.0 {
            Signal::Buy
        } else if diff >= threshold {
            Signal::StrongSell
        } else if diff >= threshold / 2.0 {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

impl Indicator for Ema {
    type Params = PeriodParams;

    const KIND: IndicatorKind = IndicatorKind::Ema;

    fn compute(series: &PriceSeries, params: &PeriodParams) -> Result<Self> {
        require_len(Self::KIND, params.period, series.len())?;

        let value = calculate_ema(series.closes(), params.period).unwrap_or(f64::NAN);
        ensure_finite(Self::KIND, &[value])?;

        Ok(Self { value })
    }

    fn signal(&self, ctx: &SignalContext<'_>) -> Option<Signal> {
        let threshold = ctx.last_price.abs() * ctx.thresholds.ema_distance_pct;
        Some(self.signal_at(ctx.last_price, threshold))
    }

    fn result(&self) -> IndicatorResult {
        IndicatorResult::Ema(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::*;

    #[test]
    fn test_sma() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = calculate_sma(&prices, 5);
        assert_eq!(sma, Some(104.0));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let prices = vec![100.0, 102.0];
        let sma = calculate_sma(&prices, 5);
        assert!(sma.is_none());
    }

    #[test]
    fn test_sma_series() {
        let series = sma_series(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(series, vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_ema() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
        let ema = calculate_ema(&prices, 5);
        assert!(ema.is_some());
        assert!(ema.unwrap() > 104.0); // EMA should be above initial SMA
    }

    #[test]
    fn test_ema_series_alignment() {
        let prices: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let series = ema_series(&prices, 4);
        assert_eq!(series.len(), 7);
        // Seed is the SMA of the first window
        assert_eq!(series[0], 1.5);
    }

    #[test]
    fn test_ema_requires_period_values() {
        let series = series_from_closes(&[100.0, 101.0]);
        let result = Ema::compute(&series, &PeriodParams { period: 5 });
        assert!(result.is_err());
    }

    #[test]
    fn test_ema_signal_bands() {
        let ema = Ema { value: 100.0 };
        // threshold 2.0: strong beyond 2, weak beyond 1
        assert_eq!(ema.signal_at(97.0, 2.0), Signal::StrongBuy);
        assert_eq!(ema.signal_at(98.5, 2.0), Signal::Buy);
        assert_eq!(ema.signal_at(99.5, 2.0), Signal::Hold);
        assert_eq!(ema.signal_at(100.0, 2.0), Signal::Hold);
        assert_eq!(ema.signal_at(101.5, 2.0), Signal::Sell);
        assert_eq!(ema.signal_at(102.0, 2.0), Signal::StrongSell);
    }

    #[test]
    fn test_ema_threshold_scales_with_price() {
        let thresholds = crate::config::SignalThresholds::default();
        // 1.5% below the EMA: a buy at 2% threshold regardless of price level
        for level in [1.0, 100.0, 50_000.0] {
            let ema = Ema { value: level };
            let ctx = SignalContext {
                last_price: level * 0.985,
                thresholds: &thresholds,
            };
            assert_eq!(ema.signal(&ctx), Some(Signal::Buy));
        }
    }
}
