use serde::{Deserialize, Serialize};

use super::{
    ema_series, ensure_finite, require_len, Indicator, IndicatorKind, IndicatorResult,
    SignalContext,
};
use crate::config::MacdParams;
use crate::error::{AnalysisError, Result};
use crate::models::{PriceSeries, Signal};

/// Moving Average Convergence Divergence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Calculate (macd, signal, histogram) for the newest bar
///
/// MACD line = EMA(fast) - EMA(slow); signal line = EMA(signal) of the MACD line.
pub fn calculate_macd(prices: &[f64], params: &MacdParams) -> Option<(f64, f64, f64)> {
    if params.fast_period == 0 || params.fast_period >= params.slow_period {
        return None;
    }

    let fast = ema_series(prices, params.fast_period);
    let slow = ema_series(prices, params.slow_period);
    if slow.is_empty() {
        return None;
    }

    // fast starts (slow - fast) bars earlier than slow
    let offset = params.slow_period - params.fast_period;
    let macd_line = slow
        .iter()
        .enumerate()
        .map(|(i, slow_ema)| fast.get(i + offset).map(|fast_ema| fast_ema - slow_ema))
        .collect::<Option<Vec<f64>>>()?;

    let signal_line = ema_series(&macd_line, params.signal_period);
    let macd = *macd_line.last()?;
    let signal = *signal_line.last()?;

    Some((macd, signal, macd - signal))
}

impl Macd {
    pub fn lookback(params: &MacdParams) -> usize {
        (params.slow_period + params.signal_period).saturating_sub(1)
    }

    /// Line crossover gives the direction, histogram size the strength
    pub fn signal_with(&self, threshold: f64) -> Signal {
        if self.macd > self.signal {
            if self.histogram > threshold {
                Signal::StrongBuy
            } else {
                Signal::Buy
            }
        } else if self.macd < self.signal {
            if self.histogram < -threshold {
                Signal::StrongSell
            } else {
                Signal::Sell
            }
        } else {
            Signal::Hold
        }
    }
}

impl Indicator for Macd {
    type Params = MacdParams;

    const KIND: IndicatorKind = IndicatorKind::Macd;

    fn compute(series: &PriceSeries, params: &MacdParams) -> Result<Self> {
        if params.fast_period == 0 || params.fast_period >= params.slow_period {
            return Err(AnalysisError::Config(format!(
                "MACD periods must satisfy 0 < fast < slow, got {} / {}",
                params.fast_period, params.slow_period
            )));
        }
        require_len(Self::KIND, Self::lookback(params), series.len())?;

        let (macd, signal, histogram) = calculate_macd(series.closes(), params)
            .unwrap_or((f64::NAN, f64::NAN, f64::NAN));
        ensure_finite(Self::KIND, &[macd, signal, histogram])?;

        Ok(Self {
            macd,
            signal,
            histogram,
        })
    }

    fn signal(&self, ctx: &SignalContext<'_>) -> Option<Signal> {
        Some(self.signal_with(ctx.thresholds.macd_histogram))
    }

    fn result(&self) -> IndicatorResult {
        IndicatorResult::Macd(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::*;

    fn params() -> MacdParams {
        MacdParams {
            fast_period: 5,
            slow_period: 10,
            signal_period: 3,
        }
    }

    #[test]
    fn test_invalid_periods_rejected() {
        let closes = rising(40);
        let zero_fast = MacdParams {
            fast_period: 0,
            ..params()
        };
        let inverted = MacdParams {
            fast_period: 10,
            slow_period: 5,
            signal_period: 3,
        };

        assert_eq!(calculate_macd(&closes, &zero_fast), None);
        assert_eq!(calculate_macd(&closes, &inverted), None);

        let series = series_from_closes(&closes);
        assert!(matches!(
            Macd::compute(&series, &zero_fast),
            Err(AnalysisError::Config(_))
        ));
        assert!(matches!(
            Macd::compute(&series, &inverted),
            Err(AnalysisError::Config(_))
        ));
    }

    #[test]
    fn test_lookback() {
        assert_eq!(Macd::lookback(&params()), 12);

        let series = series_from_closes(&rising(11));
        assert!(matches!(
            Macd::compute(&series, &params()),
            Err(AnalysisError::InsufficientData { required: 12, .. })
        ));
        assert!(Macd::compute(&series_from_closes(&rising(12)), &params()).is_ok());
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let macd = Macd::compute(&series_from_closes(&rising(40)), &params()).unwrap();
        // Fast EMA sits above slow EMA when prices climb
        assert!(macd.macd > 0.0);
        assert!((macd.histogram - (macd.macd - macd.signal)).abs() < 1e-12);
    }

    #[test]
    fn test_macd_negative_in_downtrend() {
        let macd = Macd::compute(&series_from_closes(&falling(40)), &params()).unwrap();
        assert!(macd.macd < 0.0);
    }

    #[test]
    fn test_acceleration_turns_histogram_positive() {
        // Flat, then a sharp rally at the end
        let mut closes = vec![100.0; 30];
        closes.extend((1..=6).map(|i| 100.0 + (i * i) as f64));
        let macd = Macd::compute(&series_from_closes(&closes), &params()).unwrap();

        assert!(macd.histogram > 0.05);
        assert_eq!(macd.signal_with(0.05), Signal::StrongBuy);
    }

    #[test]
    fn test_macd_signal_rules() {
        let macd = |macd, signal| Macd {
            macd,
            signal,
            histogram: macd - signal,
        };

        assert_eq!(macd(1.0, 0.9).signal_with(0.05), Signal::StrongBuy);
        assert_eq!(macd(1.0, 0.98).signal_with(0.05), Signal::Buy);
        assert_eq!(macd(1.0, 1.0).signal_with(0.05), Signal::Hold);
        assert_eq!(macd(0.98, 1.0).signal_with(0.05), Signal::Sell);
        assert_eq!(macd(0.9, 1.0).signal_with(0.05), Signal::StrongSell);
    }
}
