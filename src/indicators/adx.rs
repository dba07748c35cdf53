//! Average Directional Index (ADX) - Measures trend strength
//!
//! ADX ranges from 0 to 100:
//! - ADX > 25: Strong trend (bull or bear)
//! - ADX 20-25: Moderate trend
//! - ADX < 20: Weak trend / choppy / ranging market
//!
//! Also returns +DI and -DI to determine trend direction:
//! - +DI > -DI: Uptrend
//! - -DI > +DI: Downtrend

use serde::{Deserialize, Serialize};

use super::atr::{true_ranges, wilder_series};
use super::{ensure_finite, require_len, Indicator, IndicatorKind, IndicatorResult, SignalContext};
use crate::config::{AdxThresholds, PeriodParams};
use crate::error::Result;
use crate::models::{PriceSeries, Signal};

/// Calculate ADX, +DI, and -DI for trend strength and direction
///
/// Returns (adx, plus_di, minus_di) or None if insufficient data.
/// Needs `2 * period` bars: `period` to seed the DI smoothing and another
/// `period` DX values to seed the ADX smoothing.
pub fn calculate_adx(series: &PriceSeries, period: usize) -> Option<(f64, f64, f64)> {
    if period == 0 || series.len() < 2 * period {
        return None;
    }

    let highs = series.highs();
    let lows = series.lows();

    // Step 1: True Range (TR) and Directional Movement (+DM, -DM)
    let ranges = true_ranges(highs, lows, series.closes());
    let mut plus_dms = Vec::with_capacity(ranges.len());
    let mut minus_dms = Vec::with_capacity(ranges.len());

    for i in 1..highs.len() {
        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];

        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };

        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };

        plus_dms.push(plus_dm);
        minus_dms.push(minus_dm);
    }

    // Step 2: Smooth True Range and Directional Movements (Wilder's smoothing)
    let smoothed_tr = wilder_series(&ranges, period);
    let smoothed_plus_dm = wilder_series(&plus_dms, period);
    let smoothed_minus_dm = wilder_series(&minus_dms, period);

    // Step 3: +DI, -DI and DX for every smoothed bar
    let mut plus_di = 0.0;
    let mut minus_di = 0.0;
    let mut dx_values = Vec::with_capacity(smoothed_tr.len());

    for i in 0..smoothed_tr.len() {
        let tr = smoothed_tr[i];
        (plus_di, minus_di) = if tr > 0.0 {
            (
                smoothed_plus_dm[i] / tr * 100.0,
                smoothed_minus_dm[i] / tr * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        let di_sum = plus_di + minus_di;
        let dx = if di_sum > 0.0 {
            (plus_di - minus_di).abs() / di_sum * 100.0
        } else {
            0.0
        };
        dx_values.push(dx);
    }

    // Step 4: ADX is the Wilder-smoothed DX
    let adx = *wilder_series(&dx_values, period).last()?;

    Some((adx, plus_di, minus_di))
}

/// Trend strength with direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Adx {
    pub adx: f64,
    pub pdi: f64,
    pub mdi: f64,
}

impl Adx {
    pub fn signal_with(&self, thresholds: &AdxThresholds) -> Signal {
        let strong = self.adx >= thresholds.strong_trend;
        let moderate = self.adx >= thresholds.moderate_trend && !strong;
        let bullish = self.pdi > self.mdi;
        let bearish = self.mdi > self.pdi;

        match (strong, moderate, bullish, bearish) {
            (true, _, true, _) => Signal::StrongBuy,
            (_, true, true, _) => Signal::Buy,
            (true, _, _, true) => Signal::StrongSell,
            (_, true, _, true) => Signal::Sell,
            _ => Signal::Hold,
        }
    }
}

impl Indicator for Adx {
    type Params = PeriodParams;

    const KIND: IndicatorKind = IndicatorKind::Adx;

    fn compute(series: &PriceSeries, params: &PeriodParams) -> Result<Self> {
        require_len(Self::KIND, 2 * params.period, series.len())?;

        let (adx, pdi, mdi) =
            calculate_adx(series, params.period).unwrap_or((f64::NAN, f64::NAN, f64::NAN));
        ensure_finite(Self::KIND, &[adx, pdi, mdi])?;

        Ok(Self { adx, pdi, mdi })
    }

    fn signal(&self, ctx: &SignalContext<'_>) -> Option<Signal> {
        Some(self.signal_with(&ctx.thresholds.adx))
    }

    fn result(&self) -> IndicatorResult {
        IndicatorResult::Adx(*self)
    }
}
