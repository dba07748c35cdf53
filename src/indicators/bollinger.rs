use serde::{Deserialize, Serialize};

use super::{ensure_finite, require_len, Indicator, IndicatorKind, IndicatorResult, SignalContext};
use crate::config::BollingerParams;
use crate::error::Result;
use crate::models::{PriceSeries, Signal};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BollingerBands {
    pub upper_band: f64,
    pub middle_band: f64,
    pub lower_band: f64,
}

/// Returns (upper, middle, lower): SMA +/- `std_dev` population standard deviations
pub fn calculate_bollinger(prices: &[f64], period: usize, std_dev: f64) -> Option<(f64, f64, f64)> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let window = &prices[prices.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
    let deviation = variance.sqrt() * std_dev;

    Some((mean + deviation, mean, mean - deviation))
}

impl BollingerBands {
    pub fn width(&self) -> f64 {
        self.upper_band - self.lower_band
    }

    /// At or beyond a band is a strong signal, inside the `zone` fraction
    /// of the width next to a band a weak one.
    ///
    /// Collapsed bands (flat prices) carry no information and hold.
    pub fn signal_at(&self, price: f64, zone: f64) -> Signal {
        let band_width = self.width();
        if band_width <= 0.0 {
            return Signal::Hold;
        }

        let lower_band_zone = self.lower_band + band_width * zone;
        let upper_band_zone = self.upper_band - band_width * zone;

        if price <= self.lower_band {
            Signal::StrongBuy
        } else if price <= lower_band_zone {
            Signal::Buy
        } else if price >= self.upper_band {
            Signal::StrongSell
        } else if price >= upper_band_zone {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

impl Indicator for BollingerBands {
    type Params = BollingerParams;

    const KIND: IndicatorKind = IndicatorKind::Bollinger;

    fn compute(series: &PriceSeries, params: &BollingerParams) -> Result<Self> {
        require_len(Self::KIND, params.period, series.len())?;

        let (upper_band, middle_band, lower_band) =
            calculate_bollinger(series.closes(), params.period, params.std_dev)
                .unwrap_or((f64::NAN, f64::NAN, f64::NAN));
        ensure_finite(Self::KIND, &[upper_band, middle_band, lower_band])?;

        Ok(Self {
            upper_band,
            middle_band,
            lower_band,
        })
    }

    fn signal(&self, ctx: &SignalContext<'_>) -> Option<Signal> {
        Some(self.signal_at(ctx.last_price, ctx.thresholds.bollinger_zone))
    }

    fn result(&self) -> IndicatorResult {
        IndicatorResult::Bollinger(*self)
    }
}
