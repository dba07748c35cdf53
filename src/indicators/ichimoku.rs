//! Ichimoku Cloud (Ichimoku Kinko Hyo)
//!
//! - Tenkan-sen (conversion line): high/low midpoint over the conversion period
//! - Kijun-sen (base line): high/low midpoint over the base period
//! - Senkou span A: midpoint of tenkan and kijun
//! - Senkou span B: high/low midpoint over the span period
//! - Chikou span (lagging span): the close `displacement` bars back
//!
//! The cloud is evaluated at the current bar, without the forward projection.

use serde::{Deserialize, Serialize};

use super::{ensure_finite, require_len, Indicator, IndicatorKind, IndicatorResult, SignalContext};
use crate::config::IchimokuParams;
use crate::error::Result;
use crate::models::{PriceSeries, Signal};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Senkou {
    pub span_a: f64,
    pub span_b: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IchimokuCloud {
    pub tenkan_sen: f64,
    pub kijun_sen: f64,
    pub chikou_span: f64,
    pub senkou: Senkou,
}

/// Midpoint of the highest high and lowest low over the last `period` bars
fn midpoint(highs: &[f64], lows: &[f64], period: usize) -> Option<f64> {
    if period == 0 || highs.len() < period || lows.len() < period {
        return None;
    }

    let highest = highs[highs.len() - period..]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let lowest = lows[lows.len() - period..]
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);

    Some((highest + lowest) / 2.0)
}

pub fn calculate_ichimoku(series: &PriceSeries, params: &IchimokuParams) -> Option<IchimokuCloud> {
    let highs = series.highs();
    let lows = series.lows();
    let closes = series.closes();

    let tenkan_sen = midpoint(highs, lows, params.conversion_period)?;
    let kijun_sen = midpoint(highs, lows, params.base_period)?;
    let span_b = midpoint(highs, lows, params.span_period)?;
    let chikou_index = closes.len().checked_sub(params.displacement + 1)?;

    Some(IchimokuCloud {
        tenkan_sen,
        kijun_sen,
        chikou_span: closes[chikou_index],
        senkou: Senkou {
            span_a: (tenkan_sen + kijun_sen) / 2.0,
            span_b,
        },
    })
}

impl IchimokuCloud {
    pub fn lookback(params: &IchimokuParams) -> usize {
        params
            .conversion_period
            .max(params.base_period)
            .max(params.span_period)
            .max(params.displacement + 1)
    }

    pub fn cloud_top(&self) -> f64 {
        self.senkou.span_a.max(self.senkou.span_b)
    }

    pub fn cloud_bottom(&self) -> f64 {
        self.senkou.span_a.min(self.senkou.span_b)
    }

    /// Lines and cloud set the direction; the lagging span decides strength
    pub fn signal_at(&self, price: f64) -> Signal {
        let bullish_lines = self.tenkan_sen > self.kijun_sen;
        let bearish_lines = self.tenkan_sen < self.kijun_sen;

        let bullish_cloud = self.senkou.span_a > self.senkou.span_b;
        let bearish_cloud = self.senkou.span_a < self.senkou.span_b;

        let bullish_lagging = price > self.chikou_span;
        let bearish_lagging = price < self.chikou_span;

        if bullish_lines && bullish_cloud {
            if bullish_lagging {
                Signal::StrongBuy
            } else {
                Signal::Buy
            }
        } else if bearish_lines && bearish_cloud {
            if bearish_lagging {
                Signal::StrongSell
            } else {
                Signal::Sell
            }
        } else {
            Signal::Hold
        }
    }
}

impl Indicator for IchimokuCloud {
    type Params = IchimokuParams;

    const KIND: IndicatorKind = IndicatorKind::Ichimoku;

    fn compute(series: &PriceSeries, params: &IchimokuParams) -> Result<Self> {
        require_len(Self::KIND, Self::lookback(params), series.len())?;

        let cloud = calculate_ichimoku(series, params).unwrap_or(IchimokuCloud {
            tenkan_sen: f64::NAN,
            kijun_sen: f64::NAN,
            chikou_span: f64::NAN,
            senkou: Senkou {
                span_a: f64::NAN,
                span_b: f64::NAN,
            },
        });
        ensure_finite(
            Self::KIND,
            &[
                cloud.tenkan_sen,
                cloud.kijun_sen,
                cloud.chikou_span,
                cloud.senkou.span_a,
                cloud.senkou.span_b,
            ],
        )?;

        Ok(cloud)
    }

    fn signal(&self, ctx: &SignalContext<'_>) -> Option<Signal> {
        Some(self.signal_at(ctx.last_price))
    }

    fn result(&self) -> IndicatorResult {
        IndicatorResult::Ichimoku(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::*;

    fn params() -> IchimokuParams {
        IchimokuParams {
            conversion_period: 5,
            base_period: 10,
            span_period: 20,
            displacement: 10,
        }
    }

    #[test]
    fn test_lookback() {
        assert_eq!(IchimokuCloud::lookback(&params()), 20);

        let long_displacement = IchimokuParams {
            displacement: 30,
            ..params()
        };
        assert_eq!(IchimokuCloud::lookback(&long_displacement), 31);

        let series = series_from_closes(&rising(19));
        assert!(IchimokuCloud::compute(&series, &params()).is_err());
    }

    #[test]
    fn test_uptrend_components() {
        // closes 100..=124, highs/lows +/- 0.5
        let series = series_from_closes(&rising(25));
        let cloud = IchimokuCloud::compute(&series, &params()).unwrap();

        assert_eq!(cloud.tenkan_sen, 122.0);
        assert_eq!(cloud.kijun_sen, 119.5);
        assert_eq!(cloud.senkou.span_a, 120.75);
        assert_eq!(cloud.senkou.span_b, 114.5);
        assert_eq!(cloud.chikou_span, 114.0);

        assert_eq!(cloud.signal_at(124.0), Signal::StrongBuy);
    }

    #[test]
    fn test_downtrend_is_strong_sell() {
        let series = series_from_closes(&falling(25));
        let cloud = IchimokuCloud::compute(&series, &params()).unwrap();
        assert_eq!(cloud.signal_at(series.last_close()), Signal::StrongSell);
    }

    #[test]
    fn test_missing_lagging_confirmation_is_weak() {
        let cloud = IchimokuCloud {
            tenkan_sen: 110.0,
            kijun_sen: 105.0,
            chikou_span: 120.0,
            senkou: Senkou {
                span_a: 107.5,
                span_b: 100.0,
            },
        };
        assert_eq!(cloud.signal_at(115.0), Signal::Buy);

        let bearish = IchimokuCloud {
            tenkan_sen: 95.0,
            kijun_sen: 100.0,
            chikou_span: 90.0,
            senkou: Senkou {
                span_a: 97.5,
                span_b: 105.0,
            },
        };
        assert_eq!(bearish.signal_at(93.0), Signal::Sell);
    }

    #[test]
    fn test_conflicting_lines_and_cloud_hold() {
        let cloud = IchimokuCloud {
            tenkan_sen: 110.0,
            kijun_sen: 105.0,
            chikou_span: 100.0,
            senkou: Senkou {
                span_a: 100.0,
                span_b: 108.0,
            },
        };
        assert_eq!(cloud.signal_at(120.0), Signal::Hold);
        assert_eq!(cloud.cloud_top(), 108.0);
        assert_eq!(cloud.cloud_bottom(), 100.0);
    }

    #[test]
    fn test_flat_market_holds() {
        let series = series_from_closes(&[100.0; 25]);
        let cloud = IchimokuCloud::compute(&series, &params()).unwrap();
        assert_eq!(cloud.signal_at(100.0), Signal::Hold);
    }
}
