// Technical indicators module
// Trend: EMA, MACD, ADX, Ichimoku Cloud
// Momentum: RSI, Stochastic RSI
// Volatility: ATR, Bollinger Bands

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ichimoku;
pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod stochastic_rsi;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::{IndicatorParams, SignalThresholds};
use crate::error::{AnalysisError, Result};
use crate::models::{PriceSeries, Signal};

pub use adx::{calculate_adx, Adx};
pub use atr::{calculate_atr, Atr};
pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ichimoku::{calculate_ichimoku, IchimokuCloud, Senkou};
pub use macd::{calculate_macd, Macd};
pub use moving_average::{calculate_ema, calculate_sma, ema_series, sma_series, Ema};
pub use rsi::{calculate_rsi, rsi_series, Rsi};
pub use stochastic_rsi::{calculate_stochastic_rsi, StochasticRsi};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum IndicatorKind {
    Ema,
    Macd,
    Adx,
    Ichimoku,
    Rsi,
    StochRsi,
    Atr,
    Bollinger,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 8] = [
        IndicatorKind::Ema,
        IndicatorKind::Macd,
        IndicatorKind::Adx,
        IndicatorKind::Ichimoku,
        IndicatorKind::Rsi,
        IndicatorKind::StochRsi,
        IndicatorKind::Atr,
        IndicatorKind::Bollinger,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Adx => "ADX",
            IndicatorKind::Ichimoku => "Ichimoku Cloud",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::StochRsi => "Stochastic RSI",
            IndicatorKind::Atr => "ATR",
            IndicatorKind::Bollinger => "Bollinger Bands",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a signal rule may look at besides the indicator's own value
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    pub last_price: f64,
    pub thresholds: &'a SignalThresholds,
}

/// A technical indicator computed once, eagerly, from a price series
pub trait Indicator: Sized {
    type Params;

    const KIND: IndicatorKind;

    /// Compute the indicator for the newest bar.
    ///
    /// Fails with `InsufficientData` when the series is shorter than the
    /// indicator's lookback, never with a partial value.
    fn compute(series: &PriceSeries, params: &Self::Params) -> Result<Self>;

    /// Signal for the newest bar; `None` for indicators that never signal
    fn signal(&self, ctx: &SignalContext<'_>) -> Option<Signal>;

    /// Immutable snapshot of the computed value
    fn result(&self) -> IndicatorResult;
}

/// Computed value of any indicator, tagged by kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IndicatorResult {
    Ema(Ema),
    Macd(Macd),
    Adx(Adx),
    Ichimoku(IchimokuCloud),
    Rsi(Rsi),
    StochRsi(StochasticRsi),
    Atr(Atr),
    Bollinger(BollingerBands),
}

impl IndicatorResult {
    pub fn kind(&self) -> IndicatorKind {
        match self {
            IndicatorResult::Ema(_) => IndicatorKind::Ema,
            IndicatorResult::Macd(_) => IndicatorKind::Macd,
            IndicatorResult::Adx(_) => IndicatorKind::Adx,
            IndicatorResult::Ichimoku(_) => IndicatorKind::Ichimoku,
            IndicatorResult::Rsi(_) => IndicatorKind::Rsi,
            IndicatorResult::StochRsi(_) => IndicatorKind::StochRsi,
            IndicatorResult::Atr(_) => IndicatorKind::Atr,
            IndicatorResult::Bollinger(_) => IndicatorKind::Bollinger,
        }
    }

    pub fn signal(&self, ctx: &SignalContext<'_>) -> Option<Signal> {
        match self {
            IndicatorResult::Ema(i) => i.signal(ctx),
            IndicatorResult::Macd(i) => i.signal(ctx),
            IndicatorResult::Adx(i) => i.signal(ctx),
            IndicatorResult::Ichimoku(i) => i.signal(ctx),
            IndicatorResult::Rsi(i) => i.signal(ctx),
            IndicatorResult::StochRsi(i) => i.signal(ctx),
            IndicatorResult::Atr(i) => i.signal(ctx),
            IndicatorResult::Bollinger(i) => i.signal(ctx),
        }
    }
}

/// The full set of indicators computed for one trading pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSet {
    pub ema: Ema,
    pub macd: Macd,
    pub adx: Adx,
    pub ichimoku: IchimokuCloud,
    pub rsi: Rsi,
    pub stoch_rsi: StochasticRsi,
    pub atr: Atr,
    pub bollinger: BollingerBands,
}

impl IndicatorSet {
    pub fn compute(series: &PriceSeries, params: &IndicatorParams) -> Result<Self> {
        Ok(Self {
            // Trend
            ema: Ema::compute(series, &params.ema)?,
            macd: Macd::compute(series, &params.macd)?,
            adx: Adx::compute(series, &params.adx)?,
            ichimoku: IchimokuCloud::compute(series, &params.ichimoku)?,
            // Momentum
            rsi: Rsi::compute(series, &params.rsi)?,
            stoch_rsi: StochasticRsi::compute(series, &params.stoch_rsi)?,
            // Volatility
            atr: Atr::compute(series, &params.atr)?,
            bollinger: BollingerBands::compute(series, &params.bollinger)?,
        })
    }

    pub fn results(&self) -> [IndicatorResult; 8] {
        [
            self.ema.result(),
            self.macd.result(),
            self.adx.result(),
            self.ichimoku.result(),
            self.rsi.result(),
            self.stoch_rsi.result(),
            self.atr.result(),
            self.bollinger.result(),
        ]
    }

    pub fn get(&self, kind: IndicatorKind) -> IndicatorResult {
        match kind {
            IndicatorKind::Ema => self.ema.result(),
            IndicatorKind::Macd => self.macd.result(),
            IndicatorKind::Adx => self.adx.result(),
            IndicatorKind::Ichimoku => self.ichimoku.result(),
            IndicatorKind::Rsi => self.rsi.result(),
            IndicatorKind::StochRsi => self.stoch_rsi.result(),
            IndicatorKind::Atr => self.atr.result(),
            IndicatorKind::Bollinger => self.bollinger.result(),
        }
    }

    /// Signal of every indicator that emits one (ATR does not)
    pub fn signals(&self, ctx: &SignalContext<'_>) -> BTreeMap<IndicatorKind, Signal> {
        self.results()
            .iter()
            .filter_map(|result| result.signal(ctx).map(|signal| (result.kind(), signal)))
            .collect()
    }
}

/// Fail unless `available` covers the indicator's lookback
pub(crate) fn require_len(kind: IndicatorKind, required: usize, available: usize) -> Result<()> {
    if available < required {
        return Err(AnalysisError::InsufficientData {
            indicator: kind,
            required,
            available,
        });
    }
    Ok(())
}

pub(crate) fn ensure_finite(kind: IndicatorKind, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(AnalysisError::NonFinite { indicator: kind })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::Interval;

    #[test]
    fn test_indicator_set_computes_all_kinds() {
        let series = series_from_closes(&rising(60));
        let params = IndicatorParams::for_interval(Interval::OneSecond);
        let set = IndicatorSet::compute(&series, &params).unwrap();

        let kinds: Vec<IndicatorKind> = set.results().iter().map(|r| r.kind()).collect();
        assert_eq!(kinds, IndicatorKind::ALL.to_vec());

        for kind in IndicatorKind::ALL {
            assert_eq!(set.get(kind).kind(), kind);
        }
    }

    #[test]
    fn test_signals_exclude_atr() {
        let series = series_from_closes(&rising(60));
        let params = IndicatorParams::for_interval(Interval::OneSecond);
        let set = IndicatorSet::compute(&series, &params).unwrap();
        let thresholds = SignalThresholds::default();
        let ctx = SignalContext {
            last_price: series.last_close(),
            thresholds: &thresholds,
        };

        let signals = set.signals(&ctx);
        assert_eq!(signals.len(), 7);
        assert!(!signals.contains_key(&IndicatorKind::Atr));
    }

    #[test]
    fn test_short_series_fails_explicitly() {
        let series = series_from_closes(&rising(30));
        let params = IndicatorParams::for_interval(Interval::OneHour);
        let result = IndicatorSet::compute(&series, &params);

        assert!(matches!(
            result,
            Err(AnalysisError::InsufficientData { available: 30, .. })
        ));
    }

    #[test]
    fn test_result_serializes_with_kind_tag() {
        let result = IndicatorResult::Rsi(Rsi { value: 42.0 });
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["kind"], "rsi");
        assert_eq!(json["value"], 42.0);
    }
}
