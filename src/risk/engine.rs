use crate::config::{AnalysisConfig, IndicatorWeights, SignalThresholds, SignalWeights};
use crate::indicators::{IndicatorKind, IndicatorSet};
use crate::models::{Signal, TradeRecord};
use crate::pair::TradingPair;

/// Band width relative to ATR, scaled by `smoothing`.
///
/// Zero when ATR is not positive or the ratio is not finite.
pub fn volatility_factor(upper_band: f64, lower_band: f64, atr: f64, smoothing: f64) -> f64 {
    if atr <= 0.0 {
        return 0.0;
    }

    let factor = (upper_band - lower_band) / atr * smoothing;
    if factor.is_finite() {
        factor
    } else {
        0.0
    }
}

/// Scale, clamp to [0, 100] and round to two decimals; NaN scores 0
pub fn clamp_score(raw: f64, multiplier: f64) -> f64 {
    let scaled = raw * multiplier;
    if scaled.is_nan() {
        return 0.0;
    }

    (scaled.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

/// Take-profit, stop-loss and confidence for one analyzed pair
pub struct TradeAnalysisEngine<'a> {
    pair: &'a TradingPair,
    thresholds: &'a SignalThresholds,
    signal_weights: &'a SignalWeights,
    risk_reward_ratio: f64,
    volatility_smoothing: f64,
    score_multiplier: f64,
}

impl<'a> TradeAnalysisEngine<'a> {
    pub fn new(pair: &'a TradingPair, config: &'a AnalysisConfig) -> Self {
        Self {
            pair,
            thresholds: &config.thresholds,
            signal_weights: &config.signal_weights,
            risk_reward_ratio: config.risk.risk_reward_ratio,
            volatility_smoothing: config.risk.volatility_smoothing,
            score_multiplier: config.risk.score_multiplier,
        }
    }

    /// Override the configured ratio; non-positive values are ignored
    pub fn with_risk_reward_ratio(mut self, ratio: f64) -> Self {
        if ratio.is_finite() && ratio > 0.0 {
            self.risk_reward_ratio = ratio;
        }
        self
    }

    pub fn volatility_factor(&self) -> f64 {
        let indicators = self.pair.indicators();
        volatility_factor(
            indicators.bollinger.upper_band,
            indicators.bollinger.lower_band,
            indicators.atr.value,
            self.volatility_smoothing,
        )
    }

    /// Distance from the last price to the take-profit level; zero on HOLD
    fn target_distance(&self) -> f64 {
        match self.pair.signal() {
            Signal::Hold => 0.0,
            _ => self.pair.indicators().atr.value * (1.0 + self.volatility_factor()),
        }
    }

    pub fn take_profit(&self) -> f64 {
        let last_price = self.pair.last_price();
        let distance = self.target_distance();
        let signal = self.pair.signal();

        if signal.is_bullish() {
            (last_price + distance).max(0.0)
        } else if signal.is_bearish() {
            (last_price - distance).max(0.0)
        } else {
            last_price
        }
    }

    pub fn stop_loss(&self) -> f64 {
        let last_price = self.pair.last_price();
        let distance = self.target_distance() / self.risk_reward_ratio;
        let signal = self.pair.signal();

        if signal.is_bullish() {
            (last_price - distance).max(0.0)
        } else if signal.is_bearish() {
            (last_price + distance).max(0.0)
        } else {
            last_price
        }
    }

    /// Base weight of the final signal, plus the weight of every indicator
    /// agreeing with its direction, plus the volatility factor
    pub fn score(&self) -> f64 {
        let signal = self.pair.signal();
        let agreement = agreement_weight(
            self.pair.indicators(),
            &self.pair.profile().weights,
            signal,
            self.pair.last_price(),
            self.thresholds,
        );

        let raw = self.signal_weights.weight(signal) + agreement + self.volatility_factor();
        clamp_score(raw, self.score_multiplier)
    }

    pub fn analyze(&self) -> TradeRecord {
        let record = TradeRecord {
            symbol: self.pair.symbol().to_string(),
            interval: self.pair.interval(),
            last_price: self.pair.last_price(),
            avg_price: self.pair.avg_price(),
            signal: self.pair.signal(),
            take_profit: self.take_profit(),
            stop_loss: self.stop_loss(),
            score: self.score(),
        };

        tracing::debug!(
            "{}: {} tp={:.4} sl={:.4} score={:.2}",
            record.symbol,
            record.signal,
            record.take_profit,
            record.stop_loss,
            record.score
        );

        record
    }
}

/// Whether an indicator's raw value supports a bullish (or bearish) call
fn agrees_with(
    indicators: &IndicatorSet,
    kind: IndicatorKind,
    bullish: bool,
    price: f64,
    thresholds: &SignalThresholds,
) -> bool {
    match kind {
        IndicatorKind::Ema => {
            let ema = indicators.ema.value;
            if bullish {
                price < ema
            } else {
                price > ema
            }
        }
        IndicatorKind::Macd => {
            let histogram = indicators.macd.histogram;
            if bullish {
                histogram > thresholds.macd_histogram
            } else {
                histogram < -thresholds.macd_histogram
            }
        }
        IndicatorKind::Adx => {
            let adx = &indicators.adx;
            adx.adx >= thresholds.adx.strong_trend
                && if bullish {
                    adx.pdi > adx.mdi
                } else {
                    adx.mdi > adx.pdi
                }
        }
        IndicatorKind::Ichimoku => {
            let cloud = &indicators.ichimoku;
            if bullish {
                price > cloud.cloud_top()
                    && cloud.tenkan_sen > cloud.kijun_sen
                    && price > cloud.chikou_span
            } else {
                price < cloud.cloud_bottom()
                    && cloud.tenkan_sen < cloud.kijun_sen
                    && price < cloud.chikou_span
            }
        }
        IndicatorKind::Rsi => {
            let rsi = indicators.rsi.value;
            if bullish {
                rsi <= thresholds.rsi.buy
            } else {
                rsi >= thresholds.rsi.sell
            }
        }
        IndicatorKind::StochRsi => {
            let stoch = indicators.stoch_rsi.stoch_rsi;
            if bullish {
                stoch <= thresholds.stoch_rsi.buy
            } else {
                stoch >= thresholds.stoch_rsi.sell
            }
        }
        IndicatorKind::Bollinger => {
            let bands = &indicators.bollinger;
            if bullish {
                price < bands.lower_band
            } else {
                price > bands.upper_band
            }
        }
        IndicatorKind::Atr => false,
    }
}

/// Sum of the weights of indicators agreeing with `signal`
pub fn agreement_weight(
    indicators: &IndicatorSet,
    weights: &IndicatorWeights,
    signal: Signal,
    price: f64,
    thresholds: &SignalThresholds,
) -> f64 {
    let bias = signal.bias();
    if bias == 0 {
        return 0.0;
    }

    IndicatorKind::ALL
        .iter()
        .filter(|&&kind| agrees_with(indicators, kind, bias > 0, price, thresholds))
        .map(|&kind| weights.weight(kind))
        .sum()
}
