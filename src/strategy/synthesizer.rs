use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{AnalysisConfig, IndicatorWeights, ReliabilityThresholds, SignalWeights};
use crate::indicators::IndicatorKind;
use crate::models::Signal;

/// Weighted votes per signal value, normalized by the total indicator weight
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct SignalScores {
    pub strong_buy: f64,
    pub buy: f64,
    pub hold: f64,
    pub sell: f64,
    pub strong_sell: f64,
    pub total_weight: f64,
}

impl SignalScores {
    fn bucket_mut(&mut self, signal: Signal) -> &mut f64 {
        match signal {
            Signal::StrongBuy => &mut self.strong_buy,
            Signal::Buy => &mut self.buy,
            Signal::Hold => &mut self.hold,
            Signal::Sell => &mut self.sell,
            Signal::StrongSell => &mut self.strong_sell,
        }
    }

    pub fn get(&self, signal: Signal) -> f64 {
        match signal {
            Signal::StrongBuy => self.strong_buy,
            Signal::Buy => self.buy,
            Signal::Hold => self.hold,
            Signal::Sell => self.sell,
            Signal::StrongSell => self.strong_sell,
        }
    }

    /// Largest bucket other than `signal`
    fn max_excluding(&self, signal: Signal) -> f64 {
        Signal::ALL
            .iter()
            .filter(|&&other| other != signal)
            .map(|&other| self.get(other))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// First matching rule wins:
    /// 1. HOLD dominates
    /// 2. a strong signal above the strong threshold that beats everything
    /// 3. BUY/SELL tie
    /// 4. a moderate signal above the moderate threshold that beats HOLD and its opposite
    pub fn resolve(&self, reliability: &ReliabilityThresholds) -> Signal {
        if self.total_weight <= 0.0 {
            return Signal::Hold;
        }

        if self.hold > self.max_excluding(Signal::Hold) {
            return Signal::Hold;
        }

        if self.strong_buy >= reliability.strong
            && self.strong_buy > self.max_excluding(Signal::StrongBuy)
        {
            return Signal::StrongBuy;
        }
        if self.strong_sell >= reliability.strong
            && self.strong_sell > self.max_excluding(Signal::StrongSell)
        {
            return Signal::StrongSell;
        }

        if self.buy == self.sell {
            return Signal::Hold;
        }

        if self.buy >= reliability.moderate && self.buy > self.hold && self.buy > self.sell {
            return Signal::Buy;
        }
        if self.sell >= reliability.moderate && self.sell > self.hold && self.sell > self.buy {
            return Signal::Sell;
        }

        Signal::Hold
    }
}

/// Combines per-indicator signals into one final signal
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalSynthesizer {
    signal_weights: SignalWeights,
    reliability: ReliabilityThresholds,
}

impl SignalSynthesizer {
    pub fn new(signal_weights: SignalWeights, reliability: ReliabilityThresholds) -> Self {
        Self {
            signal_weights,
            reliability,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.signal_weights, config.reliability)
    }

    /// Normalized buckets for the given signals.
    ///
    /// Signals are summed in indicator order, so the result does not
    /// depend on how the map was built.
    pub fn scores(
        &self,
        signals: &BTreeMap<IndicatorKind, Signal>,
        weights: &IndicatorWeights,
    ) -> SignalScores {
        let mut scores = SignalScores::default();

        for (&kind, &signal) in signals {
            let indicator_weight = weights.weight(kind);
            *scores.bucket_mut(signal) += indicator_weight * self.signal_weights.weight(signal);
            scores.total_weight += indicator_weight;
        }

        if scores.total_weight > 0.0 {
            for signal in Signal::ALL {
                *scores.bucket_mut(signal) /= scores.total_weight;
            }
        }

        scores
    }

    pub fn synthesize(
        &self,
        signals: &BTreeMap<IndicatorKind, Signal>,
        weights: &IndicatorWeights,
    ) -> Signal {
        self.scores(signals, weights).resolve(&self.reliability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Interval;

    fn synthesizer() -> SignalSynthesizer {
        SignalSynthesizer::default()
    }

    fn uniform_weights() -> IndicatorWeights {
        IndicatorWeights {
            ema: 1.0,
            macd: 1.0,
            adx: 1.0,
            ichimoku: 1.0,
            rsi: 1.0,
            stoch_rsi: 1.0,
            bollinger: 1.0,
        }
    }

    fn signals(pairs: &[(IndicatorKind, Signal)]) -> BTreeMap<IndicatorKind, Signal> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_empty_input_holds() {
        let result = synthesizer().synthesize(&BTreeMap::new(), &uniform_weights());
        assert_eq!(result, Signal::Hold);
    }

    #[test]
    fn test_zero_weights_hold() {
        let zero = IndicatorWeights {
            ema: 0.0,
            macd: 0.0,
            adx: 0.0,
            ichimoku: 0.0,
            rsi: 0.0,
            stoch_rsi: 0.0,
            bollinger: 0.0,
        };
        let input = signals(&[(IndicatorKind::Ema, Signal::StrongBuy)]);
        assert_eq!(synthesizer().synthesize(&input, &zero), Signal::Hold);
    }

    #[test]
    fn test_unanimous_strong_buy() {
        let input: BTreeMap<_, _> = IndicatorKind::ALL
            .iter()
            .filter(|&&kind| kind != IndicatorKind::Atr)
            .map(|&kind| (kind, Signal::StrongBuy))
            .collect();

        let scores = synthesizer().scores(&input, &uniform_weights());
        assert_eq!(scores.strong_buy, 2.5);
        assert_eq!(scores.total_weight, 7.0);
        assert_eq!(
            synthesizer().synthesize(&input, &uniform_weights()),
            Signal::StrongBuy
        );
    }

    #[test]
    fn test_hold_dominance_wins_first() {
        let input = signals(&[
            (IndicatorKind::Ema, Signal::Hold),
            (IndicatorKind::Macd, Signal::Hold),
            (IndicatorKind::Adx, Signal::Hold),
            (IndicatorKind::Rsi, Signal::StrongBuy),
        ]);
        // hold 3/4 = 0.75 > strong_buy 2.5/4 = 0.625
        assert_eq!(
            synthesizer().synthesize(&input, &uniform_weights()),
            Signal::Hold
        );
    }

    #[test]
    fn test_buy_sell_tie_holds() {
        let input = signals(&[
            (IndicatorKind::Ema, Signal::Buy),
            (IndicatorKind::Macd, Signal::Sell),
        ]);
        assert_eq!(
            synthesizer().synthesize(&input, &uniform_weights()),
            Signal::Hold
        );
    }

    #[test]
    fn test_moderate_buy() {
        let input = signals(&[
            (IndicatorKind::Ema, Signal::Buy),
            (IndicatorKind::Macd, Signal::Buy),
            (IndicatorKind::Adx, Signal::Sell),
        ]);
        // buy 4/3, sell 2/3
        assert_eq!(
            synthesizer().synthesize(&input, &uniform_weights()),
            Signal::Buy
        );
    }

    #[test]
    fn test_moderate_sell() {
        let input = signals(&[
            (IndicatorKind::Rsi, Signal::Sell),
            (IndicatorKind::StochRsi, Signal::Sell),
            (IndicatorKind::Bollinger, Signal::Hold),
        ]);
        // sell 4/3 beats hold 1/3
        assert_eq!(
            synthesizer().synthesize(&input, &uniform_weights()),
            Signal::Sell
        );
    }

    #[test]
    fn test_strong_needs_strict_lead() {
        let input = signals(&[
            (IndicatorKind::Ema, Signal::StrongBuy),
            (IndicatorKind::Macd, Signal::StrongSell),
        ]);
        // Strong buckets tie, buy and sell are both zero
        assert_eq!(
            synthesizer().synthesize(&input, &uniform_weights()),
            Signal::Hold
        );
    }

    #[test]
    fn test_weights_shift_outcome() {
        let input = signals(&[
            (IndicatorKind::Ema, Signal::StrongBuy),
            (IndicatorKind::Rsi, Signal::StrongSell),
        ]);

        // Weekly weights favour EMA, per-second weights favour RSI
        let weekly = IndicatorWeights::for_interval(Interval::OneWeek);
        let per_second = IndicatorWeights::for_interval(Interval::OneSecond);

        assert_eq!(synthesizer().synthesize(&input, &weekly), Signal::StrongBuy);
        assert_eq!(
            synthesizer().synthesize(&input, &per_second),
            Signal::StrongSell
        );
    }

    #[test]
    fn test_below_reliability_threshold_holds() {
        let strict = SignalSynthesizer::new(
            SignalWeights::default(),
            ReliabilityThresholds {
                strong: 5.0,
                moderate: 5.0,
            },
        );
        let input = signals(&[
            (IndicatorKind::Ema, Signal::Buy),
            (IndicatorKind::Macd, Signal::Buy),
        ]);
        assert_eq!(strict.synthesize(&input, &uniform_weights()), Signal::Hold);
    }
}
