use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::indicators::IndicatorKind;
use crate::models::Interval;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PeriodParams {
    pub period: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MacdParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StochRsiParams {
    pub rsi_period: usize,
    pub stochastic_period: usize,
    pub k_period: usize,
    pub d_period: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BollingerParams {
    pub period: usize,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IchimokuParams {
    pub conversion_period: usize,
    pub base_period: usize,
    pub span_period: usize,
    pub displacement: usize,
}

/// Complete parameter set for every indicator at one interval
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndicatorParams {
    pub ema: PeriodParams,
    pub macd: MacdParams,
    pub adx: PeriodParams,
    pub rsi: PeriodParams,
    pub stoch_rsi: StochRsiParams,
    pub atr: PeriodParams,
    pub bollinger: BollingerParams,
    pub ichimoku: IchimokuParams,
}

const fn period(period: usize) -> PeriodParams {
    PeriodParams { period }
}

const fn macd(fast_period: usize, slow_period: usize, signal_period: usize) -> MacdParams {
    MacdParams {
        fast_period,
        slow_period,
        signal_period,
    }
}

const fn stoch_rsi(rsi_period: usize, stochastic_period: usize) -> StochRsiParams {
    StochRsiParams {
        rsi_period,
        stochastic_period,
        k_period: 3,
        d_period: 3,
    }
}

const fn bollinger(period: usize, std_dev: f64) -> BollingerParams {
    BollingerParams { period, std_dev }
}

const fn ichimoku(
    conversion: usize,
    base: usize,
    span: usize,
    displacement: usize,
) -> IchimokuParams {
    IchimokuParams {
        conversion_period: conversion,
        base_period: base,
        span_period: span,
        displacement,
    }
}

const ICHIMOKU_STANDARD: IchimokuParams = ichimoku(9, 26, 52, 26);

impl IndicatorParams {
    /// Tuned parameter table; shorter intervals use shorter lookbacks
    pub fn for_interval(interval: Interval) -> Self {
        use Interval::*;

        match interval {
            OneSecond => Self {
                ema: period(5),
                macd: macd(5, 10, 3),
                adx: period(5),
                rsi: period(5),
                stoch_rsi: stoch_rsi(4, 5),
                atr: period(5),
                bollinger: bollinger(10, 1.5),
                ichimoku: ichimoku(5, 10, 20, 10),
            },
            OneMinute => Self {
                ema: period(7),
                macd: macd(7, 12, 4),
                adx: period(7),
                rsi: period(7),
                stoch_rsi: stoch_rsi(6, 7),
                atr: period(7),
                bollinger: bollinger(10, 1.6),
                ichimoku: ichimoku(6, 13, 26, 13),
            },
            ThreeMinutes => Self {
                ema: period(8),
                macd: macd(8, 14, 5),
                adx: period(8),
                rsi: period(8),
                stoch_rsi: stoch_rsi(7, 8),
                atr: period(8),
                bollinger: bollinger(12, 1.7),
                ichimoku: ichimoku(7, 17, 34, 17),
            },
            FiveMinutes => Self {
                ema: period(10),
                macd: macd(10, 18, 6),
                adx: period(9),
                rsi: period(9),
                stoch_rsi: stoch_rsi(8, 10),
                atr: period(9),
                bollinger: bollinger(12, 1.8),
                ichimoku: ICHIMOKU_STANDARD,
            },
            FifteenMinutes => Self {
                ema: period(14),
                macd: macd(12, 20, 7),
                adx: period(12),
                rsi: period(12),
                stoch_rsi: stoch_rsi(10, 12),
                atr: period(12),
                bollinger: bollinger(14, 1.9),
                ichimoku: ICHIMOKU_STANDARD,
            },
            ThirtyMinutes => Self {
                ema: period(18),
                macd: macd(14, 26, 9),
                adx: period(15),
                rsi: period(15),
                stoch_rsi: stoch_rsi(12, 14),
                atr: period(15),
                bollinger: bollinger(16, 2.0),
                ichimoku: ICHIMOKU_STANDARD,
            },
            OneHour => Self {
                ema: period(24),
                macd: macd(18, 32, 11),
                adx: period(18),
                rsi: period(18),
                stoch_rsi: stoch_rsi(14, 16),
                atr: period(18),
                bollinger: bollinger(20, 2.1),
                ichimoku: ICHIMOKU_STANDARD,
            },
            TwoHours => Self {
                ema: period(32),
                macd: macd(24, 48, 16),
                adx: period(22),
                rsi: period(22),
                stoch_rsi: stoch_rsi(18, 20),
                atr: period(22),
                bollinger: bollinger(24, 2.2),
                ichimoku: ICHIMOKU_STANDARD,
            },
            FourHours => Self {
                ema: period(40),
                macd: macd(30, 60, 20),
                adx: period(26),
                rsi: period(26),
                stoch_rsi: stoch_rsi(22, 24),
                atr: period(26),
                bollinger: bollinger(30, 2.3),
                ichimoku: ICHIMOKU_STANDARD,
            },
            SixHours => Self {
                ema: period(50),
                macd: macd(40, 80, 25),
                adx: period(30),
                rsi: period(30),
                stoch_rsi: stoch_rsi(28, 30),
                atr: period(30),
                bollinger: bollinger(35, 2.4),
                ichimoku: ICHIMOKU_STANDARD,
            },
            EightHours => Self {
                ema: period(60),
                macd: macd(45, 90, 30),
                adx: period(34),
                rsi: period(34),
                stoch_rsi: stoch_rsi(30, 32),
                atr: period(34),
                bollinger: bollinger(40, 2.5),
                ichimoku: ICHIMOKU_STANDARD,
            },
            TwelveHours => Self {
                ema: period(70),
                macd: macd(50, 100, 35),
                adx: period(40),
                rsi: period(40),
                stoch_rsi: stoch_rsi(35, 36),
                atr: period(40),
                bollinger: bollinger(50, 2.6),
                ichimoku: ICHIMOKU_STANDARD,
            },
            OneDay => Self {
                ema: period(100),
                macd: macd(75, 150, 50),
                adx: period(50),
                rsi: period(50),
                stoch_rsi: stoch_rsi(45, 50),
                atr: period(50),
                bollinger: bollinger(60, 2.8),
                ichimoku: ICHIMOKU_STANDARD,
            },
            ThreeDays => Self {
                ema: period(150),
                macd: macd(120, 240, 80),
                adx: period(60),
                rsi: period(60),
                stoch_rsi: stoch_rsi(55, 60),
                atr: period(60),
                bollinger: bollinger(70, 2.9),
                ichimoku: ICHIMOKU_STANDARD,
            },
            OneWeek => Self {
                ema: period(200),
                macd: macd(150, 300, 100),
                adx: period(70),
                rsi: period(70),
                stoch_rsi: stoch_rsi(65, 70),
                atr: period(70),
                bollinger: bollinger(80, 3.0),
                ichimoku: ICHIMOKU_STANDARD,
            },
        }
    }

    /// Reject zero periods, inverted MACD legs and bad band widths
    pub fn validate(&self) -> Result<()> {
        let periods = [
            (IndicatorKind::Ema, self.ema.period),
            (IndicatorKind::Macd, self.macd.fast_period),
            (IndicatorKind::Macd, self.macd.slow_period),
            (IndicatorKind::Macd, self.macd.signal_period),
            (IndicatorKind::Adx, self.adx.period),
            (IndicatorKind::Rsi, self.rsi.period),
            (IndicatorKind::StochRsi, self.stoch_rsi.rsi_period),
            (IndicatorKind::StochRsi, self.stoch_rsi.stochastic_period),
            (IndicatorKind::StochRsi, self.stoch_rsi.k_period),
            (IndicatorKind::StochRsi, self.stoch_rsi.d_period),
            (IndicatorKind::Atr, self.atr.period),
            (IndicatorKind::Bollinger, self.bollinger.period),
            (IndicatorKind::Ichimoku, self.ichimoku.conversion_period),
            (IndicatorKind::Ichimoku, self.ichimoku.base_period),
            (IndicatorKind::Ichimoku, self.ichimoku.span_period),
        ];

        if let Some((kind, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(AnalysisError::Config(format!("{} period must be > 0", kind)));
        }

        if self.macd.fast_period >= self.macd.slow_period {
            return Err(AnalysisError::Config(format!(
                "MACD fast period ({}) must be shorter than slow period ({})",
                self.macd.fast_period, self.macd.slow_period
            )));
        }

        if !(self.bollinger.std_dev.is_finite() && self.bollinger.std_dev > 0.0) {
            return Err(AnalysisError::Config(format!(
                "Bollinger std_dev must be positive, got {}",
                self.bollinger.std_dev
            )));
        }

        Ok(())
    }
}

/// Per-interval weight of each indicator in synthesis and scoring
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IndicatorWeights {
    pub ema: f64,
    pub macd: f64,
    pub adx: f64,
    pub ichimoku: f64,
    pub rsi: f64,
    pub stoch_rsi: f64,
    pub bollinger: f64,
}

const fn weights(
    ema: f64,
    macd: f64,
    adx: f64,
    ichimoku: f64,
    rsi: f64,
    stoch_rsi: f64,
    bollinger: f64,
) -> IndicatorWeights {
    IndicatorWeights {
        ema,
        macd,
        adx,
        ichimoku,
        rsi,
        stoch_rsi,
        bollinger,
    }
}

impl IndicatorWeights {
    /// Momentum oscillators dominate short intervals, trend indicators long ones
    pub fn for_interval(interval: Interval) -> Self {
        use Interval::*;

        match interval {
            OneSecond => weights(1.2, 1.4, 1.1, 0.6, 2.2, 2.5, 1.0),
            OneMinute => weights(1.5, 1.3, 1.2, 0.7, 2.1, 2.3, 0.9),
            ThreeMinutes => weights(1.7, 1.5, 1.4, 0.8, 1.9, 2.0, 0.7),
            FiveMinutes => weights(1.9, 1.6, 1.5, 1.0, 1.7, 1.8, 0.5),
            FifteenMinutes => weights(2.2, 1.7, 1.6, 1.1, 1.5, 1.6, 0.3),
            ThirtyMinutes => weights(2.4, 1.8, 1.7, 1.3, 1.3, 1.2, 0.3),
            OneHour => weights(2.3, 1.8, 1.3, 1.6, 1.1, 1.0, 0.9),
            TwoHours => weights(2.2, 2.0, 1.9, 1.5, 1.0, 0.7, 0.7),
            FourHours => weights(2.3, 2.0, 1.7, 1.9, 1.0, 0.7, 0.4),
            SixHours => weights(2.8, 2.0, 1.8, 1.7, 0.9, 0.7, 0.1),
            EightHours => weights(2.5, 2.3, 1.7, 1.9, 0.8, 0.6, 0.2),
            TwelveHours => weights(2.6, 2.1, 1.9, 2.0, 0.6, 0.5, 0.3),
            OneDay => weights(2.7, 1.7, 2.1, 2.2, 0.6, 0.5, 0.2),
            ThreeDays => weights(3.0, 2.0, 1.9, 2.0, 0.5, 0.4, 0.2),
            OneWeek => weights(3.0, 2.0, 1.9, 2.5, 0.3, 0.2, 0.1),
        }
    }

    /// ATR carries no weight: it never emits a signal
    pub fn weight(&self, kind: IndicatorKind) -> f64 {
        match kind {
            IndicatorKind::Ema => self.ema,
            IndicatorKind::Macd => self.macd,
            IndicatorKind::Adx => self.adx,
            IndicatorKind::Ichimoku => self.ichimoku,
            IndicatorKind::Rsi => self.rsi,
            IndicatorKind::StochRsi => self.stoch_rsi,
            IndicatorKind::Bollinger => self.bollinger,
            IndicatorKind::Atr => 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for kind in IndicatorKind::ALL {
            let weight = self.weight(kind);
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(AnalysisError::Config(format!(
                    "{} weight must be a non-negative number, got {}",
                    kind, weight
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_interval_has_valid_params() {
        for interval in Interval::ALL {
            let params = IndicatorParams::for_interval(interval);
            assert!(params.validate().is_ok(), "invalid params for {}", interval);
        }
    }

    #[test]
    fn test_every_interval_has_valid_weights() {
        for interval in Interval::ALL {
            let weights = IndicatorWeights::for_interval(interval);
            assert!(weights.validate().is_ok(), "invalid weights for {}", interval);
            assert_eq!(weights.weight(IndicatorKind::Atr), 0.0);
        }
    }

    #[test]
    fn test_hourly_table_values() {
        let params = IndicatorParams::for_interval(Interval::OneHour);
        assert_eq!(params.ema.period, 24);
        assert_eq!(params.macd, macd(18, 32, 11));
        assert_eq!(params.stoch_rsi.stochastic_period, 16);
        assert_eq!(params.bollinger.std_dev, 2.1);

        let weights = IndicatorWeights::for_interval(Interval::OneHour);
        assert_eq!(weights.weight(IndicatorKind::Ema), 2.3);
        assert_eq!(weights.weight(IndicatorKind::Ichimoku), 1.6);
    }

    #[test]
    fn test_inverted_macd_rejected() {
        let mut params = IndicatorParams::for_interval(Interval::OneHour);
        params.macd.fast_period = 40;
        assert!(matches!(params.validate(), Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut params = IndicatorParams::for_interval(Interval::OneDay);
        params.rsi.period = 0;
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("RSI"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut weights = IndicatorWeights::for_interval(Interval::FourHours);
        weights.bollinger = -1.0;
        assert!(weights.validate().is_err());
    }
}
