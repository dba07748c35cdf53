// Trading pair lifecycle
// PendingPair (symbol + interval) -> initialize -> TradingPair (indicators + final signal)

use std::collections::BTreeMap;

use crate::api::MarketDataProvider;
use crate::config::{AnalysisConfig, IntervalProfile};
use crate::error::{AnalysisError, Result};
use crate::indicators::{IndicatorKind, IndicatorResult, IndicatorSet, SignalContext};
use crate::models::{Interval, MarketSnapshot, PriceSeries, Signal};
use crate::strategy::SignalSynthesizer;

/// A symbol waiting to be analyzed.
///
/// `initialize` consumes it, so a pair can only be initialized once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPair {
    symbol: String,
    interval: Interval,
}

impl PendingPair {
    pub fn new(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Fetch market data and compute every indicator and the final signal
    pub async fn initialize(
        self,
        provider: &dyn MarketDataProvider,
        config: &AnalysisConfig,
    ) -> Result<TradingPair> {
        let snapshot = provider.fetch_market(&self.symbol, self.interval).await?;
        TradingPair::from_snapshot(self.symbol, self.interval, snapshot, config)
    }
}

/// A fully analyzed trading pair
#[derive(Debug, Clone)]
pub struct TradingPair {
    symbol: String,
    interval: Interval,
    last_price: f64,
    avg_price: f64,
    series: PriceSeries,
    profile: IntervalProfile,
    indicators: IndicatorSet,
    signals: BTreeMap<IndicatorKind, Signal>,
    signal: Signal,
}

impl TradingPair {
    /// Analyze already fetched market data
    pub fn from_snapshot(
        symbol: impl Into<String>,
        interval: Interval,
        snapshot: MarketSnapshot,
        config: &AnalysisConfig,
    ) -> Result<Self> {
        config.validate()?;

        let symbol = symbol.into();
        if !(snapshot.last_price.is_finite() && snapshot.avg_price.is_finite()) {
            return Err(AnalysisError::MalformedData(format!(
                "{} prices must be finite, got last {} / avg {}",
                symbol, snapshot.last_price, snapshot.avg_price
            )));
        }

        let profile = config.profile(interval);

        let series = PriceSeries::from_candles(&snapshot.candles)?;
        let indicators = IndicatorSet::compute(&series, &profile.params)?;

        let ctx = SignalContext {
            last_price: snapshot.last_price,
            thresholds: &config.thresholds,
        };
        let signals = indicators.signals(&ctx);
        for (kind, signal) in &signals {
            tracing::debug!("{} {} {}: {}", symbol, interval, kind, signal);
        }

        let signal = SignalSynthesizer::from_config(config).synthesize(&signals, &profile.weights);

        Ok(Self {
            symbol,
            interval,
            last_price: snapshot.last_price,
            avg_price: snapshot.avg_price,
            series,
            profile,
            indicators,
            signals,
            signal,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn last_price(&self) -> f64 {
        self.last_price
    }

    pub fn avg_price(&self) -> f64 {
        self.avg_price
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    /// Parameters and weights the pair was analyzed with
    pub fn profile(&self) -> &IntervalProfile {
        &self.profile
    }

    pub fn indicators(&self) -> &IndicatorSet {
        &self.indicators
    }

    pub fn indicator(&self, kind: IndicatorKind) -> IndicatorResult {
        self.indicators.get(kind)
    }

    /// Per-indicator signals fed to the synthesizer
    pub fn signals(&self) -> &BTreeMap<IndicatorKind, Signal> {
        &self.signals
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;
    use async_trait::async_trait;

    fn candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: 1_700_000_000_000 + i as i64 * 1000,
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1.0,
            })
            .collect()
    }

    struct FixedProvider(Vec<f64>);

    #[async_trait]
    impl MarketDataProvider for FixedProvider {
        async fn fetch_market(&self, _symbol: &str, _interval: Interval) -> Result<MarketSnapshot> {
            MarketSnapshot::from_candles(candles(&self.0), 100.0)
        }
    }

    #[test]
    fn test_flat_market_holds() {
        let snapshot = MarketSnapshot::from_candles(candles(&[100.0; 60]), 100.0).unwrap();
        let pair = TradingPair::from_snapshot(
            "BTCUSDT",
            Interval::OneSecond,
            snapshot,
            &AnalysisConfig::default(),
        )
        .unwrap();

        assert_eq!(pair.signal(), Signal::Hold);
        assert_eq!(pair.signals().len(), 7);
        assert!(pair.signals().values().all(|&s| s == Signal::Hold));
        assert_eq!(pair.last_price(), 100.0);
    }

    #[test]
    fn test_short_history_fails() {
        let snapshot = MarketSnapshot::from_candles(candles(&[100.0; 10]), 100.0).unwrap();
        let result = TradingPair::from_snapshot(
            "BTCUSDT",
            Interval::OneHour,
            snapshot,
            &AnalysisConfig::default(),
        );
        assert!(matches!(
            result,
            Err(AnalysisError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_malformed_candles_fail() {
        let mut bad = candles(&[100.0; 60]);
        bad[10].high = f64::NAN;
        let snapshot = MarketSnapshot::from_candles(bad, 100.0).unwrap();

        let result = TradingPair::from_snapshot(
            "BTCUSDT",
            Interval::OneSecond,
            snapshot,
            &AnalysisConfig::default(),
        );
        assert!(matches!(result, Err(AnalysisError::MalformedData(_))));
    }

    #[test]
    fn test_initialize_through_provider() {
        let provider = FixedProvider((0..60).map(|i| 100.0 + i as f64).collect());
        let pending = PendingPair::new("ETHUSDT", Interval::OneSecond);
        assert_eq!(pending.symbol(), "ETHUSDT");

        let config = AnalysisConfig::default();
        let pair = tokio_test::block_on(pending.initialize(&provider, &config)).unwrap();

        assert_eq!(pair.symbol(), "ETHUSDT");
        assert_eq!(pair.interval(), Interval::OneSecond);
        assert_eq!(pair.last_price(), 159.0);
        assert_eq!(pair.avg_price(), 100.0);
        assert_eq!(pair.series().len(), 60);
        assert_eq!(pair.indicator(IndicatorKind::Atr).kind(), IndicatorKind::Atr);
    }

    #[test]
    fn test_invalid_profile_is_config_error() {
        let mut profile = IntervalProfile::for_interval(Interval::OneSecond);
        profile.params.macd.fast_period = 0;
        let config = AnalysisConfig::default().with_profile(Interval::OneSecond, profile);

        let snapshot = MarketSnapshot::from_candles(candles(&[100.0; 60]), 100.0).unwrap();
        let result = TradingPair::from_snapshot("BTCUSDT", Interval::OneSecond, snapshot, &config);
        assert!(matches!(result, Err(AnalysisError::Config(_))));

        let mut profile = IntervalProfile::for_interval(Interval::OneSecond);
        profile.params.macd.fast_period = profile.params.macd.slow_period;
        let config = AnalysisConfig::default().with_profile(Interval::OneSecond, profile);

        let snapshot = MarketSnapshot::from_candles(candles(&[100.0; 60]), 100.0).unwrap();
        let result = TradingPair::from_snapshot("BTCUSDT", Interval::OneSecond, snapshot, &config);
        assert!(matches!(result, Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_non_finite_prices_fail() {
        let mut snapshot = MarketSnapshot::from_candles(candles(&[100.0; 60]), 100.0).unwrap();
        snapshot.last_price = f64::NAN;
        let result = TradingPair::from_snapshot(
            "BTCUSDT",
            Interval::OneSecond,
            snapshot,
            &AnalysisConfig::default(),
        );
        assert!(matches!(result, Err(AnalysisError::MalformedData(_))));

        let snapshot = MarketSnapshot::from_candles(candles(&[100.0; 60]), f64::INFINITY).unwrap();
        let result = TradingPair::from_snapshot(
            "BTCUSDT",
            Interval::OneSecond,
            snapshot,
            &AnalysisConfig::default(),
        );
        assert!(matches!(result, Err(AnalysisError::MalformedData(_))));
    }
}
