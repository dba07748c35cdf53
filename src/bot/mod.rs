// Batch market analysis
// One task per symbol; a failing symbol is dropped, never fatal to the batch

use std::sync::Arc;

use crate::api::MarketDataProvider;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::models::{Interval, MarketSentiment, TradeRecord};
use crate::pair::PendingPair;
use crate::risk::TradeAnalysisEngine;

/// Outcome of a batch: successful records and per-symbol failures, both in
/// submission order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub trades: Vec<TradeRecord>,
    pub failures: Vec<(String, AnalysisError)>,
}

/// Analyzes symbols against a market data provider
#[derive(Clone)]
pub struct MarketBot {
    provider: Arc<dyn MarketDataProvider>,
    config: Arc<AnalysisConfig>,
}

impl MarketBot {
    /// Fails with a config error before any symbol is fetched
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Fetch, analyze and score a single symbol
    pub async fn analyze_symbol(&self, symbol: &str, interval: Interval) -> Result<TradeRecord> {
        let pair = PendingPair::new(symbol, interval)
            .initialize(self.provider.as_ref(), &self.config)
            .await?;

        let record = TradeAnalysisEngine::new(&pair, &self.config).analyze();
        tracing::info!(
            "Analyzed {} ({}): {} score {:.2}",
            record.symbol,
            record.interval,
            record.signal,
            record.score
        );

        Ok(record)
    }

    /// Analyze every symbol concurrently and keep both outcomes
    pub async fn analyze_batch<S: AsRef<str>>(
        &self,
        symbols: &[S],
        interval: Interval,
    ) -> BatchReport {
        let handles: Vec<_> = symbols
            .iter()
            .map(|symbol| {
                let symbol = symbol.as_ref().to_string();
                let bot = self.clone();
                let task_symbol = symbol.clone();
                let handle =
                    tokio::spawn(async move { bot.analyze_symbol(&task_symbol, interval).await });
                (symbol, handle)
            })
            .collect();

        let mut report = BatchReport::default();
        for (symbol, handle) in handles {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => Err(AnalysisError::Task {
                    symbol: symbol.clone(),
                    reason: e.to_string(),
                }),
            };

            match outcome {
                Ok(record) => report.trades.push(record),
                Err(e) => report.failures.push((symbol, e)),
            }
        }

        report
    }

    /// Best-effort batch: failed symbols are logged and left out
    pub async fn analyze_symbols<S: AsRef<str>>(
        &self,
        symbols: &[S],
        interval: Interval,
    ) -> Vec<TradeRecord> {
        let report = self.analyze_batch(symbols, interval).await;

        for (symbol, error) in &report.failures {
            if error.is_symbol_scoped() {
                tracing::warn!("Skipping {}: {}", symbol, error);
            } else {
                tracing::error!("❌ Skipping {} on a non-market error: {}", symbol, error);
            }
        }

        report.trades
    }
}

/// Overall lean of a batch.
///
/// Bearish only when sells outnumber buys and holds together.
pub fn compute_sentiment(trades: &[TradeRecord]) -> MarketSentiment {
    let bullish = trades.iter().filter(|t| t.signal.is_bullish()).count();
    let bearish = trades.iter().filter(|t| t.signal.is_bearish()).count();
    let hold = trades.len() - bullish - bearish;

    if bearish > bullish + hold {
        MarketSentiment::Bearish
    } else if bullish >= bearish {
        MarketSentiment::Bullish
    } else {
        MarketSentiment::Neutral
    }
}

/// Highest score first; ties keep their order
pub fn sort_trades(trades: &mut [TradeRecord]) {
    trades.sort_by(|a, b| b.score.total_cmp(&a.score));
}
