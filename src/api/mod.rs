// Market data providers
pub mod binance;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Interval, MarketSnapshot};

pub use binance::BinanceClient;

/// Source of candles and average price for a symbol
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_market(&self, symbol: &str, interval: Interval) -> Result<MarketSnapshot>;
}
