use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use super::MarketDataProvider;
use crate::config::BinanceSettings;
use crate::error::{AnalysisError, Result};
use crate::models::{Candle, Interval, MarketSnapshot};

const MAX_RETRIES: u32 = 3;

type BinanceRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Response from /api/v3/avgPrice
#[derive(Debug, Deserialize)]
struct AvgPriceResponse {
    price: String,
}

/// Binance spot REST client with rate limiting and retries
///
/// Cloneable; all clones share the same rate limiter.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    candle_limit: u32,
    backoff: Duration,
    rate_limiter: Arc<BinanceRateLimiter>,
}

impl BinanceClient {
    pub fn new(settings: &BinanceSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        let rpm = NonZeroU32::new(settings.requests_per_minute).ok_or_else(|| {
            AnalysisError::Config("requests_per_minute must be greater than zero".into())
        })?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rpm)));

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            candle_limit: settings.candle_limit,
            backoff: Duration::from_secs(1),
            rate_limiter,
        })
    }

    /// Base delay for retries; attempt `n` waits `backoff * 2^n`
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Make a rate-limited GET request with retry logic
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);

        for attempt in 1..=MAX_RETRIES {
            self.rate_limiter.until_ready().await;
            let delay = self.backoff * 2u32.pow(attempt);

            match self.client.get(&url).query(query).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response.json().await?);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        if attempt == MAX_RETRIES {
                            return Err(AnalysisError::Fetch(format!(
                                "{} returned {} after {} attempts",
                                path, status, MAX_RETRIES
                            )));
                        }
                        tracing::warn!(
                            "Binance {} returned {}, retrying in {:?} (attempt {}/{})",
                            path,
                            status,
                            delay,
                            attempt,
                            MAX_RETRIES
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    // Other errors (4xx) - don't retry
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    return Err(AnalysisError::Fetch(format!(
                        "Binance API error ({}): {}",
                        status, error_text
                    )));
                }
                Err(e) if attempt < MAX_RETRIES => {
                    tracing::warn!(
                        "Network error: {}, retrying in {:?} (attempt {}/{})",
                        e,
                        delay,
                        attempt,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AnalysisError::Fetch(format!(
            "{} failed after {} retries",
            path, MAX_RETRIES
        )))
    }

    pub async fn fetch_candles(&self, symbol: &str, interval: Interval) -> Result<Vec<Candle>> {
        let body = self
            .get_json(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", self.candle_limit.to_string()),
                ],
            )
            .await?;

        parse_klines(&body)
    }

    pub async fn fetch_avg_price(&self, symbol: &str) -> Result<f64> {
        let body = self
            .get_json("/api/v3/avgPrice", &[("symbol", symbol.to_string())])
            .await?;

        let response: AvgPriceResponse = serde_json::from_value(body)
            .map_err(|e| AnalysisError::MalformedData(format!("avgPrice response: {}", e)))?;
        parse_decimal(&response.price, "avgPrice")
    }
}

#[async_trait]
impl MarketDataProvider for BinanceClient {
    async fn fetch_market(&self, symbol: &str, interval: Interval) -> Result<MarketSnapshot> {
        let (candles, avg_price) = tokio::try_join!(
            self.fetch_candles(symbol, interval),
            self.fetch_avg_price(symbol)
        )?;

        tracing::debug!(
            "Fetched {} candles for {} ({}), newest opened {:?}",
            candles.len(),
            symbol,
            interval,
            candles.last().and_then(|c| c.open_time())
        );
        MarketSnapshot::from_candles(candles, avg_price)
    }
}

fn parse_decimal(raw: &str, field: &str) -> Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AnalysisError::MalformedData(format!("{}: invalid number {:?}", field, raw)))
}

/// Parse kline rows `[openTime, open, high, low, close, volume, ...]`
fn parse_klines(body: &Value) -> Result<Vec<Candle>> {
    let rows = body
        .as_array()
        .ok_or_else(|| AnalysisError::MalformedData("klines response is not an array".into()))?;

    rows.iter().map(parse_kline).collect()
}

fn parse_kline(row: &Value) -> Result<Candle> {
    let fields = row
        .as_array()
        .filter(|fields| fields.len() >= 6)
        .ok_or_else(|| AnalysisError::MalformedData(format!("kline row: {}", row)))?;

    let timestamp = fields[0]
        .as_i64()
        .ok_or_else(|| AnalysisError::MalformedData(format!("kline open time: {}", fields[0])))?;

    let number = |index: usize, field: &str| -> Result<f64> {
        match &fields[index] {
            Value::String(raw) => parse_decimal(raw, field),
            other => other
                .as_f64()
                .ok_or_else(|| AnalysisError::MalformedData(format!("{}: {}", field, other))),
        }
    };

    Ok(Candle {
        timestamp,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        volume: number(5, "volume")?,
    })
}
