use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AnalysisError, Result};

/// OHLCV candlestick as returned by the exchange
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    /// Open time, epoch milliseconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Trading signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Signal {
    pub const ALL: [Signal; 5] = [
        Signal::StrongBuy,
        Signal::Buy,
        Signal::Hold,
        Signal::Sell,
        Signal::StrongSell,
    ];

    pub fn is_bullish(self) -> bool {
        matches!(self, Signal::Buy | Signal::StrongBuy)
    }

    pub fn is_bearish(self) -> bool {
        matches!(self, Signal::Sell | Signal::StrongSell)
    }

    /// Directional lean: +2 strong buy .. -2 strong sell
    pub fn bias(self) -> i8 {
        match self {
            Signal::StrongBuy => 2,
            Signal::Buy => 1,
            Signal::Hold => 0,
            Signal::Sell => -1,
            Signal::StrongSell => -2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::StrongBuy => "STRONG_BUY",
            Signal::Buy => "BUY",
            Signal::Hold => "HOLD",
            Signal::Sell => "SELL",
            Signal::StrongSell => "STRONG_SELL",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kline interval supported by the exchange
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Interval {
    #[serde(rename = "1s")]
    OneSecond,
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "3m")]
    ThreeMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "8h")]
    EightHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "1w")]
    OneWeek,
}

impl Interval {
    pub const ALL: [Interval; 15] = [
        Interval::OneSecond,
        Interval::OneMinute,
        Interval::ThreeMinutes,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
        Interval::TwoHours,
        Interval::FourHours,
        Interval::SixHours,
        Interval::EightHours,
        Interval::TwelveHours,
        Interval::OneDay,
        Interval::ThreeDays,
        Interval::OneWeek,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::OneSecond => "1s",
            Interval::OneMinute => "1m",
            Interval::ThreeMinutes => "3m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::TwoHours => "2h",
            Interval::FourHours => "4h",
            Interval::SixHours => "6h",
            Interval::EightHours => "8h",
            Interval::TwelveHours => "12h",
            Interval::OneDay => "1d",
            Interval::ThreeDays => "3d",
            Interval::OneWeek => "1w",
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::OneHour
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Interval::ALL
            .into_iter()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| AnalysisError::UnknownInterval(s.to_string()))
    }
}

/// Close/high/low series extracted from candles, oldest first.
///
/// All three series always have the same non-zero length.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    closes: Vec<f64>,
    highs: Vec<f64>,
    lows: Vec<f64>,
}

impl PriceSeries {
    pub fn new(closes: Vec<f64>, highs: Vec<f64>, lows: Vec<f64>) -> Result<Self> {
        if closes.len() != highs.len() || highs.len() != lows.len() {
            return Err(AnalysisError::MalformedData(format!(
                "series length mismatch: {} closes, {} highs, {} lows",
                closes.len(),
                highs.len(),
                lows.len()
            )));
        }

        if closes.is_empty() {
            return Err(AnalysisError::MalformedData("empty price series".into()));
        }

        let all_finite = closes
            .iter()
            .chain(highs.iter())
            .chain(lows.iter())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(AnalysisError::MalformedData(
                "price series contains non-finite values".into(),
            ));
        }

        Ok(Self {
            closes,
            highs,
            lows,
        })
    }

    pub fn from_candles(candles: &[Candle]) -> Result<Self> {
        Self::new(
            candles.iter().map(|c| c.close).collect(),
            candles.iter().map(|c| c.high).collect(),
            candles.iter().map(|c| c.low).collect(),
        )
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn highs(&self) -> &[f64] {
        &self.highs
    }

    pub fn lows(&self) -> &[f64] {
        &self.lows
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn last_close(&self) -> f64 {
        // Non-empty by construction
        self.closes[self.closes.len() - 1]
    }
}

/// Raw market data for one symbol, as delivered by a data provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub avg_price: f64,
    pub last_price: f64,
    pub candles: Vec<Candle>,
}

impl MarketSnapshot {
    /// Build a snapshot whose last price is the newest candle's close
    pub fn from_candles(candles: Vec<Candle>, avg_price: f64) -> Result<Self> {
        let last_price = candles
            .last()
            .map(|c| c.close)
            .ok_or_else(|| AnalysisError::MalformedData("no candles returned".into()))?;

        Ok(Self {
            avg_price,
            last_price,
            candles,
        })
    }
}

/// Result of analyzing one trading pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub symbol: String,
    pub interval: Interval,
    pub last_price: f64,
    pub avg_price: f64,
    pub signal: Signal,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub score: f64,
}

/// Overall market lean across a batch of trade records
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketSentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for MarketSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketSentiment::Bullish => "BULLISH",
            MarketSentiment::Bearish => "BEARISH",
            MarketSentiment::Neutral => "NEUTRAL",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(close: f64) -> Candle {
        Candle {
            timestamp: 1_700_000_000_000,
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_interval_round_trips_through_str() {
        for interval in Interval::ALL {
            let parsed: Interval = interval.as_str().parse().unwrap();
            assert_eq!(parsed, interval);
        }
    }

    #[test]
    fn test_unknown_interval_is_rejected() {
        let result = "2w".parse::<Interval>();
        assert!(matches!(result, Err(AnalysisError::UnknownInterval(s)) if s == "2w"));
    }

    #[test]
    fn test_interval_serde_uses_exchange_strings() {
        let json = serde_json::to_string(&Interval::FifteenMinutes).unwrap();
        assert_eq!(json, "\"15m\"");
        let back: Interval = serde_json::from_str("\"1w\"").unwrap();
        assert_eq!(back, Interval::OneWeek);
    }

    #[test]
    fn test_signal_direction() {
        assert!(Signal::StrongBuy.is_bullish());
        assert!(Signal::Sell.is_bearish());
        assert!(!Signal::Hold.is_bullish());
        assert!(!Signal::Hold.is_bearish());
        assert_eq!(Signal::StrongSell.to_string(), "STRONG_SELL");
    }

    #[test]
    fn test_candle_open_time() {
        let open_time = candle(1.0).open_time().unwrap();
        assert_eq!(open_time.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_price_series_from_candles() {
        let candles: Vec<Candle> = (0..5).map(|i| candle(100.0 + i as f64)).collect();
        let series = PriceSeries::from_candles(&candles).unwrap();

        assert_eq!(series.len(), 5);
        assert_eq!(series.highs()[0], 100.5);
        assert_eq!(series.lows()[4], 103.5);
        assert_eq!(series.last_close(), 104.0);
    }

    #[test]
    fn test_price_series_rejects_mismatched_lengths() {
        let result = PriceSeries::new(vec![1.0, 2.0], vec![1.0, 2.0], vec![1.0]);
        assert!(matches!(result, Err(AnalysisError::MalformedData(_))));
    }

    #[test]
    fn test_price_series_rejects_empty_and_nan() {
        assert!(PriceSeries::new(vec![], vec![], vec![]).is_err());
        assert!(PriceSeries::new(vec![f64::NAN], vec![1.0], vec![1.0]).is_err());
    }

    #[test]
    fn test_snapshot_requires_candles() {
        assert!(MarketSnapshot::from_candles(vec![], 1.0).is_err());

        let snapshot =
            MarketSnapshot::from_candles(vec![candle(10.0), candle(12.0)], 11.0).unwrap();
        assert_eq!(snapshot.last_price, 12.0);
        assert_eq!(snapshot.avg_price, 11.0);
    }

    #[test]
    fn test_trade_record_serializes_camel_case() {
        let record = TradeRecord {
            symbol: "BTCUSDT".to_string(),
            interval: Interval::OneHour,
            last_price: 100.0,
            avg_price: 99.0,
            signal: Signal::Buy,
            take_profit: 105.0,
            stop_loss: 97.5,
            score: 42.0,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["takeProfit"], 105.0);
        assert_eq!(json["signal"], "BUY");
        assert_eq!(json["interval"], "1h");
    }
}
