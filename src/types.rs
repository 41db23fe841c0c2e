use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A list of values, where the last index is the most recent
pub type Data = Vec<f64>;

/// One trading day of OHLCV data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Average news sentiment for one reported day, typically in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub date: NaiveDate,
    pub sentiment: f64,
}

/// One calendar day of aligned price and sentiment data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub sentiment: f64,
}

impl MarketRow {
    pub fn from_parts(bar: &PriceBar, sentiment: &SentimentPoint) -> Self {
        Self {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            sentiment: sentiment.sentiment,
        }
    }

    pub fn price_bar(&self) -> PriceBar {
        PriceBar {
            date: self.date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }

    pub fn sentiment_point(&self) -> SentimentPoint {
        SentimentPoint {
            date: self.date,
            sentiment: self.sentiment,
        }
    }
}
