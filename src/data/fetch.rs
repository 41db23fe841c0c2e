//! Interfaces to the external price and sentiment providers.
//!
//! Providers are slow and flaky, so every call goes through [`fetch_with_retry`], which
//! makes a bounded number of attempts with a fixed delay between them and then gives up
//! with [`FetchError::Exhausted`].

use std::{future::Future, path::PathBuf, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{
    config::FetchConfig,
    data::historical::{load_price_series, load_sentiment_series},
    error::{FetchError, FetchResult},
    types::{PriceBar, SentimentPoint},
};

/// Daily OHLCV bars, ascending by date
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn price_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FetchResult<Vec<PriceBar>>;
}

/// Daily sentiment scores, ascending by date
#[async_trait]
pub trait SentimentSource: Send + Sync {
    fn name(&self) -> &str;

    async fn sentiment_series(
        &self,
        symbol: &str,
        company_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FetchResult<Vec<SentimentPoint>>;
}

/// Runs `operation` until it succeeds or `config.retry_count` attempts have failed.
/// At least one attempt is always made.
pub async fn fetch_with_retry<T, F, Fut>(
    config: &FetchConfig,
    source_name: &str,
    symbol: &str,
    mut operation: F,
) -> FetchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let attempts = config.retry_count.max(1);
    let delay = Duration::from_millis(config.retry_delay_ms);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match operation().await {
            Ok(value) => {
                debug!(source = source_name, symbol, attempt, "fetch succeeded");
                return Ok(value);
            }
            Err(e) => {
                warn!(
                    source = source_name,
                    symbol,
                    attempt,
                    attempts,
                    error = %e,
                    "fetch attempt failed"
                );
                last_error = e.to_string();

                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(FetchError::Exhausted {
        source_name: source_name.to_string(),
        symbol: symbol.to_string(),
        attempts,
        last_error,
    })
}

pub async fn fetch_price_series(
    source: &dyn PriceSource,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    config: &FetchConfig,
) -> FetchResult<Vec<PriceBar>> {
    fetch_with_retry(config, source.name(), symbol, || {
        source.price_series(symbol, start, end)
    })
    .await
}

pub async fn fetch_sentiment_series(
    source: &dyn SentimentSource,
    symbol: &str,
    company_name: &str,
    start: NaiveDate,
    end: NaiveDate,
    config: &FetchConfig,
) -> FetchResult<Vec<SentimentPoint>> {
    fetch_with_retry(config, source.name(), symbol, || {
        source.sentiment_series(symbol, company_name, start, end)
    })
    .await
}

/// Serves series previously saved under `{data_dir}/{symbol}/`
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    pub data_dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn no_data(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> FetchError {
        FetchError::NoData {
            source_name: self.data_dir.display().to_string(),
            symbol: symbol.to_string(),
            start,
            end,
        }
    }
}

#[async_trait]
impl PriceSource for JsonDirSource {
    fn name(&self) -> &str {
        "json-dir"
    }

    async fn price_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FetchResult<Vec<PriceBar>> {
        let bars: Vec<PriceBar> = load_price_series(&self.data_dir, symbol)?
            .into_iter()
            .filter(|bar| (start..=end).contains(&bar.date))
            .collect();

        if bars.is_empty() {
            return Err(self.no_data(symbol, start, end));
        }
        Ok(bars)
    }
}

#[async_trait]
impl SentimentSource for JsonDirSource {
    fn name(&self) -> &str {
        "json-dir"
    }

    async fn sentiment_series(
        &self,
        symbol: &str,
        _company_name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FetchResult<Vec<SentimentPoint>> {
        let points: Vec<SentimentPoint> = load_sentiment_series(&self.data_dir, symbol)?
            .into_iter()
            .filter(|point| (start..=end).contains(&point.date))
            .collect();

        if points.is_empty() {
            return Err(self.no_data(symbol, start, end));
        }
        Ok(points)
    }
}
