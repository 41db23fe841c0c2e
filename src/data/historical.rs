use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{
    constants::files,
    data::{align::align, sentiment::Article, smooth::smooth},
    error::{DataError, DataResult},
    types::{MarketRow, PriceBar, SentimentPoint},
    utils::create_folder_if_not_exists,
};

fn symbol_dir(data_dir: &Path, symbol: &str) -> PathBuf {
    data_dir.join(symbol)
}

pub fn stocks_path(data_dir: &Path, symbol: &str) -> PathBuf {
    symbol_dir(data_dir, symbol).join(format!("{symbol}{}", files::STOCKS_SUFFIX))
}

pub fn sentiments_path(data_dir: &Path, symbol: &str) -> PathBuf {
    symbol_dir(data_dir, symbol).join(format!("{symbol}{}", files::SENTIMENTS_SUFFIX))
}

pub fn articles_path(data_dir: &Path, symbol: &str) -> PathBuf {
    symbol_dir(data_dir, symbol).join(format!("{symbol}{}", files::ARTICLES_SUFFIX))
}

pub fn cache_path(data_dir: &Path, symbol: &str) -> PathBuf {
    symbol_dir(data_dir, symbol).join(format!("{symbol}.{}", files::CACHE_EXTENSION))
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> DataResult<T> {
    let text = fs::read_to_string(path)?;

    serde_json::from_str(&text).map_err(|e| DataError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Daily price bars in ascending date order
pub fn load_price_series(data_dir: &Path, symbol: &str) -> DataResult<Vec<PriceBar>> {
    read_json(&stocks_path(data_dir, symbol))
}

/// Sentiment is stored newest first, this returns it oldest first
pub fn load_sentiment_series(data_dir: &Path, symbol: &str) -> DataResult<Vec<SentimentPoint>> {
    let mut sentiments: Vec<SentimentPoint> = read_json(&sentiments_path(data_dir, symbol))?;
    sentiments.reverse();

    Ok(sentiments)
}

/// Raw news articles as the search provider returned them, in any order
pub fn load_articles(data_dir: &Path, symbol: &str) -> DataResult<Vec<Article>> {
    read_json(&articles_path(data_dir, symbol))
}

pub fn save_price_series(data_dir: &Path, symbol: &str, prices: &[PriceBar]) -> DataResult<()> {
    write_json(&stocks_path(data_dir, symbol), prices)
}

/// Writes newest first, the layout the sentiment scraper produces
pub fn save_sentiment_series(
    data_dir: &Path,
    symbol: &str,
    sentiments: &[SentimentPoint],
) -> DataResult<()> {
    let newest_first: Vec<SentimentPoint> = sentiments.iter().rev().copied().collect();
    write_json(&sentiments_path(data_dir, symbol), &newest_first)
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> DataResult<()> {
    if let Some(parent) = path.parent() {
        create_folder_if_not_exists(parent)?;
    }

    let text = serde_json::to_string_pretty(value).map_err(|e| DataError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    fs::write(path, text)?;

    Ok(())
}

fn get_market_rows_from_cache(data_dir: &Path, symbol: &str) -> Option<Vec<MarketRow>> {
    let file = fs::read(cache_path(data_dir, symbol)).ok()?;

    let rows: Vec<MarketRow> = postcard::from_bytes(&file).ok()?;
    Some(rows)
}

pub fn write_market_rows_cache(data_dir: &Path, symbol: &str, rows: &[MarketRow]) -> DataResult<()> {
    create_folder_if_not_exists(symbol_dir(data_dir, symbol))?;

    let encoded = postcard::to_allocvec(rows)?;
    fs::write(cache_path(data_dir, symbol), encoded.as_slice())?;

    Ok(())
}

/// Aligned rows for `symbol`, read from the postcard cache when one exists and otherwise
/// built from the raw JSON series and cached. Smoothing is applied after the cache so one
/// cache serves every averaging window.
pub fn get_market_rows(
    data_dir: &Path,
    symbol: &str,
    entries_taking_avg: usize,
) -> DataResult<Vec<MarketRow>> {
    let rows = match get_market_rows_from_cache(data_dir, symbol) {
        Some(rows) => {
            debug!(symbol, rows = rows.len(), "loaded aligned rows from cache");
            rows
        }
        None => {
            let prices = load_price_series(data_dir, symbol)?;
            let sentiments = load_sentiment_series(data_dir, symbol)?;
            let rows = align(&prices, &sentiments)?;

            info!(
                symbol,
                prices = prices.len(),
                sentiments = sentiments.len(),
                rows = rows.len(),
                "aligned raw series"
            );

            write_market_rows_cache(data_dir, symbol, &rows)?;
            rows
        }
    };

    smooth(&rows, entries_taking_avg)
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};
    use tempfile::tempdir;

    use super::*;

    fn series(days: u64) -> (Vec<PriceBar>, Vec<SentimentPoint>) {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();

        let prices = (0..days)
            .map(|day| PriceBar {
                date: start + Days::new(day),
                open: 10.0 + day as f64,
                high: 11.0 + day as f64,
                low: 9.0 + day as f64,
                close: 10.5 + day as f64,
                volume: 1_000 + day,
            })
            .collect();
        let sentiments = (0..days)
            .map(|day| SentimentPoint {
                date: start + Days::new(day),
                sentiment: day as f64 / 10.0,
            })
            .collect();

        (prices, sentiments)
    }

    #[test]
    fn test_sentiment_round_trips_through_newest_first_layout() {
        let dir = tempdir().unwrap();
        let (_, sentiments) = series(3);

        save_sentiment_series(dir.path(), "AAPL", &sentiments).unwrap();

        let text = fs::read_to_string(sentiments_path(dir.path(), "AAPL")).unwrap();
        let stored: Vec<SentimentPoint> = serde_json::from_str(&text).unwrap();
        assert_eq!(stored[0], sentiments[2]);

        assert_eq!(load_sentiment_series(dir.path(), "AAPL").unwrap(), sentiments);
    }

    #[test]
    fn test_get_market_rows_builds_and_caches() {
        let dir = tempdir().unwrap();
        let (prices, sentiments) = series(12);
        save_price_series(dir.path(), "TSLA", &prices).unwrap();
        save_sentiment_series(dir.path(), "TSLA", &sentiments).unwrap();

        let rows = get_market_rows(dir.path(), "TSLA", 0).unwrap();
        assert_eq!(rows.len(), 12);
        assert!(cache_path(dir.path(), "TSLA").exists());

        // The cache is used even once the raw files are gone
        fs::remove_file(stocks_path(dir.path(), "TSLA")).unwrap();
        let smoothed = get_market_rows(dir.path(), "TSLA", 2).unwrap();
        assert_eq!(smoothed.len(), 10);
        assert_eq!(smoothed[0].close, 11.0);
    }

    #[test]
    fn test_reports_malformed_json() {
        let dir = tempdir().unwrap();
        let path = stocks_path(dir.path(), "MSFT");
        create_folder_if_not_exists(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let err = load_price_series(dir.path(), "MSFT").unwrap_err();
        assert!(matches!(err, DataError::Parse { .. }));
        assert!(err.to_string().contains("MSFT_stocks.json"));
    }

    #[test]
    fn test_missing_files_are_io_errors() {
        let dir = tempdir().unwrap();

        assert!(matches!(
            get_market_rows(dir.path(), "NONE", 0),
            Err(DataError::Io(_))
        ));
    }
}
