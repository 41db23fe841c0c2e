use chrono::NaiveDate;
use thiserror::Error;

/// Failures while loading, aligning or caching market data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("{series} series is empty")]
    EmptySeries { series: &'static str },

    #[error(
        "price data ({price_start} to {price_end}) and sentiment data ({sentiment_start} to {sentiment_end}) do not overlap"
    )]
    NoOverlap {
        price_start: NaiveDate,
        price_end: NaiveDate,
        sentiment_start: NaiveDate,
        sentiment_end: NaiveDate,
    },

    #[error("cannot align {series} series: {reason}")]
    Alignment { series: &'static str, reason: String },

    #[error("table has {rows} rows but {required} are required")]
    TooShort { rows: usize, required: usize },

    #[error("column {column} has {len} values but the table has {rows} rows")]
    ColumnLength {
        column: String,
        len: usize,
        rows: usize,
    },

    #[error("table is missing required column {0}")]
    MissingColumn(&'static str),

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("cache error: {0}")]
    Cache(#[from] postcard::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DataResult<T> = Result<T, DataError>;

/// Failures constructing or driving the trading environment
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("table has {rows} rows, which is not enough for a lookback window of {lookback_window}")]
    InsufficientData { rows: usize, lookback_window: usize },

    #[error("invalid action type {action_type}, expected 0 (sell), 1 (hold) or 2 (buy)")]
    InvalidActionType { action_type: u32 },

    #[error("invalid action amount {amount}, expected 0..{granularity}")]
    InvalidActionAmount { amount: u32, granularity: usize },

    #[error("episode is done, reset() must be called before stepping again")]
    EpisodeDone,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

pub type EnvResult<T> = Result<T, EnvError>;

/// Failures from the external price and sentiment sources
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{source_name} failed for {symbol} after {attempts} attempts: {last_error}")]
    Exhausted {
        source_name: String,
        symbol: String,
        attempts: usize,
        last_error: String,
    },

    #[error("{source_name} has no data for {symbol} between {start} and {end}")]
    NoData {
        source_name: String,
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error(transparent)]
    Data(#[from] DataError),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Failures locating or parsing persisted model artifacts
#[derive(Error, Debug)]
pub enum ModelFileError {
    #[error("no model file with the prefix 'LATEST=' was found in {dir}")]
    NotFound { dir: String },

    #[error("malformed model file name {name}: {reason}")]
    MalformedName { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
