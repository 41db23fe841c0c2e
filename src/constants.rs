pub mod env {
    /// Multiplied by the first close of the episode window to get the starting cash
    pub const INITIAL_BUYABLE_STOCKS: f64 = 2.5;
    pub const LOOKBACK_WINDOW: usize = 5;
    pub const MAX_SESSION_LENGTH: usize = 100;
    /// Number of discrete trade amounts, each worth `(amount + 1) / K` of the tradable quantity
    pub const ACTION_GRANULARITY: usize = 10;
}

pub mod action {
    pub const SELL: u32 = 0;
    pub const HOLD: u32 = 1;
    pub const BUY: u32 = 2;
    pub const TYPE_COUNT: usize = 3;
}

pub mod baselines {
    pub const RSI_TREND_PERIOD: usize = 5;
}

pub mod indicators {
    pub const RSI_PERIOD: usize = 14;
    pub const MACD_FAST: usize = 12;
    pub const MACD_SLOW: usize = 26;
    pub const MACD_SIGNAL: usize = 9;
    pub const MOVING_AVG_PERIOD: usize = 20;
    pub const BOLLINGER_STD_DEVS: f64 = 2.0;
    pub const AROON_PERIOD: usize = 25;
}

pub mod data {
    /// Rows averaged together when smoothing an aligned table
    pub const ENTRIES_TAKING_AVG: usize = 10;
}

pub mod fetch {
    pub const RETRY_COUNT: usize = 3;
    pub const RETRY_DELAY_MS: u64 = 1_000;
}

pub mod files {
    pub const DATA_PATH: &str = "data";
    pub const MODELS_PATH: &str = "models";
    pub const STOCKS_SUFFIX: &str = "_stocks.json";
    pub const SENTIMENTS_SUFFIX: &str = "_sentiments.json";
    pub const ARTICLES_SUFFIX: &str = "_articles.json";
    pub const CACHE_EXTENSION: &str = "bin";
    pub const LATEST_PREFIX: &str = "LATEST=";
}
