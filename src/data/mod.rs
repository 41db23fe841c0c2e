pub mod align;
pub mod fetch;
pub mod historical;
pub mod sentiment;
pub mod smooth;

pub use align::align;
pub use fetch::{fetch_price_series, fetch_sentiment_series, JsonDirSource, PriceSource, SentimentSource};
pub use historical::get_market_rows;
pub use sentiment::{daily_sentiment, Article, ArticleSource, Lexicon};
pub use smooth::smooth;
