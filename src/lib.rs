pub mod config;
pub mod constants;
pub mod data;
pub mod env;
pub mod error;
pub mod features;
pub mod history;
pub mod model_file;
pub mod strategies;
pub mod types;
pub mod utils;

pub use config::{EnvConfig, FetchConfig, RewardKind};
pub use env::{Action, ActionType, Env, EpisodeWindow, Observation, RawAction, Step, StepInfo};
pub use error::{DataError, EnvError, FetchError, ModelFileError};
pub use features::{FeatureProcessor, FeaturedTable, TechnicalIndicators};
pub use types::{MarketRow, PriceBar, SentimentPoint};
