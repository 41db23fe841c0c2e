pub mod episode;
pub mod meta;

pub use episode::{EpisodeHistory, EpisodeSummary};
pub use meta::MetaHistory;
