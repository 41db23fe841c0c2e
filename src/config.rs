use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{env, fetch},
    env::reward::{Difference, RewardFunction},
    error::EnvError,
};

/// Which reward function the environment uses. Only `Difference` ships with the crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    #[default]
    Difference,
}

impl RewardKind {
    pub fn build(self) -> Box<dyn RewardFunction> {
        match self {
            RewardKind::Difference => Box::new(Difference),
        }
    }
}

/// Everything needed to construct an [`crate::Env`]. There is no process-wide state; two
/// environments built from equal configs and the same table behave identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub initial_buyable_stocks: f64,
    pub lookback_window: usize,
    pub is_serial: bool,
    pub max_session_length: usize,
    pub action_granularity: usize,
    /// Append the shares-owned history as an extra observation row
    pub observe_shares_history: bool,
    /// Whether the observation window ends on the current row (inclusive) or just before it
    pub lookback_includes_current: bool,
    pub reward: RewardKind,
    /// Seed for random-mode windows. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            initial_buyable_stocks: env::INITIAL_BUYABLE_STOCKS,
            lookback_window: env::LOOKBACK_WINDOW,
            is_serial: false,
            max_session_length: env::MAX_SESSION_LENGTH,
            action_granularity: env::ACTION_GRANULARITY,
            observe_shares_history: false,
            lookback_includes_current: false,
            reward: RewardKind::Difference,
            seed: None,
        }
    }
}

impl EnvConfig {
    pub fn serial() -> Self {
        Self {
            is_serial: true,
            ..Self::default()
        }
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, EnvError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| EnvError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, EnvError> {
        let config: Self =
            toml::from_str(text).map_err(|e| EnvError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EnvError> {
        if !(self.initial_buyable_stocks > 1.0) {
            return Err(EnvError::InvalidConfig(format!(
                "initial_buyable_stocks must be greater than 1, got {}",
                self.initial_buyable_stocks
            )));
        }
        if self.lookback_window == 0 {
            return Err(EnvError::InvalidConfig(
                "lookback_window must be at least 1".to_string(),
            ));
        }
        if self.action_granularity == 0 {
            return Err(EnvError::InvalidConfig(
                "action_granularity must be at least 1".to_string(),
            ));
        }
        if !self.is_serial && self.max_session_length <= self.lookback_window + 1 {
            return Err(EnvError::InvalidConfig(format!(
                "max_session_length ({}) must exceed lookback_window + 1 ({}) in random mode",
                self.max_session_length,
                self.lookback_window + 1
            )));
        }
        Ok(())
    }
}

/// Retry policy for the external data sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub retry_count: usize,
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retry_count: fetch::RETRY_COUNT,
            retry_delay_ms: fetch::RETRY_DELAY_MS,
        }
    }
}
