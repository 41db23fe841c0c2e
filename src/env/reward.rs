use std::fmt::Debug;

use tracing::warn;

use super::env::Env;

/// Scores a step from the net worth history, whose last entry is the current net worth
pub trait RewardFunction: Debug + Send + Sync {
    fn compute(&self, net_worths: &[f64]) -> f64;
}

/// Change in net worth over the last step
#[derive(Debug, Clone, Copy, Default)]
pub struct Difference;

impl RewardFunction for Difference {
    fn compute(&self, net_worths: &[f64]) -> f64 {
        match net_worths {
            [.., previous, current] => current - previous,
            _ => 0.,
        }
    }
}

impl Env {
    /// Non-finite rewards are reported as 0 so they never reach a learner
    pub(super) fn get_reward(&self) -> f64 {
        let reward = self.reward_fn.compute(&self.ledger.net_worths);

        if !reward.is_finite() {
            warn!(step = self.current_step, reward, "non-finite reward replaced with 0");
            return 0.;
        }

        reward
    }
}
