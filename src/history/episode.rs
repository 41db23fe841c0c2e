use enum_map::EnumMap;
use hashbrown::HashMap;
use serde::Serialize;

use crate::{
    env::{Action, ActionType},
    utils::percent_return,
};

/// Everything that happened during one episode, one entry per step
#[derive(Debug, Clone, Default)]
pub struct EpisodeHistory {
    /// Table row to `(price, shares)`
    pub buys: HashMap<usize, (f64, u64)>,
    pub sells: HashMap<usize, (f64, u64)>,
    pub actions: Vec<ActionType>,
    /// `-fraction` for sells, `+fraction` for buys, 0 for holds
    pub signed_amounts: Vec<f64>,
    pub rewards: Vec<f64>,
    pub net_worths: Vec<f64>,
    pub action_counts: EnumMap<ActionType, usize>,
}

impl EpisodeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record_step(
        &mut self,
        row: usize,
        action: Action,
        granularity: usize,
        price: f64,
        traded: u64,
        reward: f64,
        net_worth: f64,
    ) {
        if traded > 0 {
            match action.action_type {
                ActionType::Buy => {
                    self.buys.insert(row, (price, traded));
                }
                ActionType::Sell => {
                    self.sells.insert(row, (price, traded));
                }
                ActionType::Hold => {}
            }
        }

        self.actions.push(action.action_type);
        self.signed_amounts.push(action.signed_fraction(granularity));
        self.rewards.push(reward);
        self.net_worths.push(net_worth);
        self.action_counts[action.action_type] += 1;
    }

    pub fn steps(&self) -> usize {
        self.actions.len()
    }

    pub fn total_reward(&self) -> f64 {
        self.rewards.iter().sum()
    }

    /// Steps on which shares actually changed hands
    pub fn trade_count(&self) -> usize {
        self.buys.len() + self.sells.len()
    }

    pub fn final_net_worth(&self) -> Option<f64> {
        self.net_worths.last().copied()
    }

    pub fn summary(&self, initial_cash: f64) -> EpisodeSummary {
        let final_net_worth = self.final_net_worth().unwrap_or(initial_cash);

        EpisodeSummary {
            steps: self.steps(),
            initial_cash,
            final_net_worth,
            percent_return: percent_return(final_net_worth, initial_cash),
            total_reward: self.total_reward(),
            buys: self.buys.len(),
            sells: self.sells.len(),
            action_counts: self.action_counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub steps: usize,
    pub initial_cash: f64,
    pub final_net_worth: f64,
    pub percent_return: f64,
    pub total_reward: f64,
    pub buys: usize,
    pub sells: usize,
    pub action_counts: EnumMap<ActionType, usize>,
}
