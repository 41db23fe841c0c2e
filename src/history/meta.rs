use serde::Serialize;

use crate::history::episode::EpisodeHistory;

/// Results across many episodes of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetaHistory {
    pub final_net_worths: Vec<f64>,
    pub percent_returns: Vec<f64>,
    pub total_rewards: Vec<f64>,
}

impl MetaHistory {
    pub fn record(&mut self, history: &EpisodeHistory, initial_cash: f64) {
        let summary = history.summary(initial_cash);

        self.final_net_worths.push(summary.final_net_worth);
        self.percent_returns.push(summary.percent_return);
        self.total_rewards.push(summary.total_reward);
    }

    pub fn episodes(&self) -> usize {
        self.percent_returns.len()
    }

    pub fn avg_percent_return(&self) -> Option<f64> {
        if self.percent_returns.is_empty() {
            return None;
        }

        Some(self.percent_returns.iter().sum::<f64>() / self.percent_returns.len() as f64)
    }

    pub fn best_percent_return(&self) -> Option<f64> {
        self.percent_returns.iter().copied().reduce(f64::max)
    }

    pub fn worst_percent_return(&self) -> Option<f64> {
        self.percent_returns.iter().copied().reduce(f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Action;

    fn episode(final_net_worth: f64) -> EpisodeHistory {
        let mut history = EpisodeHistory::new();
        history.record_step(1, Action::hold(), 10, 1., 0, 0., final_net_worth);
        history
    }

    #[test]
    fn test_aggregates_episodes() {
        let mut meta = MetaHistory::default();
        assert_eq!(meta.avg_percent_return(), None);

        meta.record(&episode(110.), 100.);
        meta.record(&episode(90.), 100.);
        meta.record(&episode(130.), 100.);

        assert_eq!(meta.episodes(), 3);
        assert!((meta.avg_percent_return().unwrap() - 10.).abs() < 1e-9);
        assert!((meta.best_percent_return().unwrap() - 30.).abs() < 1e-9);
        assert!((meta.worst_percent_return().unwrap() + 10.).abs() < 1e-9);
    }
}
