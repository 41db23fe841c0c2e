pub mod baselines;
pub mod random;
pub mod vote;

pub use baselines::{run_baselines, Baseline, BaselinePolicy, BaselineReport};
pub use random::RandomPolicy;
pub use vote::{predict_with_votes, vote};

use crate::{
    env::{latest_observation, Action, Env, Observation, RawAction},
    error::EnvResult,
    features::FeaturedTable,
};

/// Anything that maps an observation to an action. Policies see nothing of the env
/// beyond the observation.
pub trait Policy {
    fn predict(&mut self, observation: &Observation) -> RawAction;
}

/// Resets `env` and drives it with `policy` until the episode is done, returning the
/// final net worth
pub fn run_episode<P: Policy + ?Sized>(env: &mut Env, policy: &mut P) -> EnvResult<f64> {
    let mut observation = env.reset()?;

    loop {
        let step = env.step(policy.predict(&observation))?;
        if step.done {
            return Ok(step.info.current_net_worth);
        }
        observation = step.observation;
    }
}

/// Today's action: `votes` predictions over the observation that ends on the newest row
/// of `table`, decoded against `granularity`. `shares` is the share count held on each of
/// the last `lookback` days, oldest first, for policies trained to see it.
pub fn predict_latest<P: Policy + ?Sized>(
    policy: &mut P,
    table: &FeaturedTable,
    lookback: usize,
    shares: Option<&[u64]>,
    votes: usize,
    granularity: usize,
) -> EnvResult<Action> {
    let observation = latest_observation(table, lookback, shares)?;

    match predict_with_votes(policy, &observation, votes.max(1)) {
        Some(raw) => Action::decode(raw, granularity),
        None => Ok(Action::hold()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;
    use crate::{env::ActionType, error::EnvError};

    /// Always answers `action`, remembering the shape it was shown
    struct Fixed {
        action: RawAction,
        seen: Vec<(usize, usize)>,
    }

    impl Policy for Fixed {
        fn predict(&mut self, observation: &Observation) -> RawAction {
            self.seen.push(observation.dim());
            self.action
        }
    }

    fn table(len: usize) -> FeaturedTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let prices: Vec<f64> = (0..len).map(|i| 5. + i as f64).collect();

        FeaturedTable::from_columns(
            (0..len as u64).map(|day| start + Days::new(day)).collect(),
            vec![
                ("open".to_string(), prices.clone()),
                ("close".to_string(), prices),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_predict_latest_votes_on_newest_window() {
        let mut policy = Fixed {
            action: (2, 4),
            seen: Vec::new(),
        };

        let action = predict_latest(&mut policy, &table(12), 7, Some(&[1, 1][..]), 3, 5).unwrap();

        assert_eq!(action, Action::new(ActionType::Buy, 4));
        assert_eq!(policy.seen, vec![(3, 7); 3]);
    }

    #[test]
    fn test_predict_latest_rejects_out_of_range_answers() {
        let mut policy = Fixed {
            action: (2, 9),
            seen: Vec::new(),
        };

        assert!(matches!(
            predict_latest(&mut policy, &table(12), 7, None, 1, 5),
            Err(EnvError::InvalidActionAmount { amount: 9, .. })
        ));
        assert!(matches!(
            predict_latest(&mut policy, &table(6), 7, None, 1, 10),
            Err(EnvError::InsufficientData { .. })
        ));
    }
}
