use ndarray::{s, Array1};

use super::env::{Env, Observation};
use crate::{
    error::{EnvError, EnvResult},
    features::FeaturedTable,
    utils::{min_max, normalise},
};

/// Scaled table rows `[end - lookback, end)` with one feature per row of the result.
/// `shares`, when given, holds at least the last `lookback` share counts and is appended
/// as an extra row scaled within the window.
fn build_observation(
    table: &FeaturedTable,
    end: usize,
    lookback: usize,
    shares: Option<&[u64]>,
) -> Observation {
    let start = end - lookback;
    let features = table.scaled().slice(s![.., start..end]);

    let Some(history) = shares else {
        return features.to_owned();
    };

    let shares: Vec<f64> = history[history.len() - lookback..]
        .iter()
        .map(|&shares| shares as f64)
        .collect();
    let (min, max) = min_max(shares.iter().copied()).unwrap_or((0., 0.));
    let shares_row: Array1<f32> = shares
        .iter()
        .map(|&value| normalise(value, min, max) as f32)
        .collect();

    let feature_count = table.feature_count();
    let mut observation = Observation::zeros((feature_count + 1, lookback));
    observation
        .slice_mut(s![..feature_count, ..])
        .assign(&features);
    observation.row_mut(feature_count).assign(&shares_row);

    observation
}

/// The observation over the last `lookback` rows of `table`, ending on the newest row.
///
/// This is what a trained policy sees when choosing today's action. `shares` is the
/// share count held on each of those days, oldest first; missing leading days count as
/// zero shares.
pub fn latest_observation(
    table: &FeaturedTable,
    lookback: usize,
    shares: Option<&[u64]>,
) -> EnvResult<Observation> {
    if lookback == 0 || table.len() < lookback {
        return Err(EnvError::InsufficientData {
            rows: table.len(),
            lookback_window: lookback,
        });
    }

    let padded = shares.map(|shares| {
        let mut padded = vec![0; lookback.saturating_sub(shares.len())];
        padded.extend_from_slice(shares);
        padded
    });

    Ok(build_observation(
        table,
        table.len(),
        lookback,
        padded.as_deref(),
    ))
}

impl Env {
    /// Rows `[current - lookback, current)` of the scaled table, or
    /// `(current - lookback, current]` when the lookback includes the current row.
    /// Each row of the result is one feature's history.
    pub(super) fn get_observation(&self) -> Observation {
        let end = if self.config.lookback_includes_current {
            self.current_step + 1
        } else {
            self.current_step
        };
        let shares = self
            .config
            .observe_shares_history
            .then_some(self.ledger.shares_history.as_slice());

        build_observation(&self.table, end, self.config.lookback_window, shares)
    }

    /// `(features, lookback_window)`, the shape every observation of this env has
    pub fn observation_shape(&self) -> (usize, usize) {
        let extra = usize::from(self.config.observe_shares_history);
        (self.table.feature_count() + extra, self.config.lookback_window)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Days, NaiveDate};

    use super::latest_observation;
    use crate::{
        config::EnvConfig, constants::action, env::Env, error::EnvError,
        features::FeaturedTable,
    };

    /// Closes 1..=len, so the scaled close on row i is i / (len - 1)
    fn table(len: usize) -> Arc<FeaturedTable> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let prices: Vec<f64> = (0..len).map(|i| 1. + i as f64).collect();
        let sentiment = vec![0.3; len];

        Arc::new(
            FeaturedTable::from_columns(
                (0..len as u64).map(|day| start + Days::new(day)).collect(),
                vec![
                    ("open".to_string(), prices.clone()),
                    ("close".to_string(), prices),
                    ("sentiment".to_string(), sentiment),
                ],
            )
            .unwrap(),
        )
    }

    fn scaled_close(row: usize, len: usize) -> f32 {
        (row as f64 / (len - 1) as f64) as f32
    }

    #[test]
    fn test_observation_excludes_current_row() {
        let env = Env::new(table(11), EnvConfig::serial()).unwrap();

        let observation = env.get_observation();

        assert_eq!(observation.dim(), (3, 5));
        assert_eq!(observation.dim(), env.observation_shape());
        let closes: Vec<f32> = (0..5).map(|row| scaled_close(row, 11)).collect();
        assert_eq!(observation.row(1).to_vec(), closes);
        assert!(observation.row(2).iter().all(|&value| value == 0.));
    }

    #[test]
    fn test_observation_can_include_current_row() {
        let config = EnvConfig {
            lookback_includes_current: true,
            ..EnvConfig::serial()
        };
        let env = Env::new(table(11), config).unwrap();

        let observation = env.get_observation();

        let closes: Vec<f32> = (1..6).map(|row| scaled_close(row, 11)).collect();
        assert_eq!(observation.row(1).to_vec(), closes);
    }

    #[test]
    fn test_observation_slides_with_steps() {
        let mut env = Env::new(table(11), EnvConfig::serial()).unwrap();

        let step = env.step((action::HOLD, 0)).unwrap();

        let closes: Vec<f32> = (1..6).map(|row| scaled_close(row, 11)).collect();
        assert_eq!(step.observation.row(1).to_vec(), closes);
    }

    #[test]
    fn test_shares_history_row() {
        let config = EnvConfig {
            observe_shares_history: true,
            initial_buyable_stocks: 3.,
            ..EnvConfig::serial()
        };
        let mut env = Env::new(table(11), config).unwrap();
        assert_eq!(env.observation_shape(), (4, 5));

        // No shares yet, a constant row scales to zero
        assert!(env.get_observation().row(3).iter().all(|&value| value == 0.));

        let step = env.step((action::BUY, 9)).unwrap();

        assert_eq!(step.observation.dim(), (4, 5));
        assert_eq!(step.observation.row(3).to_vec(), vec![0., 0., 0., 0., 1.]);
    }

    #[test]
    fn test_latest_observation_ends_on_newest_row() {
        let table = table(11);

        let observation = latest_observation(&table, 5, None).unwrap();

        assert_eq!(observation.dim(), (3, 5));
        let closes: Vec<f32> = (6..11).map(|row| scaled_close(row, 11)).collect();
        assert_eq!(observation.row(1).to_vec(), closes);

        // A serial episode never observes the final row in exclusive mode
        let mut env = Env::new(table, EnvConfig::serial()).unwrap();
        let mut last = env.reset().unwrap();
        while !env.is_done() {
            last = env.step((action::HOLD, 0)).unwrap().observation;
        }
        assert_ne!(last, observation);
    }

    #[test]
    fn test_latest_observation_pads_short_shares_history() {
        let observation = latest_observation(&table(11), 5, Some(&[2, 4][..])).unwrap();

        assert_eq!(observation.dim(), (4, 5));
        assert_eq!(observation.row(3).to_vec(), vec![0., 0., 0., 0.5, 1.]);
    }

    #[test]
    fn test_latest_observation_needs_a_full_lookback() {
        assert!(matches!(
            latest_observation(&table(4), 5, None),
            Err(EnvError::InsufficientData { rows: 4, lookback_window: 5 })
        ));
    }
}
