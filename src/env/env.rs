use std::{sync::Arc, time::Instant};

use colored::Colorize;
use ndarray::Array2;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use super::{
    action::{Action, RawAction},
    ledger::Ledger,
    reward::RewardFunction,
    window::{select_window, EpisodeWindow},
};
use crate::{
    config::EnvConfig,
    error::{EnvError, EnvResult},
    features::FeaturedTable,
    history::EpisodeHistory,
    utils::percent_return,
};

/// Features along the first axis, the lookback window along the second
pub type Observation = Array2<f32>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInfo {
    pub current_net_worth: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// A single-stock trading simulation over a shared, read-only featured table.
///
/// Each `step` advances one row, trades at that row's close and rewards the change in
/// net worth. Everything mutable lives in the env itself, so independent envs can run on
/// separate threads over the same `Arc<FeaturedTable>`.
#[derive(Debug)]
pub struct Env {
    pub(super) table: Arc<FeaturedTable>,
    pub(super) config: EnvConfig,
    pub(super) reward_fn: Box<dyn RewardFunction>,
    rng: StdRng,
    window: EpisodeWindow,
    pub(super) current_step: usize,
    done: bool,
    initial_cash: f64,
    pub(super) ledger: Ledger,
    pub episode_history: EpisodeHistory,
    pub episode: usize,
    episode_start: Instant,
}

impl Env {
    /// Builds the env and resets it, so it is ready to step immediately
    pub fn new(table: Arc<FeaturedTable>, config: EnvConfig) -> EnvResult<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let lookback = config.lookback_window;

        let mut env = Self {
            table,
            reward_fn: config.reward.build(),
            config,
            rng,
            window: EpisodeWindow {
                start: lookback,
                end: lookback,
            },
            current_step: lookback,
            done: true,
            initial_cash: 0.,
            ledger: Ledger::new(0., lookback),
            episode_history: EpisodeHistory::new(),
            episode: 0,
            episode_start: Instant::now(),
        };

        env.reset()?;
        Ok(env)
    }

    /// Starts a new episode on a freshly selected window
    pub fn reset(&mut self) -> EnvResult<Observation> {
        let lookback = self.config.lookback_window;

        self.window = select_window(
            self.table.len(),
            lookback,
            self.config.is_serial,
            self.config.max_session_length,
            &mut self.rng,
        )?;

        self.current_step = self.window.start;
        self.initial_cash = self.config.initial_buyable_stocks * self.table.close(self.window.start);
        self.ledger = Ledger::new(self.initial_cash, lookback);
        self.done = false;
        self.episode_history = EpisodeHistory::new();
        self.episode_start = Instant::now();

        debug!(
            episode = self.episode,
            start = self.window.start,
            end = self.window.end,
            initial_cash = self.initial_cash,
            "reset"
        );

        Ok(self.get_observation())
    }

    /// Advances one row and applies `action` at that row's close.
    ///
    /// The action on the final step is still applied. Stepping again before `reset` fails
    /// with [`EnvError::EpisodeDone`], and an undecodable action fails without changing
    /// any state.
    pub fn step(&mut self, action: RawAction) -> EnvResult<Step> {
        if self.done {
            return Err(EnvError::EpisodeDone);
        }

        let action = Action::decode(action, self.config.action_granularity)?;

        self.current_step += 1;
        self.done = self.current_step >= self.window.end;

        let price = self.table.close(self.current_step);
        let traded = self.trade(action, price);
        let net_worth = self.ledger.record(price);
        let reward = self.get_reward();

        self.episode_history.record_step(
            self.current_step,
            action,
            self.config.action_granularity,
            price,
            traded,
            reward,
            net_worth,
        );

        if self.done {
            self.handle_episode_end();
        }

        Ok(Step {
            observation: self.get_observation(),
            reward,
            done: self.done,
            info: StepInfo {
                current_net_worth: net_worth,
            },
        })
    }

    /// Current net worth
    pub fn get_value(&self) -> f64 {
        self.ledger.net_worth()
    }

    fn handle_episode_end(&mut self) {
        let final_value = self.get_value();
        let strategy_return = percent_return(final_value, self.initial_cash);
        let index_return = percent_return(
            self.table.close(self.window.end),
            self.table.close(self.window.start),
        );
        let outperformance = strategy_return - index_return;

        let strategy_str = if strategy_return >= 0.0 {
            format!("{:.2}%", strategy_return).green()
        } else {
            format!("{:.2}%", strategy_return).red()
        };

        let index_str = if index_return >= 0.0 {
            format!("{:.2}%", index_return).cyan()
        } else {
            format!("{:.2}%", index_return).red()
        };

        let outperf_str = if outperformance > 0.0 {
            format!("+{:.2}%", outperformance).bright_green().bold()
        } else if outperformance < 0.0 {
            format!("{:.2}%", outperformance).bright_red().bold()
        } else {
            format!("{:.2}%", outperformance).yellow()
        };

        println!(
            "{} {} - Total Assets: {} ({}) cumulative reward {:.2} | Stock: {} | Outperformance: {} | trades {} time {:.2}s",
            "Episode".bright_blue(),
            self.episode.to_string().bright_blue().bold(),
            format!("${:.2}", final_value).bright_white().bold(),
            strategy_str,
            self.episode_history.total_reward(),
            index_str,
            outperf_str,
            self.episode_history.trade_count(),
            Instant::now().duration_since(self.episode_start).as_secs_f32(),
        );

        info!(
            episode = self.episode,
            final_value,
            strategy_return,
            index_return,
            "episode finished"
        );

        self.episode += 1;
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn window(&self) -> EpisodeWindow {
        self.window
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn cash(&self) -> f64 {
        self.ledger.cash
    }

    pub fn shares(&self) -> u64 {
        self.ledger.shares
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn open_price(&self) -> f64 {
        self.table.open(self.current_step)
    }
}
