//! Fixed trading rules that learned policies are benchmarked against. Each one is run
//! through a serial env over the same table, so the scores are directly comparable.

use std::sync::Arc;

use colored::Colorize;
use enum_map::{Enum, EnumMap};
use serde::Serialize;
use tracing::info;

use crate::{
    config::EnvConfig,
    constants::{baselines, indicators},
    env::{Action, ActionType, Env, RawAction},
    error::EnvResult,
    features::{
        indicators::{macd, rsi},
        FeaturedTable,
    },
    types::Data,
    utils::{get_differences, percent_return},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum, Serialize)]
pub enum Baseline {
    /// Buy whenever a whole share is affordable, never sell
    Bhodl,
    /// Trade against divergence between the RSI trend and the price trend
    RsiDivergence,
    /// Trade on MACD sign changes
    SmaCrossover,
}

impl Baseline {
    pub const ALL: [Baseline; 3] = [
        Baseline::Bhodl,
        Baseline::RsiDivergence,
        Baseline::SmaCrossover,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Baseline::Bhodl => "BHODL",
            Baseline::RsiDivergence => "RSI Divergence",
            Baseline::SmaCrossover => "SMA Crossover",
        }
    }
}

/// Sum of the running totals of the step-to-step changes. Positive for an overall
/// upward trend. Undefined values contribute nothing.
fn trend_sum(values: &[f64]) -> f64 {
    let mut running = 0.;
    let mut total = 0.;

    for change in get_differences(values) {
        if change.is_finite() {
            running += change;
            total += running;
        }
    }

    total
}

/// A baseline together with the indicator series it reads, computed once over the table
#[derive(Debug, Clone)]
pub struct BaselinePolicy {
    pub baseline: Baseline,
    closes: Data,
    rsi: Data,
    macd: Data,
}

impl BaselinePolicy {
    pub fn new(baseline: Baseline, table: &FeaturedTable) -> Self {
        let closes = table.closes();

        Self {
            baseline,
            rsi: rsi(&closes, indicators::RSI_PERIOD),
            macd: macd(&closes, indicators::MACD_FAST, indicators::MACD_SLOW),
            closes,
        }
    }

    /// The action to take from the env's current row
    pub fn decide(&self, env: &Env) -> Action {
        let granularity = env.config().action_granularity;
        let step = env.current_step();

        let action_type = match self.baseline {
            Baseline::Bhodl => {
                if (env.cash() / env.open_price()).floor() >= 1. {
                    ActionType::Buy
                } else {
                    ActionType::Hold
                }
            }
            Baseline::RsiDivergence => {
                let Some(start) = step.checked_sub(baselines::RSI_TREND_PERIOD) else {
                    return Action::hold();
                };
                let rsi_sum = trend_sum(&self.rsi[start..=step]);
                let price_sum = trend_sum(&self.closes[start..=step]);

                if rsi_sum < 0. && price_sum >= 0. {
                    ActionType::Sell
                } else if rsi_sum > 0. && price_sum <= 0. {
                    ActionType::Buy
                } else {
                    ActionType::Hold
                }
            }
            Baseline::SmaCrossover => {
                let Some(previous) = step.checked_sub(1) else {
                    return Action::hold();
                };
                let (previous, current) = (self.macd[previous], self.macd[step]);

                if current > 0. && previous <= 0. {
                    ActionType::Sell
                } else if current < 0. && previous >= 0. {
                    ActionType::Buy
                } else {
                    ActionType::Hold
                }
            }
        };

        match action_type {
            ActionType::Hold => Action::hold(),
            _ => Action::all_in(action_type, granularity),
        }
    }

    pub fn predict(&self, env: &Env) -> RawAction {
        self.decide(env).into()
    }

    /// Resets `env` and trades it to the end of the episode, returning the final net worth
    pub fn run(&self, env: &mut Env) -> EnvResult<f64> {
        env.reset()?;

        loop {
            let action = self.predict(env);
            let step = env.step(action)?;
            if step.done {
                return Ok(step.info.current_net_worth);
            }
        }
    }
}

/// Final net worth of every baseline over the same serial episode
#[derive(Debug, Clone, Serialize)]
pub struct BaselineReport {
    pub initial_cash: f64,
    pub scores: EnumMap<Baseline, f64>,
}

impl BaselineReport {
    pub fn percent_return(&self, baseline: Baseline) -> f64 {
        percent_return(self.scores[baseline], self.initial_cash)
    }

    pub fn print(&self) {
        println!(
            "{} {}",
            "Initial investment".bright_blue(),
            format!("${:.2}", self.initial_cash).bright_white().bold()
        );

        for baseline in Baseline::ALL {
            let percent = self.percent_return(baseline);
            let percent_str = if percent >= 0. {
                format!("{:.3}%", percent).green()
            } else {
                format!("{:.3}%", percent).red()
            };

            println!(
                "{} baseline got {} ({} increase)",
                baseline.name().bright_blue(),
                format!("${:.2}", self.scores[baseline]).bright_white().bold(),
                percent_str,
            );
        }
    }
}

/// Runs every baseline through one serial env built from `config`
pub fn run_baselines(table: Arc<FeaturedTable>, config: &EnvConfig) -> EnvResult<BaselineReport> {
    let config = EnvConfig {
        is_serial: true,
        ..config.clone()
    };
    let mut env = Env::new(table.clone(), config)?;
    let mut scores = EnumMap::default();

    for baseline in Baseline::ALL {
        let score = BaselinePolicy::new(baseline, &table).run(&mut env)?;
        info!(baseline = baseline.name(), score, "baseline finished");
        scores[baseline] = score;
    }

    Ok(BaselineReport {
        initial_cash: env.initial_cash(),
        scores,
    })
}
