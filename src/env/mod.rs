mod action;
#[allow(clippy::module_inception)]
mod env;
mod ledger;
mod obs;
pub mod reward;
mod trade;
mod window;

pub use action::{Action, ActionType, RawAction};
pub use env::{Env, Observation, Step, StepInfo};
pub use ledger::Ledger;
pub use obs::latest_observation;
pub use reward::{Difference, RewardFunction};
pub use window::{select_window, EpisodeWindow};
