use enum_map::Enum;
use serde::{Deserialize, Serialize};

use crate::{
    constants::action,
    error::{EnvError, EnvResult},
};

/// `(action_type, action_amount)` exactly as a policy emits it
pub type RawAction = (u32, u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum ActionType {
    Sell,
    Hold,
    Buy,
}

impl TryFrom<u32> for ActionType {
    type Error = EnvError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            action::SELL => Ok(ActionType::Sell),
            action::HOLD => Ok(ActionType::Hold),
            action::BUY => Ok(ActionType::Buy),
            _ => Err(EnvError::InvalidActionType { action_type: value }),
        }
    }
}

impl From<ActionType> for u32 {
    fn from(action_type: ActionType) -> Self {
        match action_type {
            ActionType::Sell => action::SELL,
            ActionType::Hold => action::HOLD,
            ActionType::Buy => action::BUY,
        }
    }
}

/// A validated action. `amount` selects the fraction `(amount + 1) / K` of what can be traded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub action_type: ActionType,
    pub amount: u32,
}

impl Action {
    pub fn new(action_type: ActionType, amount: u32) -> Self {
        Self {
            action_type,
            amount,
        }
    }

    pub fn hold() -> Self {
        Self::new(ActionType::Hold, 0)
    }

    /// The largest amount, trading everything available
    pub fn all_in(action_type: ActionType, granularity: usize) -> Self {
        Self::new(action_type, granularity.saturating_sub(1) as u32)
    }

    pub fn decode((action_type, amount): RawAction, granularity: usize) -> EnvResult<Self> {
        let action_type = ActionType::try_from(action_type)?;

        if amount as usize >= granularity {
            return Err(EnvError::InvalidActionAmount {
                amount,
                granularity,
            });
        }

        Ok(Self::new(action_type, amount))
    }

    pub fn fraction(&self, granularity: usize) -> f64 {
        (self.amount + 1) as f64 / granularity as f64
    }

    /// `-fraction` for sells, `+fraction` for buys, 0 for holds
    pub fn signed_fraction(&self, granularity: usize) -> f64 {
        match self.action_type {
            ActionType::Sell => -self.fraction(granularity),
            ActionType::Hold => 0.,
            ActionType::Buy => self.fraction(granularity),
        }
    }
}

impl From<Action> for RawAction {
    fn from(action: Action) -> Self {
        (action.action_type.into(), action.amount)
    }
}
