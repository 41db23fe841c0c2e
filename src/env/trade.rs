use super::{
    action::{Action, ActionType},
    env::Env,
};

impl Env {
    /// Applies `action` to the ledger at `price`, returning the number of shares traded
    pub(super) fn trade(&mut self, action: Action, price: f64) -> u64 {
        let fraction = action.fraction(self.config.action_granularity);

        match action.action_type {
            ActionType::Sell => self.ledger.sell(price, fraction),
            ActionType::Hold => 0,
            ActionType::Buy => self.ledger.buy(price, fraction),
        }
    }
}
