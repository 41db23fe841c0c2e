/// Cash, whole shares, and the history the reward and observations are computed from
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub cash: f64,
    pub shares: u64,
    pub net_worths: Vec<f64>,
    pub shares_history: Vec<u64>,
}

impl Ledger {
    /// Starts all cash, with `history_len` copies of the starting state so the first
    /// observation already has a full lookback
    pub fn new(initial_cash: f64, history_len: usize) -> Self {
        Self {
            cash: initial_cash,
            shares: 0,
            net_worths: vec![initial_cash; history_len],
            shares_history: vec![0; history_len],
        }
    }

    pub fn value(&self, price: f64) -> f64 {
        self.shares as f64 * price + self.cash
    }

    /// Latest recorded net worth
    pub fn net_worth(&self) -> f64 {
        self.net_worths.last().copied().unwrap_or(self.cash)
    }

    /// Buys `floor(cash / price * fraction)` shares, returning how many were bought
    pub fn buy(&mut self, price: f64, fraction: f64) -> u64 {
        if !(price > 0.) || !price.is_finite() {
            return 0;
        }

        let mut shares = ((self.cash / price) * fraction).floor().max(0.) as u64;
        // Division can round up onto a whole share the cash doesn't quite cover
        if shares > 0 && price * shares as f64 > self.cash {
            shares -= 1;
        }

        self.cash -= price * shares as f64;
        self.shares += shares;
        shares
    }

    /// Sells `floor(shares * fraction)` shares, returning how many were sold
    pub fn sell(&mut self, price: f64, fraction: f64) -> u64 {
        if !price.is_finite() {
            return 0;
        }

        let shares = ((self.shares as f64 * fraction).floor().max(0.) as u64).min(self.shares);

        self.cash += price * shares as f64;
        self.shares -= shares;
        shares
    }

    /// Appends the current holdings to the history and returns the net worth at `price`
    pub fn record(&mut self, price: f64) -> f64 {
        let net_worth = self.value(price);

        self.shares_history.push(self.shares);
        self.net_worths.push(net_worth);
        net_worth
    }
}
