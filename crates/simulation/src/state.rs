//! Simulated position state for one strategy.

use defi_engine_domain::metrics::il_percent;

/// Running state of one strategy along a market path.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionState {
    /// Deployed capital in USD, before unrealized impermanent loss.
    pub capital: f64,
    /// Rewards accrued but not yet compounded.
    pub pending_rewards: f64,
    /// Cumulative gas paid.
    pub gas_spent: f64,
    /// Fraction of capital held as LP liquidity.
    pub lp_share: f64,
    /// Price at which LP exposure was last centred.
    pub lp_entry_price: f64,
    pub trades: u32,
    pub steps_since_compound: usize,
    pub steps_since_rebalance: usize,
}

impl PositionState {
    #[must_use]
    pub fn open(capital: f64, price: f64, lp_share: f64) -> Self {
        Self {
            capital,
            pending_rewards: 0.0,
            gas_spent: 0.0,
            lp_share,
            lp_entry_price: price,
            trades: 0,
            steps_since_compound: 0,
            steps_since_rebalance: 0,
        }
    }

    #[must_use]
    pub fn has_lp_exposure(&self) -> bool {
        self.lp_share > 0.0
    }

    /// Signed impermanent loss in percent at `price`.
    #[must_use]
    pub fn il_pct(&self, price: f64) -> f64 {
        if !self.has_lp_exposure() || self.lp_entry_price <= 0.0 {
            return 0.0;
        }
        il_percent(price / self.lp_entry_price)
    }

    /// Moves capital with the market, scaled by `beta`. Never below zero.
    pub fn apply_market(&mut self, price_return: f64, beta: f64) {
        self.capital = (self.capital * (1.0 + beta * price_return)).max(0.0);
    }

    /// Accrues one step of yield. A negative rate is a cost and is charged
    /// straight to capital.
    pub fn accrue(&mut self, rate_per_step: f64) {
        let accrual = self.capital * rate_per_step;
        if accrual >= 0.0 {
            self.pending_rewards += accrual;
        } else {
            self.capital = (self.capital + accrual).max(0.0);
        }
    }

    /// Folds pending rewards into capital. Returns the amount restaked.
    pub fn compound(&mut self, gas: f64) -> f64 {
        let amount = self.pending_rewards;
        self.capital += amount;
        self.pending_rewards = 0.0;
        self.charge(gas);
        self.steps_since_compound = 0;
        amount
    }

    /// Re-centres LP exposure at `price`, realizing the impermanent loss.
    /// Returns the loss in USD.
    pub fn rebalance(&mut self, price: f64, gas: f64) -> f64 {
        let loss = self.unrealized_loss(price);
        self.capital = (self.capital - loss).max(0.0);
        self.lp_entry_price = price;
        self.charge(gas);
        self.steps_since_rebalance = 0;
        loss
    }

    /// Advances the step counters when no trade fired.
    pub fn tick(&mut self, compounded: bool, rebalanced: bool) {
        if !compounded {
            self.steps_since_compound += 1;
        }
        if !rebalanced {
            self.steps_since_rebalance += 1;
        }
    }

    /// Impermanent loss in USD if the LP exposure were closed at `price`.
    #[must_use]
    pub fn unrealized_loss(&self, price: f64) -> f64 {
        self.capital * self.lp_share * self.il_pct(price).abs() / 100.0
    }

    /// Mark-to-market value before gas.
    #[must_use]
    pub fn gross_value(&self, price: f64) -> f64 {
        self.capital - self.unrealized_loss(price) + self.pending_rewards
    }

    /// Mark-to-market value net of gas paid so far.
    #[must_use]
    pub fn equity(&self, price: f64) -> f64 {
        self.gross_value(price) - self.gas_spent
    }

    fn charge(&mut self, gas: f64) {
        self.gas_spent += gas;
        self.trades += 1;
    }
}
