//! Cash/position ledger and per-bar valuation records.

use chrono::NaiveDate;

/// Ledger for a single-instrument, long-only backtest.
///
/// `position` is an unsigned contract count, so it can never go negative.
/// Cash is only debited by [`PortfolioState::buy`], which never spends more
/// than is available.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    cash: f64,
    position: u64,
}

impl PortfolioState {
    pub fn new(initial_cash: f64) -> Self {
        PortfolioState {
            cash: initial_cash,
            position: 0,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0
    }

    /// Mark-to-market value of the held contracts.
    pub fn position_value(&self, price: f64) -> f64 {
        self.position as f64 * price
    }

    /// cash + position_value
    pub fn total_value(&self, price: f64) -> f64 {
        self.cash + self.position_value(price)
    }

    /// Largest whole number of contracts the current cash buys at `price`.
    pub fn max_affordable(&self, price: f64) -> u64 {
        if price <= 0.0 || self.cash <= 0.0 {
            return 0;
        }
        let mut quantity = (self.cash / price).floor() as u64;
        // floor of a rounded quotient can overshoot by one
        while quantity > 0 && quantity as f64 * price > self.cash {
            quantity -= 1;
        }
        quantity
    }

    /// Buy up to `quantity` contracts at `price`, capped by available cash.
    ///
    /// Returns the number of contracts actually bought.
    pub fn buy(&mut self, quantity: u64, price: f64) -> u64 {
        let filled = quantity.min(self.max_affordable(price));
        if filled == 0 {
            return 0;
        }
        self.cash -= filled as f64 * price;
        if self.cash < 0.0 {
            self.cash = 0.0;
        }
        self.position += filled;
        filled
    }

    /// Liquidate the whole position at `price`. Returns the contracts sold.
    pub fn sell_all(&mut self, price: f64) -> u64 {
        let sold = self.position;
        self.cash += self.position_value(price);
        self.position = 0;
        sold
    }
}

/// Portfolio value at the close of one bar, after the rule was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationRecord {
    pub date: NaiveDate,
    pub cash: f64,
    pub position: u64,
    pub close: f64,
    pub total_value: f64,
}

impl ValuationRecord {
    pub fn capture(date: NaiveDate, state: &PortfolioState, close: f64) -> Self {
        ValuationRecord {
            date,
            cash: state.cash(),
            position: state.position(),
            close,
            total_value: state.total_value(close),
        }
    }
}
