//! Executed trade log entries.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A fill applied to the ledger at a bar's close.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub date: NaiveDate,
    pub side: Side,
    pub quantity: u64,
    pub price: f64,
    pub cash_after: f64,
}

impl Fill {
    /// Cash moved by this fill: negative for buys, positive for sells.
    pub fn cash_flow(&self) -> f64 {
        let notional = self.quantity as f64 * self.price;
        match self.side {
            Side::Buy => -notional,
            Side::Sell => notional,
        }
    }
}
