//! Decision rules applied bar-by-bar by the valuation engine.

use super::ohlcv::PriceBar;
use super::portfolio::PortfolioState;

pub const DEFAULT_ENTRY_THRESHOLD: f64 = 0.01;
pub const DEFAULT_EXIT_THRESHOLD: f64 = 0.01;

/// What a rule asks the engine to do at the current bar's close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDecision {
    Hold,
    /// Buy this many contracts; the engine caps the size at what cash affords.
    EnterLong(u64),
    /// Sell the whole position.
    ExitLong,
}

/// A trading policy evaluated once per bar, from the second bar onward.
///
/// Implementations only decide; all ledger bookkeeping stays in the engine.
pub trait DecisionRule {
    fn decide(&self, bar: &PriceBar, prior: &PriceBar, state: &PortfolioState) -> TradeDecision;

    fn name(&self) -> &str;
}

impl<R: DecisionRule + ?Sized> DecisionRule for Box<R> {
    fn decide(&self, bar: &PriceBar, prior: &PriceBar, state: &PortfolioState) -> TradeDecision {
        (**self).decide(bar, prior, state)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Buy the dip, sell the rip.
///
/// When flat and the close fell by more than `entry_threshold` from the prior
/// close, go all-in. When holding and the close rose by more than
/// `exit_threshold`, sell everything. Both comparisons are strict.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRule {
    pub entry_threshold: f64,
    pub exit_threshold: f64,
}

impl Default for ThresholdRule {
    fn default() -> Self {
        ThresholdRule {
            entry_threshold: DEFAULT_ENTRY_THRESHOLD,
            exit_threshold: DEFAULT_EXIT_THRESHOLD,
        }
    }
}

impl DecisionRule for ThresholdRule {
    fn decide(&self, bar: &PriceBar, prior: &PriceBar, state: &PortfolioState) -> TradeDecision {
        let price_return = bar.return_from(prior.close);

        if state.is_flat() && price_return < -self.entry_threshold {
            TradeDecision::EnterLong(state.max_affordable(bar.close))
        } else if !state.is_flat() && price_return > self.exit_threshold {
            TradeDecision::ExitLong
        } else {
            TradeDecision::Hold
        }
    }

    fn name(&self) -> &str {
        "threshold"
    }
}
