//! Valuation engine: replays a decision rule over one instrument's bars.
//!
//! Bars are walked strictly in date order. Each step applies the rule
//! against the prior bar, then marks the ledger to the bar's close.

use log::{debug, info};

use super::error::OptbenchError;
use super::ohlcv::{sorted_and_validated, PriceBar};
use super::portfolio::{PortfolioState, ValuationRecord};
use super::returns::ReturnSeries;
use super::strategy::{DecisionRule, ThresholdRule, TradeDecision};
use super::trade::{Fill, Side};

pub const DEFAULT_INITIAL_CASH: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: DEFAULT_INITIAL_CASH,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), OptbenchError> {
        if !self.initial_cash.is_finite() || self.initial_cash < 0.0 {
            return Err(OptbenchError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "initial_cash".to_string(),
                reason: format!(
                    "initial_cash must be a non-negative number, got {}",
                    self.initial_cash
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub valuations: Vec<ValuationRecord>,
    pub fills: Vec<Fill>,
    pub final_state: PortfolioState,
    pub initial_cash: f64,
}

pub struct ValuationEngine<R: DecisionRule = ThresholdRule> {
    bars: Vec<PriceBar>,
    config: BacktestConfig,
    rule: R,
}

impl ValuationEngine<ThresholdRule> {
    /// Engine with the default threshold rule.
    pub fn new(bars: Vec<PriceBar>, config: BacktestConfig) -> Result<Self, OptbenchError> {
        Self::with_rule(bars, config, ThresholdRule::default())
    }
}

impl<R: DecisionRule> ValuationEngine<R> {
    /// Validate configuration and bars, sorting the bars ascending by date.
    pub fn with_rule(
        bars: Vec<PriceBar>,
        config: BacktestConfig,
        rule: R,
    ) -> Result<Self, OptbenchError> {
        config.validate()?;
        let bars = sorted_and_validated(bars)?;
        Ok(ValuationEngine { bars, config, rule })
    }

    /// Replay the rule over every bar from a fresh ledger.
    ///
    /// Produces one valuation per bar in date order. The first bar is never
    /// evaluated since it has no prior close.
    pub fn run(&self) -> BacktestResult {
        let mut state = PortfolioState::new(self.config.initial_cash);
        let mut valuations = Vec::with_capacity(self.bars.len());
        let mut fills = Vec::new();
        let mut prior: Option<&PriceBar> = None;

        for bar in &self.bars {
            if let Some(prior_bar) = prior {
                let decision = self.rule.decide(bar, prior_bar, &state);
                if let Some(fill) = apply_decision(&mut state, bar, decision) {
                    debug!(
                        "{} {} {} @ {:.4} (cash {:.2})",
                        fill.date, fill.side, fill.quantity, fill.price, fill.cash_after
                    );
                    fills.push(fill);
                }
            }
            valuations.push(ValuationRecord::capture(bar.date, &state, bar.close));
            prior = Some(bar);
        }

        if let (Some(first), Some(last)) = (valuations.first(), valuations.last()) {
            info!(
                "{} rule over {} bars ({} to {}): {} fills, final value {:.2}",
                self.rule.name(),
                valuations.len(),
                first.date,
                last.date,
                fills.len(),
                last.total_value
            );
        }

        BacktestResult {
            valuations,
            fills,
            final_state: state,
            initial_cash: self.config.initial_cash,
        }
    }

    /// Run the engine and difference its valuation sequence.
    pub fn compute_returns(&self) -> ReturnSeries {
        ReturnSeries::from_valuations(&self.run().valuations)
    }
}

fn apply_decision(
    state: &mut PortfolioState,
    bar: &PriceBar,
    decision: TradeDecision,
) -> Option<Fill> {
    let (side, quantity) = match decision {
        TradeDecision::Hold => return None,
        TradeDecision::EnterLong(size) => (Side::Buy, state.buy(size, bar.close)),
        TradeDecision::ExitLong => (Side::Sell, state.sell_all(bar.close)),
    };
    if quantity == 0 {
        return None;
    }
    Some(Fill {
        date: bar.date,
        side,
        quantity,
        price: bar.close,
        cash_after: state.cash(),
    })
}

/// Valuation returns for `bars` under the default rule.
pub fn compute_returns(
    bars: Vec<PriceBar>,
    config: BacktestConfig,
) -> Result<ReturnSeries, OptbenchError> {
    Ok(ValuationEngine::new(bars, config)?.compute_returns())
}
