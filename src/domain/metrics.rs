//! Summary statistics for a backtest run and an aligned return table.

use super::align::CombinedReturnSeries;
use super::backtest::BacktestResult;
use super::portfolio::ValuationRecord;
use super::trade::Side;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSummary {
    pub initial_value: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub round_trips: usize,
    pub winning_round_trips: usize,
    pub win_rate: f64,
}

impl BacktestSummary {
    pub fn compute(result: &BacktestResult) -> Self {
        let initial_value = result.initial_cash;
        let final_value = result
            .valuations
            .last()
            .map(|v| v.total_value)
            .unwrap_or(initial_value);

        let total_return = if initial_value > 0.0 {
            (final_value - initial_value) / initial_value
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&result.valuations);

        // a round trip closes on each sell; its cost is every buy since the last sell
        let mut round_trips = 0usize;
        let mut winning_round_trips = 0usize;
        let mut open_cost = 0.0_f64;
        for fill in &result.fills {
            match fill.side {
                Side::Buy => open_cost += -fill.cash_flow(),
                Side::Sell => {
                    round_trips += 1;
                    if fill.cash_flow() > open_cost {
                        winning_round_trips += 1;
                    }
                    open_cost = 0.0;
                }
            }
        }

        let win_rate = if round_trips > 0 {
            winning_round_trips as f64 / round_trips as f64
        } else {
            0.0
        };

        BacktestSummary {
            initial_value,
            final_value,
            total_return,
            max_drawdown,
            max_drawdown_duration,
            round_trips,
            winning_round_trips,
            win_rate,
        }
    }
}

fn compute_drawdown(valuations: &[ValuationRecord]) -> (f64, usize) {
    let Some(first) = valuations.first() else {
        return (0.0, 0);
    };

    let mut peak = first.total_value;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0usize;
    let mut current_dd_duration = 0usize;

    for v in valuations {
        if v.total_value >= peak {
            peak = v.total_value;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - v.total_value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_dd_duration += 1;
            if current_dd_duration > max_dd_duration {
                max_dd_duration = current_dd_duration;
            }
        }
    }

    (max_dd, max_dd_duration)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSummary {
    pub rows: usize,
    pub mean_reference: f64,
    pub mean_instrument: f64,
    pub cumulative_reference: f64,
    pub cumulative_instrument: f64,
    /// cumulative_instrument - cumulative_reference
    pub excess_return: f64,
    /// Pearson correlation of the two return columns; 0 when undefined.
    pub correlation: f64,
}

impl ComparisonSummary {
    pub fn compute(series: &CombinedReturnSeries) -> Self {
        let records = series.records();
        let rows = records.len();
        if rows == 0 {
            return ComparisonSummary {
                rows: 0,
                mean_reference: 0.0,
                mean_instrument: 0.0,
                cumulative_reference: 0.0,
                cumulative_instrument: 0.0,
                excess_return: 0.0,
                correlation: 0.0,
            };
        }

        let n = rows as f64;
        let mean_reference = records.iter().map(|r| r.return_reference).sum::<f64>() / n;
        let mean_instrument = records.iter().map(|r| r.return_instrument).sum::<f64>() / n;

        let cumulative_reference = compound(records.iter().map(|r| r.return_reference));
        let cumulative_instrument = compound(records.iter().map(|r| r.return_instrument));

        let mut cov = 0.0_f64;
        let mut var_ref = 0.0_f64;
        let mut var_inst = 0.0_f64;
        for r in records {
            let dr = r.return_reference - mean_reference;
            let di = r.return_instrument - mean_instrument;
            cov += dr * di;
            var_ref += dr * dr;
            var_inst += di * di;
        }
        let denom = (var_ref * var_inst).sqrt();
        let correlation = if denom > 0.0 { cov / denom } else { 0.0 };

        ComparisonSummary {
            rows,
            mean_reference,
            mean_instrument,
            cumulative_reference,
            cumulative_instrument,
            excess_return: cumulative_instrument - cumulative_reference,
            correlation,
        }
    }
}

fn compound(returns: impl Iterator<Item = f64>) -> f64 {
    returns.fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}
