//! Period-return series.
//!
//! A return is `None` when it cannot be computed: always for the first
//! record, and for any record whose predecessor value is zero.

use chrono::NaiveDate;

use super::error::OptbenchError;
use super::ohlcv::{sorted_and_validated, PriceBar};
use super::portfolio::ValuationRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnRecord {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Date-ordered returns with strictly increasing, unique dates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnSeries {
    records: Vec<ReturnRecord>,
}

impl ReturnSeries {
    /// Wrap externally produced records, rejecting unsorted or repeated dates
    /// and defined values that are not finite.
    pub fn new(records: Vec<ReturnRecord>) -> Result<Self, OptbenchError> {
        if let Some(r) = records
            .iter()
            .find(|r| r.value.is_some_and(|v| !v.is_finite()))
        {
            return Err(OptbenchError::input(format!(
                "return on {} is not finite; use None for an undefined return",
                r.date
            )));
        }
        if let Some(pair) = records.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(OptbenchError::input(format!(
                "return series dates must be strictly increasing ({} then {})",
                pair[0].date, pair[1].date
            )));
        }
        Ok(ReturnSeries { records })
    }

    /// Percent change between consecutive `(date, value)` points.
    ///
    /// Points must already be strictly increasing by date.
    fn pct_change<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut prev: Option<f64> = None;
        let records = points
            .into_iter()
            .map(|(date, value)| {
                let ret = prev.and_then(|p| {
                    if p == 0.0 {
                        None
                    } else {
                        Some((value - p) / p)
                    }
                });
                prev = Some(value);
                ReturnRecord { date, value: ret }
            })
            .collect();
        ReturnSeries { records }
    }

    /// Returns of a valuation sequence's total value.
    pub fn from_valuations(valuations: &[ValuationRecord]) -> Self {
        Self::pct_change(valuations.iter().map(|v| (v.date, v.total_value)))
    }

    /// Returns of consecutive close prices.
    ///
    /// The bars are sorted and validated first, so duplicate dates or
    /// non-positive closes surface as input errors.
    pub fn from_closes(bars: &[PriceBar]) -> Result<Self, OptbenchError> {
        let bars = sorted_and_validated(bars.to_vec())?;
        Ok(Self::pct_change(bars.iter().map(|b| (b.date, b.close))))
    }

    pub fn records(&self) -> &[ReturnRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with a computable return, in date order.
    pub fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.records
            .iter()
            .filter_map(|r| r.value.map(|v| (r.date, v)))
    }
}
