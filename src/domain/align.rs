//! Return alignment: inner-join two return series on exact date equality.

use chrono::NaiveDate;
use log::{debug, warn};
use std::cmp::Ordering;

use super::error::OptbenchError;
use super::ohlcv::PriceBar;
use super::returns::ReturnSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedReturnRecord {
    pub date: NaiveDate,
    pub return_reference: f64,
    pub return_instrument: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CombinedReturnSeries {
    records: Vec<CombinedReturnRecord>,
}

impl CombinedReturnSeries {
    pub fn records(&self) -> &[CombinedReturnRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignOptions {
    /// Treat a join with no overlapping dates as an input error instead of
    /// an empty result.
    pub empty_overlap_is_error: bool,
}

/// Align with default options (an empty overlap is a valid empty result).
pub fn align(
    reference: &ReturnSeries,
    instrument: &ReturnSeries,
) -> Result<CombinedReturnSeries, OptbenchError> {
    align_with(reference, instrument, &AlignOptions::default())
}

pub fn align_with(
    reference: &ReturnSeries,
    instrument: &ReturnSeries,
    options: &AlignOptions,
) -> Result<CombinedReturnSeries, OptbenchError> {
    if reference.is_empty() {
        return Err(OptbenchError::input("reference return series is empty"));
    }
    if instrument.is_empty() {
        return Err(OptbenchError::input("instrument return series is empty"));
    }

    let refs = reference.records();
    let inst = instrument.records();
    let mut records = Vec::with_capacity(refs.len().min(inst.len()));
    let mut matched = 0usize;
    let (mut i, mut j) = (0usize, 0usize);

    // both sides are strictly increasing by date
    while i < refs.len() && j < inst.len() {
        match refs[i].date.cmp(&inst[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                matched += 1;
                if let (Some(r), Some(x)) = (refs[i].value, inst[j].value) {
                    records.push(CombinedReturnRecord {
                        date: refs[i].date,
                        return_reference: r,
                        return_instrument: x,
                    });
                }
                i += 1;
                j += 1;
            }
        }
    }

    debug!(
        "aligned {} reference and {} instrument returns: {} shared dates, {} rows kept",
        refs.len(),
        inst.len(),
        matched,
        records.len()
    );

    if records.is_empty() {
        if options.empty_overlap_is_error {
            return Err(OptbenchError::input(
                "reference and instrument returns share no dates with defined values",
            ));
        }
        warn!("reference and instrument returns share no dates with defined values");
    }

    Ok(CombinedReturnSeries { records })
}

/// Derive the reference returns from its closes, then align.
pub fn align_bars(
    reference_bars: &[PriceBar],
    instrument: &ReturnSeries,
    options: &AlignOptions,
) -> Result<CombinedReturnSeries, OptbenchError> {
    let reference = ReturnSeries::from_closes(reference_bars)?;
    align_with(&reference, instrument, options)
}
