//! Price bar representation and series validation.

use chrono::NaiveDate;

use super::error::OptbenchError;

/// One period of aggregated price/volume data for a single instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Fractional change of this bar's close versus `prev_close`.
    pub fn return_from(&self, prev_close: f64) -> f64 {
        (self.close - prev_close) / prev_close
    }
}

/// Sort bars ascending by date and reject sequences the engine cannot price.
///
/// Fails with an input error when the sequence is empty, a date repeats,
/// a close is zero, negative or not finite, or a volume is negative.
pub fn sorted_and_validated(mut bars: Vec<PriceBar>) -> Result<Vec<PriceBar>, OptbenchError> {
    if bars.is_empty() {
        return Err(OptbenchError::input("bar sequence is empty"));
    }

    bars.sort_by_key(|b| b.date);

    for bar in &bars {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(OptbenchError::input(format!(
                "non-positive close price {} on {}",
                bar.close, bar.date
            )));
        }
        if bar.volume < 0.0 {
            return Err(OptbenchError::input(format!(
                "negative volume {} on {}",
                bar.volume, bar.date
            )));
        }
    }

    if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(OptbenchError::input(format!(
            "duplicate bar date {}",
            pair[0].date
        )));
    }

    Ok(bars)
}
