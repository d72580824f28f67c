//! Price data access port trait.

use crate::domain::error::OptbenchError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `symbol` within `[start_date, end_date]`, sorted by date.
    ///
    /// Implementations fail with [`OptbenchError::Retrieval`] when the
    /// symbol has no bars in the range.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, OptbenchError>;

    fn list_symbols(&self) -> Result<Vec<String>, OptbenchError>;
}
