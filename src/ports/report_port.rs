//! Report output port trait.

use crate::domain::align::CombinedReturnSeries;
use crate::domain::error::OptbenchError;
use std::path::Path;

/// Port for persisting an aligned return table.
pub trait ReportPort {
    fn write_combined(
        &self,
        series: &CombinedReturnSeries,
        output_path: &Path,
    ) -> Result<(), OptbenchError>;
}
