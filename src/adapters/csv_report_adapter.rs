//! CSV writer for aligned return tables.

use crate::domain::align::CombinedReturnSeries;
use crate::domain::error::OptbenchError;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub const HEADER: [&str; 3] = ["date", "return_reference", "return_instrument"];

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }

    /// Render the table into any writer.
    pub fn write_to<W: std::io::Write>(
        &self,
        series: &CombinedReturnSeries,
        writer: W,
    ) -> Result<(), OptbenchError> {
        let mut wtr = csv::Writer::from_writer(writer);
        let report_err = |e: csv::Error| OptbenchError::Report {
            reason: format!("CSV write error: {}", e),
        };

        wtr.write_record(HEADER).map_err(report_err)?;
        for r in series.records() {
            wtr.write_record([
                r.date.format("%Y-%m-%d").to_string(),
                r.return_reference.to_string(),
                r.return_instrument.to_string(),
            ])
            .map_err(report_err)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_combined(
        &self,
        series: &CombinedReturnSeries,
        output_path: &Path,
    ) -> Result<(), OptbenchError> {
        let file = std::fs::File::create(output_path).map_err(|e| OptbenchError::Report {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;
        self.write_to(series, file)
    }
}
