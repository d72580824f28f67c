//! CSV file price data adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with the header
//! `date,open,high,low,close,volume`.

use crate::domain::error::OptbenchError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use log::debug;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn retrieval(symbol: &str, reason: String) -> OptbenchError {
    OptbenchError::Retrieval {
        symbol: symbol.to_string(),
        reason,
    }
}

fn parse_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    symbol: &str,
    line: u64,
) -> Result<f64, OptbenchError> {
    let raw = record
        .get(index)
        .ok_or_else(|| retrieval(symbol, format!("line {}: missing {} column", line, name)))?;
    raw.trim().parse::<f64>().map_err(|e| {
        retrieval(
            symbol,
            format!("line {}: invalid {} value {:?}: {}", line, name, raw, e),
        )
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, OptbenchError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| retrieval(symbol, format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| retrieval(symbol, format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let date_str = record
                .get(0)
                .ok_or_else(|| retrieval(symbol, format!("line {}: missing date column", line)))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                retrieval(symbol, format!("line {}: invalid date {:?}: {}", line, date_str, e))
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(PriceBar {
                date,
                open: parse_field(&record, 1, "open", symbol, line)?,
                high: parse_field(&record, 2, "high", symbol, line)?,
                low: parse_field(&record, 3, "low", symbol, line)?,
                close: parse_field(&record, 4, "close", symbol, line)?,
                volume: parse_field(&record, 5, "volume", symbol, line)?,
            });
        }

        if bars.is_empty() {
            return Err(retrieval(
                symbol,
                format!("no bars between {} and {}", start_date, end_date),
            ));
        }

        bars.sort_by_key(|b| b.date);
        debug!("loaded {} bars for {} from {}", bars.len(), symbol, path.display());
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, OptbenchError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            retrieval(
                "*",
                format!("failed to read directory {}: {}", self.base_path.display(), e),
            )
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| retrieval("*", format!("directory entry error: {}", e)))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
