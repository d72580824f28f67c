//! Configuration validation.
//!
//! Validates all config fields before any price data is read.

use crate::domain::error::OptbenchError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), OptbenchError> {
    validate_data_dir(config)?;
    validate_symbols(config)?;
    validate_dates(config)?;
    validate_initial_cash(config)?;
    validate_threshold(config, "entry_threshold")?;
    validate_threshold(config, "exit_threshold")?;
    parse_flag(config, "empty_overlap_is_error", false)?;
    Ok(())
}

fn missing(section: &str, key: &str) -> OptbenchError {
    OptbenchError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(key: &str, reason: String) -> OptbenchError {
    OptbenchError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason,
    }
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), OptbenchError> {
    if !config.has_key("data", "dir") {
        return Err(missing("data", "dir"));
    }
    Ok(())
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), OptbenchError> {
    for key in ["symbol", "reference_symbol"] {
        if !config.has_key("backtest", key) {
            return Err(missing("backtest", key));
        }
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), OptbenchError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date > end_date {
        return Err(invalid(
            "start_date",
            "start_date must not be after end_date".to_string(),
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, OptbenchError> {
    match value {
        None => Err(missing("backtest", field)),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(field, format!("invalid {} format, expected YYYY-MM-DD", field))
        }),
    }
}

/// Parse an optional numeric key, rejecting present-but-garbled values
/// instead of silently using the default.
pub fn parse_number(
    config: &dyn ConfigPort,
    key: &str,
    default: f64,
) -> Result<f64, OptbenchError> {
    match config.get_double("backtest", key)? {
        None => Ok(default),
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(invalid(key, format!("{} must be finite, got {}", key, v))),
    }
}

/// Parse an optional boolean key under `[backtest]`.
pub fn parse_flag(
    config: &dyn ConfigPort,
    key: &str,
    default: bool,
) -> Result<bool, OptbenchError> {
    Ok(config.get_bool("backtest", key)?.unwrap_or(default))
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), OptbenchError> {
    let value = parse_number(config, "initial_cash", 0.0)?;
    if value < 0.0 {
        return Err(invalid(
            "initial_cash",
            "initial_cash must be non-negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_threshold(config: &dyn ConfigPort, key: &str) -> Result<(), OptbenchError> {
    let value = parse_number(config, key, 0.01)?;
    if value <= 0.0 || value >= 1.0 {
        return Err(invalid(key, format!("{} must be between 0 and 1", key)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    fn with_backtest(extra: &str) -> FileConfigAdapter {
        make_config(&format!(
            "[data]\ndir = bars\n\n[backtest]\nsymbol = OPT\nreference_symbol = SPY\nstart_date = 2024-01-01\nend_date = 2024-06-30\n{}",
            extra
        ))
    }

    fn invalid_key(err: &OptbenchError) -> Option<&str> {
        match err {
            OptbenchError::ConfigInvalid { key, .. } => Some(key.as_str()),
            _ => None,
        }
    }

    #[test]
    fn minimal_config_passes() {
        assert!(validate_run_config(&with_backtest("")).is_ok());
    }

    #[test]
    fn full_config_passes() {
        let config = with_backtest(
            "initial_cash = 2500\nentry_threshold = 0.02\nexit_threshold = 0.015\n",
        );
        assert!(validate_run_config(&config).is_ok());
    }

    #[test]
    fn missing_data_dir() {
        let config = make_config(
            "[backtest]\nsymbol = OPT\nreference_symbol = SPY\nstart_date = 2024-01-01\nend_date = 2024-06-30\n",
        );
        let err = validate_run_config(&config).unwrap_err();
        assert!(matches!(err, OptbenchError::ConfigMissing { ref key, .. } if key == "dir"));
    }

    #[test]
    fn missing_reference_symbol() {
        let config = make_config(
            "[data]\ndir = bars\n[backtest]\nsymbol = OPT\nstart_date = 2024-01-01\nend_date = 2024-06-30\n",
        );
        let err = validate_run_config(&config).unwrap_err();
        assert!(
            matches!(err, OptbenchError::ConfigMissing { ref key, .. } if key == "reference_symbol")
        );
    }

    #[test]
    fn negative_initial_cash_fails() {
        let err = validate_run_config(&with_backtest("initial_cash = -1\n")).unwrap_err();
        assert_eq!(invalid_key(&err), Some("initial_cash"));
    }

    #[test]
    fn zero_initial_cash_is_allowed() {
        assert!(validate_run_config(&with_backtest("initial_cash = 0\n")).is_ok());
    }

    #[test]
    fn garbled_initial_cash_fails() {
        let err = validate_run_config(&with_backtest("initial_cash = lots\n")).unwrap_err();
        assert_eq!(invalid_key(&err), Some("initial_cash"));
    }

    #[test]
    fn infinite_initial_cash_fails() {
        let err = validate_run_config(&with_backtest("initial_cash = inf\n")).unwrap_err();
        assert_eq!(invalid_key(&err), Some("initial_cash"));
    }

    #[test]
    fn misspelled_overlap_flag_fails() {
        let err =
            validate_run_config(&with_backtest("empty_overlap_is_error = ture\n")).unwrap_err();
        assert_eq!(invalid_key(&err), Some("empty_overlap_is_error"));
    }

    #[test]
    fn overlap_flag_accepts_yes_no() {
        assert!(validate_run_config(&with_backtest("empty_overlap_is_error = yes\n")).is_ok());
        assert!(validate_run_config(&with_backtest("empty_overlap_is_error = off\n")).is_ok());
    }

    #[test]
    fn threshold_must_be_positive() {
        let err = validate_run_config(&with_backtest("entry_threshold = 0\n")).unwrap_err();
        assert_eq!(invalid_key(&err), Some("entry_threshold"));
        let err = validate_run_config(&with_backtest("exit_threshold = -0.01\n")).unwrap_err();
        assert_eq!(invalid_key(&err), Some("exit_threshold"));
    }

    #[test]
    fn threshold_below_one() {
        let err = validate_run_config(&with_backtest("exit_threshold = 1.5\n")).unwrap_err();
        assert_eq!(invalid_key(&err), Some("exit_threshold"));
    }

    #[test]
    fn bad_date_format() {
        let config = make_config(
            "[data]\ndir = bars\n[backtest]\nsymbol = OPT\nreference_symbol = SPY\nstart_date = 01/02/2024\nend_date = 2024-06-30\n",
        );
        let err = validate_run_config(&config).unwrap_err();
        assert_eq!(invalid_key(&err), Some("start_date"));
    }

    #[test]
    fn start_after_end_fails() {
        let config = make_config(
            "[data]\ndir = bars\n[backtest]\nsymbol = OPT\nreference_symbol = SPY\nstart_date = 2024-07-01\nend_date = 2024-06-30\n",
        );
        let err = validate_run_config(&config).unwrap_err();
        assert_eq!(invalid_key(&err), Some("start_date"));
    }

    #[test]
    fn same_start_and_end_is_allowed() {
        let config = make_config(
            "[data]\ndir = bars\n[backtest]\nsymbol = OPT\nreference_symbol = SPY\nstart_date = 2024-06-30\nend_date = 2024-06-30\n",
        );
        assert!(validate_run_config(&config).is_ok());
    }
}
