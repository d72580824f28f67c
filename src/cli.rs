//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{error, info};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::align::{align_bars, AlignOptions, CombinedReturnSeries};
use crate::domain::backtest::{
    BacktestConfig, BacktestResult, ValuationEngine, DEFAULT_INITIAL_CASH,
};
use crate::domain::config_validation::{
    parse_date, parse_flag, parse_number, validate_run_config,
};
use crate::domain::error::OptbenchError;
use crate::domain::metrics::{BacktestSummary, ComparisonSummary};
use crate::domain::returns::ReturnSeries;
use crate::domain::strategy::{ThresholdRule, DEFAULT_ENTRY_THRESHOLD, DEFAULT_EXIT_THRESHOLD};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "optbench",
    about = "Backtest a single-instrument rule and compare its returns against a reference"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the backtest and print the aligned return table
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        /// Write the aligned table as CSV (overrides [output] path)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Traded instrument (overrides [backtest] symbol)
        #[arg(long)]
        symbol: Option<String>,
        /// Reference instrument (overrides [backtest] reference_symbol)
        #[arg(long)]
        reference: Option<String>,
    },
    /// Validate a configuration file without reading price data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with bar files in the configured data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Everything one comparison run needs, resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub symbol: String,
    pub reference_symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub backtest: BacktestConfig,
    pub rule: ThresholdRule,
    pub align: AlignOptions,
    pub output_path: Option<PathBuf>,
}

/// Output of [`run_comparison`].
#[derive(Debug, Clone)]
pub struct Comparison {
    pub backtest: BacktestResult,
    pub instrument_returns: ReturnSeries,
    pub combined: CombinedReturnSeries,
    pub backtest_summary: BacktestSummary,
    pub comparison_summary: ComparisonSummary,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Compare {
            config,
            output,
            symbol,
            reference,
        } => run_compare(&config, output, symbol, reference),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            let _ = report_failure(&mut io::stderr().lock(), &e);
            (&e).into()
        }
    }
}

/// Write the fatal error on its own line, independent of the log filter.
pub fn report_failure<W: Write>(out: &mut W, err: &OptbenchError) -> io::Result<()> {
    writeln!(out, "error: {err}")
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, OptbenchError> {
    info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Validate and collect the run configuration.
pub fn build_run_config(adapter: &dyn ConfigPort) -> Result<RunConfig, OptbenchError> {
    validate_run_config(adapter)?;

    let required = |section: &str, key: &str| {
        adapter
            .get_string(section, key)
            .map(|v| v.trim().to_string())
            .ok_or_else(|| OptbenchError::ConfigMissing {
                section: section.into(),
                key: key.into(),
            })
    };

    let start_str = adapter.get_string("backtest", "start_date");
    let end_str = adapter.get_string("backtest", "end_date");
    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    Ok(RunConfig {
        data_dir: PathBuf::from(required("data", "dir")?),
        symbol: required("backtest", "symbol")?,
        reference_symbol: required("backtest", "reference_symbol")?,
        start_date,
        end_date,
        backtest: BacktestConfig {
            initial_cash: parse_number(adapter, "initial_cash", DEFAULT_INITIAL_CASH)?,
        },
        rule: ThresholdRule {
            entry_threshold: parse_number(adapter, "entry_threshold", DEFAULT_ENTRY_THRESHOLD)?,
            exit_threshold: parse_number(adapter, "exit_threshold", DEFAULT_EXIT_THRESHOLD)?,
        },
        align: AlignOptions {
            empty_overlap_is_error: parse_flag(adapter, "empty_overlap_is_error", false)?,
        },
        output_path: adapter
            .get_string("output", "path")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from),
    })
}

/// Fetch both instruments, backtest the traded one and align its returns
/// against the reference's close-to-close returns.
pub fn run_comparison(
    data_port: &dyn DataPort,
    config: &RunConfig,
) -> Result<Comparison, OptbenchError> {
    info!(
        "Fetching {} and {} from {} to {}",
        config.symbol, config.reference_symbol, config.start_date, config.end_date
    );
    let bars = data_port.fetch_bars(&config.symbol, config.start_date, config.end_date)?;
    let reference_bars =
        data_port.fetch_bars(&config.reference_symbol, config.start_date, config.end_date)?;

    let engine = ValuationEngine::with_rule(bars, config.backtest.clone(), config.rule.clone())?;
    let backtest = engine.run();
    let instrument_returns = ReturnSeries::from_valuations(&backtest.valuations);

    let combined = align_bars(&reference_bars, &instrument_returns, &config.align)?;
    info!(
        "Aligned {} rows of {} vs {}",
        combined.len(),
        config.symbol,
        config.reference_symbol
    );

    let backtest_summary = BacktestSummary::compute(&backtest);
    let comparison_summary = ComparisonSummary::compute(&combined);

    Ok(Comparison {
        backtest,
        instrument_returns,
        combined,
        backtest_summary,
        comparison_summary,
    })
}

/// Render the aligned table and both summaries.
pub fn print_comparison<W: Write>(
    out: &mut W,
    config: &RunConfig,
    comparison: &Comparison,
) -> io::Result<()> {
    writeln!(
        out,
        "{:<12} {:>16} {:>16}",
        "date",
        format!("{} %", config.reference_symbol),
        format!("{} %", config.symbol)
    )?;
    for r in comparison.combined.records() {
        writeln!(
            out,
            "{:<12} {:>16.4} {:>16.4}",
            r.date.format("%Y-%m-%d"),
            r.return_reference * 100.0,
            r.return_instrument * 100.0
        )?;
    }

    let b = &comparison.backtest_summary;
    writeln!(out, "\n=== Backtest ({}) ===", config.symbol)?;
    writeln!(out, "Initial Value:    {:.2}", b.initial_value)?;
    writeln!(out, "Final Value:      {:.2}", b.final_value)?;
    writeln!(out, "Total Return:     {:.2}%", b.total_return * 100.0)?;
    writeln!(out, "Max Drawdown:     -{:.1}%", b.max_drawdown * 100.0)?;
    writeln!(out, "Round Trips:      {}", b.round_trips)?;
    writeln!(out, "Win Rate:         {:.1}%", b.win_rate * 100.0)?;

    let c = &comparison.comparison_summary;
    writeln!(
        out,
        "\n=== {} vs {} ===",
        config.symbol, config.reference_symbol
    )?;
    writeln!(out, "Rows:             {}", c.rows)?;
    writeln!(out, "Cumulative Ref:   {:.2}%", c.cumulative_reference * 100.0)?;
    writeln!(out, "Cumulative Inst:  {:.2}%", c.cumulative_instrument * 100.0)?;
    writeln!(out, "Excess Return:    {:.2}%", c.excess_return * 100.0)?;
    writeln!(out, "Correlation:      {:.3}", c.correlation)?;
    Ok(())
}

fn run_compare(
    config_path: &Path,
    output_override: Option<PathBuf>,
    symbol_override: Option<String>,
    reference_override: Option<String>,
) -> Result<(), OptbenchError> {
    let adapter = load_config(config_path)?;
    let mut config = build_run_config(&adapter)?;
    if let Some(symbol) = symbol_override {
        config.symbol = symbol;
    }
    if let Some(reference) = reference_override {
        config.reference_symbol = reference;
    }
    if output_override.is_some() {
        config.output_path = output_override;
    }

    let data_port = CsvAdapter::new(config.data_dir.clone());
    let comparison = run_comparison(&data_port, &config)?;

    let stdout = io::stdout();
    print_comparison(&mut stdout.lock(), &config, &comparison)?;

    if let Some(path) = &config.output_path {
        CsvReportAdapter::new().write_combined(&comparison.combined, path)?;
        info!("Aligned returns written to {}", path.display());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), OptbenchError> {
    let adapter = load_config(config_path)?;
    let config = build_run_config(&adapter)?;
    info!(
        "Config valid: {} vs {} from {} to {}, initial cash {:.2}",
        config.symbol,
        config.reference_symbol,
        config.start_date,
        config.end_date,
        config.backtest.initial_cash
    );
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), OptbenchError> {
    let adapter = load_config(config_path)?;
    let dir = adapter
        .get_string("data", "dir")
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| OptbenchError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })?;
    let symbols = CsvAdapter::new(PathBuf::from(dir.trim())).list_symbols()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for symbol in symbols {
        writeln!(out, "{}", symbol)?;
    }
    Ok(())
}
