//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::fallback_adapter::FallbackDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::adapters::synthetic_adapter::SyntheticDataAdapter;
use crate::adapters::tracing_event_adapter::TracingEventAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{build_backtest_config, validate_strategy};
use crate::domain::error::KumoError;
use crate::domain::metrics::Metrics;
use crate::domain::report::BacktestResponse;
use crate::domain::rule::Block;
use crate::domain::strategy::{Strategy, UnrecognizedKind};
use crate::domain::strategy_parser;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_OUTPUT: &str = "report.json";

#[derive(Parser, Debug)]
#[command(name = "kumo", about = "Rule-block forex strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        /// INI run configuration; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Strategy JSON document
        #[arg(short, long)]
        strategy: PathBuf,
        /// CSV bars, overriding [data] csv_path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Report path, overriding [report] output
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a strategy document
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            strategy,
            data,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(config.as_deref(), &strategy, data.as_deref())
            } else {
                run_backtest(config.as_deref(), &strategy, data.as_deref(), output.as_deref())
            }
        }
        Command::Validate { strategy } => run_validate(&strategy),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, ExitCode> {
    let loaded = match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => FileConfigAdapter::from_string(""),
    };
    loaded.map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

pub fn load_strategy(path: &Path) -> Result<Strategy, KumoError> {
    let document = fs::read_to_string(path)?;
    strategy_parser::parse(&document)
}

/// A path from the command line, else a non-blank config entry.
fn resolve_path(
    adapter: &dyn ConfigPort,
    overridden: Option<&Path>,
    section: &str,
    key: &str,
) -> Option<PathBuf> {
    overridden.map(Path::to_path_buf).or_else(|| {
        adapter
            .get_string(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}

/// `--data` wins over `[data] csv_path`; without either, bars are synthetic.
pub fn build_data_port(adapter: &dyn ConfigPort, data_override: Option<&Path>) -> Box<dyn DataPort> {
    match resolve_path(adapter, data_override, "data", "csv_path") {
        Some(path) => Box::new(FallbackDataAdapter::new(CsvAdapter::new(path))),
        None => Box::new(SyntheticDataAdapter::new()),
    }
}

fn run_backtest(
    config_path: Option<&Path>,
    strategy_path: &Path,
    data_override: Option<&Path>,
    output_override: Option<&Path>,
) -> ExitCode {
    // Stage 1: Load and validate config
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let output = resolve_path(&adapter, output_override, "report", "output")
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    // Stage 2: Load strategy
    eprintln!("Loading strategy from {}", strategy_path.display());
    let strategy = match load_strategy(strategy_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            let response = BacktestResponse::failed(
                bt_config.identity(""),
                bt_config.initial_balance,
                e.to_string(),
            );
            return finish_failed(&response, &output, &e);
        }
    };
    eprintln!("Strategy: {}", strategy.name);

    // Stage 3: Fetch bars and simulate
    let data_port = build_data_port(&adapter, data_override);
    eprintln!(
        "Running backtest: {} {} from {} to {}",
        bt_config.symbol, bt_config.timeframe, bt_config.start_date, bt_config.end_date
    );

    let identity = bt_config.identity(&strategy.name);
    let result =
        backtest_engine::simulate(&bt_config, &strategy, data_port.as_ref(), &TracingEventAdapter);

    let report = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            let response =
                BacktestResponse::failed(identity, bt_config.initial_balance, e.to_string());
            return finish_failed(&response, &output, &e);
        }
    };

    // Stage 4: Console summary
    print_summary(&report.metrics);

    // Stage 5: Write report
    let response = BacktestResponse::succeeded(identity, report);
    match JsonReportAdapter.write(&response, &output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Write the failed envelope, then exit with the code for `cause`.
fn finish_failed(response: &BacktestResponse, output: &Path, cause: &KumoError) -> ExitCode {
    if let Err(e) = JsonReportAdapter.write(response, output) {
        eprintln!("error: {e}");
    }
    cause.into()
}

pub fn print_summary(metrics: &Metrics) {
    eprintln!("\n=== Results ===");
    eprintln!("Net Profit:       {:.2}", metrics.net_profit);
    eprintln!("Return:           {:.2}%", metrics.return_percent);
    eprintln!("Final Balance:    {:.2}", metrics.final_balance);
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", metrics.sortino_ratio);
    eprintln!("Max Drawdown:     -{:.2}%", metrics.max_drawdown_percent);
    eprintln!("Time in Market:   {:.1}%", metrics.time_in_market);
}

fn print_blocks(label: &str, blocks: &[Block]) {
    eprintln!("\n{} blocks:", label);
    if blocks.is_empty() {
        eprintln!("  (none)");
    }
    for block in blocks {
        let state = if block.enabled { "" } else { " [disabled]" };
        eprintln!("  {}{}", block.name, state);
        for rule in &block.rules {
            eprintln!("    {}", rule);
        }
    }
}

fn print_strategy(strategy: &Strategy) {
    print_blocks("Entry", &strategy.entry_blocks);
    print_blocks("Exit", &strategy.exit_blocks);

    let unknown = strategy.unrecognized_kinds();
    if !unknown.is_empty() {
        eprintln!("\nIgnored kinds:");
        for kind in &unknown {
            match kind {
                UnrecognizedKind::Indicator(k) => eprintln!("  indicator: {}", k),
                UnrecognizedKind::Comparator(k) => eprintln!("  comparator: {}", k),
                UnrecognizedKind::Action(k) => eprintln!("  action: {}", k),
            }
        }
    }
}

fn check_strategy(strategy_path: &Path) -> Result<Strategy, ExitCode> {
    eprintln!("Loading strategy from {}", strategy_path.display());
    let strategy = load_strategy(strategy_path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    validate_strategy(&strategy).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok(strategy)
}

pub fn run_dry_run(
    config_path: Option<&Path>,
    strategy_path: &Path,
    data_override: Option<&Path>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let bt_config: BacktestConfig = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Config validated successfully");

    let strategy = match check_strategy(strategy_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    print_strategy(&strategy);

    let source = resolve_path(&adapter, data_override, "data", "csv_path");

    eprintln!("\nRun:");
    eprintln!("  symbol:    {}", bt_config.symbol);
    eprintln!("  timeframe: {}", bt_config.timeframe);
    eprintln!("  period:    {} to {}", bt_config.start_date, bt_config.end_date);
    match source {
        Some(path) => eprintln!("  data:      {} (synthetic fallback)", path.display()),
        None => eprintln!("  data:      synthetic"),
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(strategy_path: &Path) -> ExitCode {
    let strategy = match check_strategy(strategy_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    eprintln!("Strategy: {}", strategy.name);
    if !strategy.description.is_empty() {
        eprintln!("  {}", strategy.description);
    }
    print_strategy(&strategy);

    eprintln!("\nStrategy is valid");
    ExitCode::SUCCESS
}
