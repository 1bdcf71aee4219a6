//! Configuration validation.
//!
//! Run configuration and strategy are both checked before any bar is read.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::KumoError;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const SECTION: &str = "backtest";

pub const DEFAULT_SYMBOL: &str = "EURUSD";
pub const DEFAULT_TIMEFRAME: &str = "1h";
pub const DEFAULT_START_DATE: &str = "2024-01-01";
pub const DEFAULT_END_DATE: &str = "2024-12-31";
pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;
pub const DEFAULT_COMMISSION_PCT: f64 = 0.02;
pub const DEFAULT_SLIPPAGE_PIPS: f64 = 2.0;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), KumoError> {
    validate_initial_balance(config)?;
    validate_commission(config)?;
    validate_slippage(config)?;
    validate_dates(config)?;
    validate_symbol(config)?;
    Ok(())
}

/// Validate and read the `[backtest]` section, applying defaults for absent keys.
pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, KumoError> {
    validate_backtest_config(config)?;
    let (start_date, end_date) = read_dates(config)?;

    Ok(BacktestConfig {
        symbol: config.get_string_or(SECTION, "symbol", DEFAULT_SYMBOL),
        timeframe: config.get_string_or(SECTION, "timeframe", DEFAULT_TIMEFRAME),
        start_date,
        end_date,
        initial_balance: config.get_double(SECTION, "initial_balance", DEFAULT_INITIAL_BALANCE),
        commission_pct: config.get_double(SECTION, "commission", DEFAULT_COMMISSION_PCT),
        slippage_pips: config.get_double(SECTION, "slippage", DEFAULT_SLIPPAGE_PIPS),
    })
}

/// A strategy needs at least one entry block to ever trade.
pub fn validate_strategy(strategy: &Strategy) -> Result<(), KumoError> {
    if strategy.entry_blocks.is_empty() {
        return Err(KumoError::strategy_invalid(
            "strategy must have at least one entry block",
        ));
    }
    Ok(())
}

fn invalid(key: &str, reason: impl Into<String>) -> KumoError {
    KumoError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), KumoError> {
    let value = config.get_double(SECTION, "initial_balance", DEFAULT_INITIAL_BALANCE);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("initial_balance", "initial_balance must be positive"));
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), KumoError> {
    let value = config.get_double(SECTION, "commission", DEFAULT_COMMISSION_PCT);
    if !value.is_finite() || value < 0.0 {
        return Err(invalid("commission", "commission must be non-negative"));
    }
    Ok(())
}

fn validate_slippage(config: &dyn ConfigPort) -> Result<(), KumoError> {
    let value = config.get_double(SECTION, "slippage", DEFAULT_SLIPPAGE_PIPS);
    if !value.is_finite() || value < 0.0 {
        return Err(invalid("slippage", "slippage must be non-negative"));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), KumoError> {
    let (start_date, end_date) = read_dates(config)?;
    if start_date >= end_date {
        return Err(invalid("start_date", "start_date must be before end_date"));
    }
    Ok(())
}

fn read_dates(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), KumoError> {
    let start = config.get_string_or(SECTION, "start_date", DEFAULT_START_DATE);
    let end = config.get_string_or(SECTION, "end_date", DEFAULT_END_DATE);
    Ok((parse_date(&start, "start_date")?, parse_date(&end, "end_date")?))
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, KumoError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| invalid(field, format!("invalid {} format, expected YYYY-MM-DD", field)))
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), KumoError> {
    match config.get_string(SECTION, "symbol") {
        Some(s) if s.trim().is_empty() => Err(KumoError::ConfigMissing {
            section: SECTION.to_string(),
            key: "symbol".to_string(),
        }),
        _ => Ok(()),
    }
}
