//! Backtest engine and simulation loop.
//!
//! `BacktestConfig` carries the per-run parameters. `BacktestEngine` walks an
//! ordered bar series once, in this order per bar:
//!
//! 1. Append the bar to the price history
//! 2. With a position open: stop-loss, then take-profit, then exit signal
//! 3. Without one: entry signal, sizing, slippage, open
//!
//! Any position still open after the last bar is closed at its close price
//! with reason `Backtest End`.

use chrono::NaiveDate;

use super::config_validation::validate_strategy;
use super::error::KumoError;
use super::execution::{EntryResult, ExecutionConfig, check_risk_exit, enter_position};
use super::metrics::Metrics;
use super::ohlcv::{OhlcvBar, PriceHistory};
use super::portfolio::Portfolio;
use super::position::ExitReason;
use super::report::{BacktestReport, RunIdentity};
use super::rule_eval::{entry_signal, exit_signal};
use super::strategy::Strategy;
use crate::ports::data_port::DataPort;
use crate::ports::event_port::EventPort;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub timeframe: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_balance: f64,
    /// Percent of absolute gross profit, charged on every close.
    pub commission_pct: f64,
    pub slippage_pips: f64,
}

impl BacktestConfig {
    pub fn execution(&self) -> ExecutionConfig {
        ExecutionConfig {
            commission_pct: self.commission_pct,
            slippage_pips: self.slippage_pips,
        }
    }

    pub fn identity(&self, strategy_name: &str) -> RunIdentity {
        RunIdentity {
            strategy_name: strategy_name.to_string(),
            symbol: self.symbol.clone(),
            timeframe: self.timeframe.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

pub struct BacktestEngine<'a> {
    config: &'a BacktestConfig,
    events: &'a dyn EventPort,
}

impl<'a> BacktestEngine<'a> {
    pub fn new(config: &'a BacktestConfig, events: &'a dyn EventPort) -> Self {
        BacktestEngine { config, events }
    }

    /// Simulate `strategy` over `bars`, which must be ordered by time.
    ///
    /// Holds no state between calls; the same inputs give the same report.
    pub fn run(&self, strategy: &Strategy, bars: &[OhlcvBar]) -> Result<BacktestReport, KumoError> {
        let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
            return Err(KumoError::NoData {
                symbol: self.config.symbol.clone(),
                timeframe: self.config.timeframe.clone(),
            });
        };

        self.events.run_started(&strategy.name, bars.len());
        for kind in strategy.unrecognized_kinds() {
            self.events.unrecognized_kind(&kind);
        }

        let execution = self.config.execution();
        let mut portfolio = Portfolio::new(self.config.initial_balance);
        let mut history = PriceHistory::with_capacity(bars.len());
        portfolio.record_equity(first.time);

        for bar in bars {
            history.push(bar);

            if let Some(position) = portfolio.open.as_ref() {
                let reason = check_risk_exit(position, bar.close).or_else(|| {
                    exit_signal(&strategy.exit_blocks, &history, bar)
                        .then_some(ExitReason::ExitSignal)
                });
                if let Some(reason) = reason {
                    self.close(&mut portfolio, bar, reason);
                }
            } else if let Some(direction) = entry_signal(&strategy.entry_blocks, &history, bar) {
                let entry = enter_position(
                    portfolio.next_trade_id(),
                    direction,
                    bar.time,
                    bar.close,
                    portfolio.balance,
                    &strategy.position_sizing,
                    &strategy.risk,
                    &execution,
                );
                match entry {
                    EntryResult::Entered(position) => {
                        self.events.trade_opened(&position);
                        let opened = portfolio.open_position(position);
                        debug_assert!(opened.is_ok(), "entry attempted with a position open");
                    }
                    EntryResult::InvalidSize(size) => self.events.entry_rejected(direction, size),
                }
            }
        }

        if portfolio.has_position() {
            self.close(&mut portfolio, last, ExitReason::BacktestEnd);
        }

        let span_seconds = (last.time - first.time).num_seconds();
        let metrics = Metrics::compute(&portfolio, span_seconds);
        self.events
            .run_finished(portfolio.closed_trades.len(), portfolio.balance);

        Ok(BacktestReport {
            metrics,
            trades: portfolio.closed_trades,
            equity_curve: portfolio.equity_curve,
        })
    }

    fn close(&self, portfolio: &mut Portfolio, bar: &OhlcvBar, reason: ExitReason) {
        if portfolio
            .close_position(bar.time, bar.close, reason, self.config.commission_pct)
            .is_none()
        {
            return;
        }
        if let Some(trade) = portfolio.closed_trades.last() {
            self.events.trade_closed(trade, portfolio.balance);
        }
    }
}

/// Validate the strategy, fetch bars and simulate.
pub fn simulate(
    config: &BacktestConfig,
    strategy: &Strategy,
    data: &dyn DataPort,
    events: &dyn EventPort,
) -> Result<BacktestReport, KumoError> {
    validate_strategy(strategy)?;
    let bars = data.fetch_bars(
        &config.symbol,
        &config.timeframe,
        config.start_date,
        config.end_date,
    )?;
    BacktestEngine::new(config, events).run(strategy, &bars)
}
