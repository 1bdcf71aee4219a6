//! Trade execution and fill simulation.
//!
//! Implements entry sizing, slippage, stop-loss/take-profit level placement
//! and the per-bar risk-exit check.

use chrono::NaiveDateTime;

use super::position::{Direction, ENTRY_REASON_SIGNAL, ExitReason, LOT_UNITS, PIP_SIZE, Position};
use super::strategy::{PositionSizing, RiskPolicy, StopTarget};

/// Per-run execution parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionConfig {
    /// Charged as a percentage of absolute gross profit on every close.
    pub commission_pct: f64,
    /// Adverse entry offset in pips.
    pub slippage_pips: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission_pct: 0.0,
            slippage_pips: 0.0,
        }
    }
}

/// Lot size for a new position at the given balance.
///
/// `PercentBalance` and `RiskPercent` share one formula:
/// balance * value / 100 / 100,000.
pub fn position_size(sizing: &PositionSizing, balance: f64) -> f64 {
    match *sizing {
        PositionSizing::FixedLots(lots) => lots,
        PositionSizing::PercentBalance(pct) | PositionSizing::RiskPercent(pct) => {
            balance * pct / 100.0 / LOT_UNITS
        }
    }
}

/// Long entries fill above the market, short entries below.
pub fn apply_slippage_entry(market_price: f64, direction: Direction, slippage_pips: f64) -> f64 {
    market_price + direction.sign() * slippage_pips * PIP_SIZE
}

fn level(entry_price: f64, offset_sign: f64, target: Option<&StopTarget>) -> Option<f64> {
    let pips = target?.distance_pips()?;
    Some(entry_price + offset_sign * pips * PIP_SIZE)
}

/// Stop-loss price: below entry for longs, above for shorts.
pub fn stop_loss_level(entry_price: f64, direction: Direction, risk: &RiskPolicy) -> Option<f64> {
    level(entry_price, -direction.sign(), risk.stop_loss.as_ref())
}

/// Take-profit price: above entry for longs, below for shorts.
pub fn take_profit_level(entry_price: f64, direction: Direction, risk: &RiskPolicy) -> Option<f64> {
    level(entry_price, direction.sign(), risk.take_profit.as_ref())
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered(Position),
    /// Sizing produced a zero, negative or non-finite lot count.
    InvalidSize(f64),
}

/// Build a position for an entry signal on a bar closing at `market_price`.
///
/// Steps:
/// 1. Size from the sizing policy and current balance
/// 2. Reject non-positive or non-finite sizes
/// 3. Apply adverse slippage to the fill
/// 4. Place stop-loss/take-profit levels around the filled price
#[allow(clippy::too_many_arguments)]
pub fn enter_position(
    id: u64,
    direction: Direction,
    time: NaiveDateTime,
    market_price: f64,
    balance: f64,
    sizing: &PositionSizing,
    risk: &RiskPolicy,
    config: &ExecutionConfig,
) -> EntryResult {
    let size = position_size(sizing, balance);
    if !size.is_finite() || size <= 0.0 {
        return EntryResult::InvalidSize(size);
    }

    let entry_price = apply_slippage_entry(market_price, direction, config.slippage_pips);

    EntryResult::Entered(Position {
        id,
        direction,
        entry_time: time,
        entry_price,
        size,
        stop_loss: stop_loss_level(entry_price, direction, risk),
        take_profit: take_profit_level(entry_price, direction, risk),
        entry_reason: ENTRY_REASON_SIGNAL.to_string(),
    })
}

/// Stop-loss takes priority over take-profit when both are breached.
pub fn check_risk_exit(position: &Position, price: f64) -> Option<ExitReason> {
    if position.should_stop_loss(price) {
        Some(ExitReason::StopLoss)
    } else if position.should_take_profit(price) {
        Some(ExitReason::TakeProfit)
    } else {
        None
    }
}
