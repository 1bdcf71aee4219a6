//! Account state and equity tracking for a single-position run.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::position::{ClosedTrade, ExitReason, Position};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub time: NaiveDateTime,
    pub equity: f64,
    /// Percent below the running peak balance at this point.
    pub drawdown_percent: f64,
}

/// Balance, the single open-position slot, and the run's ledgers.
///
/// The balance only moves when a trade closes.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub balance: f64,
    pub initial_balance: f64,
    pub peak_balance: f64,
    pub open: Option<Position>,
    pub closed_trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    next_trade_id: u64,
}

impl Portfolio {
    pub fn new(initial_balance: f64) -> Self {
        Portfolio {
            balance: initial_balance,
            initial_balance,
            peak_balance: initial_balance,
            open: None,
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
            next_trade_id: 1,
        }
    }

    pub fn has_position(&self) -> bool {
        self.open.is_some()
    }

    /// Id for the next opened trade; ids start at 1.
    pub fn next_trade_id(&self) -> u64 {
        self.next_trade_id
    }

    /// Occupy the open slot. Returns the position back if the slot is taken.
    pub fn open_position(&mut self, position: Position) -> Result<(), Position> {
        if self.open.is_some() {
            return Err(position);
        }
        self.next_trade_id = position.id + 1;
        self.open = Some(position);
        Ok(())
    }

    /// Close the open position, book its profit and append an equity point.
    pub fn close_position(
        &mut self,
        time: NaiveDateTime,
        price: f64,
        reason: ExitReason,
        commission_pct: f64,
    ) -> Option<&ClosedTrade> {
        let position = self.open.take()?;
        let trade = position.close(time, price, reason, commission_pct);
        self.balance += trade.profit;
        self.closed_trades.push(trade);
        self.record_equity(time);
        self.closed_trades.last()
    }

    /// Append a point at the current balance, updating the running peak.
    pub fn record_equity(&mut self, time: NaiveDateTime) {
        if self.balance > self.peak_balance {
            self.peak_balance = self.balance;
        }
        let drawdown_percent = if self.peak_balance > 0.0 {
            (self.peak_balance - self.balance) / self.peak_balance * 100.0
        } else {
            0.0
        };
        self.equity_curve.push(EquityPoint {
            time,
            equity: self.balance,
            drawdown_percent,
        });
    }
}
