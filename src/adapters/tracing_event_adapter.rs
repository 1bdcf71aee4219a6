//! Forwards engine events to `tracing`.

use crate::domain::position::{ClosedTrade, Direction, Position};
use crate::domain::strategy::UnrecognizedKind;
use crate::ports::event_port::EventPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventAdapter;

impl EventPort for TracingEventAdapter {
    fn run_started(&self, strategy: &str, bars: usize) {
        tracing::info!(strategy, bars, "backtest started");
    }

    fn unrecognized_kind(&self, kind: &UnrecognizedKind) {
        match kind {
            UnrecognizedKind::Indicator(k) => {
                tracing::warn!(kind = %k, "unrecognized indicator, rules using it never fire")
            }
            UnrecognizedKind::Comparator(k) => {
                tracing::warn!(kind = %k, "unrecognized comparator, rule always false")
            }
            UnrecognizedKind::Action(k) => {
                tracing::warn!(kind = %k, "unrecognized action ignored")
            }
        }
    }

    fn trade_opened(&self, position: &Position) {
        tracing::debug!(
            id = position.id,
            direction = %position.direction,
            time = %position.entry_time,
            price = position.entry_price,
            size = position.size,
            "trade opened"
        );
    }

    fn entry_rejected(&self, direction: Direction, size: f64) {
        tracing::warn!(%direction, size, "entry skipped: position size must be positive");
    }

    fn trade_closed(&self, trade: &ClosedTrade, balance: f64) {
        tracing::debug!(
            id = trade.id,
            reason = %trade.exit_reason,
            time = %trade.exit_time,
            profit = trade.profit,
            pips = trade.pips,
            balance,
            "trade closed"
        );
    }

    fn run_finished(&self, trades: usize, final_balance: f64) {
        tracing::info!(trades, final_balance, "backtest finished");
    }
}
