//! Engine event port.
//!
//! The engine reports what it does through this trait instead of keeping its
//! own counters. Every method has a no-op default so a sink only overrides
//! the events it cares about.

use crate::domain::position::{ClosedTrade, Direction, Position};
use crate::domain::strategy::UnrecognizedKind;

pub trait EventPort {
    fn run_started(&self, _strategy: &str, _bars: usize) {}

    /// Called once per distinct unrecognized kind, before the first bar.
    fn unrecognized_kind(&self, _kind: &UnrecognizedKind) {}

    fn trade_opened(&self, _position: &Position) {}

    fn entry_rejected(&self, _direction: Direction, _size: f64) {}

    fn trade_closed(&self, _trade: &ClosedTrade, _balance: f64) {}

    fn run_finished(&self, _trades: usize, _final_balance: f64) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl EventPort for NoopEvents {}
