//! OHLCV bar representation and the growing price history read by indicators.

use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Append-only closes with parallel highs and lows.
///
/// After the bar at index `i` has been pushed the history holds `i + 1`
/// entries. It is never truncated within a run, so indicators may read
/// arbitrarily long trailing windows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    closes: Vec<f64>,
    highs: Vec<f64>,
    lows: Vec<f64>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PriceHistory {
            closes: Vec::with_capacity(capacity),
            highs: Vec::with_capacity(capacity),
            lows: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, bar: &OhlcvBar) {
        self.closes.push(bar.close);
        self.highs.push(bar.high);
        self.lows.push(bar.low);
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn highs(&self) -> &[f64] {
        &self.highs
    }

    pub fn lows(&self) -> &[f64] {
        &self.lows
    }
}
