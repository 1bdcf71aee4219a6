//! Trade lifecycle: an open `Position` is consumed by `close` into a `ClosedTrade`.
//!
//! The transition is one-way and sets every exit field at once.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Smallest quoted price increment for the supported pairs.
pub const PIP_SIZE: f64 = 0.0001;
/// Base-currency units in one standard lot.
pub const LOT_UNITS: f64 = 100_000.0;

pub const ENTRY_REASON_SIGNAL: &str = "Entry Signal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExitReason {
    #[serde(rename = "stop_loss")]
    StopLoss,
    #[serde(rename = "take_profit")]
    TakeProfit,
    #[serde(rename = "exit_signal")]
    ExitSignal,
    #[serde(rename = "Backtest End")]
    BacktestEnd,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop_loss"),
            ExitReason::TakeProfit => write!(f, "take_profit"),
            ExitReason::ExitSignal => write!(f, "exit_signal"),
            ExitReason::BacktestEnd => write!(f, "Backtest End"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub id: u64,
    pub direction: Direction,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub size: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub entry_reason: String,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.direction == Direction::Long
    }

    pub fn is_short(&self) -> bool {
        self.direction == Direction::Short
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        match self.stop_loss {
            None => false,
            Some(level) if self.is_long() => price <= level,
            Some(level) => price >= level,
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        match self.take_profit {
            None => false,
            Some(level) if self.is_long() => price >= level,
            Some(level) => price <= level,
        }
    }

    /// Close the position, realizing profit net of commission.
    ///
    /// `commission_pct` is charged on the absolute gross profit.
    pub fn close(
        self,
        exit_time: NaiveDateTime,
        exit_price: f64,
        exit_reason: ExitReason,
        commission_pct: f64,
    ) -> ClosedTrade {
        let delta = (exit_price - self.entry_price) * self.direction.sign();
        let pips = delta / PIP_SIZE;
        let gross = delta * self.size * LOT_UNITS;

        let notional = self.entry_price * self.size * LOT_UNITS;
        let profit_percent = if notional != 0.0 {
            gross / notional * 100.0
        } else {
            0.0
        };

        let commission = gross.abs() * commission_pct / 100.0;

        ClosedTrade {
            id: self.id,
            direction: self.direction,
            entry_time: self.entry_time,
            entry_price: self.entry_price,
            size: self.size,
            exit_time,
            exit_price,
            profit: gross - commission,
            profit_percent,
            pips,
            commission,
            duration_seconds: (exit_time - self.entry_time).num_seconds(),
            entry_reason: self.entry_reason,
            exit_reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedTrade {
    pub id: u64,
    pub direction: Direction,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub size: f64,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    /// Realized profit after commission.
    pub profit: f64,
    /// Gross profit relative to the position notional.
    pub profit_percent: f64,
    pub pips: f64,
    #[serde(skip)]
    pub commission: f64,
    pub duration_seconds: i64,
    pub entry_reason: String,
    pub exit_reason: ExitReason,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample_long_position() -> Position {
        Position {
            id: 1,
            direction: Direction::Long,
            entry_time: at(0),
            entry_price: 1.1000,
            size: 1.0,
            stop_loss: Some(1.0950),
            take_profit: Some(1.1100),
            entry_reason: ENTRY_REASON_SIGNAL.into(),
        }
    }

    fn sample_short_position() -> Position {
        Position {
            id: 2,
            direction: Direction::Short,
            entry_time: at(0),
            entry_price: 1.1000,
            size: 0.5,
            stop_loss: Some(1.1050),
            take_profit: Some(1.0900),
            entry_reason: ENTRY_REASON_SIGNAL.into(),
        }
    }

    #[test]
    fn is_long_and_short() {
        assert!(sample_long_position().is_long());
        assert!(!sample_long_position().is_short());
        assert!(sample_short_position().is_short());
    }

    #[test]
    fn stop_loss_long_triggered() {
        let pos = sample_long_position();
        assert!(pos.should_stop_loss(1.0940));
        assert!(pos.should_stop_loss(1.0950));
        assert!(!pos.should_stop_loss(1.0960));
    }

    #[test]
    fn stop_loss_short_triggered() {
        let pos = sample_short_position();
        assert!(pos.should_stop_loss(1.1060));
        assert!(pos.should_stop_loss(1.1050));
        assert!(!pos.should_stop_loss(1.1040));
    }

    #[test]
    fn stop_loss_disabled() {
        let mut pos = sample_long_position();
        pos.stop_loss = None;
        assert!(!pos.should_stop_loss(0.0));
    }

    #[test]
    fn take_profit_long_triggered() {
        let pos = sample_long_position();
        assert!(pos.should_take_profit(1.1110));
        assert!(pos.should_take_profit(1.1100));
        assert!(!pos.should_take_profit(1.1090));
    }

    #[test]
    fn take_profit_short_triggered() {
        let pos = sample_short_position();
        assert!(pos.should_take_profit(1.0890));
        assert!(pos.should_take_profit(1.0900));
        assert!(!pos.should_take_profit(1.0910));
    }

    #[test]
    fn take_profit_disabled() {
        let mut pos = sample_short_position();
        pos.take_profit = None;
        assert!(!pos.should_take_profit(0.0));
    }

    #[test]
    fn close_long_profit() {
        let trade = sample_long_position().close(at(5), 1.1050, ExitReason::ExitSignal, 0.0);
        assert!((trade.pips - 50.0).abs() < 1e-6);
        assert!((trade.profit - 500.0).abs() < 1e-6);
        assert_eq!(trade.duration_seconds, 5 * 3600);
        assert_eq!(trade.exit_reason, ExitReason::ExitSignal);
        assert_eq!(trade.exit_time, at(5));
    }

    #[test]
    fn close_short_profit() {
        let trade = sample_short_position().close(at(2), 1.0980, ExitReason::TakeProfit, 0.0);
        assert!((trade.pips - 20.0).abs() < 1e-6);
        assert!((trade.profit - 100.0).abs() < 1e-6);
    }

    #[test]
    fn close_short_loss() {
        let trade = sample_short_position().close(at(2), 1.1020, ExitReason::StopLoss, 0.0);
        assert!((trade.pips + 20.0).abs() < 1e-6);
        assert!((trade.profit + 100.0).abs() < 1e-6);
    }

    #[test]
    fn commission_charged_on_absolute_gross() {
        let win = sample_long_position().close(at(1), 1.1050, ExitReason::ExitSignal, 2.0);
        assert!((win.commission - 10.0).abs() < 1e-6);
        assert!((win.profit - 490.0).abs() < 1e-6);

        let loss = sample_long_position().close(at(1), 1.0950, ExitReason::StopLoss, 2.0);
        assert!((loss.commission - 10.0).abs() < 1e-6);
        assert!((loss.profit + 510.0).abs() < 1e-6);
    }

    #[test]
    fn profit_percent_uses_gross_notional() {
        let trade = sample_long_position().close(at(1), 1.1110, ExitReason::TakeProfit, 5.0);
        // gross 1100 on a notional of 110,000
        assert!((trade.profit_percent - 1.0).abs() < 1e-9);
    }

    #[test]
    fn closed_trade_serializes_report_fields() {
        let trade = sample_long_position().close(at(3), 1.1100, ExitReason::BacktestEnd, 0.0);
        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["direction"], "long");
        assert_eq!(json["entryTime"], "2024-01-15T00:00:00");
        assert_eq!(json["exitTime"], "2024-01-15T03:00:00");
        assert_eq!(json["durationSeconds"], 10800);
        assert_eq!(json["exitReason"], "Backtest End");
        assert_eq!(json["entryReason"], "Entry Signal");
        assert!(json.get("commission").is_none());
    }
}
