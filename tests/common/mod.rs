#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use kumo::domain::backtest::BacktestConfig;
use kumo::domain::error::KumoError;
use kumo::domain::indicator::{IndicatorType, PriceField};
pub use kumo::domain::ohlcv::OhlcvBar;
use kumo::domain::position::{ClosedTrade, Direction, Position};
use kumo::domain::rule::{Action, Block, Comparator, ComparisonTarget, Rule};
use kumo::domain::strategy::{
    PositionSizing, RiskPolicy, StopTarget, StopUnit, Strategy, UnrecognizedKind,
};
use kumo::ports::data_port::DataPort;
use kumo::ports::event_port::EventPort;
use std::cell::RefCell;

pub struct MockDataPort {
    pub bars: Vec<OhlcvBar>,
    pub error: Option<String>,
    pub calls: RefCell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            error: None,
            calls: RefCell::new(0),
        }
    }

    pub fn with_bars(mut self, bars: Vec<OhlcvBar>) -> Self {
        self.bars = bars;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        _symbol: &str,
        _timeframe: &str,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, KumoError> {
        *self.calls.borrow_mut() += 1;
        if let Some(reason) = &self.error {
            return Err(KumoError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }
}

/// Records every engine event as a short line.
#[derive(Default)]
pub struct RecordingEvents {
    pub events: RefCell<Vec<String>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn push(&self, line: String) {
        self.events.borrow_mut().push(line);
    }
}

impl EventPort for RecordingEvents {
    fn run_started(&self, strategy: &str, bars: usize) {
        self.push(format!("started {} {}", strategy, bars));
    }

    fn unrecognized_kind(&self, kind: &UnrecognizedKind) {
        self.push(format!("unrecognized {:?}", kind));
    }

    fn trade_opened(&self, position: &Position) {
        self.push(format!("opened {} {}", position.id, position.direction));
    }

    fn entry_rejected(&self, direction: Direction, size: f64) {
        self.push(format!("rejected {} {}", direction, size));
    }

    fn trade_closed(&self, trade: &ClosedTrade, _balance: f64) {
        self.push(format!("closed {} {}", trade.id, trade.exit_reason));
    }

    fn run_finished(&self, trades: usize, _final_balance: f64) {
        self.push(format!("finished {}", trades));
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Hourly timestamps from 2024-01-01 00:00.
pub fn hour(i: usize) -> NaiveDateTime {
    date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap() + Duration::hours(i as i64)
}

pub fn make_bar(i: usize, close: f64) -> OhlcvBar {
    OhlcvBar {
        time: hour(i),
        open: close,
        high: close,
        low: close,
        close,
        volume: 1000,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect()
}

pub fn rising_bars(count: usize, start: f64, step: f64) -> Vec<OhlcvBar> {
    (0..count).map(|i| make_bar(i, start + i as f64 * step)).collect()
}

pub fn flat_bars(count: usize, price: f64) -> Vec<OhlcvBar> {
    (0..count).map(|i| make_bar(i, price)).collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        symbol: "EURUSD".into(),
        timeframe: "1h".into(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 3, 1),
        initial_balance: 10_000.0,
        commission_pct: 0.0,
        slippage_pips: 0.0,
    }
}

pub fn indicator_rule(left: IndicatorType, comparator: Comparator, right: IndicatorType) -> Rule {
    Rule {
        indicator: left,
        comparator,
        target: ComparisonTarget::Indicator(right),
    }
}

pub fn value_rule(left: IndicatorType, comparator: Comparator, value: f64) -> Rule {
    Rule {
        indicator: left,
        comparator,
        target: ComparisonTarget::Value(value),
    }
}

pub fn close() -> IndicatorType {
    IndicatorType::Price(PriceField::Close)
}

pub fn block(name: &str, rules: Vec<Rule>, actions: Vec<Action>) -> Block {
    Block {
        name: name.into(),
        enabled: true,
        rules,
        actions,
    }
}

pub fn pips(value: f64) -> Option<StopTarget> {
    Some(StopTarget {
        enabled: true,
        unit: StopUnit::Pips,
        value,
    })
}

pub fn make_strategy(entry: Vec<Block>, exit: Vec<Block>, risk: RiskPolicy) -> Strategy {
    Strategy {
        name: "Test".into(),
        description: String::new(),
        entry_blocks: entry,
        exit_blocks: exit,
        risk,
        position_sizing: PositionSizing::FixedLots(0.1),
    }
}

/// SMA(14) crossing above SMA(50) opens a long with 50/100 pip stops.
pub fn sma_cross_strategy() -> Strategy {
    make_strategy(
        vec![block(
            "Cross up",
            vec![indicator_rule(
                IndicatorType::Sma(14),
                Comparator::CrossesAbove,
                IndicatorType::Sma(50),
            )],
            vec![Action::OpenLong],
        )],
        vec![],
        RiskPolicy {
            stop_loss: pips(50.0),
            take_profit: pips(100.0),
        },
    )
}

pub const SMA_CROSS_JSON: &str = r#"{
    "name": "SMA Crossover",
    "description": "fast over slow",
    "entryBlocks": [{
        "id": "b1",
        "type": "entry",
        "name": "Cross up",
        "enabled": true,
        "rules": [{
            "id": "r1",
            "indicator": {"indicator": "sma", "parameters": {"period": 14}},
            "condition": "crosses_above",
            "comparisonValue": {
                "type": "indicator",
                "indicatorValue": {"indicator": "sma", "parameters": {"period": 50}}
            }
        }],
        "actions": [{"id": "a1", "action": "open_long"}]
    }],
    "exitBlocks": [],
    "stopLoss": {"enabled": true, "type": "pips", "value": 50},
    "takeProfit": {"enabled": true, "type": "pips", "value": 100},
    "positionSizing": {"type": "fixed_lots", "value": 0.1}
}"#;
