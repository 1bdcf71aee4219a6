//! Strategy configuration and composition.

use crate::domain::rule::{Action, Block, Comparator};
use crate::domain::indicator::IndicatorType;

pub const DEFAULT_STOP_LOSS_VALUE: f64 = 50.0;
pub const DEFAULT_TAKE_PROFIT_VALUE: f64 = 100.0;
pub const DEFAULT_LOTS: f64 = 0.1;

/// Pips per percentage point when a stop is expressed as a percentage.
const PIPS_PER_PERCENT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopUnit {
    Pips,
    Percentage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopTarget {
    pub enabled: bool,
    pub unit: StopUnit,
    pub value: f64,
}

impl StopTarget {
    /// Distance from entry in pips, or `None` when disabled.
    pub fn distance_pips(&self) -> Option<f64> {
        if !self.enabled {
            return None;
        }
        Some(match self.unit {
            StopUnit::Pips => self.value,
            StopUnit::Percentage => self.value * PIPS_PER_PERCENT,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiskPolicy {
    pub stop_loss: Option<StopTarget>,
    pub take_profit: Option<StopTarget>,
}

/// How many lots to open.
///
/// `PercentBalance` and `RiskPercent` currently size identically; no
/// stop-distance based risk sizing is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionSizing {
    FixedLots(f64),
    PercentBalance(f64),
    RiskPercent(f64),
}

impl Default for PositionSizing {
    fn default() -> Self {
        PositionSizing::FixedLots(DEFAULT_LOTS)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: String,
    pub description: String,
    pub entry_blocks: Vec<Block>,
    pub exit_blocks: Vec<Block>,
    pub risk: RiskPolicy,
    pub position_sizing: PositionSizing,
}

impl Strategy {
    fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.entry_blocks.iter().chain(self.exit_blocks.iter())
    }

    /// Every distinct kind the engine will treat as "no effect", in
    /// declaration order.
    pub fn unrecognized_kinds(&self) -> Vec<UnrecognizedKind> {
        let mut kinds = Vec::new();
        let mut note = |kind: UnrecognizedKind| {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        };
        for block in self.blocks() {
            for indicator in block.unknown_indicators() {
                if let IndicatorType::Unknown(kind) = indicator {
                    note(UnrecognizedKind::Indicator(kind.clone()));
                }
            }
            for rule in &block.rules {
                if let Comparator::Unknown(kind) = &rule.comparator {
                    note(UnrecognizedKind::Comparator(kind.clone()));
                }
            }
        }
        for block in &self.entry_blocks {
            for action in &block.actions {
                if let Action::Unrecognized(kind) = action {
                    note(UnrecognizedKind::Action(kind.clone()));
                }
            }
        }
        kinds
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnrecognizedKind {
    Indicator(String),
    Comparator(String),
    Action(String),
}
