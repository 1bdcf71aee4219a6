//! Rule and block evaluation.
//!
//! # Evaluation Semantics
//!
//! - A rule with an unavailable operand on either side is `false`
//! - `==` compares within `EQUALITY_EPSILON`
//! - `CROSSES_ABOVE`/`CROSSES_BELOW` are plain `>`/`<` on the current bar
//! - Rules within a block are AND-ed; blocks are OR-ed
//! - Disabled blocks and blocks without rules never fire

use crate::domain::ohlcv::{OhlcvBar, PriceHistory};
use crate::domain::position::Direction;
use crate::domain::rule::{Block, Comparator, ComparisonTarget, Rule};

pub const EQUALITY_EPSILON: f64 = 1e-4;

fn resolve_target(target: &ComparisonTarget, history: &PriceHistory, bar: &OhlcvBar) -> Option<f64> {
    match target {
        ComparisonTarget::Value(v) => Some(*v),
        ComparisonTarget::Indicator(ind) => ind.value(history, bar),
    }
}

pub fn evaluate_rule(rule: &Rule, history: &PriceHistory, bar: &OhlcvBar) -> bool {
    let Some(left) = rule.indicator.value(history, bar) else {
        return false;
    };
    let Some(right) = resolve_target(&rule.target, history, bar) else {
        return false;
    };

    match rule.comparator {
        Comparator::GreaterThan | Comparator::CrossesAbove => left > right,
        Comparator::LessThan | Comparator::CrossesBelow => left < right,
        Comparator::Equal => (left - right).abs() < EQUALITY_EPSILON,
        Comparator::GreaterEqual => left >= right,
        Comparator::LessEqual => left <= right,
        Comparator::Unknown(_) => false,
    }
}

/// True when the block is enabled, has rules, and every rule holds.
pub fn block_fires(block: &Block, history: &PriceHistory, bar: &OhlcvBar) -> bool {
    block.enabled
        && !block.rules.is_empty()
        && block.rules.iter().all(|rule| evaluate_rule(rule, history, bar))
}

/// Direction of the first firing block that names one.
///
/// A firing block whose actions carry no direction does not stop the scan.
pub fn entry_signal(blocks: &[Block], history: &PriceHistory, bar: &OhlcvBar) -> Option<Direction> {
    blocks
        .iter()
        .filter(|block| block_fires(block, history, bar))
        .find_map(|block| block.actions.iter().find_map(|action| action.direction()))
}

pub fn exit_signal(blocks: &[Block], history: &PriceHistory, bar: &OhlcvBar) -> bool {
    blocks.iter().any(|block| block_fires(block, history, bar))
}
