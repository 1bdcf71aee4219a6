//! Rule-block data structures.
//!
//! - `Comparator`: the fixed comparator set, plus an explicit unknown variant
//! - `ComparisonTarget`: literal or nested indicator on the right-hand side
//! - `Rule`: one indicator-vs-target condition
//! - `Action`: what a firing block asks for
//! - `Block`: AND-combined rules with their actions

use crate::domain::indicator::IndicatorType;
use crate::domain::position::Direction;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Comparator {
    GreaterThan,
    LessThan,
    Equal,
    GreaterEqual,
    LessEqual,
    /// Evaluated as `>` on the current bar; no prior-bar confirmation.
    CrossesAbove,
    /// Evaluated as `<` on the current bar; no prior-bar confirmation.
    CrossesBelow,
    Unknown(String),
}

impl Comparator {
    pub fn from_kind(kind: &str) -> Self {
        match kind.trim().to_lowercase().as_str() {
            "greater_than" | ">" => Comparator::GreaterThan,
            "less_than" | "<" => Comparator::LessThan,
            "equal" | "equal_to" | "==" => Comparator::Equal,
            "greater_equal" | "greater_or_equal" | ">=" => Comparator::GreaterEqual,
            "less_equal" | "less_or_equal" | "<=" => Comparator::LessEqual,
            "crosses_above" => Comparator::CrossesAbove,
            "crosses_below" => Comparator::CrossesBelow,
            _ => Comparator::Unknown(kind.to_string()),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::GreaterThan => write!(f, ">"),
            Comparator::LessThan => write!(f, "<"),
            Comparator::Equal => write!(f, "=="),
            Comparator::GreaterEqual => write!(f, ">="),
            Comparator::LessEqual => write!(f, "<="),
            Comparator::CrossesAbove => write!(f, "CROSSES_ABOVE"),
            Comparator::CrossesBelow => write!(f, "CROSSES_BELOW"),
            Comparator::Unknown(kind) => write!(f, "UNKNOWN({})", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonTarget {
    Value(f64),
    Indicator(IndicatorType),
}

impl fmt::Display for ComparisonTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonTarget::Value(v) => write!(f, "{}", v),
            ComparisonTarget::Indicator(ind) => write!(f, "{}", ind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub indicator: IndicatorType,
    pub comparator: Comparator,
    pub target: ComparisonTarget,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.indicator, self.comparator, self.target)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    OpenLong,
    OpenShort,
    ClosePosition,
    Unrecognized(String),
}

impl Action {
    pub fn from_kind(kind: &str) -> Self {
        match kind.trim().to_lowercase().as_str() {
            "open_long" | "buy_market" => Action::OpenLong,
            "open_short" | "sell_market" => Action::OpenShort,
            "close_position" | "close_buy" | "close_sell" => Action::ClosePosition,
            _ => Action::Unrecognized(kind.to_string()),
        }
    }

    /// Entry direction requested by this action, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Action::OpenLong => Some(Direction::Long),
            Action::OpenShort => Some(Direction::Short),
            Action::ClosePosition | Action::Unrecognized(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    pub enabled: bool,
    pub rules: Vec<Rule>,
    pub actions: Vec<Action>,
}

impl Block {
    /// Indicator kinds referenced anywhere in this block that the engine does not know.
    pub fn unknown_indicators(&self) -> impl Iterator<Item = &IndicatorType> {
        self.rules.iter().flat_map(|rule| {
            let target = match &rule.target {
                ComparisonTarget::Indicator(ind) => Some(ind),
                ComparisonTarget::Value(_) => None,
            };
            std::iter::once(&rule.indicator)
                .chain(target)
                .filter(|ind| ind.is_unknown())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparator_spellings() {
        assert_eq!(Comparator::from_kind("greater_than"), Comparator::GreaterThan);
        assert_eq!(Comparator::from_kind(">"), Comparator::GreaterThan);
        assert_eq!(Comparator::from_kind("less_than"), Comparator::LessThan);
        assert_eq!(Comparator::from_kind("equal"), Comparator::Equal);
        assert_eq!(Comparator::from_kind("equal_to"), Comparator::Equal);
        assert_eq!(Comparator::from_kind("greater_or_equal"), Comparator::GreaterEqual);
        assert_eq!(Comparator::from_kind("greater_equal"), Comparator::GreaterEqual);
        assert_eq!(Comparator::from_kind("less_or_equal"), Comparator::LessEqual);
        assert_eq!(Comparator::from_kind("<="), Comparator::LessEqual);
        assert_eq!(Comparator::from_kind("CROSSES_ABOVE"), Comparator::CrossesAbove);
        assert_eq!(Comparator::from_kind("crosses_below"), Comparator::CrossesBelow);
    }

    #[test]
    fn unknown_comparator_keeps_kind() {
        assert_eq!(
            Comparator::from_kind("between"),
            Comparator::Unknown("between".into())
        );
    }

    #[test]
    fn action_directions() {
        assert_eq!(Action::from_kind("open_long").direction(), Some(Direction::Long));
        assert_eq!(Action::from_kind("buy_market").direction(), Some(Direction::Long));
        assert_eq!(Action::from_kind("open_short").direction(), Some(Direction::Short));
        assert_eq!(Action::from_kind("sell_market").direction(), Some(Direction::Short));
        assert_eq!(Action::from_kind("close_position"), Action::ClosePosition);
        assert_eq!(Action::ClosePosition.direction(), None);
    }

    #[test]
    fn limit_orders_are_unrecognized() {
        let action = Action::from_kind("buy_limit");
        assert_eq!(action, Action::Unrecognized("buy_limit".into()));
        assert_eq!(action.direction(), None);
    }

    #[test]
    fn rule_display() {
        let rule = Rule {
            indicator: IndicatorType::Sma(14),
            comparator: Comparator::CrossesAbove,
            target: ComparisonTarget::Indicator(IndicatorType::Sma(50)),
        };
        assert_eq!(rule.to_string(), "SMA(14) CROSSES_ABOVE SMA(50)");

        let rule = Rule {
            indicator: IndicatorType::Rsi(14),
            comparator: Comparator::LessThan,
            target: ComparisonTarget::Value(30.0),
        };
        assert_eq!(rule.to_string(), "RSI(14) < 30");
    }

    #[test]
    fn block_reports_unknown_indicators_on_both_sides() {
        let block = Block {
            name: "entry".into(),
            enabled: true,
            rules: vec![
                Rule {
                    indicator: IndicatorType::Unknown("adx".into()),
                    comparator: Comparator::GreaterThan,
                    target: ComparisonTarget::Value(25.0),
                },
                Rule {
                    indicator: IndicatorType::Sma(10),
                    comparator: Comparator::GreaterThan,
                    target: ComparisonTarget::Indicator(IndicatorType::Unknown("vwap".into())),
                },
            ],
            actions: vec![Action::OpenLong],
        };
        let unknown: Vec<String> = block.unknown_indicators().map(|i| i.to_string()).collect();
        assert_eq!(unknown, vec!["UNKNOWN(adx)", "UNKNOWN(vwap)"]);
    }
}
