//! Strategy document parser.
//!
//! Reads the designer's JSON document into the closed domain types.
//! Numeric values may be written as a number, a numeric string, or a
//! `{"type": "variable", "variableId": ..}` reference into the document's
//! `variables` list; references are resolved here, so the engine only ever
//! sees plain numbers.
//!
//! Unknown indicator, comparator and action kinds are kept as explicit
//! unknown variants rather than rejected.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::error::KumoError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::{DEFAULT_PERIOD, IndicatorType, PriceField};
use crate::domain::rule::{Action, Block, Comparator, ComparisonTarget, Rule};
use crate::domain::strategy::{
    DEFAULT_LOTS, DEFAULT_STOP_LOSS_VALUE, DEFAULT_TAKE_PROFIT_VALUE, PositionSizing, RiskPolicy,
    StopTarget, StopUnit, Strategy,
};

const DEFAULT_SMOOTHING: usize = 3;
/// Largest accepted indicator period.
const MAX_PERIOD: usize = u32::MAX as usize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StrategyDoc {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    entry_blocks: Vec<BlockDoc>,
    #[serde(default)]
    exit_blocks: Vec<BlockDoc>,
    #[serde(default)]
    stop_loss: Option<StopDoc>,
    #[serde(default)]
    take_profit: Option<StopDoc>,
    #[serde(default)]
    position_sizing: Option<SizingDoc>,
    #[serde(default)]
    variables: Vec<VariableDoc>,
}

#[derive(Debug, Deserialize)]
struct VariableDoc {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    value: f64,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct BlockDoc {
    #[serde(default)]
    name: String,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    #[serde(default)]
    rules: Vec<RuleDoc>,
    #[serde(default)]
    actions: Vec<ActionDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleDoc {
    indicator: IndicatorDoc,
    condition: String,
    comparison_value: ComparisonDoc,
}

#[derive(Debug, Deserialize)]
struct IndicatorDoc {
    indicator: String,
    #[serde(default)]
    parameters: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonDoc {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    numeric_value: Option<Value>,
    #[serde(default)]
    variable_reference: Option<Value>,
    #[serde(default)]
    indicator_value: Option<IndicatorDoc>,
}

#[derive(Debug, Deserialize)]
struct ActionDoc {
    #[serde(alias = "type")]
    action: String,
}

#[derive(Debug, Deserialize)]
struct StopDoc {
    #[serde(default)]
    enabled: bool,
    #[serde(rename = "type", alias = "unit", default)]
    unit: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SizingDoc {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

/// Parse a strategy document.
///
/// Fails with `StrategyParse` on malformed JSON and `StrategyInvalid` on a
/// well-formed document whose values cannot be resolved.
pub fn parse(document: &str) -> Result<Strategy, KumoError> {
    let doc: StrategyDoc = serde_json::from_str(document)?;
    let resolver = Resolver {
        variables: &doc.variables,
    };

    Ok(Strategy {
        name: doc.name.clone(),
        description: doc.description.clone().unwrap_or_default(),
        entry_blocks: resolver.blocks(&doc.entry_blocks)?,
        exit_blocks: resolver.blocks(&doc.exit_blocks)?,
        risk: RiskPolicy {
            stop_loss: resolver.stop(doc.stop_loss.as_ref(), DEFAULT_STOP_LOSS_VALUE)?,
            take_profit: resolver.stop(doc.take_profit.as_ref(), DEFAULT_TAKE_PROFIT_VALUE)?,
        },
        position_sizing: resolver.sizing(doc.position_sizing.as_ref())?,
    })
}

struct Resolver<'a> {
    variables: &'a [VariableDoc],
}

impl Resolver<'_> {
    fn variable(&self, reference: &serde_json::Map<String, Value>) -> Result<f64, KumoError> {
        let id = reference.get("variableId").and_then(Value::as_str);
        let name = reference.get("variableName").and_then(Value::as_str);
        if id.is_none() && name.is_none() {
            return Err(KumoError::strategy_invalid(
                "variable reference has neither variableId nor variableName",
            ));
        }

        self.variables
            .iter()
            .find(|v| id.is_some_and(|id| v.id == id))
            .or_else(|| {
                self.variables
                    .iter()
                    .find(|v| name.is_some_and(|name| v.name == name))
            })
            .map(|v| v.value)
            .ok_or_else(|| {
                KumoError::strategy_invalid(format!(
                    "unknown variable {}",
                    id.or(name).unwrap_or_default()
                ))
            })
    }

    fn number(&self, value: &Value, what: &str) -> Result<f64, KumoError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| KumoError::strategy_invalid(format!("{what}: {n} is not a number"))),
            Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
                KumoError::strategy_invalid(format!("{what}: '{s}' is not a number"))
            }),
            Value::Object(reference) => self.variable(reference),
            other => Err(KumoError::strategy_invalid(format!(
                "{what}: expected a number, got {other}"
            ))),
        }
    }

    fn period(
        &self,
        params: &BTreeMap<String, Value>,
        keys: &[&str],
        default: usize,
    ) -> Result<usize, KumoError> {
        let Some((key, raw)) = keys
            .iter()
            .find_map(|&key| params.get(key).map(|raw| (key, raw)))
        else {
            return Ok(default);
        };

        let value = self.number(raw, key)?;
        if value >= 1.0 && value.fract() == 0.0 && value <= MAX_PERIOD as f64 {
            Ok(value as usize)
        } else {
            Err(KumoError::strategy_invalid(format!(
                "{key} must be a positive integer up to {MAX_PERIOD}, got {value}"
            )))
        }
    }

    fn indicator(&self, doc: &IndicatorDoc) -> Result<IndicatorType, KumoError> {
        let params = &doc.parameters;
        let indicator = match doc.indicator.trim().to_lowercase().as_str() {
            "close" => IndicatorType::Price(PriceField::Close),
            "open" => IndicatorType::Price(PriceField::Open),
            "high" => IndicatorType::Price(PriceField::High),
            "low" => IndicatorType::Price(PriceField::Low),
            "sma" | "ma" => IndicatorType::Sma(self.period(params, &["period"], DEFAULT_PERIOD)?),
            "ema" => IndicatorType::Ema(self.period(params, &["period"], DEFAULT_PERIOD)?),
            "rsi" => IndicatorType::Rsi(self.period(params, &["period"], DEFAULT_PERIOD)?),
            "macd" => IndicatorType::Macd {
                fast: self.period(params, &["fast_period"], DEFAULT_FAST)?,
                slow: self.period(params, &["slow_period"], DEFAULT_SLOW)?,
                signal: self.period(params, &["signal_period"], DEFAULT_SIGNAL)?,
            },
            "stochastic" => IndicatorType::Stochastic {
                period: self.period(params, &["k_period", "period"], DEFAULT_PERIOD)?,
                smooth_k: self.period(params, &["slowing"], DEFAULT_SMOOTHING)?,
                smooth_d: self.period(params, &["d_period"], DEFAULT_SMOOTHING)?,
            },
            _ => IndicatorType::Unknown(doc.indicator.clone()),
        };
        Ok(indicator)
    }

    fn target(&self, doc: &ComparisonDoc) -> Result<ComparisonTarget, KumoError> {
        let missing =
            |field: &str| KumoError::strategy_invalid(format!("{} comparison without {field}", doc.kind));

        match doc.kind.trim().to_lowercase().as_str() {
            "number" => {
                let raw = doc.numeric_value.as_ref().ok_or_else(|| missing("numericValue"))?;
                Ok(ComparisonTarget::Value(self.number(raw, "numericValue")?))
            }
            "indicator" => {
                let ind = doc.indicator_value.as_ref().ok_or_else(|| missing("indicatorValue"))?;
                Ok(ComparisonTarget::Indicator(self.indicator(ind)?))
            }
            "variable" => {
                let raw = doc
                    .variable_reference
                    .as_ref()
                    .ok_or_else(|| missing("variableReference"))?;
                Ok(ComparisonTarget::Value(self.number(raw, "variableReference")?))
            }
            other => Err(KumoError::strategy_invalid(format!(
                "unknown comparison type '{other}'"
            ))),
        }
    }

    fn rule(&self, doc: &RuleDoc) -> Result<Rule, KumoError> {
        Ok(Rule {
            indicator: self.indicator(&doc.indicator)?,
            comparator: Comparator::from_kind(&doc.condition),
            target: self.target(&doc.comparison_value)?,
        })
    }

    fn blocks(&self, docs: &[BlockDoc]) -> Result<Vec<Block>, KumoError> {
        docs.iter()
            .map(|doc| {
                Ok(Block {
                    name: doc.name.clone(),
                    enabled: doc.enabled,
                    rules: doc
                        .rules
                        .iter()
                        .map(|r| self.rule(r))
                        .collect::<Result<_, _>>()?,
                    actions: doc
                        .actions
                        .iter()
                        .map(|a| Action::from_kind(&a.action))
                        .collect(),
                })
            })
            .collect()
    }

    fn stop(&self, doc: Option<&StopDoc>, default_value: f64) -> Result<Option<StopTarget>, KumoError> {
        let Some(doc) = doc else {
            return Ok(None);
        };
        let unit = match doc.unit.as_deref().map(str::trim) {
            Some(u) if u.eq_ignore_ascii_case("pips") => StopUnit::Pips,
            _ => StopUnit::Percentage,
        };
        let value = match &doc.value {
            Some(raw) => self.number(raw, "stop value")?,
            None => default_value,
        };
        Ok(Some(StopTarget {
            enabled: doc.enabled,
            unit,
            value,
        }))
    }

    fn sizing(&self, doc: Option<&SizingDoc>) -> Result<PositionSizing, KumoError> {
        let Some(doc) = doc else {
            return Ok(PositionSizing::default());
        };
        let value = match &doc.value {
            Some(raw) => self.number(raw, "positionSizing.value")?,
            None => DEFAULT_LOTS,
        };
        let kind = doc.kind.as_deref().unwrap_or("fixed_lots");
        Ok(match kind.trim().to_lowercase().as_str() {
            "fixed_lots" => PositionSizing::FixedLots(value),
            "percent_balance" => PositionSizing::PercentBalance(value),
            "risk_percent" => PositionSizing::RiskPercent(value),
            _ => PositionSizing::default(),
        })
    }
}
