//! Run outputs: the engine's report and the response envelope written out.

use chrono::NaiveDate;
use serde::Serialize;

use super::metrics::Metrics;
use super::portfolio::EquityPoint;
use super::position::ClosedTrade;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestReport {
    pub metrics: Metrics,
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResponse {
    pub success: bool,
    pub strategy_name: String,
    pub symbol: String,
    pub timeframe: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub metrics: Metrics,
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run identity shared by successful and failed responses.
#[derive(Debug, Clone, PartialEq)]
pub struct RunIdentity {
    pub strategy_name: String,
    pub symbol: String,
    pub timeframe: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl BacktestResponse {
    pub fn succeeded(identity: RunIdentity, report: BacktestReport) -> Self {
        BacktestResponse {
            success: true,
            strategy_name: identity.strategy_name,
            symbol: identity.symbol,
            timeframe: identity.timeframe,
            start_date: identity.start_date,
            end_date: identity.end_date,
            metrics: report.metrics,
            trades: report.trades,
            equity_curve: report.equity_curve,
            error: None,
        }
    }

    /// Zeroed metrics, no trades and an empty equity curve.
    pub fn failed(identity: RunIdentity, initial_balance: f64, error: impl Into<String>) -> Self {
        BacktestResponse {
            success: false,
            strategy_name: identity.strategy_name,
            symbol: identity.symbol,
            timeframe: identity.timeframe,
            start_date: identity.start_date,
            end_date: identity.end_date,
            metrics: Metrics::empty(initial_balance),
            trades: Vec::new(),
            equity_curve: Vec::new(),
            error: Some(error.into()),
        }
    }
}
