//! Domain layer: simulation logic with no I/O.

pub mod ohlcv;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod indicator;
pub mod rule;
pub mod strategy_parser;
pub mod rule_eval;
pub mod backtest;
pub mod metrics;
pub mod report;
pub mod strategy;
pub mod config_validation;
pub mod error;
