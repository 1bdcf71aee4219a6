//! Technical indicator evaluation over a growing price history.
//!
//! This module provides:
//! - `IndicatorType`: closed enum for indicator identity + parameters
//! - `PriceField`: raw bar fields usable as operands
//! - `IndicatorType::value`: dispatch to the stateless evaluators
//!
//! Every evaluator returns `None` ("unavailable") when the history is too short
//! or the parameters are degenerate. Callers treat `None` as evaluation-false,
//! never as zero.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdValue};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stochastic::{calculate_stochastic, StochasticValue};

use crate::domain::ohlcv::{OhlcvBar, PriceHistory};
use std::fmt;

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Price(PriceField),
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Stochastic {
        period: usize,
        smooth_k: usize,
        smooth_d: usize,
    },
    /// A kind the engine does not know. Always unavailable.
    Unknown(String),
}

impl IndicatorType {
    /// Evaluate the indicator at the current bar.
    ///
    /// `history` must already contain `bar`. MACD yields its main line and
    /// Stochastic yields %K.
    pub fn value(&self, history: &PriceHistory, bar: &OhlcvBar) -> Option<f64> {
        match self {
            IndicatorType::Price(PriceField::Open) => Some(bar.open),
            IndicatorType::Price(PriceField::High) => Some(bar.high),
            IndicatorType::Price(PriceField::Low) => Some(bar.low),
            IndicatorType::Price(PriceField::Close) => Some(bar.close),
            IndicatorType::Sma(period) => calculate_sma(history.closes(), *period),
            IndicatorType::Ema(period) => calculate_ema(history.closes(), *period),
            IndicatorType::Rsi(period) => calculate_rsi(history.closes(), *period),
            IndicatorType::Macd { fast, slow, signal } => {
                calculate_macd(history.closes(), *fast, *slow, *signal).map(|m| m.line)
            }
            IndicatorType::Stochastic {
                period,
                smooth_k,
                smooth_d,
            } => calculate_stochastic(history, *period, *smooth_k, *smooth_d).map(|s| s.k),
            IndicatorType::Unknown(_) => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, IndicatorType::Unknown(_))
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Price(PriceField::Open) => write!(f, "OPEN"),
            IndicatorType::Price(PriceField::High) => write!(f, "HIGH"),
            IndicatorType::Price(PriceField::Low) => write!(f, "LOW"),
            IndicatorType::Price(PriceField::Close) => write!(f, "CLOSE"),
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Stochastic {
                period,
                smooth_k,
                smooth_d,
            } => write!(f, "STOCHASTIC({},{},{})", period, smooth_k, smooth_d),
            IndicatorType::Unknown(kind) => write!(f, "UNKNOWN({})", kind),
        }
    }
}
