//! Stochastic oscillator.
//!
//! %K at bar i = (C[i] - LL) / (HH - LL) * 100 over the `period` bars ending at
//! i, or 50 when the window is flat. The reported %K is the mean of the last
//! `smooth_k` such values. %D is approximated as 0.9 * %K rather than an SMA of
//! the %K series; `smooth_d` does not change it.

use crate::domain::ohlcv::PriceHistory;

pub const D_DAMPING: f64 = 0.9;
const FLAT_WINDOW_K: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticValue {
    pub k: f64,
    pub d: f64,
}

pub fn calculate_stochastic(
    history: &PriceHistory,
    period: usize,
    smooth_k: usize,
    _smooth_d: usize,
) -> Option<StochasticValue> {
    let closes = history.closes();
    let highs = history.highs();
    let lows = history.lows();
    let len = closes.len();

    if period == 0 || len < period {
        return None;
    }

    // `end` is exclusive: the window for bar end-1 is [end-period, end).
    let first_end = (len + 1).saturating_sub(smooth_k).max(period);
    let k_values: Vec<f64> = (first_end..=len)
        .map(|end| {
            let start = end - period;
            let window_high = highs[start..end]
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            let window_low = lows[start..end]
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min);
            let close = closes[end - 1];

            if window_high == window_low {
                FLAT_WINDOW_K
            } else {
                (close - window_low) / (window_high - window_low) * 100.0
            }
        })
        .collect();

    if k_values.is_empty() {
        return None;
    }

    let k = k_values.iter().sum::<f64>() / k_values.len() as f64;
    Some(StochasticValue { k, d: k * D_DAMPING })
}
