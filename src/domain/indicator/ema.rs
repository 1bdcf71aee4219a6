//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA = (C - EMA) * k + EMA over the rest of the history.
//!
//! The whole history is re-walked on every call, so the value at a bar is
//! path-dependent from the first bar of the run.

pub fn calculate_ema(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = closes[..period].iter().sum::<f64>() / period as f64;

    for &close in &closes[period..] {
        ema = (close - ema) * k + ema;
    }

    Some(ema)
}
