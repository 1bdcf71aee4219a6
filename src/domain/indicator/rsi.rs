//! Relative Strength Index.
//!
//! Simple averages of gains and losses over the last `period` close-to-close
//! deltas. RSI = 100 - 100 / (1 + avg_gain / avg_loss); a zero average loss
//! yields 100. Needs `period + 1` closes.

pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<f64> {
    let needed = period.checked_add(1)?;
    if period == 0 || closes.len() < needed {
        return None;
    }

    let window = &closes[closes.len() - needed..];
    let (gains, losses) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(g, l), change| {
            if change > 0.0 {
                (g + change, l)
            } else {
                (g, l - change)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
