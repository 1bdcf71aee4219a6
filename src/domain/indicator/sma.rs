//! Simple Moving Average.
//!
//! Mean of the last `period` closes.

pub fn calculate_sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_of_trailing_window() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(calculate_sma(&closes, 3), Some(4.0));
        assert_eq!(calculate_sma(&closes, 5), Some(3.0));
    }

    #[test]
    fn sma_unavailable_when_history_short() {
        assert_eq!(calculate_sma(&[1.0, 2.0], 3), None);
        assert_eq!(calculate_sma(&[], 1), None);
    }

    #[test]
    fn sma_period_0() {
        assert_eq!(calculate_sma(&[1.0, 2.0], 0), None);
    }

    #[test]
    fn sma_period_1_is_last_close() {
        assert_eq!(calculate_sma(&[1.0, 2.0, 7.5], 1), Some(7.5));
    }
}
