//! Deterministic synthetic bar source.
//!
//! Produces a repeating 200-bar cycle: 100 bars trending up, then 100
//! trending down, with a step that grows through each run of ten bars.
//! Used when no real data is available.

use crate::domain::error::KumoError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{Duration, NaiveDate, NaiveTime};

const CYCLE: usize = 200;
const BASE_STEP: f64 = 0.0001;
const STEP_INCREMENT: f64 = 0.00001;
const VOLUME: i64 = 1000;

/// Bar length in minutes; unrecognized timeframes are treated as hourly.
pub fn timeframe_minutes(timeframe: &str) -> i64 {
    match timeframe.trim() {
        "1" | "1m" => 1,
        "5" | "5m" => 5,
        "15" | "15m" => 15,
        "30" | "30m" => 30,
        "60" | "1h" => 60,
        "240" | "4h" => 240,
        "D" | "1d" => 1_440,
        "W" | "1w" => 10_080,
        _ => 60,
    }
}

/// Quote level the series starts from.
fn base_price(symbol: &str) -> f64 {
    if symbol.to_uppercase().contains("EUR") {
        1.1
    } else {
        1.0
    }
}

fn step(i: usize) -> f64 {
    let magnitude = BASE_STEP + (i % 10) as f64 * STEP_INCREMENT;
    if i % CYCLE < CYCLE / 2 {
        magnitude
    } else {
        -magnitude
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticDataAdapter;

impl SyntheticDataAdapter {
    pub fn new() -> Self {
        SyntheticDataAdapter
    }

    /// One bar per timeframe interval from `start_date` 00:00 up to, but not
    /// including, `end_date` 00:00.
    pub fn generate(
        &self,
        symbol: &str,
        timeframe: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<OhlcvBar> {
        let minutes = timeframe_minutes(timeframe);
        let start = start_date.and_time(NaiveTime::MIN);
        let total_minutes = (end_date.and_time(NaiveTime::MIN) - start).num_minutes();
        let count = (total_minutes / minutes).max(0) as usize;

        let mut price = base_price(symbol);
        (0..count)
            .map(|i| {
                let change = step(i);
                price += change;
                OhlcvBar {
                    time: start + Duration::minutes(i as i64 * minutes),
                    open: price - change * 0.5,
                    high: price + change.abs() * 2.0,
                    low: price - change.abs() * 2.0,
                    close: price,
                    volume: VOLUME,
                }
            })
            .collect()
    }
}

impl DataPort for SyntheticDataAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, KumoError> {
        let bars = self.generate(symbol, timeframe, start_date, end_date);
        tracing::info!(symbol, timeframe, bars = bars.len(), "generated synthetic bars");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn timeframe_map() {
        assert_eq!(timeframe_minutes("1h"), 60);
        assert_eq!(timeframe_minutes("4h"), 240);
        assert_eq!(timeframe_minutes("D"), 1440);
        assert_eq!(timeframe_minutes("1w"), 10080);
        assert_eq!(timeframe_minutes("15"), 15);
        assert_eq!(timeframe_minutes("1M"), 60);
    }

    #[test]
    fn bar_count_follows_timeframe() {
        let adapter = SyntheticDataAdapter::new();
        assert_eq!(adapter.generate("EURUSD", "1h", day(1, 1), day(1, 2)).len(), 24);
        assert_eq!(adapter.generate("EURUSD", "4h", day(1, 1), day(1, 11)).len(), 60);
        assert!(adapter.generate("EURUSD", "1h", day(1, 2), day(1, 1)).is_empty());
    }

    #[test]
    fn bars_spaced_by_timeframe() {
        let bars = SyntheticDataAdapter::new().generate("EURUSD", "15", day(1, 1), day(1, 2));
        assert_eq!(bars.len(), 96);
        assert_eq!(bars[0].time, day(1, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(bars[1].time, day(1, 1).and_hms_opt(0, 15, 0).unwrap());
    }

    #[test]
    fn base_price_depends_on_symbol() {
        let adapter = SyntheticDataAdapter::new();
        let eur = adapter.generate("EURUSD", "1h", day(1, 1), day(1, 2));
        let gbp = adapter.generate("GBPUSD", "1h", day(1, 1), day(1, 2));
        assert_relative_eq!(eur[0].close, 1.1 + 0.0001);
        assert_relative_eq!(gbp[0].close, 1.0 + 0.0001);
    }

    #[test]
    fn trend_then_reversal() {
        let bars = SyntheticDataAdapter::new().generate("EURUSD", "1h", day(1, 1), day(2, 1));
        assert!(bars.len() > 200);
        assert!(bars[..100].windows(2).all(|w| w[1].close > w[0].close));
        assert!(bars[100..200].windows(2).all(|w| w[1].close < w[0].close));
        assert!(bars[200].close > bars[199].close);
    }

    #[test]
    fn ohlc_shape() {
        let bars = SyntheticDataAdapter::new().generate("EURUSD", "1h", day(1, 1), day(1, 10));
        for (i, bar) in bars.iter().enumerate() {
            let change = step(i);
            assert_relative_eq!(bar.high - bar.close, 2.0 * change.abs(), epsilon = 1e-12);
            assert_relative_eq!(bar.close - bar.low, 2.0 * change.abs(), epsilon = 1e-12);
            assert_relative_eq!(bar.close - bar.open, 0.5 * change, epsilon = 1e-12);
            assert_eq!(bar.volume, 1000);
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let adapter = SyntheticDataAdapter::new();
        let a = adapter.fetch_bars("EURUSD", "1h", day(1, 1), day(1, 20)).unwrap();
        let b = adapter.fetch_bars("EURUSD", "1h", day(1, 1), day(1, 20)).unwrap();
        assert_eq!(a, b);
    }
}
