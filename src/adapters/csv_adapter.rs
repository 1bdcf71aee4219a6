//! CSV file bar source.
//!
//! Expects a header row with `time,open,high,low,close,volume`. Timestamps
//! may be `YYYY-MM-DD HH:MM:SS`, ISO `YYYY-MM-DDTHH:MM:SS`, or a bare date.

use crate::domain::error::KumoError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::path::PathBuf;

const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvAdapter {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

fn data_error(reason: impl Into<String>) -> KumoError {
    KumoError::Data {
        reason: reason.into(),
    }
}

fn parse_time(raw: &str) -> Result<NaiveDateTime, KumoError> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| data_error(format!("invalid time '{}'", raw)))
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DataPort for CsvAdapter {
    /// The file holds a single series, so `symbol` and `timeframe` only label
    /// errors. Rows are kept from `start_date` 00:00 up to, but not including,
    /// `end_date` 00:00, the same window the synthetic source covers.
    fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, KumoError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| data_error(format!("failed to read {}: {}", self.path.display(), e)))?;

        let start = start_date.and_time(NaiveTime::MIN);
        let end = end_date.and_time(NaiveTime::MIN);
        let mut bars = Vec::new();

        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result.map_err(|e| {
                data_error(format!("{} row {}: {}", self.path.display(), line + 1, e))
            })?;
            let time = parse_time(&row.time)?;
            if time < start || time >= end {
                continue;
            }
            bars.push(OhlcvBar {
                time,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume.unwrap_or(0.0) as i64,
            });
        }

        bars.sort_by_key(|b| b.time);
        bars.dedup_by_key(|b| b.time);

        tracing::debug!(
            path = %self.path.display(),
            symbol,
            timeframe,
            bars = bars.len(),
            "loaded csv bars"
        );
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("EURUSD_1h.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    const SAMPLE: &str = "time,open,high,low,close,volume\n\
        2024-01-15 10:00:00,1.1000,1.1010,1.0990,1.1005,1200\n\
        2024-01-15 09:00:00,1.0990,1.1002,1.0985,1.1000,1000\n\
        2024-01-16T09:00:00,1.1005,1.1020,1.1000,1.1015,900\n\
        2024-01-15 10:00:00,9.9,9.9,9.9,9.9,1\n\
        2024-01-17,1.1015,1.1030,1.1010,1.1025,\n";

    #[test]
    fn fetch_sorts_and_drops_duplicates() {
        let (_dir, path) = write_csv(SAMPLE);
        let bars = CsvAdapter::new(path)
            .fetch_bars("EURUSD", "1h", day(1), day(31))
            .unwrap();

        assert_eq!(bars.len(), 4);
        assert!(bars.windows(2).all(|w| w[0].time < w[1].time));
        assert_eq!(bars[0].close, 1.1000);
        assert_eq!(bars[1].volume, 1200);
        assert_eq!(bars[3].volume, 0);
        assert_eq!(bars[3].time, day(17).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn fetch_filters_by_date() {
        let (_dir, path) = write_csv(SAMPLE);
        let bars = CsvAdapter::new(path)
            .fetch_bars("EURUSD", "1h", day(16), day(17))
            .unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].time, day(16).and_hms_opt(9, 0, 0).unwrap());
    }

    #[test]
    fn window_matches_synthetic_source() {
        let rows: String = (0..72)
            .map(|h| {
                let t = day(1).and_hms_opt(0, 0, 0).unwrap() + chrono::Duration::hours(h);
                format!("{},1.1,1.1,1.1,1.1,1\n", t.format("%Y-%m-%d %H:%M:%S"))
            })
            .collect();
        let (_dir, path) = write_csv(&format!("time,open,high,low,close,volume\n{rows}"));
        let csv = CsvAdapter::new(path)
            .fetch_bars("EURUSD", "1h", day(1), day(3))
            .unwrap();
        let synthetic = crate::adapters::synthetic_adapter::SyntheticDataAdapter::new()
            .generate("EURUSD", "1h", day(1), day(3));

        assert_eq!(csv.len(), 48);
        let csv_times: Vec<_> = csv.iter().map(|b| b.time).collect();
        let synthetic_times: Vec<_> = synthetic.iter().map(|b| b.time).collect();
        assert_eq!(csv_times, synthetic_times);
    }

    #[test]
    fn missing_file_is_data_error() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/bars.csv"));
        let result = adapter.fetch_bars("EURUSD", "1h", day(1), day(31));
        assert!(matches!(result, Err(KumoError::Data { .. })));
    }

    #[test]
    fn bad_time_is_data_error() {
        let (_dir, path) = write_csv("time,open,high,low,close,volume\n15/01/2024,1,1,1,1,1\n");
        let result = CsvAdapter::new(path).fetch_bars("EURUSD", "1h", day(1), day(31));
        assert!(matches!(result, Err(KumoError::Data { .. })));
    }

    #[test]
    fn bad_number_is_data_error() {
        let (_dir, path) =
            write_csv("time,open,high,low,close,volume\n2024-01-15,1,abc,1,1,1\n");
        let result = CsvAdapter::new(path).fetch_bars("EURUSD", "1h", day(1), day(31));
        assert!(matches!(result, Err(KumoError::Data { .. })));
    }
}
