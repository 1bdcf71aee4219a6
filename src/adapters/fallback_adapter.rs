//! Primary data source with a synthetic fallback.

use crate::adapters::synthetic_adapter::SyntheticDataAdapter;
use crate::domain::error::KumoError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;

/// Fewer bars than this from the primary source are not enough to warm up
/// the slower indicators.
pub const MIN_PRIMARY_BARS: usize = 50;

/// Serves the primary source's bars unless it fails or returns
/// `MIN_PRIMARY_BARS` or fewer, in which case synthetic bars are generated
/// for the same request.
pub struct FallbackDataAdapter<P> {
    primary: P,
    fallback: SyntheticDataAdapter,
}

impl<P: DataPort> FallbackDataAdapter<P> {
    pub fn new(primary: P) -> Self {
        FallbackDataAdapter {
            primary,
            fallback: SyntheticDataAdapter::new(),
        }
    }
}

impl<P: DataPort> DataPort for FallbackDataAdapter<P> {
    fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, KumoError> {
        match self.primary.fetch_bars(symbol, timeframe, start_date, end_date) {
            Ok(bars) if bars.len() > MIN_PRIMARY_BARS => return Ok(bars),
            Ok(bars) => tracing::warn!(
                symbol,
                timeframe,
                bars = bars.len(),
                "insufficient bars from primary source, using synthetic data"
            ),
            Err(e) => tracing::warn!(
                symbol,
                timeframe,
                error = %e,
                "primary data source failed, using synthetic data"
            ),
        }
        self.fallback
            .fetch_bars(symbol, timeframe, start_date, end_date)
    }
}
