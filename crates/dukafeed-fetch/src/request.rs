//! Stream request options and validation.

use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;
use std::time::Duration;

use dukafeed_instruments::Catalog;
use dukafeed_types::{Granularity, Instrument, PriceSide, TimeRange, ValidationError};

use crate::fetcher::{FetchPolicy, RetryDelay};

/// Options for a historical record stream.
///
/// Built with [`StreamRequest::new`] plus setters; everything is checked by
/// [`FeedClient::stream`](crate::FeedClient::stream) before any I/O starts.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use dukafeed_fetch::StreamRequest;
/// use dukafeed_types::{Granularity, PriceSide};
///
/// let request = StreamRequest::new("EUR/USD", Granularity::M1)
///     .dates(
///         NaiveDate::from_ymd_opt(2019, 2, 4).unwrap(),
///         NaiveDate::from_ymd_opt(2019, 2, 8).unwrap(),
///     )
///     .side(PriceSide::Mid)
///     .batch_size(20);
/// ```
#[derive(Debug, Clone)]
pub struct StreamRequest {
    instrument: String,
    granularity: Granularity,
    side: PriceSide,
    time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    date_range: Option<(NaiveDate, NaiveDate)>,
    batch_size: usize,
    batch_pause: Duration,
    max_retries: u32,
    retry_delay: RetryDelay,
    retry_on_empty: bool,
    fail_after_retries: bool,
    cache_dir: Option<PathBuf>,
    halt_on_error: bool,
}

impl StreamRequest {
    /// Creates a request with default options for an instrument and
    /// granularity. A range must be supplied with [`range`](Self::range)
    /// or [`dates`](Self::dates) before streaming.
    pub fn new(instrument: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            instrument: instrument.into(),
            granularity,
            side: PriceSide::default(),
            time_range: None,
            date_range: None,
            batch_size: 10,
            batch_pause: Duration::ZERO,
            max_retries: 3,
            retry_delay: RetryDelay::default(),
            retry_on_empty: false,
            fail_after_retries: false,
            cache_dir: None,
            halt_on_error: true,
        }
    }

    /// Sets the half-open time range `[from, to)`.
    #[must_use]
    pub const fn range(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.time_range = Some((from, to));
        self
    }

    /// Sets an inclusive date range; bare dates lift to UTC midnight, so
    /// `[first, last]` covers `[first 00:00, (last + 1 day) 00:00)`.
    #[must_use]
    pub const fn dates(mut self, first: NaiveDate, last: NaiveDate) -> Self {
        self.date_range = Some((first, last));
        self
    }

    /// Sets the quote side for bar requests (default bid).
    #[must_use]
    pub const fn side(mut self, side: PriceSide) -> Self {
        self.side = side;
        self
    }

    /// Sets how many units are fetched concurrently per batch (default 10).
    #[must_use]
    pub const fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the pause between batches (default none).
    #[must_use]
    pub const fn batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }

    /// Sets the number of retries after a failed attempt (default 3).
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay policy between retries (default exponential,
    /// 200 ms doubled per attempt).
    #[must_use]
    pub fn retry_delay(mut self, retry_delay: RetryDelay) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Retries empty 200 responses instead of accepting them as data gaps
    /// (default off).
    #[must_use]
    pub const fn retry_on_empty(mut self, retry_on_empty: bool) -> Self {
        self.retry_on_empty = retry_on_empty;
        self
    }

    /// Makes retry exhaustion a unit error instead of an empty unit
    /// (default off).
    #[must_use]
    pub const fn fail_after_retries(mut self, fail_after_retries: bool) -> Self {
        self.fail_after_retries = fail_after_retries;
        self
    }

    /// Enables the file cache rooted at `dir`.
    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Sets whether a failed unit aborts the stream (default) or is logged
    /// and skipped.
    #[must_use]
    pub const fn halt_on_error(mut self, halt_on_error: bool) -> Self {
        self.halt_on_error = halt_on_error;
        self
    }

    /// Validates the options against the catalog.
    pub(crate) fn validate(&self) -> Result<ValidatedRequest, ValidationError> {
        let instrument = Catalog::global()
            .get(&self.instrument)
            .ok_or_else(|| ValidationError::UnknownInstrument(self.instrument.clone()))?
            .clone();

        let range = match (self.time_range, self.date_range) {
            (Some((from, to)), None) => TimeRange::new(from, to)?,
            (None, Some((first, last))) => TimeRange::from_dates(first, last)?,
            (None, None) => return Err(ValidationError::MissingDateRange),
            (Some(_), Some(_)) => {
                return Err(ValidationError::InvalidDateRange(
                    "both a time range and a date range were provided".to_string(),
                ));
            }
        };

        if self.batch_size == 0 {
            return Err(ValidationError::InvalidBatchSize);
        }

        // Mid bars fetch two files per unit; halve the batch so the number
        // of in-flight requests stays within the configured bound.
        let effective_batch_size = if self.side == PriceSide::Mid && !self.granularity.is_ticks() {
            (self.batch_size / 2).max(1)
        } else {
            self.batch_size
        };

        Ok(ValidatedRequest {
            instrument,
            granularity: self.granularity,
            side: self.side,
            range,
            effective_batch_size,
            batch_pause: self.batch_pause,
            halt_on_error: self.halt_on_error,
            policy: FetchPolicy {
                max_retries: self.max_retries,
                retry_delay: self.retry_delay.clone(),
                retry_on_empty: self.retry_on_empty,
                fail_after_retries: self.fail_after_retries,
                cache_dir: self.cache_dir.clone(),
            },
        })
    }
}

/// A request that passed validation, ready for the orchestrator.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedRequest {
    pub(crate) instrument: Instrument,
    pub(crate) granularity: Granularity,
    pub(crate) side: PriceSide,
    pub(crate) range: TimeRange,
    pub(crate) effective_batch_size: usize,
    pub(crate) batch_pause: Duration,
    pub(crate) halt_on_error: bool,
    pub(crate) policy: FetchPolicy,
}
