//! Batched streaming download orchestration.
//!
//! The orchestrator consumes the lazy plan in chunks of the effective
//! batch size, dispatches each chunk's units concurrently, and re-emits
//! results in plan order so the record sequence stays chronological.
//! Dropping the stream stops planning and cancels in-flight requests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use thiserror::Error;

use dukafeed_types::{FetchUnit, Plan, PriceSide, Record, ValidationError};

use crate::fetcher::{FetchError, Fetcher};
use crate::parse::{DecodeError, decode_bars, decode_ticks, merge_mid_bars};
use crate::request::{StreamRequest, ValidatedRequest};
use crate::transport::{HttpTransport, Transport};
use crate::url::unit_url;

/// Terminal failure of a single plan unit.
#[derive(Error, Debug)]
pub enum UnitError {
    /// The unit's resource could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The unit's bytes could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Fatal stream error: a unit failed and the request has `halt_on_error`
/// set.
#[derive(Error, Debug)]
pub enum FeedError {
    /// A plan unit failed terminally.
    #[error("{unit} failed: {source}")]
    Unit {
        /// The unit that failed.
        unit: FetchUnit,
        /// The underlying failure.
        source: UnitError,
    },
}

impl FeedError {
    /// The plan unit this error is annotated with.
    #[must_use]
    pub const fn unit(&self) -> &FetchUnit {
        match self {
            Self::Unit { unit, .. } => unit,
        }
    }
}

/// Client producing lazily-materialized, chronologically ordered record
/// streams.
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use dukafeed_fetch::{FeedClient, StreamRequest};
/// use dukafeed_types::Granularity;
/// use futures::StreamExt;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = FeedClient::new()?;
/// let request = StreamRequest::new("EUR/USD", Granularity::Ticks).dates(
///     NaiveDate::from_ymd_opt(2019, 2, 4).unwrap(),
///     NaiveDate::from_ymd_opt(2019, 2, 4).unwrap(),
/// );
///
/// let stream = client.stream(&request)?;
/// futures::pin_mut!(stream);
/// while let Some(record) = stream.next().await {
///     println!("{:?}", record?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FeedClient {
    transport: Arc<dyn Transport>,
}

impl FeedClient {
    /// Creates a client backed by the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_transport(Arc::new(HttpTransport::with_defaults()?)))
    }

    /// Creates a client over a custom transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Streams the records described by `request`.
    ///
    /// Validation happens here, before any I/O; the returned stream is
    /// single-pass, finite for any finite range, globally ordered by time,
    /// and filtered to the request's half-open range. Per-unit failures
    /// are routed by the request's `halt_on_error` setting: aborting the
    /// stream with a [`FeedError`], or logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the request is malformed or the
    /// instrument is unknown.
    pub fn stream(
        &self,
        request: &StreamRequest,
    ) -> Result<impl Stream<Item = Result<Record, FeedError>> + Send + 'static, ValidationError>
    {
        let validated = request.validate()?;
        Ok(build_stream(Arc::clone(&self.transport), validated, Utc::now()))
    }
}

/// Per-unit state shared by all unit tasks of one stream.
#[derive(Debug)]
struct UnitContext {
    fetcher: Fetcher,
    prefix: String,
    point_value: f64,
    side: PriceSide,
}

/// Assembles the record stream for a validated request.
///
/// `now` pins the planner's current-period fallback.
fn build_stream(
    transport: Arc<dyn Transport>,
    validated: ValidatedRequest,
    now: DateTime<Utc>,
) -> impl Stream<Item = Result<Record, FeedError>> + Send + 'static {
    let ValidatedRequest {
        instrument,
        granularity,
        side,
        range,
        effective_batch_size,
        batch_pause,
        halt_on_error,
        policy,
    } = validated;

    let ctx = Arc::new(UnitContext {
        fetcher: Fetcher::new(transport, policy),
        prefix: instrument.remote_prefix().to_string(),
        point_value: instrument.point_value(),
        side,
    });
    let plan = Plan::new(granularity, range.from, range.to, now);

    stream::iter(plan)
        .chunks(effective_batch_size)
        .enumerate()
        .then(move |(index, units)| {
            let ctx = Arc::clone(&ctx);
            async move {
                if index > 0 && !batch_pause.is_zero() {
                    tokio::time::sleep(batch_pause).await;
                }
                // Dispatch the whole chunk concurrently; join_all returns
                // results in plan order regardless of completion order.
                future::join_all(units.into_iter().map(|unit| {
                    let ctx = Arc::clone(&ctx);
                    async move {
                        let result = run_unit(&ctx, unit).await;
                        (unit, result)
                    }
                }))
                .await
            }
        })
        .flat_map(stream::iter)
        .map(move |(unit, result)| match result {
            Ok(records) => records.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(source) if halt_on_error => vec![Err(FeedError::Unit { unit, source })],
            Err(source) => {
                tracing::error!(unit = %unit, error = %source, "skipping failed unit");
                Vec::new()
            }
        })
        .flat_map(stream::iter)
        .filter(move |item| {
            let keep = item
                .as_ref()
                .map_or(true, |record| range.contains(record.time()));
            future::ready(keep)
        })
        .scan(false, |halted, item| {
            if *halted {
                return future::ready(None);
            }
            *halted = item.is_err();
            future::ready(Some(item))
        })
}

/// Fetches and decodes one plan unit into records.
async fn run_unit(ctx: &UnitContext, unit: FetchUnit) -> Result<Vec<Record>, UnitError> {
    if let FetchUnit::TickHour { hour } = unit {
        let url = unit_url(&ctx.prefix, &unit, ctx.side);
        let bytes = ctx.fetcher.fetch(&url).await?;
        let ticks = decode_ticks(&bytes, hour, ctx.point_value)?;
        return Ok(ticks.into_iter().map(Record::Tick).collect());
    }

    let origin = unit.start();
    let bars = match ctx.side {
        PriceSide::Mid => {
            let bid_url = unit_url(&ctx.prefix, &unit, PriceSide::Bid);
            let ask_url = unit_url(&ctx.prefix, &unit, PriceSide::Ask);
            let (bid_bytes, ask_bytes) =
                future::try_join(ctx.fetcher.fetch(&bid_url), ctx.fetcher.fetch(&ask_url)).await?;
            let bid = decode_bars(&bid_bytes, origin, ctx.point_value)?;
            let ask = decode_bars(&ask_bytes, origin, ctx.point_value)?;
            merge_mid_bars(bid, ask)?
        }
        side => {
            let url = unit_url(&ctx.prefix, &unit, side);
            let bytes = ctx.fetcher.fetch(&url).await?;
            decode_bars(&bytes, origin, ctx.point_value)?
        }
    };
    Ok(bars.into_iter().map(Record::Bar).collect())
}
