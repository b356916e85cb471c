//! Streaming client for Dukascopy historical tick and candle data.
//!
//! This is a facade crate that re-exports functionality from the dukafeed
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use dukafeed::prelude::*;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FeedClient::new()?;
//!     let request = StreamRequest::new("EUR/USD", Granularity::Ticks).dates(
//!         chrono::NaiveDate::from_ymd_opt(2019, 2, 4).unwrap(),
//!         chrono::NaiveDate::from_ymd_opt(2019, 2, 4).unwrap(),
//!     );
//!
//!     let records = client.stream(&request)?;
//!     futures::pin_mut!(records);
//!     while let Some(record) = records.next().await {
//!         println!("{:?}", record?);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use dukafeed_types::*;

// Re-export the instrument catalog
pub use dukafeed_instruments::Catalog;

// Re-export the download pipeline
pub use dukafeed_fetch::{
    DecodeError, DecompressError, FeedClient, FeedError, FetchError, FetchPolicy, Fetcher,
    HttpTransport, RetryDelay, StreamRequest, Transport, TransportConfig, TransportError,
    UnitError, WireResponse, decode_bars, decode_ticks, decompress_bi5, merge_mid_bars, url,
};

/// Prelude module for convenient imports.
///
/// ```
/// use dukafeed::prelude::*;
/// ```
pub mod prelude {
    pub use dukafeed_types::{
        Bar, FetchUnit, Granularity, Instrument, Plan, PriceSide, Record, Tick, TimeRange,
        ValidationError,
    };

    pub use dukafeed_instruments::Catalog;

    pub use dukafeed_fetch::{FeedClient, FeedError, RetryDelay, StreamRequest};
}
