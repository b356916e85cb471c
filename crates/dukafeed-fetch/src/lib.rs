//! Download pipeline for the dukafeed historical data client.
//!
//! This crate turns a validated request into a lazy, chronologically
//! ordered stream of records:
//!
//! - [`url::unit_url`] - composes remote resource URLs
//! - [`Fetcher`] - retry-aware download with optional file cache
//! - [`decompress_bi5`] - LZMA decompression
//! - [`decode_ticks`] / [`decode_bars`] - binary record decoding
//! - [`FeedClient::stream`] - the batched streaming entry point

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod decompress;
mod fetcher;
mod parse;
mod request;
mod stream;
mod transport;
pub mod url;

pub use decompress::{DecompressError, decompress_bi5};
pub use fetcher::{FetchError, FetchPolicy, Fetcher, RetryDelay};
pub use parse::{DecodeError, decode_bars, decode_ticks, merge_mid_bars};
pub use request::StreamRequest;
pub use stream::{FeedClient, FeedError, UnitError};
pub use transport::{HttpTransport, Transport, TransportConfig, TransportError, WireResponse};
