//! Core types for the dukafeed historical data client.
//!
//! This crate provides the fundamental data structures used throughout
//! dukafeed:
//!
//! - [`Tick`] and [`Bar`] - decoded market observations
//! - [`RawTick`] and [`RawBar`] - wire-format records before normalization
//! - [`Record`] - the single item type emitted by a stream
//! - [`Granularity`] and [`PriceSide`] - request dimensions
//! - [`TimeRange`] - half-open UTC time ranges
//! - [`Plan`] and [`FetchUnit`] - the lazy download plan
//! - [`Instrument`] - catalog descriptor for a tradable symbol

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod granularity;
mod instrument;
mod plan;
mod range;
mod record;
mod side;

pub use error::ValidationError;
pub use granularity::Granularity;
pub use instrument::Instrument;
pub use plan::{FetchUnit, Plan};
pub use range::TimeRange;
pub use record::{Bar, RawBar, RawTick, Record, Tick};
pub use side::PriceSide;
