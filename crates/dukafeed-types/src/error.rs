//! Request validation errors.

use thiserror::Error;

/// Errors surfaced synchronously by `stream` before any I/O happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The instrument name does not resolve in the catalog.
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    /// The granularity string is not one of the supported values.
    #[error("invalid granularity '{0}', expected one of: ticks, m1, h1, d1")]
    InvalidGranularity(String),

    /// The price side string is not one of the supported values.
    #[error("invalid price side '{0}', expected one of: bid, ask, mid")]
    InvalidPriceSide(String),

    /// The batch size is zero.
    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    /// Neither a time range nor a date range was provided.
    #[error("a time range or a date range is required")]
    MissingDateRange,

    /// The provided range is malformed.
    #[error("invalid date range: {0}")]
    InvalidDateRange(String),
}
