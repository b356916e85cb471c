//! Decoded market observations and their wire-format counterparts.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A single quote update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Timestamp of the tick (UTC, millisecond precision).
    pub time: DateTime<Utc>,
    /// Ask (offer) price.
    pub ask: f64,
    /// Bid price.
    pub bid: f64,
    /// Volume available at the ask price.
    pub ask_volume: f32,
    /// Volume available at the bid price.
    pub bid_volume: f32,
}

impl Tick {
    /// Creates a new tick.
    #[must_use]
    pub const fn new(
        time: DateTime<Utc>,
        ask: f64,
        bid: f64,
        ask_volume: f32,
        bid_volume: f32,
    ) -> Self {
        Self {
            time,
            ask,
            bid,
            ask_volume,
            bid_volume,
        }
    }

    /// Returns the mid price (average of ask and bid).
    #[must_use]
    pub fn mid(&self) -> f64 {
        (self.ask + self.bid) / 2.0
    }

    /// Returns the spread (ask - bid).
    ///
    /// Source data does not guarantee `ask >= bid`; the spread can be
    /// negative on crossed quotes.
    #[must_use]
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    /// Returns the total volume (ask + bid volume).
    #[must_use]
    pub fn total_volume(&self) -> f32 {
        self.ask_volume + self.bid_volume
    }
}

/// An OHLCV bar over a fixed period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time (start of the period, UTC).
    pub time: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price during the period.
    pub high: f64,
    /// Lowest price during the period.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume over the period.
    pub volume: f32,
}

impl Bar {
    /// Creates a new bar.
    #[must_use]
    pub const fn new(
        time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f32,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns the body size (|close - open|).
    #[must_use]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Returns true if this is a bullish (green) bar.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if this is a bearish (red) bar.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// A single market observation emitted by the stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    /// A raw quote update.
    Tick(Tick),
    /// An aggregated OHLCV bar.
    Bar(Bar),
}

impl Record {
    /// Returns the observation timestamp.
    #[must_use]
    pub const fn time(&self) -> DateTime<Utc> {
        match self {
            Self::Tick(tick) => tick.time,
            Self::Bar(bar) => bar.time,
        }
    }
}

/// Raw tick as read from an hourly bi5 file, before normalization.
///
/// The wire format stores ticks as 20 bytes in big-endian order:
/// - `u32`: milliseconds since the start of the covered hour
/// - `i32`: ask price (integer, needs division by the point value)
/// - `i32`: bid price (integer, needs division by the point value)
/// - `f32`: ask volume
/// - `f32`: bid volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawTick {
    /// Milliseconds since the start of the covered hour.
    pub time_delta_ms: u32,
    /// Raw integer ask price.
    pub ask_raw: i32,
    /// Raw integer bid price.
    pub bid_raw: i32,
    /// Ask volume.
    pub ask_volume: f32,
    /// Bid volume.
    pub bid_volume: f32,
}

impl RawTick {
    /// Size in bytes of a raw tick record.
    pub const SIZE: usize = 20;

    /// Creates a new raw tick.
    #[must_use]
    pub const fn new(
        time_delta_ms: u32,
        ask_raw: i32,
        bid_raw: i32,
        ask_volume: f32,
        bid_volume: f32,
    ) -> Self {
        Self {
            time_delta_ms,
            ask_raw,
            bid_raw,
            ask_volume,
            bid_volume,
        }
    }

    /// Normalizes the raw tick into an absolute-time [`Tick`].
    ///
    /// `hour_start` is the start of the hour the file covers; the point
    /// value converts raw integer prices to decimals (EUR/USD has a point
    /// value of 100 000, so a raw ask of 114545 becomes 1.14545).
    #[must_use]
    pub fn normalize(self, hour_start: DateTime<Utc>, point_value: f64) -> Tick {
        Tick {
            time: hour_start + TimeDelta::milliseconds(i64::from(self.time_delta_ms)),
            ask: f64::from(self.ask_raw) / point_value,
            bid: f64::from(self.bid_raw) / point_value,
            ask_volume: self.ask_volume,
            bid_volume: self.bid_volume,
        }
    }
}

/// Raw OHLCV bar as read from a candle bi5 file, before normalization.
///
/// The wire format stores bars as 24 bytes in big-endian order:
/// - `i32`: seconds since the file's origin (day, month, or year start)
/// - `i32`: open price (integer)
/// - `i32`: high price (integer)
/// - `i32`: low price (integer)
/// - `i32`: close price (integer)
/// - `f32`: volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBar {
    /// Seconds since the file's origin timestamp.
    pub time_delta_s: i32,
    /// Raw integer open price.
    pub open_raw: i32,
    /// Raw integer high price.
    pub high_raw: i32,
    /// Raw integer low price.
    pub low_raw: i32,
    /// Raw integer close price.
    pub close_raw: i32,
    /// Traded volume.
    pub volume: f32,
}

impl RawBar {
    /// Size in bytes of a raw bar record.
    pub const SIZE: usize = 24;

    /// Creates a new raw bar.
    #[must_use]
    pub const fn new(
        time_delta_s: i32,
        open_raw: i32,
        high_raw: i32,
        low_raw: i32,
        close_raw: i32,
        volume: f32,
    ) -> Self {
        Self {
            time_delta_s,
            open_raw,
            high_raw,
            low_raw,
            close_raw,
            volume,
        }
    }

    /// Normalizes the raw bar into an absolute-time [`Bar`].
    ///
    /// `origin` is the start of the period the file covers (day start for
    /// minute files, month start for hour files, year start for day files).
    #[must_use]
    pub fn normalize(self, origin: DateTime<Utc>, point_value: f64) -> Bar {
        let open = f64::from(self.open_raw) / point_value;
        let high = f64::from(self.high_raw) / point_value;
        let low = f64::from(self.low_raw) / point_value;
        let close = f64::from(self.close_raw) / point_value;
        Bar {
            time: origin + TimeDelta::seconds(i64::from(self.time_delta_s)),
            open,
            // Candle files occasionally carry an extreme inside the
            // open/close range; widen so emitted bars are well-formed.
            high: high.max(open).max(close).max(low),
            low: low.min(open).min(close).min(high),
            close,
            volume: self.volume,
        }
    }
}
