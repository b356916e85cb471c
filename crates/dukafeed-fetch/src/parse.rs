//! Binary record decoding from decompressed bi5 data.

use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, Utc};
use thiserror::Error;

use dukafeed_types::{Bar, RawBar, RawTick, Tick};

/// Errors that can occur while decoding records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Tick data length is not a multiple of the record size.
    #[error("invalid tick data: {len} bytes is not a multiple of {}", RawTick::SIZE)]
    InvalidTickFormat {
        /// Length of the offending blob.
        len: usize,
    },

    /// Bar data length is not a multiple of the record size.
    #[error("invalid bar data: {len} bytes is not a multiple of {}", RawBar::SIZE)]
    InvalidBarFormat {
        /// Length of the offending blob.
        len: usize,
    },

    /// The bid and ask files for a mid-price unit disagree.
    #[error("bid and ask candle files disagree for the same period")]
    MidMismatch,
}

/// Decodes one hour of ticks from decompressed bi5 data.
///
/// `hour_start` is the start of the hour the file covers; tick deltas are
/// milliseconds from it. An empty blob decodes to an empty vector. File
/// order is preserved and is monotonic non-decreasing in time.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidTickFormat`] when the blob length leaves
/// a trailing partial record.
pub fn decode_ticks(
    data: &[u8],
    hour_start: DateTime<Utc>,
    point_value: f64,
) -> Result<Vec<Tick>, DecodeError> {
    if !data.len().is_multiple_of(RawTick::SIZE) {
        return Err(DecodeError::InvalidTickFormat { len: data.len() });
    }

    Ok(data
        .chunks_exact(RawTick::SIZE)
        .map(|chunk| read_raw_tick(chunk).normalize(hour_start, point_value))
        .collect())
}

/// Decodes one file of bars from decompressed bi5 data.
///
/// `origin` is the start of the period the file covers (day start for
/// minute files, month start for hour files, year start for day files);
/// bar deltas are seconds from it.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidBarFormat`] when the blob length leaves a
/// trailing partial record.
pub fn decode_bars(
    data: &[u8],
    origin: DateTime<Utc>,
    point_value: f64,
) -> Result<Vec<Bar>, DecodeError> {
    if !data.len().is_multiple_of(RawBar::SIZE) {
        return Err(DecodeError::InvalidBarFormat { len: data.len() });
    }

    Ok(data
        .chunks_exact(RawBar::SIZE)
        .map(|chunk| read_raw_bar(chunk).normalize(origin, point_value))
        .collect())
}

/// Zips the bid and ask bar series of one unit into mid-price bars.
///
/// OHLC fields are averaged componentwise; volume is the sum of both
/// sides.
///
/// # Errors
///
/// Returns [`DecodeError::MidMismatch`] when the two series disagree on
/// record count or timestamps.
pub fn merge_mid_bars(bid: Vec<Bar>, ask: Vec<Bar>) -> Result<Vec<Bar>, DecodeError> {
    if bid.len() != ask.len() {
        return Err(DecodeError::MidMismatch);
    }

    bid.into_iter()
        .zip(ask)
        .map(|(b, a)| {
            if b.time != a.time {
                return Err(DecodeError::MidMismatch);
            }
            Ok(Bar {
                time: b.time,
                open: (b.open + a.open) / 2.0,
                high: (b.high + a.high) / 2.0,
                low: (b.low + a.low) / 2.0,
                close: (b.close + a.close) / 2.0,
                volume: b.volume + a.volume,
            })
        })
        .collect()
}

#[inline]
fn read_raw_tick(chunk: &[u8]) -> RawTick {
    RawTick::new(
        BigEndian::read_u32(&chunk[0..4]),
        BigEndian::read_i32(&chunk[4..8]),
        BigEndian::read_i32(&chunk[8..12]),
        BigEndian::read_f32(&chunk[12..16]),
        BigEndian::read_f32(&chunk[16..20]),
    )
}

#[inline]
fn read_raw_bar(chunk: &[u8]) -> RawBar {
    RawBar::new(
        BigEndian::read_i32(&chunk[0..4]),
        BigEndian::read_i32(&chunk[4..8]),
        BigEndian::read_i32(&chunk[8..12]),
        BigEndian::read_i32(&chunk[12..16]),
        BigEndian::read_i32(&chunk[16..20]),
        BigEndian::read_f32(&chunk[20..24]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tick_bytes(ms: u32, ask: i32, bid: i32, ask_vol: f32, bid_vol: f32) -> Vec<u8> {
        let mut bytes = vec![0u8; RawTick::SIZE];
        BigEndian::write_u32(&mut bytes[0..4], ms);
        BigEndian::write_i32(&mut bytes[4..8], ask);
        BigEndian::write_i32(&mut bytes[8..12], bid);
        BigEndian::write_f32(&mut bytes[12..16], ask_vol);
        BigEndian::write_f32(&mut bytes[16..20], bid_vol);
        bytes
    }

    fn bar_bytes(secs: i32, o: i32, h: i32, l: i32, c: i32, volume: f32) -> Vec<u8> {
        let mut bytes = vec![0u8; RawBar::SIZE];
        BigEndian::write_i32(&mut bytes[0..4], secs);
        BigEndian::write_i32(&mut bytes[4..8], o);
        BigEndian::write_i32(&mut bytes[8..12], h);
        BigEndian::write_i32(&mut bytes[12..16], l);
        BigEndian::write_i32(&mut bytes[16..20], c);
        BigEndian::write_f32(&mut bytes[20..24], volume);
        bytes
    }

    #[test]
    fn test_decode_ticks() {
        let hour = Utc.with_ymd_and_hms(2019, 2, 4, 0, 0, 0).unwrap();
        let mut data = tick_bytes(994, 114545, 114543, 1.0, 2.06);
        data.extend(tick_bytes(1494, 114546, 114544, 0.5, 0.75));

        let ticks = decode_ticks(&data, hour, 100_000.0).unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].time, hour + chrono::TimeDelta::milliseconds(994));
        assert!((ticks[0].ask - 1.14545).abs() < 1e-10);
        assert!((ticks[0].bid - 1.14543).abs() < 1e-10);
        assert!(ticks[1].time > ticks[0].time);
    }

    #[test]
    fn test_decode_ticks_empty() {
        let hour = Utc.with_ymd_and_hms(2019, 2, 4, 0, 0, 0).unwrap();
        assert!(decode_ticks(&[], hour, 100_000.0).unwrap().is_empty());
    }

    #[test]
    fn test_decode_ticks_trailing_bytes() {
        let hour = Utc.with_ymd_and_hms(2019, 2, 4, 0, 0, 0).unwrap();
        let data = vec![0u8; 25];
        assert_eq!(
            decode_ticks(&data, hour, 100_000.0),
            Err(DecodeError::InvalidTickFormat { len: 25 })
        );
    }

    #[test]
    fn test_decode_bars() {
        let origin = Utc.with_ymd_and_hms(2019, 2, 4, 0, 0, 0).unwrap();
        let mut data = bar_bytes(0, 114543, 114570, 114542, 114569, 293.76);
        data.extend(bar_bytes(60, 114569, 114580, 114560, 114575, 120.5));

        let bars = decode_bars(&data, origin, 100_000.0).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time, origin);
        assert_eq!(bars[1].time, origin + chrono::TimeDelta::seconds(60));
        assert!((bars[0].open - 1.14543).abs() < 1e-10);
        assert!((bars[0].volume - 293.76).abs() < 1e-3);
    }

    #[test]
    fn test_decode_bars_trailing_bytes() {
        let origin = Utc.with_ymd_and_hms(2019, 2, 4, 0, 0, 0).unwrap();
        let data = vec![0u8; 30];
        assert_eq!(
            decode_bars(&data, origin, 100_000.0),
            Err(DecodeError::InvalidBarFormat { len: 30 })
        );
    }

    #[test]
    fn test_merge_mid_bars() {
        let origin = Utc.with_ymd_and_hms(2019, 2, 4, 0, 0, 0).unwrap();
        let bid = decode_bars(&bar_bytes(0, 114543, 114570, 114542, 114569, 100.0), origin, 100_000.0)
            .unwrap();
        let ask = decode_bars(&bar_bytes(0, 114545, 114572, 114544, 114571, 50.0), origin, 100_000.0)
            .unwrap();

        let mid = merge_mid_bars(bid, ask).unwrap();
        assert_eq!(mid.len(), 1);
        assert!((mid[0].open - 1.14544).abs() < 1e-10);
        assert!((mid[0].high - 1.14571).abs() < 1e-10);
        assert!((mid[0].low - 1.14543).abs() < 1e-10);
        assert!((mid[0].close - 1.14570).abs() < 1e-10);
        assert!((mid[0].volume - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_merge_mid_bars_count_mismatch() {
        let origin = Utc.with_ymd_and_hms(2019, 2, 4, 0, 0, 0).unwrap();
        let bid = decode_bars(&bar_bytes(0, 1, 1, 1, 1, 1.0), origin, 10.0).unwrap();
        assert_eq!(merge_mid_bars(bid, Vec::new()), Err(DecodeError::MidMismatch));
    }

    #[test]
    fn test_merge_mid_bars_timestamp_mismatch() {
        let origin = Utc.with_ymd_and_hms(2019, 2, 4, 0, 0, 0).unwrap();
        let bid = decode_bars(&bar_bytes(0, 1, 1, 1, 1, 1.0), origin, 10.0).unwrap();
        let ask = decode_bars(&bar_bytes(60, 1, 1, 1, 1, 1.0), origin, 10.0).unwrap();
        assert_eq!(merge_mid_bars(bid, ask), Err(DecodeError::MidMismatch));
    }
}
