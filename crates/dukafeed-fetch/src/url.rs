//! Remote URL construction.

use chrono::{Datelike, Timelike};

use dukafeed_types::{FetchUnit, PriceSide};

/// Base URL for the historical data feed.
pub const BASE_URL: &str = "https://datafeed.dukascopy.com/datafeed";

/// Builds the URL for a plan unit.
///
/// The remote encodes months zero-indexed and two-digit (January = `00`);
/// days and hours are two-digit zero-padded. Candle files are per quote
/// side; the side is ignored for tick files, which carry both sides.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use dukafeed_fetch::url::unit_url;
/// use dukafeed_types::{FetchUnit, PriceSide};
///
/// let unit = FetchUnit::TickHour {
///     hour: Utc.with_ymd_and_hms(2019, 2, 4, 0, 0, 0).unwrap(),
/// };
/// assert_eq!(
///     unit_url("EURUSD", &unit, PriceSide::Bid),
///     "https://datafeed.dukascopy.com/datafeed/EURUSD/2019/01/04/00h_ticks.bi5"
/// );
/// ```
#[must_use]
pub fn unit_url(prefix: &str, unit: &FetchUnit, side: PriceSide) -> String {
    match *unit {
        FetchUnit::TickHour { hour } => format!(
            "{BASE_URL}/{prefix}/{}/{:02}/{:02}/{:02}h_ticks.bi5",
            hour.year(),
            hour.month() - 1,
            hour.day(),
            hour.hour()
        ),
        FetchUnit::MinuteBars { day } => format!(
            "{BASE_URL}/{prefix}/{}/{:02}/{:02}/{}_candles_min_1.bi5",
            day.year(),
            day.month() - 1,
            day.day(),
            side.wire_token()
        ),
        FetchUnit::HourBars { month } => format!(
            "{BASE_URL}/{prefix}/{}/{:02}/{}_candles_hour_1.bi5",
            month.year(),
            month.month() - 1,
            side.wire_token()
        ),
        FetchUnit::DayBars { year } => {
            format!("{BASE_URL}/{prefix}/{year}/{}_candles_day_1.bi5", side.wire_token())
        }
    }
}

/// Derives the cache file name for a URL: the path after the base with
/// separators flattened to `-`.
#[must_use]
pub fn cache_key(url: &str) -> String {
    url.strip_prefix(BASE_URL)
        .map_or(url, |rest| rest.trim_start_matches('/'))
        .replace('/', "-")
}
