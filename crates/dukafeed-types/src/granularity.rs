//! Requested record granularity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ValidationError;

/// Granularity of the records produced by a stream request.
///
/// Ticks are fetched from hourly files; bars come from daily, monthly, or
/// yearly aggregate files depending on the bar period. The file actually
/// downloaded for a given request may be finer than the requested
/// granularity when the covering period is still in progress (see
/// [`Plan`](crate::Plan)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Raw ticks (no aggregation).
    #[default]
    Ticks,
    /// 1-minute bars.
    #[serde(rename = "m1")]
    M1,
    /// 1-hour bars.
    #[serde(rename = "h1")]
    H1,
    /// Daily bars.
    #[serde(rename = "d1")]
    D1,
}

impl Granularity {
    /// Returns true if this is tick data.
    #[must_use]
    pub const fn is_ticks(&self) -> bool {
        matches!(self, Self::Ticks)
    }

    /// Returns the granularity as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ticks => "ticks",
            Self::M1 => "m1",
            Self::H1 => "h1",
            Self::D1 => "d1",
        }
    }

    /// Returns all supported granularities.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Ticks, Self::M1, Self::H1, Self::D1]
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ticks" | "tick" => Ok(Self::Ticks),
            "m1" | "1m" | "minute" | "min" => Ok(Self::M1),
            "h1" | "1h" | "hour" => Ok(Self::H1),
            "d1" | "1d" | "day" | "daily" => Ok(Self::D1),
            _ => Err(ValidationError::InvalidGranularity(s.to_string())),
        }
    }
}
