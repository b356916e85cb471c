//! Quote side selection for bar requests.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ValidationError;

/// Which side of the book a bar series is built from.
///
/// Ticks always carry both sides, so the side only affects bar requests.
/// `Mid` has no file of its own on the remote: the orchestrator fetches the
/// bid and ask files for the unit and averages them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PriceSide {
    /// Bid-side prices.
    #[default]
    Bid,
    /// Ask-side prices.
    Ask,
    /// Midpoint of bid and ask, composed client-side.
    Mid,
}

impl PriceSide {
    /// Returns the side as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bid => "bid",
            Self::Ask => "ask",
            Self::Mid => "mid",
        }
    }

    /// Uppercase token used in remote candle file names.
    ///
    /// `Mid` never appears in a URL; the orchestrator expands it to a bid
    /// and an ask fetch before any URL is built.
    #[must_use]
    pub const fn wire_token(&self) -> &'static str {
        match self {
            Self::Bid => "BID",
            Self::Ask => "ASK",
            Self::Mid => "MID",
        }
    }
}

impl std::fmt::Display for PriceSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PriceSide {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bid" => Ok(Self::Bid),
            "ask" => Ok(Self::Ask),
            "mid" => Ok(Self::Mid),
            _ => Err(ValidationError::InvalidPriceSide(s.to_string())),
        }
    }
}
