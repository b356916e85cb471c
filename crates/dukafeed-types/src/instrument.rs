//! Instrument descriptors.

use serde::{Deserialize, Serialize};

/// A tradable instrument as described by the catalog.
///
/// `remote_prefix` is the path segment the remote files live under;
/// `point_value` is the divisor that converts the integer prices in the
/// wire format to decimals. The catalog derives it from the pip value
/// (`10 / pip_value`) with a handful of per-symbol overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    name: String,
    remote_prefix: String,
    pip_value: f64,
    point_value: f64,
}

impl Instrument {
    /// Creates a new instrument descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        remote_prefix: impl Into<String>,
        pip_value: f64,
        point_value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            remote_prefix: remote_prefix.into(),
            pip_value,
            point_value,
        }
    }

    /// The trading symbol as written by the user (e.g. `"EUR/USD"`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The remote path prefix (e.g. `"EURUSD"`).
    #[must_use]
    pub fn remote_prefix(&self) -> &str {
        &self.remote_prefix
    }

    /// The instrument's pip value.
    #[must_use]
    pub const fn pip_value(&self) -> f64 {
        self.pip_value
    }

    /// The divisor converting raw integer prices to decimal prices.
    #[must_use]
    pub const fn point_value(&self) -> f64 {
        self.point_value
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let instrument = Instrument::new("EUR/USD", "EURUSD", 0.0001, 100_000.0);
        assert_eq!(instrument.name(), "EUR/USD");
        assert_eq!(instrument.remote_prefix(), "EURUSD");
        assert!((instrument.pip_value() - 0.0001).abs() < 1e-12);
        assert!((instrument.point_value() - 100_000.0).abs() < 1e-9);
    }
}
