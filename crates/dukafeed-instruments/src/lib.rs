//! Instrument catalog for the dukafeed historical data client.
//!
//! Provides the static lookup table from trading symbol to remote path
//! prefix and pip value, with point values derived at load time.
//!
//! # Example
//!
//! ```
//! use dukafeed_instruments::Catalog;
//!
//! let catalog = Catalog::global();
//! let eurusd = catalog.get("EUR/USD").unwrap();
//! assert_eq!(eurusd.remote_prefix(), "EURUSD");
//! assert!((eurusd.point_value() - 100_000.0).abs() < 1e-6);
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;

use dukafeed_types::Instrument;

/// The instrument metadata JSON embedded at compile time.
const INSTRUMENTS_JSON: &str = include_str!("../data/instruments.json");

/// Symbols whose point value does not follow the `10 / pip_value` rule.
///
/// Kept local to the catalog so new overrides never touch the decoders.
const POINT_VALUE_OVERRIDES: &[(&str, f64)] = &[
    ("BAT/USD", 100_000.0),
    ("UNI/USD", 1_000.0),
    ("LNK/USD", 1_000.0),
];

/// Global catalog instance.
static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// One entry of the bundled metadata document.
#[derive(Debug, Deserialize)]
struct CatalogEntry {
    prefix: String,
    pip: f64,
}

/// Catalog of all supported instruments.
#[derive(Debug)]
pub struct Catalog {
    // Keyed by lowercased symbol for case-insensitive lookup.
    instruments: HashMap<String, Instrument>,
}

impl Catalog {
    /// Returns the global catalog, loaded lazily on first access.
    #[must_use]
    pub fn global() -> &'static Self {
        CATALOG.get_or_init(Self::load)
    }

    /// Loads instruments from the embedded JSON data.
    fn load() -> Self {
        let entries: HashMap<String, CatalogEntry> =
            serde_json::from_str(INSTRUMENTS_JSON).expect("invalid instruments.json");

        let instruments = entries
            .into_iter()
            .map(|(name, entry)| {
                let point_value = point_value_for(&name, entry.pip);
                let instrument = Instrument::new(&name, entry.prefix, entry.pip, point_value);
                (name.to_lowercase(), instrument)
            })
            .collect();

        Self { instruments }
    }

    /// Looks up an instrument by symbol (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Instrument> {
        self.instruments.get(&name.to_lowercase())
    }

    /// Returns all instruments as an iterator.
    pub fn all(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.values()
    }

    /// Returns all symbols sorted alphabetically.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.instruments.values().map(Instrument::name).collect();
        names.sort_unstable();
        names
    }

    /// Returns the total number of instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

/// Point value for a symbol: `10 / pip` unless overridden.
fn point_value_for(name: &str, pip: f64) -> f64 {
    POINT_VALUE_OVERRIDES
        .iter()
        .find(|(symbol, _)| *symbol == name)
        .map_or(10.0 / pip, |(_, value)| *value)
}
