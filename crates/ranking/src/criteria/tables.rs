//! Fixed lookup tables shared by the scoring strategies.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    /// Lowest percentage (inclusive) that still falls into this band.
    pub min_percent: Decimal,
    pub place: u32,
}

impl Band {
    pub fn new(min_percent: u32, place: u32) -> Self {
        Self {
            min_percent: Decimal::from(min_percent),
            place,
        }
    }
}

/// Percentage bands, best first. A ratio lands in the first band whose lower
/// edge it reaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandTable {
    bands: Vec<Band>,
}

impl BandTable {
    pub fn new(bands: Vec<Band>) -> Self {
        Self { bands }
    }

    /// `count` bands of `width` percentage points from 100% down to 0%,
    /// placed 1..=count. `uniform(5, 20)` puts 95% and above in place 1 and
    /// anything under 5% in place 20.
    pub fn uniform(width: u32, count: u32) -> Self {
        let bands = (1..=count)
            .map(|place| Band::new(100u32.saturating_sub(width * place), place))
            .collect();
        Self { bands }
    }

    pub fn place_for(&self, percent: Decimal) -> u32 {
        self.bands
            .iter()
            .find(|band| percent >= band.min_percent)
            .or(self.bands.last())
            .map_or(1, |band| band.place)
    }

    /// Place of the lowest band.
    pub fn worst_place(&self) -> u32 {
        self.bands.iter().map(|band| band.place).max().unwrap_or(1)
    }

    pub fn validate(&self, criterion: &str) -> Result<(), ConfigError> {
        let Some(last) = self.bands.last() else {
            return Err(ConfigError::EmptyBandTable {
                criterion: criterion.to_string(),
            });
        };

        let descending = self
            .bands
            .windows(2)
            .all(|pair| pair[0].min_percent > pair[1].min_percent);
        if !descending || !last.min_percent.is_zero() {
            return Err(ConfigError::UnorderedBandTable {
                criterion: criterion.to_string(),
            });
        }

        if let Some(band) = self.bands.iter().find(|band| band.place == 0) {
            return Err(ConfigError::InvalidPlace {
                criterion: criterion.to_string(),
                place: band.place,
            });
        }

        Ok(())
    }
}

/// Integer key to integer value, e.g. earned points to place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    values: BTreeMap<u32, u32>,
}

impl LookupTable {
    pub fn from_pairs(pairs: &[(u32, u32)]) -> Self {
        Self {
            values: pairs.iter().copied().collect(),
        }
    }

    /// Keys `0..=top`; `top` maps to `best` and every key below adds one.
    pub fn descending(top: u32, best: u32) -> Self {
        Self {
            values: (0..=top).map(|key| (key, best + (top - key))).collect(),
        }
    }

    pub fn get(&self, key: u32) -> Option<u32> {
        self.values.get(&key).copied()
    }

    /// Value for `key`, or the largest value in the table when `key` is not listed.
    pub fn get_or_worst(&self, key: u32) -> u32 {
        self.get(key).unwrap_or_else(|| self.worst())
    }

    pub fn worst(&self) -> u32 {
        self.values.values().copied().max().unwrap_or(0)
    }

    /// Every key in `0..=max_key` must be present.
    pub fn validate_covers(&self, criterion: &str, max_key: u32) -> Result<(), ConfigError> {
        match (0..=max_key).find(|key| !self.values.contains_key(key)) {
            Some(value) => Err(ConfigError::MissingLookupEntry {
                criterion: criterion.to_string(),
                value,
            }),
            None => Ok(()),
        }
    }

    /// Every value must be a usable place.
    pub fn validate_places(&self, criterion: &str) -> Result<(), ConfigError> {
        match self.values.values().find(|place| **place == 0) {
            Some(place) => Err(ConfigError::InvalidPlace {
                criterion: criterion.to_string(),
                place: *place,
            }),
            None => Ok(()),
        }
    }
}

/// Percentage of `part` in `whole`; zero when `whole` is zero.
pub fn percent(part: u32, whole: u32) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole)
}
