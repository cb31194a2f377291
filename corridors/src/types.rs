//! Core data types for corridor records

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;

use crate::{CorridorError, FeeType, ProviderKind, Result};

/// Country identifier - a node in the corridor graph
///
/// Opaque to the optimizer: it may be a display name ("Mexico") or a code
/// ("MEX"). Two countries are the same node only if the identifiers match
/// exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Country(String);

impl Country {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Country {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Country {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for Country {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Country {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A directed remittance corridor between two countries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub source: Country,
    pub destination: Country,

    /// Fee as a percentage of the transfer amount (0-100)
    pub base_fee_percent: f64,

    /// Flat fee, used when `fee_type` is fixed
    pub fixed_fee: f64,

    pub min_fee: f64,
    pub max_fee: f64,
    pub fee_type: FeeType,

    /// Average settlement time in hours
    pub avg_time_hours: f64,

    /// Success probability proxy (0-100)
    pub reliability_score: f64,

    /// Daily volume capacity in USD
    pub volume_capacity: f64,

    #[serde(default)]
    pub providers: BTreeSet<ProviderKind>,

    #[serde(default)]
    pub currency_pairs: Vec<String>,

    #[serde(default)]
    pub restrictions: Vec<String>,
}

impl Corridor {
    /// Create a percentage-fee corridor with neutral defaults for the
    /// remaining attributes
    pub fn percentage<S, D>(source: S, destination: D, base_fee_percent: f64, min_fee: f64, max_fee: f64) -> Self
    where
        S: Into<Country>,
        D: Into<Country>,
    {
        Self {
            source: source.into(),
            destination: destination.into(),
            base_fee_percent,
            fixed_fee: 0.0,
            min_fee,
            max_fee,
            fee_type: FeeType::Percentage,
            avg_time_hours: 24.0,
            reliability_score: 95.0,
            volume_capacity: 1_000_000.0,
            providers: ProviderKind::ALL.into_iter().collect(),
            currency_pairs: Vec::new(),
            restrictions: Vec::new(),
        }
    }

    /// Create a fixed-fee corridor with neutral defaults for the remaining
    /// attributes
    pub fn fixed<S, D>(source: S, destination: D, fixed_fee: f64, min_fee: f64, max_fee: f64) -> Self
    where
        S: Into<Country>,
        D: Into<Country>,
    {
        Self {
            fixed_fee,
            base_fee_percent: 0.0,
            fee_type: FeeType::Fixed,
            ..Self::percentage(source, destination, 0.0, min_fee, max_fee)
        }
    }

    /// Set the average settlement time
    pub fn with_time(mut self, avg_time_hours: f64) -> Self {
        self.avg_time_hours = avg_time_hours;
        self
    }

    /// Set the reliability score
    pub fn with_reliability(mut self, reliability_score: f64) -> Self {
        self.reliability_score = reliability_score;
        self
    }

    /// Restrict the corridor to the given providers
    pub fn with_providers<I: IntoIterator<Item = ProviderKind>>(mut self, providers: I) -> Self {
        self.providers = providers.into_iter().collect();
        self
    }

    /// Whether the corridor is served by `provider`
    pub fn supports(&self, provider: ProviderKind) -> bool {
        self.providers.contains(&provider)
    }

    /// Clamp a fee to the corridor's `[min_fee, max_fee]` bounds
    pub fn clamp_fee(&self, fee: f64) -> f64 {
        fee.max(self.min_fee).min(self.max_fee)
    }

    /// Published tariff for `amount`: percentage or flat fee, clamped
    pub fn tariff_fee(&self, amount: f64) -> f64 {
        let raw = match self.fee_type {
            FeeType::Percentage => amount * (self.base_fee_percent / 100.0),
            FeeType::Fixed => self.fixed_fee,
        };
        self.clamp_fee(raw)
    }

    /// Validate the corridor record
    ///
    /// Rejects self-loops, empty identifiers, non-finite numbers, negative
    /// fees, inverted fee bounds and out-of-range percentages.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| {
            CorridorError::invalid_corridor(self.source.as_str(), self.destination.as_str(), reason)
        };

        if self.source.as_str().trim().is_empty() || self.destination.as_str().trim().is_empty() {
            return Err(invalid("country identifiers must not be empty".into()));
        }
        if self.source == self.destination {
            return Err(invalid("source and destination must differ".into()));
        }

        let numbers = [
            ("base_fee_percent", self.base_fee_percent),
            ("fixed_fee", self.fixed_fee),
            ("min_fee", self.min_fee),
            ("max_fee", self.max_fee),
            ("avg_time_hours", self.avg_time_hours),
            ("reliability_score", self.reliability_score),
            ("volume_capacity", self.volume_capacity),
        ];
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(invalid(format!("{} is not a finite number", field)));
            }
        }

        if !(0.0..=100.0).contains(&self.base_fee_percent) {
            return Err(invalid(format!(
                "base_fee_percent {} outside 0-100",
                self.base_fee_percent
            )));
        }
        if self.fixed_fee < 0.0 || self.min_fee < 0.0 {
            return Err(invalid("fees must not be negative".into()));
        }
        if self.max_fee < self.min_fee {
            return Err(invalid(format!(
                "max_fee {} is below min_fee {}",
                self.max_fee, self.min_fee
            )));
        }
        if self.avg_time_hours <= 0.0 {
            return Err(invalid(format!(
                "avg_time_hours must be positive, got {}",
                self.avg_time_hours
            )));
        }
        if !(0.0..=100.0).contains(&self.reliability_score) {
            return Err(invalid(format!(
                "reliability_score {} outside 0-100",
                self.reliability_score
            )));
        }
        if self.volume_capacity < 0.0 {
            return Err(invalid("volume_capacity must not be negative".into()));
        }

        Ok(())
    }
}

/// A collection of corridor records as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorridorDataset {
    pub corridors: Vec<Corridor>,
}

impl CorridorDataset {
    pub fn new(corridors: Vec<Corridor>) -> Self {
        Self { corridors }
    }

    pub fn len(&self) -> usize {
        self.corridors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corridors.is_empty()
    }

    /// Validate every record, failing on the first invalid one
    pub fn validate(&self) -> Result<()> {
        self.corridors.iter().try_for_each(Corridor::validate)
    }
}
