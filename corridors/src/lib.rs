//! # AIFi Corridors
//!
//! The corridor layer of the AIFi remittance optimizer - holds the directed
//! network of remittance channels between countries, validates corridor
//! records, and loads or synthesizes corridor datasets.

pub mod error;
pub mod graph;
pub mod loader;
pub mod synthetic;
pub mod types;

// Re-export commonly used types
pub use error::{CorridorError, Result};
pub use graph::{CorridorGraph, SimplePaths};
pub use synthetic::SyntheticCorridorGenerator;
pub use types::*;

/// Current version of the corridor layer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How a corridor charges for a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FeeType {
    #[serde(rename = "percentage")]
    Percentage,
    #[serde(rename = "fixed")]
    Fixed,
}

impl FeeType {
    /// Get the human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            FeeType::Percentage => "percentage",
            FeeType::Fixed => "fixed",
        }
    }

    /// Numeric indicator used as a model feature (1 = percentage)
    pub fn indicator(&self) -> f64 {
        match self {
            FeeType::Percentage => 1.0,
            FeeType::Fixed => 0.0,
        }
    }
}

impl std::fmt::Display for FeeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for FeeType {
    type Err = CorridorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "percentage" | "percent" | "pct" => Ok(FeeType::Percentage),
            "fixed" | "flat" => Ok(FeeType::Fixed),
            _ => Err(CorridorError::InvalidFeeType(s.to_string())),
        }
    }
}

/// Kind of provider operating a corridor
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum ProviderKind {
    Bank,
    MoneyTransfer,
    Crypto,
}

impl ProviderKind {
    /// All provider kinds in ordinal order
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Bank,
        ProviderKind::MoneyTransfer,
        ProviderKind::Crypto,
    ];

    /// Ordinal used as a model feature
    pub fn ordinal(&self) -> u8 {
        match self {
            ProviderKind::Bank => 0,
            ProviderKind::MoneyTransfer => 1,
            ProviderKind::Crypto => 2,
        }
    }

    /// Provider kind for an ordinal, if any
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Get the human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Bank => "Bank",
            ProviderKind::MoneyTransfer => "MoneyTransfer",
            ProviderKind::Crypto => "Crypto",
        }
    }
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::MoneyTransfer
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = CorridorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "bank" => Ok(ProviderKind::Bank),
            "moneytransfer" | "mto" => Ok(ProviderKind::MoneyTransfer),
            "crypto" => Ok(ProviderKind::Crypto),
            _ => Err(CorridorError::InvalidProvider(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse_is_case_insensitive() {
        assert_eq!("bank".parse::<ProviderKind>().unwrap(), ProviderKind::Bank);
        assert_eq!(
            "Money_Transfer".parse::<ProviderKind>().unwrap(),
            ProviderKind::MoneyTransfer
        );
        assert_eq!("CRYPTO".parse::<ProviderKind>().unwrap(), ProviderKind::Crypto);
        assert!("carrier pigeon".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_ordinals() {
        for (i, kind) in ProviderKind::ALL.iter().enumerate() {
            assert_eq!(kind.ordinal() as usize, i);
            assert_eq!(ProviderKind::from_ordinal(i as u8), Some(*kind));
        }
        assert_eq!(ProviderKind::from_ordinal(3), None);
    }

    #[test]
    fn test_fee_type_serde_names() {
        let json = serde_json::to_string(&FeeType::Percentage).unwrap();
        assert_eq!(json, "\"percentage\"");
        let parsed: FeeType = serde_json::from_str("\"fixed\"").unwrap();
        assert_eq!(parsed, FeeType::Fixed);
        assert_eq!(FeeType::Percentage.indicator(), 1.0);
        assert_eq!(FeeType::Fixed.indicator(), 0.0);
    }
}
