//! Configuration management for the optimizer
//!
//! Loads from a YAML file, or layers `config/default`, `config/local` and
//! `AIFI__*` environment variables. Everything the optimizer needs is passed
//! explicitly through [`OptimizerConfig`]; nothing below the binary reads the
//! process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use aifi_corridors::ProviderKind;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default number of intermediate countries allowed in a route
pub const DEFAULT_MAX_HOPS: usize = 2;

/// Optimizer configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Fee model training settings
    pub model: ModelConfig,

    /// Route search settings
    pub routing: RoutingConfig,

    /// Where corridor data comes from
    pub corridors: CorridorSourceConfig,

    /// Remittance contract connection settings
    pub chain: ChainConfig,
}

/// Fee model training configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of boosting rounds
    pub n_estimators: usize,

    /// Shrinkage applied to each tree
    pub learning_rate: f64,

    /// Maximum depth of each regression tree
    pub max_depth: usize,

    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,

    /// Number of synthetic training draws
    pub training_samples: usize,

    /// Seed for the training draws
    pub seed: u64,

    /// Transfer amount range for training draws (USD)
    pub min_amount: f64,
    pub max_amount: f64,

    /// Multiplicative noise half-width applied to ground-truth fees
    pub noise: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            training_samples: 5000,
            seed: 42,
            min_amount: 10.0,
            max_amount: 10_000.0,
            noise: 0.05,
        }
    }
}

/// Route search configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Intermediate countries allowed when the caller does not say
    pub default_max_hops: usize,

    /// Alternatives reported next to the best route
    pub max_alternatives: usize,

    /// Provider used for a hop when the corridor offers it
    pub default_provider: ProviderKind,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_max_hops: DEFAULT_MAX_HOPS,
            max_alternatives: 2,
            default_provider: ProviderKind::MoneyTransfer,
        }
    }
}

/// Corridor data source configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorridorSourceConfig {
    /// JSON corridor dataset; synthetic corridors are used when absent
    pub data_path: Option<PathBuf>,

    /// Seed for synthetic corridor generation
    pub synthetic_seed: u64,

    /// Probability of a direct corridor between two synthetic countries
    pub synthetic_connectivity: f64,
}

impl Default for CorridorSourceConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            synthetic_seed: 42,
            synthetic_connectivity: 0.7,
        }
    }
}

/// Remittance contract connection settings
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the chain client
    pub provider_url: String,

    /// Signing key handed to the chain client; never logged
    pub private_key: Option<String>,

    /// Contract name -> deployed address
    pub contract_addresses: HashMap<String, String>,

    /// Decimals of the transferred token
    pub token_decimals: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            provider_url: "https://public-node.testnet.rsk.co".to_string(),
            private_key: None,
            contract_addresses: HashMap::new(),
            token_decimals: 18,
        }
    }
}

impl std::fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfig")
            .field("provider_url", &self.provider_url)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("contract_addresses", &self.contract_addresses)
            .field("token_decimals", &self.token_decimals)
            .finish()
    }
}

impl ChainConfig {
    /// Address of a named contract
    ///
    /// Names match case-insensitively; the layered loader lowercases keys.
    pub fn contract_address(&self, name: &str) -> Option<&str> {
        self.contract_addresses
            .get(name)
            .or_else(|| {
                self.contract_addresses
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, address)| address)
            })
            .map(String::as_str)
    }
}

impl OptimizerConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from layered files and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Layered load with `config/default` and `config/local` resolved under `base`
    pub fn load_from<P: AsRef<Path>>(base: P) -> Result<Self> {
        let layer = |name: &str| base.as_ref().join("config").join(name).to_string_lossy().into_owned();

        let config = Config::builder()
            // Start with default values
            .add_source(File::with_name(&layer("default")).required(false))
            // Add local config (gitignored)
            .add_source(File::with_name(&layer("local")).required(false))
            // Add environment variables, e.g. AIFI__CHAIN__PROVIDER_URL
            .add_source(
                Environment::with_prefix("AIFI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let model = &self.model;
        if model.n_estimators == 0 {
            return Err(ConfigError::Message("model.n_estimators must be greater than 0".into()));
        }
        if !(model.learning_rate > 0.0 && model.learning_rate <= 1.0) {
            return Err(ConfigError::Message(format!(
                "model.learning_rate must be in (0, 1], got {}",
                model.learning_rate
            )));
        }
        if model.max_depth == 0 {
            return Err(ConfigError::Message("model.max_depth must be greater than 0".into()));
        }
        if model.min_samples_leaf == 0 {
            return Err(ConfigError::Message("model.min_samples_leaf must be greater than 0".into()));
        }
        if model.training_samples == 0 {
            return Err(ConfigError::Message("model.training_samples must be greater than 0".into()));
        }
        if !(model.min_amount >= 0.0 && model.min_amount < model.max_amount && model.max_amount.is_finite()) {
            return Err(ConfigError::Message(format!(
                "model amount range [{}, {}] is invalid",
                model.min_amount, model.max_amount
            )));
        }
        if !(0.0..1.0).contains(&model.noise) {
            return Err(ConfigError::Message(format!(
                "model.noise must be in [0, 1), got {}",
                model.noise
            )));
        }

        if !(0.0..=1.0).contains(&self.corridors.synthetic_connectivity) {
            return Err(ConfigError::Message(format!(
                "corridors.synthetic_connectivity must be in [0, 1], got {}",
                self.corridors.synthetic_connectivity
            )));
        }

        if self.chain.token_decimals > 30 {
            return Err(ConfigError::Message(format!(
                "chain.token_decimals {} is too large",
                self.chain.token_decimals
            )));
        }

        Ok(())
    }

    /// Save configuration to a YAML file (for generating examples)
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OptimizerConfig::default();

        assert_eq!(config.model.n_estimators, 100);
        assert_eq!(config.model.max_depth, 3);
        assert_eq!(config.model.training_samples, 5000);
        assert_eq!(config.routing.default_max_hops, 2);
        assert_eq!(config.routing.max_alternatives, 2);
        assert_eq!(config.routing.default_provider, ProviderKind::MoneyTransfer);
        assert!(config.corridors.data_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = OptimizerConfig::default();
        config.model.seed = 7;
        config
            .chain
            .contract_addresses
            .insert("AIFiRemittance".to_string(), "0x0000000000000000000000000000000000000001".to_string());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("optimizer.yaml");

        config.save_to_file(&path).unwrap();
        let loaded = OptimizerConfig::from_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "model:\n  n_estimators: 10\nrouting:\n  default_provider: Crypto\n";
        let config: OptimizerConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.model.n_estimators, 10);
        assert_eq!(config.model.learning_rate, 0.1);
        assert_eq!(config.routing.default_provider, ProviderKind::Crypto);
        assert_eq!(config.chain.token_decimals, 18);
    }

    #[test]
    fn test_validate_rejects_bad_model_settings() {
        let mut config = OptimizerConfig::default();
        config.model.learning_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = OptimizerConfig::default();
        config.model.min_amount = 500.0;
        config.model.max_amount = 100.0;
        assert!(config.validate().is_err());

        let mut config = OptimizerConfig::default();
        config.corridors.synthetic_connectivity = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layered_load_applies_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config").join("default.yaml"),
            "routing:\n  default_max_hops: 3\n  default_provider: Crypto\nmodel:\n  n_estimators: 40\n",
        )
        .unwrap();

        std::env::set_var("AIFI__ROUTING__DEFAULT_MAX_HOPS", "1");
        std::env::set_var(
            "AIFI__CHAIN__CONTRACT_ADDRESSES__AIFIREMITTANCE",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        );
        let loaded = OptimizerConfig::load_from(dir.path());
        std::env::remove_var("AIFI__ROUTING__DEFAULT_MAX_HOPS");
        std::env::remove_var("AIFI__CHAIN__CONTRACT_ADDRESSES__AIFIREMITTANCE");

        let config = loaded.unwrap();
        assert_eq!(config.routing.default_max_hops, 1);
        assert_eq!(config.routing.default_provider, ProviderKind::Crypto);
        assert_eq!(config.model.n_estimators, 40);
        assert_eq!(config.model.max_depth, 3);
        assert_eq!(
            config.chain.contract_address("AIFiRemittance"),
            Some("0x5FbDB2315678afecb367f032d93F642f64180aa3")
        );
    }

    #[test]
    fn test_layered_load_without_files_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = OptimizerConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.model.training_samples, 5000);
        assert_eq!(config.chain.token_decimals, 18);
    }

    #[test]
    fn test_contract_lookup_ignores_case() {
        let mut chain = ChainConfig::default();
        chain
            .contract_addresses
            .insert("aifiremittance".to_string(), "0x00000000000000000000000000000000000000a1".to_string());

        assert!(chain.contract_address("AIFiRemittance").is_some());
        assert!(chain.contract_address("Other").is_none());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let chain = ChainConfig {
            private_key: Some("deadbeef".to_string()),
            ..ChainConfig::default()
        };

        let rendered = format!("{:?}", chain);
        assert!(!rendered.contains("deadbeef"));
        assert!(rendered.contains("<redacted>"));
    }
}
