//! Transfer intent builder
//!
//! Converts a route plan into the unsigned `initiateTransfer` call a chain
//! client submits to the remittance contract. Signing and submission happen
//! elsewhere.

use aifi_corridors::Country;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::ChainConfig;
use crate::error::{OptimizerError, Result};
use crate::types::RoutePlan;

/// Contract name looked up in `ChainConfig::contract_addresses`
pub const REMITTANCE_CONTRACT: &str = "AIFiRemittance";

/// Contract method invoked by a transfer intent
pub const INITIATE_TRANSFER: &str = "initiateTransfer";

/// An unsigned remittance contract call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferIntent {
    pub id: Uuid,
    pub contract_address: String,
    pub method: String,
    pub token_address: String,

    /// Amount in the token's smallest unit, as a decimal string
    pub amount: String,

    pub recipient_id: String,
    pub origin_country: Country,
    pub destination_country: Country,

    /// Route the transfer is expected to take
    pub route: Vec<Country>,

    pub expected_fee: f64,
    pub expected_received: f64,

    /// Endpoint the intent is meant for
    pub provider_url: String,

    pub created_at: DateTime<Utc>,
}

/// Builds transfer intents against one chain configuration
pub struct TransferIntentBuilder<'a> {
    chain: &'a ChainConfig,
}

impl<'a> TransferIntentBuilder<'a> {
    pub fn new(chain: &'a ChainConfig) -> Self {
        Self { chain }
    }

    /// Build the `initiateTransfer` call for the best route of `plan`
    pub fn build(&self, plan: &RoutePlan, token_address: &str, recipient_id: &str) -> Result<TransferIntent> {
        let contract_address = self.chain.contract_address(REMITTANCE_CONTRACT).ok_or_else(|| {
            OptimizerError::Config(config::ConfigError::Message(format!(
                "no address configured for contract {}",
                REMITTANCE_CONTRACT
            )))
        })?;

        if !is_valid_address(contract_address) {
            return Err(OptimizerError::intent(format!(
                "invalid contract address {}",
                contract_address
            )));
        }
        if !is_valid_address(token_address) {
            return Err(OptimizerError::intent(format!("invalid token address {}", token_address)));
        }
        if recipient_id.trim().is_empty() {
            return Err(OptimizerError::intent("recipient id must not be empty"));
        }

        let amount = to_smallest_unit(plan.original_amount, self.chain.token_decimals)?;

        let intent = TransferIntent {
            id: Uuid::new_v4(),
            contract_address: contract_address.to_string(),
            method: INITIATE_TRANSFER.to_string(),
            token_address: token_address.to_string(),
            amount: amount.to_string(),
            recipient_id: recipient_id.to_string(),
            origin_country: plan.source_country.clone(),
            destination_country: plan.destination_country.clone(),
            route: plan.best_route.path.clone(),
            expected_fee: plan.best_route.total_fee,
            expected_received: plan.amount_received,
            provider_url: self.chain.provider_url.clone(),
            created_at: Utc::now(),
        };

        info!(
            intent_id = %intent.id,
            route = %plan.best_route.path_display(),
            amount = %intent.amount,
            "Transfer intent built"
        );

        Ok(intent)
    }
}

/// `0x` followed by 40 hex digits
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Convert a token amount to integer units with `decimals` decimal places
///
/// Digits beyond `decimals` are truncated.
pub fn to_smallest_unit(amount: f64, decimals: u32) -> Result<u128> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(OptimizerError::intent(format!(
            "cannot convert amount {} to token units",
            amount
        )));
    }
    if amount == 0.0 {
        return Ok(0);
    }

    let text = amount.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let decimals = decimals as usize;
    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.extend(fraction.chars().chain(std::iter::repeat('0')).take(decimals));

    digits
        .parse::<u128>()
        .map_err(|e| OptimizerError::intent(format!("amount {} overflows token units: {}", amount, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Route;
    use aifi_corridors::ProviderKind;

    const CONTRACT: &str = "0x00000000000000000000000000000000000000a1";
    const TOKEN: &str = "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6";

    fn plan() -> RoutePlan {
        RoutePlan {
            source_country: "US".into(),
            destination_country: "PHL".into(),
            original_amount: 1000.5,
            amount_received: 975.5,
            best_route: Route {
                path: vec!["US".into(), "MEX".into(), "PHL".into()],
                fees: vec![20.0, 5.0],
                total_fee: 25.0,
                fee_percent: 2.5,
                estimated_time: 18.0,
                reliability: 88.2,
                providers: vec![ProviderKind::MoneyTransfer; 2],
            },
            alternative_routes: Vec::new(),
        }
    }

    fn chain() -> ChainConfig {
        let mut chain = ChainConfig::default();
        chain
            .contract_addresses
            .insert(REMITTANCE_CONTRACT.to_string(), CONTRACT.to_string());
        chain
    }

    #[test]
    fn test_build_intent() {
        let chain = chain();
        let intent = TransferIntentBuilder::new(&chain).build(&plan(), TOKEN, "recipient-7").unwrap();

        assert_eq!(intent.contract_address, CONTRACT);
        assert_eq!(intent.method, "initiateTransfer");
        assert_eq!(intent.amount, "1000500000000000000000");
        assert_eq!(intent.route.len(), 3);
        assert_eq!(intent.origin_country.as_str(), "US");
        assert_eq!(intent.destination_country.as_str(), "PHL");
        assert_eq!(intent.expected_fee, 25.0);
    }

    #[test]
    fn test_missing_contract_is_config_error() {
        let chain = ChainConfig::default();
        let err = TransferIntentBuilder::new(&chain).build(&plan(), TOKEN, "r").unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_rejects_bad_token_address() {
        let chain = chain();
        let builder = TransferIntentBuilder::new(&chain);

        assert!(builder.build(&plan(), "0x1234", "r").is_err());
        assert!(builder.build(&plan(), TOKEN, "  ").is_err());
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address(CONTRACT));
        assert!(is_valid_address(TOKEN));
        assert!(!is_valid_address("742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6aa"));
        assert!(!is_valid_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8bg"));
    }

    #[test]
    fn test_smallest_unit_conversion() {
        assert_eq!(to_smallest_unit(0.0, 18).unwrap(), 0);
        assert_eq!(to_smallest_unit(1.0, 6).unwrap(), 1_000_000);
        assert_eq!(to_smallest_unit(0.1, 18).unwrap(), 100_000_000_000_000_000);
        assert_eq!(to_smallest_unit(12.3456, 2).unwrap(), 1234);
        assert_eq!(to_smallest_unit(250.0, 0).unwrap(), 250);
        assert!(to_smallest_unit(-1.0, 18).is_err());
        assert!(to_smallest_unit(f64::INFINITY, 18).is_err());
    }
}
