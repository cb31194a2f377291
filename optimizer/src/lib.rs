//! # AIFi Remittance Optimizer
//!
//! Finds the cheapest way to move money between two countries over a network
//! of remittance corridors. A gradient-boosted fee model prices each hop, and
//! multi-hop routes are priced on the amount left after earlier fees.

pub mod config;
pub mod error;
pub mod fee;
pub mod intent;
pub mod optimizer;
pub mod report;
pub mod router;
pub mod types;

// Re-export commonly used types
pub use config::{ChainConfig, OptimizerConfig};
pub use error::{OptimizerError, Result};
pub use fee::{FeeEstimator, FeeModel};
pub use intent::{TransferIntent, TransferIntentBuilder};
pub use optimizer::RemittanceOptimizer;
pub use report::{CorridorStats, CorridorStatsReport, RouteReport};
pub use types::*;

/// Current version of the optimizer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
