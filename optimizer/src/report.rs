//! Route ranking and query reports

use std::fmt;

use aifi_corridors::{Corridor, Country, FeeType, ProviderKind};
use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, Result};
use crate::fee::FeeEstimator;
use crate::types::{Route, RoutePlan, TimeContext};

/// Amounts priced in corridor stats
pub const EXAMPLE_AMOUNTS: [f64; 4] = [100.0, 500.0, 1000.0, 5000.0];

/// Message reported when a query has no candidate route
pub const NO_ROUTE_MESSAGE: &str = "No valid routes found between these countries";

/// Message reported when a stats query names no direct corridor
pub const NO_CORRIDOR_MESSAGE: &str = "No direct corridor between these countries";

/// Sort routes by total fee, cheapest first, keeping discovery order on ties
pub fn rank_routes(mut routes: Vec<Route>) -> Vec<Route> {
    routes.sort_by(|a, b| a.total_fee.total_cmp(&b.total_fee));
    routes
}

/// Build a plan from routes already ranked by [`rank_routes`]
pub fn assemble_plan(
    source: &str,
    destination: &str,
    amount: f64,
    ranked: Vec<Route>,
    max_alternatives: usize,
) -> Result<RoutePlan> {
    let mut routes = ranked.into_iter();
    let best_route = routes
        .next()
        .ok_or_else(|| OptimizerError::no_route(source, destination))?;
    let alternative_routes: Vec<Route> = routes.take(max_alternatives).collect();

    Ok(RoutePlan {
        source_country: source.into(),
        destination_country: destination.into(),
        original_amount: amount,
        amount_received: amount - best_route.total_fee,
        best_route,
        alternative_routes,
    })
}

/// Serializable outcome of a route query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub source_country: Country,
    pub destination_country: Country,
    pub original_amount: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_received: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_route: Option<Route>,

    #[serde(default)]
    pub alternative_routes: Vec<Route>,
}

impl RouteReport {
    /// Fold a query result into a report
    ///
    /// Only `NoRouteFound` becomes an unsuccessful report; any other error is
    /// passed back to the caller.
    pub fn from_outcome(
        source: &str,
        destination: &str,
        amount: f64,
        outcome: Result<RoutePlan>,
    ) -> Result<Self> {
        match outcome {
            Ok(plan) => Ok(plan.into()),
            Err(OptimizerError::NoRouteFound { .. }) => Ok(Self {
                success: false,
                message: Some(NO_ROUTE_MESSAGE.to_string()),
                source_country: source.into(),
                destination_country: destination.into(),
                original_amount: amount,
                amount_received: None,
                best_route: None,
                alternative_routes: Vec::new(),
            }),
            Err(err) => Err(err),
        }
    }
}

impl From<RoutePlan> for RouteReport {
    fn from(plan: RoutePlan) -> Self {
        Self {
            success: true,
            message: None,
            source_country: plan.source_country,
            destination_country: plan.destination_country,
            original_amount: plan.original_amount,
            amount_received: Some(plan.amount_received),
            best_route: Some(plan.best_route),
            alternative_routes: plan.alternative_routes,
        }
    }
}

impl fmt::Display for RouteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} -> {}, sending ${:.2}",
            self.source_country, self.destination_country, self.original_amount
        )?;

        let (Some(best), Some(received)) = (&self.best_route, self.amount_received) else {
            return write!(f, "{}", self.message.as_deref().unwrap_or(NO_ROUTE_MESSAGE));
        };

        let plan = RoutePlan {
            source_country: self.source_country.clone(),
            destination_country: self.destination_country.clone(),
            original_amount: self.original_amount,
            amount_received: received,
            best_route: best.clone(),
            alternative_routes: self.alternative_routes.clone(),
        };
        write!(f, "{}", plan)
    }
}

/// Fee for one example amount on a corridor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeExample {
    pub amount: f64,
    pub fee: f64,
    pub fee_percent: f64,
    pub amount_received: f64,
}

/// Summary of a single corridor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorStats {
    /// `"<source> to <destination>"`
    pub corridor: String,

    pub source: Country,
    pub destination: Country,
    pub avg_time_hours: f64,
    pub reliability_score: f64,
    pub fee_type: FeeType,

    /// Set for percentage corridors only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_fee_percent: Option<f64>,

    /// Set for fixed corridors only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_fee: Option<f64>,

    pub min_fee: f64,
    pub max_fee: f64,
    pub examples: Vec<FeeExample>,
}

impl CorridorStats {
    /// Price [`EXAMPLE_AMOUNTS`] on `corridor`
    pub fn describe(
        corridor: &Corridor,
        estimator: &FeeEstimator,
        time: TimeContext,
        provider: ProviderKind,
    ) -> Self {
        let examples = EXAMPLE_AMOUNTS
            .iter()
            .map(|&amount| {
                let fee = estimator.predict_fee(corridor, amount, time, provider);
                FeeExample {
                    amount,
                    fee,
                    fee_percent: fee / amount * 100.0,
                    amount_received: amount - fee,
                }
            })
            .collect();

        let (base_fee_percent, fixed_fee) = match corridor.fee_type {
            FeeType::Percentage => (Some(corridor.base_fee_percent), None),
            FeeType::Fixed => (None, Some(corridor.fixed_fee)),
        };

        Self {
            corridor: format!("{} to {}", corridor.source, corridor.destination),
            source: corridor.source.clone(),
            destination: corridor.destination.clone(),
            avg_time_hours: corridor.avg_time_hours,
            reliability_score: corridor.reliability_score,
            fee_type: corridor.fee_type,
            base_fee_percent,
            fixed_fee,
            min_fee: corridor.min_fee,
            max_fee: corridor.max_fee,
            examples,
        }
    }
}

impl fmt::Display for CorridorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Corridor: {}", self.corridor)?;
        writeln!(f, "Average time: {:.1} hours", self.avg_time_hours)?;
        writeln!(f, "Reliability: {:.1}%", self.reliability_score)?;
        match (self.base_fee_percent, self.fixed_fee) {
            (Some(pct), _) => writeln!(f, "Fee: {:.2}% ({})", pct, self.fee_type)?,
            (_, Some(fixed)) => writeln!(f, "Fee: ${:.2} ({})", fixed, self.fee_type)?,
            _ => writeln!(f, "Fee type: {}", self.fee_type)?,
        }
        write!(f, "Fee bounds: ${:.2} - ${:.2}", self.min_fee, self.max_fee)?;

        for example in &self.examples {
            write!(
                f,
                "\n  ${:.0}: fee ${:.2} ({:.2}%), receives ${:.2}",
                example.amount, example.fee, example.fee_percent, example.amount_received
            )?;
        }
        Ok(())
    }
}

/// Serializable outcome of a corridor stats query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorStatsReport {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub source: Country,
    pub destination: Country,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CorridorStats>,
}

impl CorridorStatsReport {
    /// Fold a stats lookup into a report; only `NoCorridor` becomes unsuccessful
    pub fn from_outcome(source: &str, destination: &str, outcome: Result<CorridorStats>) -> Result<Self> {
        match outcome {
            Ok(stats) => Ok(Self {
                success: true,
                message: None,
                source: stats.source.clone(),
                destination: stats.destination.clone(),
                stats: Some(stats),
            }),
            Err(OptimizerError::NoCorridor { .. }) => Ok(Self {
                success: false,
                message: Some(NO_CORRIDOR_MESSAGE.to_string()),
                source: source.into(),
                destination: destination.into(),
                stats: None,
            }),
            Err(err) => Err(err),
        }
    }
}

impl fmt::Display for CorridorStatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stats {
            Some(stats) => write!(f, "{}", stats),
            None => write!(
                f,
                "{} -> {}: {}",
                self.source,
                self.destination,
                self.message.as_deref().unwrap_or(NO_CORRIDOR_MESSAGE)
            ),
        }
    }
}
