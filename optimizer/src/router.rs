//! Route search over the corridor graph
//!
//! Prices the direct corridor and every simple multi-hop path within the hop
//! limit. Each hop is priced on what is left after the previous hops' fees.

use aifi_corridors::{Corridor, CorridorGraph, ProviderKind};
use tracing::{debug, instrument};

use crate::config::RoutingConfig;
use crate::error::{OptimizerError, Result};
use crate::fee::FeeEstimator;
use crate::report::{assemble_plan, rank_routes};
use crate::types::{Route, RoutePlan, TimeContext};

/// A single route query against a graph and fee model
pub struct RouteSearch<'a> {
    graph: &'a CorridorGraph,
    estimator: &'a FeeEstimator,
    routing: &'a RoutingConfig,
}

impl<'a> RouteSearch<'a> {
    pub fn new(graph: &'a CorridorGraph, estimator: &'a FeeEstimator, routing: &'a RoutingConfig) -> Self {
        Self {
            graph,
            estimator,
            routing,
        }
    }

    /// Cheapest route from `source` to `destination` with at most
    /// `max_hops` intermediate countries
    #[instrument(skip(self, time), fields(hour = time.hour_of_day, day = time.day_of_week))]
    pub fn find(
        &self,
        source: &str,
        destination: &str,
        amount: f64,
        max_hops: usize,
        time: TimeContext,
    ) -> Result<RoutePlan> {
        validate_query(source, destination, amount)?;

        let candidates = self.candidates(source, destination, amount, max_hops, time);
        debug!(candidates = candidates.len(), "Route candidates priced");

        if candidates.is_empty() {
            return Err(OptimizerError::no_route(source, destination));
        }

        let ranked = rank_routes(candidates);
        assemble_plan(source, destination, amount, ranked, self.routing.max_alternatives)
    }

    /// Every resolvable route, direct corridor first
    pub fn candidates(
        &self,
        source: &str,
        destination: &str,
        amount: f64,
        max_hops: usize,
        time: TimeContext,
    ) -> Vec<Route> {
        let mut candidates = Vec::new();

        if self.graph.has_edge(source, destination) {
            let direct = [source, destination];
            if let Some(route) = self.evaluate_path(&direct, amount, time) {
                candidates.push(route);
            }
        }

        if max_hops >= 1 {
            for path in self.graph.all_simple_paths(source, destination, max_hops.saturating_add(2)) {
                if path.len() <= 2 {
                    continue;
                }
                let hops: Vec<&str> = path.iter().map(|c| c.as_str()).collect();
                if let Some(route) = self.evaluate_path(&hops, amount, time) {
                    candidates.push(route);
                }
            }
        }

        candidates
    }

    /// Price a path hop by hop, or `None` if any hop cannot be priced
    pub fn evaluate_path(&self, path: &[&str], amount: f64, time: TimeContext) -> Option<Route> {
        if path.len() < 2 {
            return None;
        }

        let mut remaining = amount;
        let mut fees = Vec::with_capacity(path.len() - 1);
        let mut providers = Vec::with_capacity(path.len() - 1);
        let mut estimated_time = 0.0;
        let mut reliability = 1.0;

        for hop in path.windows(2) {
            let Some(corridor) = self.graph.get_edge(hop[0], hop[1]) else {
                debug!(from = hop[0], to = hop[1], "Dropping path with missing corridor");
                return None;
            };

            let provider = self.provider_for(corridor);
            let fee = self.estimator.predict_fee(corridor, remaining, time, provider);
            if !fee.is_finite() {
                debug!(from = hop[0], to = hop[1], "Dropping path with unpriceable hop");
                return None;
            }

            remaining -= fee;
            estimated_time += corridor.avg_time_hours;
            reliability *= corridor.reliability_score / 100.0;
            fees.push(fee);
            providers.push(provider);
        }

        let total_fee: f64 = fees.iter().sum();
        Some(Route {
            path: path.iter().map(|c| (*c).into()).collect(),
            fees,
            total_fee,
            fee_percent: total_fee / amount * 100.0,
            estimated_time,
            reliability: reliability * 100.0,
            providers,
        })
    }

    /// Provider priced on a hop
    ///
    /// The configured default when the corridor offers it or lists no
    /// providers, otherwise the lowest-ordinal provider offered.
    pub fn provider_for(&self, corridor: &Corridor) -> ProviderKind {
        let preferred = self.routing.default_provider;
        if corridor.providers.is_empty() || corridor.supports(preferred) {
            preferred
        } else {
            corridor.providers.iter().next().copied().unwrap_or(preferred)
        }
    }
}

/// Reject queries no route could answer
pub fn validate_query(source: &str, destination: &str, amount: f64) -> Result<()> {
    if source.trim().is_empty() || destination.trim().is_empty() {
        return Err(OptimizerError::invalid_query("country must not be empty"));
    }
    if source == destination {
        return Err(OptimizerError::invalid_query(format!(
            "source and destination are both {}",
            source
        )));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(OptimizerError::invalid_query(format!(
            "amount must be a positive number, got {}",
            amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    fn estimator(corridors: &[Corridor]) -> FeeEstimator {
        let config = ModelConfig {
            n_estimators: 20,
            training_samples: 400,
            ..ModelConfig::default()
        };
        FeeEstimator::train(corridors, &config).unwrap()
    }

    fn fixture() -> (CorridorGraph, FeeEstimator) {
        let corridors = vec![
            Corridor::percentage("US", "MEX", 2.0, 2.0, 100.0).with_time(6.0).with_reliability(98.0),
            Corridor::percentage("MEX", "PHL", 1.0, 1.0, 100.0).with_time(12.0).with_reliability(90.0),
            Corridor::fixed("US", "IND", 8.0, 5.0, 40.0),
            Corridor::fixed("IND", "PHL", 8.0, 5.0, 40.0),
        ];
        let estimator = estimator(&corridors);
        (CorridorGraph::from_corridors(corridors).unwrap(), estimator)
    }

    #[test]
    fn test_evaluate_path_prices_on_remaining_amount() {
        let (graph, estimator) = fixture();
        let routing = RoutingConfig::default();
        let search = RouteSearch::new(&graph, &estimator, &routing);
        let time = TimeContext::new(10, 1);

        let route = search.evaluate_path(&["US", "MEX", "PHL"], 1000.0, time).unwrap();

        let hop1 = estimator.predict_fee(graph.get_edge("US", "MEX").unwrap(), 1000.0, time, ProviderKind::MoneyTransfer);
        let hop2 =
            estimator.predict_fee(graph.get_edge("MEX", "PHL").unwrap(), 1000.0 - hop1, time, ProviderKind::MoneyTransfer);

        assert_eq!(route.fees, vec![hop1, hop2]);
        assert_eq!(route.total_fee, hop1 + hop2);
        assert_eq!(route.estimated_time, 18.0);
        assert!((route.reliability - 88.2).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_path_drops_missing_hop() {
        let (graph, estimator) = fixture();
        let routing = RoutingConfig::default();
        let search = RouteSearch::new(&graph, &estimator, &routing);

        assert!(search.evaluate_path(&["US", "PHL", "MEX"], 1000.0, TimeContext::new(0, 0)).is_none());
    }

    #[test]
    fn test_hop_limit() {
        let (graph, estimator) = fixture();
        let routing = RoutingConfig::default();
        let search = RouteSearch::new(&graph, &estimator, &routing);
        let time = TimeContext::new(0, 0);

        assert!(search.candidates("US", "PHL", 500.0, 0, time).is_empty());
        assert_eq!(search.candidates("US", "PHL", 500.0, 1, time).len(), 2);
    }

    #[test]
    fn test_provider_selection() {
        let (graph, estimator) = fixture();
        let routing = RoutingConfig::default();
        let search = RouteSearch::new(&graph, &estimator, &routing);

        let all = Corridor::percentage("A", "B", 1.0, 0.0, 10.0);
        let none = all.clone().with_providers(Vec::new());
        let bank_and_crypto = all.clone().with_providers([ProviderKind::Crypto, ProviderKind::Bank]);
        let crypto = all.clone().with_providers([ProviderKind::Crypto]);

        assert_eq!(search.provider_for(&all), ProviderKind::MoneyTransfer);
        assert_eq!(search.provider_for(&none), ProviderKind::MoneyTransfer);
        assert_eq!(search.provider_for(&bank_and_crypto), ProviderKind::Bank);
        assert_eq!(search.provider_for(&crypto), ProviderKind::Crypto);
    }

    #[test]
    fn test_validate_query() {
        assert!(validate_query("US", "MEX", 100.0).is_ok());
        assert!(validate_query("US", "US", 100.0).is_err());
        assert!(validate_query("US", "MEX", 0.0).is_err());
        assert!(validate_query("US", "MEX", -5.0).is_err());
        assert!(validate_query("US", "MEX", f64::NAN).is_err());
        assert!(validate_query("", "MEX", 10.0).is_err());
    }
}
