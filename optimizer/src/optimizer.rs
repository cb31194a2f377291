//! Remittance optimizer facade
//!
//! Owns the corridor graph and the trained fee model. Both are immutable
//! after construction, so one optimizer can serve queries from many threads.

use std::path::Path;

use aifi_corridors::{CorridorDataset, CorridorGraph, ProviderKind, SyntheticCorridorGenerator};
use tracing::{info, warn};

use crate::config::OptimizerConfig;
use crate::error::{OptimizerError, Result};
use crate::fee::FeeEstimator;
use crate::report::{CorridorStats, RouteReport};
use crate::router::RouteSearch;
use crate::types::{RoutePlan, TimeContext};

/// Route and fee queries over a fixed corridor network
#[derive(Debug, Clone)]
pub struct RemittanceOptimizer {
    graph: CorridorGraph,
    estimator: FeeEstimator,
    config: OptimizerConfig,

    /// Fixed pricing time; the local clock is used when unset
    pricing_time: Option<TimeContext>,
}

impl RemittanceOptimizer {
    /// Load corridors per `config.corridors` and train the fee model
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        let generator = SyntheticCorridorGenerator::new(config.corridors.synthetic_seed)
            .with_connectivity(config.corridors.synthetic_connectivity);
        let dataset = CorridorDataset::load_or_generate(config.corridors.data_path.as_deref(), &generator)?;
        Self::from_dataset(dataset, config)
    }

    /// Build from an in-memory dataset, training the fee model on it
    pub fn from_dataset(dataset: CorridorDataset, config: OptimizerConfig) -> Result<Self> {
        dataset.validate()?;
        let estimator = FeeEstimator::train(&dataset.corridors, &config.model)?;
        Self::with_estimator(dataset, estimator, config)
    }

    /// Build from a dataset and an already trained fee model
    pub fn with_estimator(dataset: CorridorDataset, estimator: FeeEstimator, config: OptimizerConfig) -> Result<Self> {
        let graph = CorridorGraph::from_corridors(dataset.corridors)?;
        if graph.edge_count() == 0 {
            warn!("Optimizer built with an empty corridor network");
        }

        info!(
            countries = graph.node_count(),
            corridors = graph.edge_count(),
            "Remittance optimizer ready"
        );

        Ok(Self {
            graph,
            estimator,
            config,
            pricing_time: None,
        })
    }

    /// Price every query at `time` instead of the local clock
    pub fn with_pricing_time(mut self, time: TimeContext) -> Self {
        self.pricing_time = Some(time);
        self
    }

    pub fn graph(&self) -> &CorridorGraph {
        &self.graph
    }

    pub fn estimator(&self) -> &FeeEstimator {
        &self.estimator
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Time context used for queries without an explicit one
    pub fn time_context(&self) -> TimeContext {
        self.pricing_time.unwrap_or_else(TimeContext::now)
    }

    /// Predicted fee for one corridor
    pub fn predict_fee(
        &self,
        source: &str,
        destination: &str,
        amount: f64,
        time: TimeContext,
        provider: ProviderKind,
    ) -> Result<f64> {
        let corridor = self
            .graph
            .get_edge(source, destination)
            .ok_or_else(|| OptimizerError::no_corridor(source, destination))?;
        Ok(self.estimator.predict_fee(corridor, amount, time, provider))
    }

    /// Cheapest route with at most `max_hops` intermediate countries
    pub fn find_optimal_route(
        &self,
        source: &str,
        destination: &str,
        amount: f64,
        max_hops: Option<usize>,
    ) -> Result<RoutePlan> {
        self.find_optimal_route_at(source, destination, amount, max_hops, self.time_context())
    }

    pub fn find_optimal_route_at(
        &self,
        source: &str,
        destination: &str,
        amount: f64,
        max_hops: Option<usize>,
        time: TimeContext,
    ) -> Result<RoutePlan> {
        let max_hops = max_hops.unwrap_or(self.config.routing.default_max_hops);
        RouteSearch::new(&self.graph, &self.estimator, &self.config.routing).find(
            source,
            destination,
            amount,
            max_hops,
            time,
        )
    }

    /// Route query folded into a report; a missing route is not an error
    pub fn route_report(
        &self,
        source: &str,
        destination: &str,
        amount: f64,
        max_hops: Option<usize>,
    ) -> Result<RouteReport> {
        let outcome = self.find_optimal_route(source, destination, amount, max_hops);
        RouteReport::from_outcome(source, destination, amount, outcome)
    }

    /// Fee examples and attributes of one corridor
    pub fn describe_corridor_stats(&self, source: &str, destination: &str) -> Result<CorridorStats> {
        self.describe_corridor_stats_at(source, destination, self.time_context())
    }

    pub fn describe_corridor_stats_at(
        &self,
        source: &str,
        destination: &str,
        time: TimeContext,
    ) -> Result<CorridorStats> {
        let corridor = self
            .graph
            .get_edge(source, destination)
            .ok_or_else(|| OptimizerError::no_corridor(source, destination))?;
        let provider = RouteSearch::new(&self.graph, &self.estimator, &self.config.routing).provider_for(corridor);
        Ok(CorridorStats::describe(corridor, &self.estimator, time, provider))
    }

    /// Write the trained fee model as JSON
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.estimator.save_to_file(path)
    }
}
