//! Synthetic training data for the fee model

use aifi_corridors::{Corridor, ProviderKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::features::{build_features, tariff_fee, FeatureVector};
use crate::config::ModelConfig;
use crate::error::{OptimizerError, Result};
use crate::types::TimeContext;

/// Feature rows and the fee observed for each
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub fees: Vec<f64>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.fees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }

    /// Observed fee relative to the tariff of each row
    ///
    /// Rows with a zero tariff get a ratio of 1.
    pub fn deviations(&self) -> Vec<f64> {
        self.features
            .iter()
            .zip(&self.fees)
            .map(|(features, fee)| deviation(*fee, tariff_fee(features)))
            .collect()
    }
}

pub(crate) fn deviation(fee: f64, tariff: f64) -> f64 {
    if tariff > 0.0 {
        fee / tariff
    } else {
        1.0
    }
}

/// Draw `config.training_samples` noisy transfers over `corridors`
///
/// Each draw picks a corridor, an amount, a time and a provider, prices the
/// transfer at the corridor tariff and perturbs it by up to `config.noise`
/// in either direction.
pub fn generate_training_set(corridors: &[Corridor], config: &ModelConfig) -> Result<TrainingSet> {
    if corridors.is_empty() {
        return Err(OptimizerError::model("cannot train the fee model without corridors"));
    }
    if config.training_samples == 0 {
        return Err(OptimizerError::model("training_samples must be greater than 0"));
    }
    if !(config.min_amount < config.max_amount) {
        return Err(OptimizerError::model(format!(
            "training amount range [{}, {}] is empty",
            config.min_amount, config.max_amount
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut set = TrainingSet {
        features: Vec::with_capacity(config.training_samples),
        fees: Vec::with_capacity(config.training_samples),
    };

    for _ in 0..config.training_samples {
        let corridor = &corridors[rng.gen_range(0..corridors.len())];
        let amount = rng.gen_range(config.min_amount..config.max_amount);
        let time = TimeContext::new(rng.gen_range(0..24), rng.gen_range(0..7));
        let provider = ProviderKind::from_ordinal(rng.gen_range(0..3)).unwrap_or_default();

        let tariff = corridor.tariff_fee(amount);
        let factor = if config.noise > 0.0 {
            rng.gen_range(1.0 - config.noise..=1.0 + config.noise)
        } else {
            1.0
        };

        set.features.push(build_features(corridor, amount, time, provider));
        set.fees.push(tariff * factor);
    }

    debug!(
        samples = set.len(),
        corridors = corridors.len(),
        seed = config.seed,
        "Generated fee training set"
    );

    Ok(set)
}
