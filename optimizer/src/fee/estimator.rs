//! Fee estimator backed by a trained model

use std::path::Path;

use aifi_corridors::{Corridor, ProviderKind};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::features::{build_features, tariff_fee};
use super::model::{BoostingParams, GradientBoostedRegressor};
use super::training::generate_training_set;
use crate::config::ModelConfig;
use crate::error::Result;
use crate::types::TimeContext;

/// Serialized form of a trained fee model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeModel {
    /// Crate version that trained the model
    pub version: String,

    pub seed: u64,
    pub training_samples: usize,

    /// Regressor over the observed-to-tariff fee ratio
    pub regressor: GradientBoostedRegressor,
}

impl FeeModel {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        model.regressor.validate()?;
        Ok(model)
    }
}

/// Predicts per-hop fees
///
/// The regressor learns how far observed fees stray from each corridor's
/// tariff. A prediction is the tariff scaled by that ratio, clamped to the
/// corridor's fee bounds.
#[derive(Debug, Clone)]
pub struct FeeEstimator {
    model: FeeModel,
}

impl FeeEstimator {
    /// Train a model on synthetic transfers over `corridors`
    pub fn train(corridors: &[Corridor], config: &ModelConfig) -> Result<Self> {
        let set = generate_training_set(corridors, config)?;
        let params = BoostingParams {
            n_estimators: config.n_estimators,
            learning_rate: config.learning_rate,
            max_depth: config.max_depth,
            min_samples_leaf: config.min_samples_leaf,
        };

        let regressor = GradientBoostedRegressor::fit(&set.features, &set.deviations(), params)?;

        info!(
            samples = set.len(),
            trees = regressor.tree_count(),
            corridors = corridors.len(),
            "Fee model trained"
        );

        Ok(Self::new(FeeModel {
            version: crate::VERSION.to_string(),
            seed: config.seed,
            training_samples: set.len(),
            regressor,
        }))
    }

    pub fn new(model: FeeModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &FeeModel {
        &self.model
    }

    /// Fee for moving `amount` over `corridor`
    ///
    /// Always within `[corridor.min_fee, corridor.max_fee]`.
    pub fn predict_fee(
        &self,
        corridor: &Corridor,
        amount: f64,
        time: TimeContext,
        provider: ProviderKind,
    ) -> f64 {
        let features = build_features(corridor, amount, time, provider);
        let ratio = self.model.regressor.predict(&features);
        corridor.clamp_fee(tariff_fee(&features) * ratio)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.model.to_json()?)?;
        info!(path = %path.as_ref().display(), "Fee model saved");
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let model = FeeModel::from_json(&content)?;
        info!(
            path = %path.as_ref().display(),
            version = %model.version,
            "Fee model loaded"
        );
        Ok(Self::new(model))
    }
}
