//! Fee estimation
//!
//! A gradient-boosted regression model trained once on synthetic transfers
//! predicts the fee for a single corridor hop.

pub mod estimator;
pub mod features;
pub mod model;
pub mod training;

pub use estimator::{FeeEstimator, FeeModel};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use model::{BoostingParams, GradientBoostedRegressor, RegressionTree};
pub use training::{generate_training_set, TrainingSet};
