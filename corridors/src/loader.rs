//! Corridor dataset loading and persistence
//!
//! Datasets are JSON documents of the form `{"corridors": [...]}`. When no
//! dataset file is available a synthetic one is generated instead.

use std::path::Path;
use tracing::{info, warn};

use crate::synthetic::SyntheticCorridorGenerator;
use crate::types::CorridorDataset;
use crate::Result;

impl CorridorDataset {
    /// Load and validate a dataset from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let dataset = Self::from_json(&content)?;

        info!(
            path = %path.as_ref().display(),
            corridors = dataset.len(),
            "Loaded corridor dataset"
        );
        Ok(dataset)
    }

    /// Parse and validate a dataset from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Save the dataset as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from `path` if it exists, otherwise synthesize a dataset
    pub fn load_or_generate(path: Option<&Path>, generator: &SyntheticCorridorGenerator) -> Result<Self> {
        if let Some(path) = path {
            if path.exists() {
                return Self::from_file(path);
            }
            warn!(
                path = %path.display(),
                "Corridor data file not found, falling back to synthetic corridors"
            );
        }

        let dataset = generator.generate();
        info!(
            corridors = dataset.len(),
            seed = generator.seed,
            "Generated synthetic corridor dataset"
        );
        Ok(dataset)
    }
}
