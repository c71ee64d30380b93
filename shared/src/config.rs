//! Experiment file loading
//!
//! Reads a YAML experiment document and returns a validated [`Experiment`].

use std::path::Path;

use crate::errors::{ConfigError, ConfigResult};
use crate::experiment::Experiment;

pub const DEFAULT_CONFIG_PATH: &str = "experiment.yaml";

/// Parse and validate an experiment from YAML text
pub fn parse_experiment(yaml: &str) -> ConfigResult<Experiment> {
    let experiment: Experiment = serde_yaml::from_str(yaml)?;
    experiment.validate()
}

/// Read, parse and validate an experiment file
pub fn load_experiment(path: impl AsRef<Path>) -> ConfigResult<Experiment> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_experiment(&yaml)
}
