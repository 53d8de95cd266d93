//! Solver configuration
//!
//! ## Sources (later wins)
//! 1. [`SolverConfig::default`]
//! 2. JSON file via [`SolverConfig::from_json_file`] (missing fields keep defaults)
//! 3. Environment variables `QAOA_*`, `.env` included, via [`SolverConfig::apply_env`]
//! 4. Builder methods (`with_depth`, ...) or CLI flags
//!
//! | Variable | Field |
//! |----------|-------|
//! | `QAOA_DEPTH` | `depth` |
//! | `QAOA_MAX_ITERATIONS` | `max_iterations` |
//! | `QAOA_TRAINING_SHOTS` | `training_shots` |
//! | `QAOA_EVALUATION_SHOTS` | `evaluation_shots` |
//! | `QAOA_INITIAL_VALUE` | `initial_value` |
//! | `QAOA_OPTIMIZER` | `optimizer` |
//! | `QAOA_TOLERANCE` | `tolerance` |
//! | `QAOA_SEED` | `seed` |
//! | `QAOA_SAMPLER_RETRIES` | `sampler_retries` |
//! | `QAOA_RETRY_BACKOFF_MS` | `retry_backoff_ms` |
//! | `QAOA_COMPARE_EXACT` | `compare_exact` |

use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QaoaError, Result};
use crate::optimizer::{OptimizerKind, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE};
use crate::sampler::retry::DEFAULT_BACKOFF_MS;
use crate::DEFAULT_EVALUATION_SHOTS;

/// Parameters of one solve run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Number of QAOA layers
    pub depth: usize,
    /// Optimizer iteration budget
    pub max_iterations: usize,
    /// Shots per objective evaluation during optimization
    pub training_shots: u64,
    /// Shots for the final distribution
    pub evaluation_shots: u64,
    /// Value every initial parameter starts at
    pub initial_value: f64,
    /// Minimizer
    pub optimizer: OptimizerKind,
    /// Optimizer convergence tolerance
    pub tolerance: f64,
    /// Seed for optimizer randomness
    pub seed: u64,
    /// Retries for transient sampler failures
    pub sampler_retries: usize,
    /// Fallback delay between retries
    pub retry_backoff_ms: u64,
    /// Brute-force the optimum after solving (graphs up to 20 nodes)
    pub compare_exact: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            depth: 1,
            max_iterations: DEFAULT_MAX_ITER,
            training_shots: DEFAULT_EVALUATION_SHOTS,
            evaluation_shots: DEFAULT_EVALUATION_SHOTS,
            initial_value: 1.0,
            optimizer: OptimizerKind::default(),
            tolerance: DEFAULT_TOLERANCE,
            seed: 0,
            sampler_retries: 1,
            retry_backoff_ms: DEFAULT_BACKOFF_MS,
            compare_exact: true,
        }
    }
}

impl SolverConfig {
    /// Default configuration with the given depth and iteration budget
    pub fn new(depth: usize, max_iterations: usize) -> Self {
        Self {
            depth,
            max_iterations,
            ..Self::default()
        }
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_training_shots(mut self, shots: u64) -> Self {
        self.training_shots = shots;
        self
    }

    pub fn with_evaluation_shots(mut self, shots: u64) -> Self {
        self.evaluation_shots = shots;
        self
    }

    pub fn with_initial_value(mut self, value: f64) -> Self {
        self.initial_value = value;
        self
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Retry policy for [`crate::sampler::RetryingSampler`]
    pub fn with_retries(mut self, retries: usize, backoff_ms: u64) -> Self {
        self.sampler_retries = retries;
        self.retry_backoff_ms = backoff_ms;
        self
    }

    pub fn with_compare_exact(mut self, compare_exact: bool) -> Self {
        self.compare_exact = compare_exact;
        self
    }

    /// Initial parameter vector `[initial_value; 2·depth]`
    pub fn initial_params(&self) -> Vec<f64> {
        vec![self.initial_value; crate::circuit::n_params(self.depth)]
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        debug!(path = %path.as_ref().display(), "loaded solver config");
        Ok(config)
    }

    /// Apply `QAOA_*` overrides from the process environment and `.env`
    pub fn apply_env(self) -> Result<Self> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        self.apply_env_from(|key| env::var(key).ok())
    }

    /// Apply `QAOA_*` overrides from an arbitrary lookup
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_from(&lookup, "QAOA_DEPTH", &mut self.depth)?;
        override_from(&lookup, "QAOA_MAX_ITERATIONS", &mut self.max_iterations)?;
        override_from(&lookup, "QAOA_TRAINING_SHOTS", &mut self.training_shots)?;
        override_from(&lookup, "QAOA_EVALUATION_SHOTS", &mut self.evaluation_shots)?;
        override_from(&lookup, "QAOA_INITIAL_VALUE", &mut self.initial_value)?;
        override_from(&lookup, "QAOA_OPTIMIZER", &mut self.optimizer)?;
        override_from(&lookup, "QAOA_TOLERANCE", &mut self.tolerance)?;
        override_from(&lookup, "QAOA_SEED", &mut self.seed)?;
        override_from(&lookup, "QAOA_SAMPLER_RETRIES", &mut self.sampler_retries)?;
        override_from(&lookup, "QAOA_RETRY_BACKOFF_MS", &mut self.retry_backoff_ms)?;
        override_from(&lookup, "QAOA_COMPARE_EXACT", &mut self.compare_exact)?;
        Ok(self)
    }

    /// Check values before a solve
    pub fn validate(&self) -> Result<()> {
        if self.training_shots == 0 || self.evaluation_shots == 0 {
            return Err(QaoaError::InvalidConfig(
                "shot counts must be positive".into(),
            ));
        }
        if !self.initial_value.is_finite() {
            return Err(QaoaError::InvalidConfig(format!(
                "initial value {} is not finite",
                self.initial_value
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(QaoaError::InvalidConfig(format!(
                "tolerance {} must be finite and non-negative",
                self.tolerance
            )));
        }
        Ok(())
    }
}

fn override_from<T, F>(lookup: &F, key: &str, slot: &mut T) -> Result<()>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|_| QaoaError::InvalidConfig(format!("{key}='{raw}' cannot be parsed")))?;
        debug!(key, value = %raw, "config override from environment");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.evaluation_shots, 1000);
        assert_eq!(config.initial_value, 1.0);
        assert_eq!(config.optimizer, OptimizerKind::NelderMead);
        assert!(config.compare_exact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_initial_params() {
        let config = SolverConfig::new(3, 20).with_initial_value(0.5).with_seed(9);
        assert_eq!(config.initial_params(), vec![0.5; 6]);
        assert_eq!(config.max_iterations, 20);
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn test_json_partial() {
        let config: SolverConfig =
            serde_json::from_str(r#"{"depth": 2, "optimizer": "spsa"}"#).unwrap();
        assert_eq!(config.depth, 2);
        assert_eq!(config.optimizer, OptimizerKind::Spsa);
        assert_eq!(config.evaluation_shots, 1000);
    }

    #[test]
    fn test_json_unknown_field_rejected() {
        assert!(serde_json::from_str::<SolverConfig>(r#"{"depht": 2}"#).is_err());
    }

    #[test]
    fn test_json_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("qaoa-config-{}.json", std::process::id()));
        let config = SolverConfig::new(2, 50).with_optimizer(OptimizerKind::Spsa);
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = SolverConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            SolverConfig::from_json_file("/nonexistent/qaoa.json"),
            Err(QaoaError::IoError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = SolverConfig::default()
            .apply_env_from(env_of(&[
                ("QAOA_DEPTH", "3"),
                ("QAOA_OPTIMIZER", "spsa"),
                ("QAOA_EVALUATION_SHOTS", " 2048 "),
                ("QAOA_COMPARE_EXACT", "false"),
            ]))
            .unwrap();
        assert!(!config.compare_exact);
        assert_eq!(config.depth, 3);
        assert_eq!(config.optimizer, OptimizerKind::Spsa);
        assert_eq!(config.evaluation_shots, 2048);
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITER);
    }

    #[test]
    fn test_env_bad_value() {
        let err = SolverConfig::default()
            .apply_env_from(env_of(&[("QAOA_SEED", "abc")]))
            .unwrap_err();
        assert!(matches!(err, QaoaError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects() {
        assert!(SolverConfig::default().with_training_shots(0).validate().is_err());
        assert!(SolverConfig::default().with_initial_value(f64::NAN).validate().is_err());
        assert!(SolverConfig::default().with_tolerance(-1.0).validate().is_err());
    }
}
