//! Runtime configuration, loaded from JSON.
//!
//! Every field has a default, so `{}` is a valid configuration that
//! reproduces the built-in behaviour.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::process::{AccelFrame, PRESSURE_NOISE_STD};
use crate::sigma_points::MerweScaled;
use crate::unscented::UnscentedTransform;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Sigma point and mean parameters of the unscented transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub alpha: f64,
    pub beta: f64,
    pub kappa: f64,
    pub regularization: f64,
    pub mean_tolerance: f64,
    pub max_mean_iterations: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 2.0,
            kappa: 0.0,
            regularization: 1e-9,
            mean_tolerance: 1e-12,
            max_mean_iterations: 100,
        }
    }
}

impl TransformConfig {
    pub fn build(&self) -> UnscentedTransform<f64> {
        UnscentedTransform::new(MerweScaled::new(self.alpha, self.beta, self.kappa))
            .with_regularization_factor(self.regularization)
            .with_mean_tolerance(self.mean_tolerance, self.max_mean_iterations)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub accel_frame: AccelFrame,
    /// Standard deviation of the pressure random walk, per sqrt(second).
    pub pressure_noise_std: f64,
    /// Longest single integration step, seconds. Longer gaps are split.
    pub max_dt: f64,
    /// Parent frame of published odometry.
    pub frame_id: String,
    pub child_frame_id: String,
    pub transform: TransformConfig,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            accel_frame: AccelFrame::default(),
            pressure_noise_std: PRESSURE_NOISE_STD,
            max_dt: 1.0,
            frame_id: "ecef".to_string(),
            child_frame_id: "base_link".to_string(),
            transform: TransformConfig::default(),
        }
    }
}

impl EstimatorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        };

        positive("max_dt", self.max_dt)?;
        positive("transform.alpha", self.transform.alpha)?;
        positive("transform.mean_tolerance", self.transform.mean_tolerance)?;

        if !(self.pressure_noise_std.is_finite() && self.pressure_noise_std >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pressure_noise_std must be non-negative, got {}",
                self.pressure_noise_std
            )));
        }
        if !(self.transform.regularization.is_finite() && self.transform.regularization >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "transform.regularization must be non-negative, got {}",
                self.transform.regularization
            )));
        }
        if !self.transform.beta.is_finite() || !self.transform.kappa.is_finite() {
            return Err(ConfigError::Invalid("transform.beta and transform.kappa must be finite".into()));
        }
        if self.transform.max_mean_iterations == 0 {
            return Err(ConfigError::Invalid("transform.max_mean_iterations must be at least 1".into()));
        }
        Ok(())
    }
}
