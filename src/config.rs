//! Scorer configuration
//!
//! The threshold and effective-time aggregation are the only knobs the scorer has.
//! Configuration is plain data: the library never reads the process environment.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default attention threshold for effective learning time
pub const DEFAULT_THRESHOLD: f64 = 70.0;

/// How qualifying attention samples are aggregated into the headline metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveTimeMode {
    /// Number of samples above the threshold (seconds)
    #[default]
    Count,
    /// Sum of the attention scores above the threshold
    ValueSum,
}

impl EffectiveTimeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveTimeMode::Count => "count",
            EffectiveTimeMode::ValueSum => "value_sum",
        }
    }
}

impl fmt::Display for EffectiveTimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectiveTimeMode {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "count" => Ok(EffectiveTimeMode::Count),
            "value_sum" | "sum" => Ok(EffectiveTimeMode::ValueSum),
            other => Err(ComputeError::InvalidConfig(format!(
                "unknown effective time mode '{other}' (expected count or value_sum)"
            ))),
        }
    }
}

/// Settings applied when scoring a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Attention scores strictly above this count as effective learning
    pub threshold: f64,
    /// Aggregation reported as the effective learning metric
    pub mode: EffectiveTimeMode,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            mode: EffectiveTimeMode::Count,
        }
    }
}

impl ScorerConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_mode(mut self, mode: EffectiveTimeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check the configuration before it is applied to a session
    pub fn validate(&self) -> Result<(), ComputeError> {
        validate_threshold(self.threshold).map(|_| ())
    }

    /// Load configuration from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Reject thresholds that cannot be compared against scores
pub fn validate_threshold(threshold: f64) -> Result<f64, ComputeError> {
    if threshold.is_finite() {
        Ok(threshold)
    } else {
        Err(ComputeError::InvalidThreshold(threshold))
    }
}
