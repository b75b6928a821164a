//! Input Configuration

use fos_motion::DEFAULT_POOL_CAPACITY;
use fos_velocity::{AgeWeighting, DEFAULT_STRATEGY};
use serde::{Deserialize, Serialize};

use crate::InputError;

/// Input layer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Velocity tracking
    pub velocity: VelocityConfig,

    /// Event pool
    pub pool: PoolConfig,

    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

/// Velocity tracking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    /// Strategy name (lsq1, lsq2, lsq3, wlsq2-delta, wlsq2-central, wlsq2-recent)
    pub strategy: String,

    /// What age-based weightings measure against
    pub age_weighting: AgeWeighting,

    /// Velocity units: 1 for px/ms, 1000 for px/s
    pub units: i32,

    /// Per-axis clamp
    pub max_velocity: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            velocity: VelocityConfig::default(),
            pool: PoolConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY.to_string(),
            age_weighting: AgeWeighting::default(),
            units: 1000,
            max_velocity: f32::MAX,
        }
    }
}

/// Event pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Recycled events kept for reuse
    pub capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

impl Config {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, InputError> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.velocity.strategy, "lsq2");
        assert_eq!(config.velocity.units, 1000);
        assert_eq!(config.pool.capacity, 10);
        assert_eq!(config.log_filter, "info");
        assert_eq!(Config::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn test_partial_document() {
        let config = Config::from_toml_str(
            r#"
            log_filter = "fos_velocity=debug"

            [velocity]
            strategy = "wlsq2-recent"
            age_weighting = "newest_sample"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_filter, "fos_velocity=debug");
        assert_eq!(config.velocity.strategy, "wlsq2-recent");
        assert_eq!(config.velocity.age_weighting, AgeWeighting::NewestSample);
        assert_eq!(config.velocity.units, 1000);
        assert_eq!(config.pool, PoolConfig::default());
    }

    #[test]
    fn test_bad_document() {
        let err = Config::from_toml_str("[pool]\ncapacity = \"many\"").unwrap_err();
        assert!(matches!(err, InputError::Config(_)));
    }
}
