//! fOS Input
//!
//! The fOS input layer in one crate.
//!
//! # Example
//! ```rust,ignore
//! use fos_input::{Config, InputPipeline};
//!
//! let config = Config::from_toml_str(include_str!("input.toml"))?;
//! fos_input::logging::init(&config.log_filter);
//! let mut pipeline = InputPipeline::new(config);
//! pipeline.track(&event);
//! let v = pipeline.velocity(event.device_id(), -1);
//! ```

mod config;
pub mod logging;
mod pipeline;

pub use config::{Config, PoolConfig, VelocityConfig};
pub use pipeline::InputPipeline;

pub use fos_motion::{EventPool, MotionEvent, MotionEventN, ObtainArgs, PointerCoords, PointerProperties};
pub use fos_velocity::{Estimator, VelocityTracker, VelocityTrackerState};

// Re-export sub-crates for advanced usage
pub use fos_geometry as geometry;
pub use fos_motion as motion;
pub use fos_velocity as velocity;

/// Input layer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Input layer error
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] fos_geometry::GeometryError),

    #[error("Motion event error: {0}")]
    Motion(#[from] fos_motion::MotionError),

    #[error("Velocity error: {0}")]
    Velocity(#[from] fos_velocity::VelocityError),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}
