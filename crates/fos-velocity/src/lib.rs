//! fOS Velocity
//!
//! Pointer velocity estimation for fling and gesture detection:
//! - Weighted least-squares polynomial fits with a confidence score
//! - Pluggable strategies over a sliding window of movements
//! - A tracker fed by motion events and a units/clamping query surface

pub mod estimator;
pub mod least_squares;
pub mod state;
pub mod strategy;
pub mod tracker;

pub use estimator::{Estimator, MAX_DEGREE};
pub use least_squares::solve_least_squares;
pub use state::{VelocityTrackerState, ACTIVE_POINTER_ID};
pub use strategy::{
    parse_strategy, AgeWeighting, LeastSquaresStrategy, Positions, VelocityTrackerStrategy, Weighting,
    DEFAULT_STRATEGY, HISTORY_SIZE, HORIZON,
};
pub use tracker::{VelocityTracker, ASSUME_POINTER_STOPPED_TIME, MAX_POINTERS};

/// Velocity tracking error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VelocityError {
    #[error("Unknown velocity tracker strategy: {0}")]
    UnknownStrategy(String),

    #[error("Expected {ids} positions, got {positions}")]
    PositionCountMismatch { ids: usize, positions: usize },
}
