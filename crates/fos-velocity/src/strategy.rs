//! Velocity tracker strategies
//!
//! A strategy keeps recent movements and fits an [`Estimator`] per pointer
//! on demand. The least-squares strategy is the only implementation; it
//! keeps a ring of the last [`HISTORY_SIZE`] movements.

use std::fmt;

use fos_geometry::{BitSet32, SparseTable, Vec2};
use serde::{Deserialize, Serialize};

use crate::estimator::Estimator;
use crate::least_squares::solve_least_squares;
use crate::VelocityError;

/// Positions of the pointers in one movement, keyed by pointer id
pub type Positions = SparseTable<BitSet32, Vec2>;

/// Movements kept by the least-squares strategy
pub const HISTORY_SIZE: usize = 20;

/// Samples older than this relative to the newest are ignored (100 ms)
pub const HORIZON: i64 = 100 * 1_000_000;

/// Strategy used when none is named
pub const DEFAULT_STRATEGY: &str = "lsq2";

/// Pluggable velocity estimation
pub trait VelocityTrackerStrategy: fmt::Debug + Send {
    /// Forget every movement
    fn clear(&mut self);

    /// Drop the pointers in `id_bits` from the newest movement
    fn clear_pointers(&mut self, id_bits: BitSet32);

    /// Record the positions of every tracked pointer at `event_time` (ns)
    fn add_movement(&mut self, event_time: i64, positions: &Positions);

    /// Fit pointer `id`, or `None` without data for it
    fn get_estimator(&self, id: u32) -> Option<Estimator>;
}

/// Per-sample weighting of the fit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Weighting {
    /// Every sample weighs 1
    #[default]
    None,
    /// Samples close in time to their successor weigh less
    Delta,
    /// Very recent and very old samples weigh less
    Central,
    /// Old samples weigh less
    Recent,
}

/// What age-based weightings measure sample age against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeWeighting {
    /// Each sample against itself, so every age is zero
    #[default]
    SelfReferenced,
    /// Each sample against the newest movement
    NewestSample,
}

/// Degree and weighting for a strategy name
pub fn parse_strategy(name: &str) -> Result<(u32, Weighting), VelocityError> {
    match name {
        "lsq1" => Ok((1, Weighting::None)),
        "lsq2" => Ok((2, Weighting::None)),
        "lsq3" => Ok((3, Weighting::None)),
        "wlsq2-delta" => Ok((2, Weighting::Delta)),
        "wlsq2-central" => Ok((2, Weighting::Central)),
        "wlsq2-recent" => Ok((2, Weighting::Recent)),
        _ => Err(VelocityError::UnknownStrategy(name.to_string())),
    }
}

#[derive(Debug, Clone, Default)]
struct Movement {
    event_time: i64,
    positions: Positions,
}

/// Weighted least-squares polynomial fit over a ring of movements
#[derive(Debug, Clone)]
pub struct LeastSquaresStrategy {
    degree: u32,
    weighting: Weighting,
    age_weighting: AgeWeighting,
    index: usize,
    movements: [Movement; HISTORY_SIZE],
}

impl LeastSquaresStrategy {
    pub fn new(degree: u32, weighting: Weighting) -> Self {
        Self {
            degree,
            weighting,
            age_weighting: AgeWeighting::default(),
            index: 0,
            movements: std::array::from_fn(|_| Movement::default()),
        }
    }

    /// Strategy for one of the names accepted by [`parse_strategy`]
    pub fn from_name(name: &str) -> Result<Self, VelocityError> {
        let (degree, weighting) = parse_strategy(name)?;
        tracing::debug!("Creating velocity strategy {} (degree {}, {:?})", name, degree, weighting);
        Ok(Self::new(degree, weighting))
    }

    pub fn with_age_weighting(mut self, age_weighting: AgeWeighting) -> Self {
        self.age_weighting = age_weighting;
        self
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Age of the movement at `index` in milliseconds
    fn age_millis(&self, index: usize) -> f32 {
        let reference = match self.age_weighting {
            AgeWeighting::SelfReferenced => self.movements[index].event_time,
            AgeWeighting::NewestSample => self.movements[self.index].event_time,
        };
        (reference - self.movements[index].event_time) as f32 * 0.000001
    }

    fn choose_weight(&self, index: usize) -> f32 {
        match self.weighting {
            Weighting::None => 1.0,
            Weighting::Delta => {
                // delta 0ms: 0.5, delta 10ms: 1.0
                if index == self.index {
                    return 1.0;
                }
                let next = (index + 1) % HISTORY_SIZE;
                let delta_millis =
                    (self.movements[next].event_time - self.movements[index].event_time) as f32 * 0.000001;
                if delta_millis < 0.0 {
                    0.5
                } else if delta_millis < 10.0 {
                    0.5 + delta_millis * 0.05
                } else {
                    1.0
                }
            }
            Weighting::Central => {
                // age 0ms: 0.5, 10ms: 1.0, 50ms: 1.0, 60ms: 0.5
                let age_millis = self.age_millis(index);
                if age_millis < 0.0 {
                    0.5
                } else if age_millis < 10.0 {
                    0.5 + age_millis * 0.05
                } else if age_millis < 50.0 {
                    1.0
                } else if age_millis < 60.0 {
                    0.5 + (60.0 - age_millis) * 0.05
                } else {
                    0.5
                }
            }
            Weighting::Recent => {
                // age 0ms: 1.0, 50ms: 1.0, 100ms: 0.5
                let age_millis = self.age_millis(index);
                if age_millis < 50.0 {
                    1.0
                } else if age_millis < 100.0 {
                    0.5 + (100.0 - age_millis) * 0.01
                } else {
                    0.5
                }
            }
        }
    }
}

impl VelocityTrackerStrategy for LeastSquaresStrategy {
    fn clear(&mut self) {
        self.index = 0;
        self.movements[0].positions.clear();
    }

    fn clear_pointers(&mut self, id_bits: BitSet32) {
        let newest = &mut self.movements[self.index].positions;
        for id in id_bits.iter() {
            newest.remove(id);
        }
    }

    fn add_movement(&mut self, event_time: i64, positions: &Positions) {
        self.index = (self.index + 1) % HISTORY_SIZE;
        let movement = &mut self.movements[self.index];
        movement.event_time = event_time;
        movement.positions.clone_from(positions);
    }

    fn get_estimator(&self, id: u32) -> Option<Estimator> {
        let mut x = [0.0f32; HISTORY_SIZE];
        let mut y = [0.0f32; HISTORY_SIZE];
        let mut w = [0.0f32; HISTORY_SIZE];
        let mut time = [0.0f32; HISTORY_SIZE];

        // Walk back from the newest movement while the pointer is present
        let newest_time = self.movements[self.index].event_time;
        let mut index = self.index;
        let mut m = 0;
        while m < HISTORY_SIZE {
            let movement = &self.movements[index];
            let Some(position) = movement.positions.get(id) else {
                break;
            };
            let age = newest_time - movement.event_time;
            if age > HORIZON {
                break;
            }

            x[m] = position.x;
            y[m] = position.y;
            w[m] = self.choose_weight(index);
            time[m] = -(age as f32) * 0.000000001;
            index = if index == 0 { HISTORY_SIZE - 1 } else { index - 1 };
            m += 1;
        }

        if m == 0 {
            return None;
        }

        let mut estimator = Estimator {
            time: newest_time,
            ..Estimator::default()
        };

        let degree = self.degree.min(m as u32 - 1);
        if degree >= 1 {
            let n = degree as usize + 1;
            let fit_x = solve_least_squares(&time[..m], &x[..m], &w[..m], n);
            let fit_y = solve_least_squares(&time[..m], &y[..m], &w[..m], n);
            if let (Some((x_coeffs, x_det)), Some((y_coeffs, y_det))) = (fit_x, fit_y) {
                estimator.x_coeffs = x_coeffs;
                estimator.y_coeffs = y_coeffs;
                estimator.degree = degree;
                estimator.confidence = x_det * y_det;
                return Some(estimator);
            }
        }

        // No velocity, only the current position
        estimator.x_coeffs[0] = x[0];
        estimator.y_coeffs[0] = y[0];
        estimator.degree = 0;
        estimator.confidence = 1.0;
        Some(estimator)
    }
}
