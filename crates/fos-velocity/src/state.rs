//! Velocity query surface
//!
//! Computes velocities for every current pointer once, in caller units and
//! clamped, then answers per-pointer queries from that snapshot.

use fos_geometry::{BitSet32, Vec2};
use fos_motion::{MotionEventN, MAX_POINTER_ID};

use crate::estimator::Estimator;
use crate::strategy::AgeWeighting;
use crate::tracker::VelocityTracker;
use crate::VelocityError;

/// Pointer id that selects the tracker's active pointer
pub const ACTIVE_POINTER_ID: i32 = -1;

fn clamp_symmetric(v: f32, max: f32) -> f32 {
    if v > max {
        max
    } else if v < -max {
        -max
    } else {
        v
    }
}

/// Velocity tracker plus the last computed velocities
#[derive(Debug, Default)]
pub struct VelocityTrackerState {
    tracker: VelocityTracker,
    calculated_id_bits: BitSet32,
    calculated: Vec<Vec2>,
}

impl VelocityTrackerState {
    pub fn new(strategy: Option<&str>) -> Result<Self, VelocityError> {
        Self::with_age_weighting(strategy, AgeWeighting::default())
    }

    pub fn with_age_weighting(strategy: Option<&str>, age_weighting: AgeWeighting) -> Result<Self, VelocityError> {
        Ok(Self {
            tracker: VelocityTracker::with_strategy_weighted(strategy, age_weighting)?,
            calculated_id_bits: BitSet32::default(),
            calculated: Vec::new(),
        })
    }

    pub fn tracker(&self) -> &VelocityTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut VelocityTracker {
        &mut self.tracker
    }

    /// Reset the tracker and drop computed velocities
    pub fn clear(&mut self) {
        self.tracker.clear();
        self.calculated_id_bits.clear();
        self.calculated.clear();
    }

    pub fn add_movement(&mut self, event: &MotionEventN) {
        self.tracker.add_movement(event);
    }

    /// Compute velocities for every current pointer.
    ///
    /// `units` scales px/ms (1 gives px/ms, 1000 gives px/s). Each axis is
    /// clamped to `[-max_velocity, max_velocity]`.
    pub fn compute_current_velocity(&mut self, units: i32, max_velocity: f32) {
        let id_bits = self.tracker.current_pointer_id_bits();
        self.calculated_id_bits = id_bits;
        self.calculated.clear();

        let scale = units as f32 / 1000.0;
        for id in id_bits.iter() {
            let v = self.tracker.get_velocity(id).unwrap_or_default();
            let vx = clamp_symmetric(v.x * scale, max_velocity);
            let vy = clamp_symmetric(v.y * scale, max_velocity);
            self.calculated.push(Vec2::new(vx, vy));
        }
    }

    /// [`compute_current_velocity`](Self::compute_current_velocity) without a clamp
    pub fn compute_current_velocity_default(&mut self, units: i32) {
        self.compute_current_velocity(units, f32::MAX);
    }

    fn resolve(&self, id: i32) -> Option<u32> {
        if id == ACTIVE_POINTER_ID {
            return self.tracker.active_pointer_id();
        }
        (0..=MAX_POINTER_ID).contains(&id).then_some(id as u32)
    }

    /// Last computed velocity of pointer `id` (or the active pointer for
    /// [`ACTIVE_POINTER_ID`]); zero when it was not part of the computation
    pub fn velocity(&self, id: i32) -> Vec2 {
        self.resolve(id)
            .filter(|&id| self.calculated_id_bits.has_bit(id))
            .and_then(|id| {
                let slot = self.calculated_id_bits.get_index_of_bit(id) as usize;
                self.calculated.get(slot).copied()
            })
            .unwrap_or_default()
    }

    pub fn x_velocity(&self, id: i32) -> f32 {
        self.velocity(id).x
    }

    pub fn y_velocity(&self, id: i32) -> f32 {
        self.velocity(id).y
    }

    /// Fit for pointer `id` (or the active pointer)
    pub fn get_estimator(&self, id: i32) -> Option<Estimator> {
        self.resolve(id).and_then(|id| self.tracker.get_estimator(id))
    }
}
