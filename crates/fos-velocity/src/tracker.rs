//! Velocity tracker
//!
//! Feeds pointer positions from a motion stream to a strategy, tracking
//! which pointers are current and which one is active.

use fos_geometry::{BitSet32, Vec2};
use fos_motion::action::*;
use fos_motion::{MotionEventN, HISTORY_CURRENT, MAX_POINTER_ID};

use crate::estimator::Estimator;
use crate::strategy::{
    AgeWeighting, LeastSquaresStrategy, Positions, VelocityTrackerStrategy, Weighting, DEFAULT_STRATEGY,
};
use crate::VelocityError;

/// Pointers tracked at once; extra pointers are dropped
pub const MAX_POINTERS: usize = 10;

/// A gap this long means every pointer has stopped (40 ms)
pub const ASSUME_POINTER_STOPPED_TIME: i64 = 40 * 1_000_000;

/// Velocity tracker for one input stream
#[derive(Debug)]
pub struct VelocityTracker {
    last_event_time: i64,
    current_pointer_id_bits: BitSet32,
    active_pointer_id: Option<u32>,
    strategy: Box<dyn VelocityTrackerStrategy>,
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::with_strategy_impl(Box::new(LeastSquaresStrategy::new(2, Weighting::None)))
    }
}

impl VelocityTracker {
    /// Tracker using the default strategy
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker using the named strategy, or the default when `None`
    pub fn with_strategy(name: Option<&str>) -> Result<Self, VelocityError> {
        Self::with_strategy_weighted(name, AgeWeighting::default())
    }

    pub fn with_strategy_weighted(name: Option<&str>, age_weighting: AgeWeighting) -> Result<Self, VelocityError> {
        let strategy = LeastSquaresStrategy::from_name(name.unwrap_or(DEFAULT_STRATEGY))?
            .with_age_weighting(age_weighting);
        Ok(Self::with_strategy_impl(Box::new(strategy)))
    }

    /// Tracker driving a caller-supplied strategy
    pub fn with_strategy_impl(strategy: Box<dyn VelocityTrackerStrategy>) -> Self {
        Self {
            last_event_time: 0,
            current_pointer_id_bits: BitSet32::default(),
            active_pointer_id: None,
            strategy,
        }
    }

    /// Forget every pointer
    pub fn clear(&mut self) {
        self.current_pointer_id_bits.clear();
        self.active_pointer_id = None;
        self.strategy.clear();
    }

    /// Forget the pointers in `id_bits`. The active pointer moves to the
    /// first remaining one if it was among them.
    pub fn clear_pointers(&mut self, id_bits: BitSet32) {
        let remaining = BitSet32::new(self.current_pointer_id_bits.value & !id_bits.value);
        self.current_pointer_id_bits = remaining;

        if self.active_pointer_id.is_some_and(|active| id_bits.has_bit(active)) {
            self.active_pointer_id = (!remaining.is_empty()).then(|| remaining.first_marked_bit());
        }
        self.strategy.clear_pointers(id_bits);
    }

    /// Pointers present in the last movement
    pub fn current_pointer_id_bits(&self) -> BitSet32 {
        self.current_pointer_id_bits
    }

    pub fn active_pointer_id(&self) -> Option<u32> {
        self.active_pointer_id
    }

    /// Record positions for the pointers in `id_bits`, given densely in
    /// id order. Time is in nanoseconds.
    pub fn add_movement_positions(
        &mut self,
        event_time: i64,
        mut id_bits: BitSet32,
        positions: &[Vec2],
    ) -> Result<(), VelocityError> {
        while id_bits.count() as usize > MAX_POINTERS {
            id_bits.clear_last_marked_bit();
        }

        let count = id_bits.count() as usize;
        let table = match positions.get(..count) {
            Some(dense) => Positions::from_dense(id_bits, dense.to_vec()),
            None => None,
        };
        let Some(table) = table else {
            return Err(VelocityError::PositionCountMismatch {
                ids: count,
                positions: positions.len(),
            });
        };

        if (self.current_pointer_id_bits.value & id_bits.value) != 0
            && event_time >= self.last_event_time + ASSUME_POINTER_STOPPED_TIME
        {
            tracing::debug!(
                "No movement for {} ns, assuming all pointers stopped",
                event_time - self.last_event_time
            );
            self.strategy.clear();
        }

        self.last_event_time = event_time;
        self.current_pointer_id_bits = id_bits;

        let active_present = self.active_pointer_id.is_some_and(|id| id_bits.has_bit(id));
        if !active_present {
            self.active_pointer_id = (!id_bits.is_empty()).then(|| id_bits.first_marked_bit());
        }

        self.strategy.add_movement(event_time, &table);
        Ok(())
    }

    /// Feed a motion event.
    ///
    /// Down and hover-enter start over, pointer-down restarts the new
    /// pointer, moves replay every sample oldest first. Other actions carry
    /// no movement and are ignored.
    pub fn add_movement(&mut self, event: &MotionEventN) {
        match event.action_masked() {
            ACTION_DOWN | ACTION_HOVER_ENTER => self.clear(),
            ACTION_POINTER_DOWN => {
                let index = event.action_index();
                if index < event.pointer_count() {
                    let id = event.pointer_id(index);
                    if (0..=MAX_POINTER_ID).contains(&id) {
                        let mut down = BitSet32::default();
                        down.mark_bit(id as u32);
                        self.clear_pointers(down);
                    }
                }
            }
            ACTION_MOVE | ACTION_HOVER_MOVE => {}
            _ => return,
        }

        let mut tracked: Vec<(usize, u32)> = (0..event.pointer_count())
            .filter_map(|i| {
                let id = event.pointer_id(i);
                (0..=MAX_POINTER_ID).contains(&id).then_some((i, id as u32))
            })
            .collect();
        tracked.truncate(MAX_POINTERS);

        let mut id_bits = BitSet32::default();
        for &(_, id) in &tracked {
            id_bits.mark_bit(id);
        }

        let mut positions = vec![Vec2::default(); tracked.len()];
        let history = event.history_size();
        for h in 0..=history {
            let pos = if h == history { HISTORY_CURRENT } else { h };
            for &(i, id) in &tracked {
                let slot = id_bits.get_index_of_bit(id) as usize;
                positions[slot] = Vec2::new(event.historical_x(i, pos), event.historical_y(i, pos));
            }
            let time = event.historical_event_time_nanos(pos);
            if let Err(err) = self.add_movement_positions(time, id_bits, &positions) {
                tracing::warn!("Dropping movement: {}", err);
            }
        }
    }

    /// Fit for pointer `id`; `None` for ids past `MAX_POINTER_ID`
    pub fn get_estimator(&self, id: u32) -> Option<Estimator> {
        if id > MAX_POINTER_ID as u32 {
            return None;
        }
        self.strategy.get_estimator(id)
    }

    /// Velocity of pointer `id` in px/s, when a fit of degree 1 or more
    /// exists
    pub fn get_velocity(&self, id: u32) -> Option<Vec2> {
        self.get_estimator(id)
            .filter(|e| e.degree >= 1)
            .map(|e| Vec2::new(e.x_coeff(1), e.y_coeff(1)))
    }
}
