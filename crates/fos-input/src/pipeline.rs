//! Input pipeline
//!
//! Hands out pooled motion events and keeps one velocity tracker per input
//! device.

use std::collections::HashMap;

use fos_geometry::Vec2;
use fos_motion::{EventPool, MotionEvent, MotionEventN, ObtainArgs};
use fos_velocity::{parse_strategy, VelocityTrackerState, DEFAULT_STRATEGY};

use crate::{Config, InputError};

/// Event pool plus per-device velocity tracking
#[derive(Debug)]
pub struct InputPipeline {
    config: Config,
    pool: EventPool,
    trackers: HashMap<i32, VelocityTrackerState>,
}

impl InputPipeline {
    /// Create a pipeline. An unknown strategy name falls back to the default.
    pub fn new(mut config: Config) -> Self {
        if let Err(err) = parse_strategy(&config.velocity.strategy) {
            tracing::warn!("{}, using {}", err, DEFAULT_STRATEGY);
            config.velocity.strategy = DEFAULT_STRATEGY.to_string();
        }

        tracing::info!(
            "Input pipeline {} initialized (strategy {}, pool {})",
            crate::VERSION,
            config.velocity.strategy,
            config.pool.capacity
        );

        Self {
            pool: EventPool::with_capacity(config.pool.capacity),
            config,
            trackers: HashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> &EventPool {
        &self.pool
    }

    pub fn obtain(&self, args: ObtainArgs<'_>) -> Result<MotionEvent, InputError> {
        Ok(MotionEvent::obtain(&self.pool, args)?)
    }

    pub fn recycle(&self, event: MotionEvent) {
        event.recycle(&self.pool);
    }

    /// Feed `event` to the tracker of its device
    pub fn track(&mut self, event: &MotionEventN) {
        if event.pointer_count() == 0 {
            tracing::warn!("Skipping motion event without pointers from device {}", event.device_id());
            return;
        }

        let velocity = &self.config.velocity;
        self.trackers
            .entry(event.device_id())
            .or_insert_with(|| {
                tracing::debug!("Tracking device {}", event.device_id());
                VelocityTrackerState::with_age_weighting(Some(&velocity.strategy), velocity.age_weighting)
                    .unwrap_or_default()
            })
            .add_movement(event);
    }

    /// Current velocity of `pointer_id` on `device_id` in the configured
    /// units and clamp; `-1` selects the device's active pointer
    pub fn velocity(&mut self, device_id: i32, pointer_id: i32) -> Vec2 {
        let units = self.config.velocity.units;
        let max_velocity = self.config.velocity.max_velocity;
        match self.trackers.get_mut(&device_id) {
            Some(state) => {
                state.compute_current_velocity(units, max_velocity);
                state.velocity(pointer_id)
            }
            None => Vec2::default(),
        }
    }

    pub fn tracker(&self, device_id: i32) -> Option<&VelocityTrackerState> {
        self.trackers.get(&device_id)
    }

    /// Number of devices with a tracker
    pub fn device_count(&self) -> usize {
        self.trackers.len()
    }

    /// Forget everything tracked for `device_id`
    pub fn reset_device(&mut self, device_id: i32) {
        if self.trackers.remove(&device_id).is_some() {
            tracing::debug!("Reset device {}", device_id);
        }
    }
}

impl Default for InputPipeline {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
