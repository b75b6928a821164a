//! Pooled motion events
//!
//! `MotionEvent` wraps a [`MotionEventN`] and adds the pipeline-facing
//! operations: pooled construction, batching, splitting by pointer id and
//! clamping. Times at this boundary are milliseconds; the record keeps
//! nanoseconds.

use std::ops::{Deref, DerefMut};

use fos_geometry::{transform_angle, BitSet32, Transform};

use crate::action::*;
use crate::native::{MotionEventN, MotionEventParams, HISTORY_CURRENT, MAX_POINTER_ID};
use crate::pointer::{PointerCoords, PointerProperties};
use crate::pool::EventPool;
use crate::source::{should_disregard_transformation, Classification, Source};
use crate::MotionError;

const NS_PER_MS: i64 = 1_000_000;

/// Arguments of [`MotionEvent::obtain`], times in milliseconds
#[derive(Debug, Clone, Default)]
pub struct ObtainArgs<'a> {
    pub down_time: i64,
    pub event_time: i64,
    pub action: i32,
    pub properties: &'a [PointerProperties],
    pub coords: &'a [PointerCoords],
    pub meta_state: i32,
    pub button_state: Buttons,
    pub x_precision: f32,
    pub y_precision: f32,
    pub device_id: i32,
    pub edge_flags: EdgeFlags,
    pub source: Source,
    pub display_id: i32,
    pub flags: MotionFlags,
    pub classification: Classification,
}

/// Motion event handed out by an [`EventPool`]
#[derive(Debug, Clone, Default)]
pub struct MotionEvent {
    native: MotionEventN,
}

impl Deref for MotionEvent {
    type Target = MotionEventN;

    fn deref(&self) -> &MotionEventN {
        &self.native
    }
}

impl DerefMut for MotionEvent {
    fn deref_mut(&mut self) -> &mut MotionEventN {
        &mut self.native
    }
}

impl MotionEvent {
    /// Build an event from logical coordinates with identity transforms.
    ///
    /// The cursor position is derived from the pointers for mouse sources.
    pub fn obtain(pool: &EventPool, args: ObtainArgs<'_>) -> Result<MotionEvent, MotionError> {
        let mut ev = pool.take();
        let params = MotionEventParams {
            id: pool.next_id(),
            device_id: args.device_id,
            source: args.source,
            display_id: args.display_id,
            action: args.action,
            flags: args.flags,
            edge_flags: args.edge_flags,
            meta_state: args.meta_state,
            button_state: args.button_state,
            classification: args.classification,
            x_precision: args.x_precision,
            y_precision: args.y_precision,
            down_time_nanos: args.down_time * NS_PER_MS,
            event_time_nanos: args.event_time * NS_PER_MS,
            ..MotionEventParams::default()
        };

        if let Err(err) = ev.native.initialize(params, args.properties, args.coords) {
            pool.recycle(ev);
            return Err(err);
        }
        ev.update_cursor_position();
        Ok(ev)
    }

    /// Single-pointer touchscreen event with unit pressure, size and precision
    pub fn obtain_simple(
        pool: &EventPool,
        down_time: i64,
        event_time: i64,
        action: i32,
        x: f32,
        y: f32,
        meta_state: i32,
    ) -> MotionEvent {
        let mut ev = pool.take();
        let props = [PointerProperties::new(0, Default::default())];
        let mut sample = PointerCoords::at(x, y);
        sample.pressure = 1.0;
        sample.size = 1.0;
        let coords = [sample];
        let params = MotionEventParams {
            id: pool.next_id(),
            source: Source::TOUCHSCREEN,
            action,
            meta_state,
            down_time_nanos: down_time * NS_PER_MS,
            event_time_nanos: event_time * NS_PER_MS,
            ..MotionEventParams::default()
        };
        ev.native.initialize_unchecked(params, &props, &coords);
        ev
    }

    /// Full copy of `other`, history included
    pub fn obtain_copy(pool: &EventPool, other: &MotionEvent) -> MotionEvent {
        let mut ev = pool.take();
        ev.native.copy_from(&other.native, true);
        ev
    }

    /// Copy of `other` holding only its current sample
    pub fn obtain_no_history(pool: &EventPool, other: &MotionEvent) -> MotionEvent {
        let mut ev = pool.take();
        ev.native.copy_from(&other.native, false);
        ev
    }

    /// Hand this event back to `pool`
    pub fn recycle(self, pool: &EventPool) {
        pool.recycle(self);
    }

    pub fn native(&self) -> &MotionEventN {
        &self.native
    }

    // ========================================================================
    // Times
    // ========================================================================

    pub fn down_time(&self) -> i64 {
        self.native.down_time_nanos() / NS_PER_MS
    }

    pub fn set_down_time(&mut self, down_time: i64) {
        self.native.set_down_time_nanos(down_time * NS_PER_MS);
    }

    pub fn event_time(&self) -> i64 {
        self.native.event_time_nanos() / NS_PER_MS
    }

    /// Time of sample `pos` (or [`HISTORY_CURRENT`])
    pub fn historical_event_time(&self, pos: usize) -> Result<i64, MotionError> {
        self.check_pos(pos)?;
        Ok(self.native.historical_event_time_nanos(pos) / NS_PER_MS)
    }

    // ========================================================================
    // Checked access
    // ========================================================================

    fn check_index(&self, index: usize) -> Result<(), MotionError> {
        let count = self.pointer_count();
        if index >= count {
            return Err(MotionError::PointerIndexOutOfRange { index, count });
        }
        Ok(())
    }

    fn check_pos(&self, pos: usize) -> Result<(), MotionError> {
        let size = self.history_size();
        if pos != HISTORY_CURRENT && pos >= size {
            return Err(MotionError::HistoryIndexOutOfRange { pos, size });
        }
        Ok(())
    }

    /// Logical-space coordinates of pointer `index` at sample `pos`
    pub fn pointer_coords(&self, index: usize, pos: usize) -> Result<PointerCoords, MotionError> {
        self.check_index(index)?;
        self.check_pos(pos)?;
        Ok(self.native.transformed_pointer_coords(index, pos))
    }

    pub fn checked_pointer_properties(&self, index: usize) -> Result<PointerProperties, MotionError> {
        self.check_index(index)?;
        Ok(*self.native.pointer_properties(index))
    }

    pub fn checked_axis_value(&self, axis: i32, index: usize, pos: usize) -> Result<f32, MotionError> {
        self.check_index(index)?;
        self.check_pos(pos)?;
        self.native.historical_axis_value(axis, index, pos)
    }

    // ========================================================================
    // Location and cursor
    // ========================================================================

    /// Move the first pointer to logical `(x, y)` by offsetting the event
    pub fn set_location(&mut self, x: f32, y: f32) {
        if self.pointer_count() == 0 {
            return;
        }
        let dx = x - self.native.x(0);
        let dy = y - self.native.y(0);
        self.native.offset_location(dx, dy);
    }

    /// Mouse events put the cursor at the centroid of their pointers; every
    /// other source clears it.
    pub fn update_cursor_position(&mut self) {
        let count = self.pointer_count();
        if self.source() != Source::MOUSE || count == 0 {
            self.native.invalidate_cursor_position();
            return;
        }

        let (sum_x, sum_y) = (0..count).fold((0.0f32, 0.0f32), |(sx, sy), i| {
            (sx + self.native.x(i), sy + self.native.y(i))
        });
        self.native
            .set_cursor_position(sum_x / count as f32, sum_y / count as f32);
    }

    // ========================================================================
    // Batching
    // ========================================================================

    /// Map logical coordinates back into this event's raw space
    fn to_raw(&self, inverse: &Transform, coords: &PointerCoords) -> PointerCoords {
        let mut raw = coords.clone();
        let xy = if should_disregard_transformation(self.source()) {
            inverse.transform_vector(coords.x, coords.y)
        } else {
            inverse.transform_xy(coords.x, coords.y)
        };
        raw.set_xy(xy);
        let relative = inverse.transform_vector(coords.relative_x, coords.relative_y);
        raw.relative_x = relative.x;
        raw.relative_y = relative.y;
        raw.orientation = transform_angle(inverse, coords.orientation);
        raw
    }

    /// Append a sample given in logical coordinates
    pub fn add_batch_sample(
        &mut self,
        event_time: i64,
        coords: &[PointerCoords],
        meta_state: i32,
    ) -> Result<(), MotionError> {
        let inverse = self.transform().inverse();
        let raw: Vec<PointerCoords> = coords.iter().map(|c| self.to_raw(&inverse, c)).collect();
        self.native.add_sample(event_time * NS_PER_MS, &raw)?;
        let meta = self.meta_state() | meta_state;
        self.native.set_meta_state(meta);
        Ok(())
    }

    fn can_batch(&self, other: &MotionEvent) -> bool {
        let action = self.action_masked();
        if action != ACTION_MOVE && action != ACTION_HOVER_MOVE {
            return false;
        }
        action == other.action_masked()
            && self.device_id() == other.device_id()
            && self.source() == other.source()
            && self.display_id() == other.display_id()
            && self.flags() == other.flags()
            && self.classification() == other.classification()
            && self.all_pointer_properties() == other.all_pointer_properties()
    }

    /// Append every sample of `other` to this event's history.
    ///
    /// Both must be moves (or hover moves) from the same device, source,
    /// display and flags with the same pointers in the same order. Returns
    /// `false` without modifying this event otherwise.
    pub fn add_batch(&mut self, pool: &EventPool, other: &MotionEvent) -> bool {
        if !self.can_batch(other) {
            tracing::debug!(
                "Rejected batch: {} into {}",
                action_to_string(other.action()),
                action_to_string(self.action())
            );
            return false;
        }

        let count = self.pointer_count();
        let inverse = self.transform().inverse();
        let history = other.history_size();

        pool.with_scratch(count, |scratch| {
            for h in 0..=history {
                let pos = if h == history { HISTORY_CURRENT } else { h };
                for i in 0..count {
                    let logical = other.native.transformed_pointer_coords(i, pos);
                    scratch.coords[i] = self.to_raw(&inverse, &logical);
                }
                let time = other.historical_event_time_nanos(pos);
                // Pointer count already matched, so this cannot fail
                let added = self.native.add_sample(time, &scratch.coords[..count]);
                debug_assert!(added.is_ok(), "batched sample rejected: {added:?}");
            }
        });

        let meta = self.meta_state() | other.meta_state();
        self.native.set_meta_state(meta);
        true
    }

    // ========================================================================
    // Splitting and clamping
    // ========================================================================

    /// New event holding only the pointers whose ids are in `id_bits`.
    ///
    /// Pointer-down/up actions are rewritten for the remaining pointers: a
    /// missing trigger becomes a move, a lone survivor becomes down or up
    /// (cancel when the gesture was canceled), otherwise the pointer index
    /// is re-encoded.
    pub fn split(&self, pool: &EventPool, id_bits: BitSet32) -> Result<MotionEvent, MotionError> {
        let old_count = self.pointer_count();
        let old_action = self.action();
        let old_masked = action_masked(old_action);
        let old_index = action_index(old_action);

        pool.with_scratch(old_count, |scratch| {
            let mut new_count = 0;
            let mut new_index = None;
            for (i, props) in self.all_pointer_properties().iter().enumerate() {
                if !(0..=MAX_POINTER_ID).contains(&props.id) || !id_bits.has_bit(props.id as u32) {
                    continue;
                }
                if i == old_index {
                    new_index = Some(new_count);
                }
                scratch.properties[new_count] = *props;
                scratch.index_map[new_count] = i;
                new_count += 1;
            }

            if new_count == 0 {
                return Err(MotionError::SplitMatchedNothing(id_bits.value));
            }

            let new_action = if is_pointer_action(old_action) {
                match new_index {
                    None => ACTION_MOVE,
                    Some(_) if new_count == 1 => {
                        if old_masked == ACTION_POINTER_DOWN {
                            ACTION_DOWN
                        } else if self.flags().contains(MotionFlags::CANCELED) {
                            ACTION_CANCEL
                        } else {
                            ACTION_UP
                        }
                    }
                    Some(index) => pointer_action(old_masked, index),
                }
            } else {
                old_action
            };

            let mut ev = pool.take();
            let history = self.history_size();
            for h in 0..=history {
                let pos = if h == history { HISTORY_CURRENT } else { h };
                for i in 0..new_count {
                    let source_index = scratch.index_map[i];
                    scratch.coords[i].copy_from(self.raw_pointer_coords(source_index, pos));
                }
                let time = self.historical_event_time_nanos(pos);
                if h == 0 {
                    let params = MotionEventParams {
                        id: pool.next_id(),
                        action: new_action,
                        event_time_nanos: time,
                        ..self.params()
                    };
                    ev.native.initialize_unchecked(
                        params,
                        &scratch.properties[..new_count],
                        &scratch.coords[..new_count],
                    );
                } else {
                    ev.native.add_sample(time, &scratch.coords[..new_count])?;
                }
            }
            Ok(ev)
        })
    }

    /// New single-sample event with every pointer clamped into the rect
    /// (logical coordinates)
    pub fn clamp_no_history(&self, pool: &EventPool, left: f32, top: f32, right: f32, bottom: f32) -> MotionEvent {
        let count = self.pointer_count();
        let inverse = self.transform().inverse();

        pool.with_scratch(count, |scratch| {
            for i in 0..count {
                scratch.properties[i] = *self.pointer_properties(i);
                let mut logical = self.native.transformed_pointer_coords(i, HISTORY_CURRENT);
                logical.x = logical.x.max(left).min(right);
                logical.y = logical.y.max(top).min(bottom);
                scratch.coords[i] = self.to_raw(&inverse, &logical);
            }

            let mut ev = pool.take();
            let params = MotionEventParams {
                id: pool.next_id(),
                ..self.params()
            };
            ev.native.initialize_unchecked(
                params,
                &scratch.properties[..count],
                &scratch.coords[..count],
            );
            ev
        })
    }
}
