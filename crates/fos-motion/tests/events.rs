//! Integration tests for fos-motion
//!
//! Sparse axis storage, split completeness, batch atomicity and cursor
//! handling through the pooled wrapper.

use fos_geometry::{BitSet32, Matrix3, RotationFlags, Transform};
use fos_motion::action::*;
use fos_motion::axis::*;
use fos_motion::{
    EventPool, MotionError, MotionEvent, MotionFlags, ObtainArgs, PointerCoords, PointerProperties,
    Source, ToolType, HISTORY_CURRENT,
};
use proptest::prelude::*;

fn sparse_axis() -> impl Strategy<Value = i32> {
    (9i32..=63).prop_filter("fixed axis", |a| *a != AXIS_RELATIVE_X && *a != AXIS_RELATIVE_Y)
}

fn obtain(pool: &EventPool, action: i32, source: Source, points: &[(i32, f32, f32)]) -> MotionEvent {
    let props: Vec<_> = points
        .iter()
        .map(|&(id, _, _)| PointerProperties::new(id, ToolType::Finger))
        .collect();
    let coords: Vec<_> = points.iter().map(|&(_, x, y)| PointerCoords::at(x, y)).collect();
    MotionEvent::obtain(
        pool,
        ObtainArgs {
            down_time: 100,
            event_time: 116,
            action,
            properties: &props,
            coords: &coords,
            source,
            device_id: 4,
            ..Default::default()
        },
    )
    .unwrap()
}

// ============================================================================
// SPARSE AXES
// ============================================================================

proptest! {
    #[test]
    fn sparse_axes_round_trip(
        entries in proptest::collection::btree_map(sparse_axis(), 0.1f32..100.0, 0..20)
    ) {
        let mut coords = PointerCoords::new();
        for (&axis, &value) in &entries {
            coords.set_axis_value(axis, value).unwrap();
        }
        for axis in 9..=63 {
            if axis == AXIS_RELATIVE_X || axis == AXIS_RELATIVE_Y {
                continue;
            }
            let expected = entries.get(&axis).copied().unwrap_or(0.0);
            prop_assert_eq!(coords.axis_value(axis), Ok(expected));
        }
        let stored: Vec<i32> = coords.iter_sparse().map(|(a, _)| a).collect();
        let keys: Vec<i32> = entries.keys().copied().collect();
        prop_assert_eq!(stored, keys);
    }
}

#[test]
fn zero_writes_follow_noop_and_overwrite_paths() {
    let mut coords = PointerCoords::new();
    coords.set_axis_value(AXIS_BRAKE, 0.0).unwrap();
    assert_eq!(coords.sparse_bits().count(), 0);

    coords.set_axis_value(AXIS_BRAKE, 2.5).unwrap();
    coords.set_axis_value(AXIS_BRAKE, 0.0).unwrap();
    assert_eq!(coords.sparse_bits().count(), 1);
    assert_eq!(coords.axis_value(AXIS_BRAKE), Ok(0.0));
}

// ============================================================================
// SPLIT
// ============================================================================

#[test]
fn split_by_every_id_reproduces_event() {
    let pool = EventPool::new();
    let ev = obtain(
        &pool,
        ACTION_MOVE,
        Source::TOUCHSCREEN,
        &[(0, 1.0, 2.0), (3, 3.0, 4.0), (7, 5.0, 6.0)],
    );

    let split = ev.split(&pool, ev.pointer_id_bits()).unwrap();
    assert_eq!(split.pointer_count(), 3);
    assert_eq!(split.action(), ACTION_MOVE);
    for i in 0..3 {
        assert_eq!(split.pointer_id(i), ev.pointer_id(i));
        assert_eq!((split.x(i), split.y(i)), (ev.x(i), ev.y(i)));
    }
}

#[test]
fn split_reencodes_pointer_index() {
    let pool = EventPool::new();
    let ev = obtain(
        &pool,
        pointer_action(ACTION_POINTER_DOWN, 2),
        Source::TOUCHSCREEN,
        &[(0, 1.0, 1.0), (1, 2.0, 2.0), (2, 3.0, 3.0)],
    );

    let mut bits = BitSet32::default();
    bits.mark_bit(1);
    bits.mark_bit(2);
    let split = ev.split(&pool, bits).unwrap();
    assert_eq!(split.action(), pointer_action(ACTION_POINTER_DOWN, 1));
    assert_eq!(split.pointer_count(), 2);

    let mut lone = BitSet32::default();
    lone.mark_bit(2);
    assert_eq!(ev.split(&pool, lone).unwrap().action(), ACTION_DOWN);
}

#[test]
fn split_canceled_pointer_up_becomes_cancel() {
    let pool = EventPool::new();
    let mut ev = obtain(
        &pool,
        pointer_action(ACTION_POINTER_UP, 0),
        Source::TOUCHSCREEN,
        &[(0, 1.0, 1.0), (1, 2.0, 2.0)],
    );
    ev.set_flags(MotionFlags::CANCELED);

    let mut bits = BitSet32::default();
    bits.mark_bit(0);
    assert_eq!(ev.split(&pool, bits).unwrap().action(), ACTION_CANCEL);
}

#[test]
fn split_keeps_history_and_transform() {
    let pool = EventPool::new();
    let mut ev = obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(0, 1.0, 1.0), (1, 9.0, 9.0)]);
    ev.add_batch_sample(132, &[PointerCoords::at(2.0, 2.0), PointerCoords::at(8.0, 8.0)], 0)
        .unwrap();
    ev.offset_location(10.0, 0.0);

    let mut bits = BitSet32::default();
    bits.mark_bit(1);
    let split = ev.split(&pool, bits).unwrap();
    assert_eq!(split.history_size(), 1);
    assert_eq!(split.historical_x(0, 0), 19.0);
    assert_eq!(split.x(0), 18.0);
    assert_eq!(split.event_time(), 132);
    assert_eq!(split.historical_event_time(0), Ok(116));
}

// ============================================================================
// BATCHING
// ============================================================================

#[test]
fn add_batch_appends_all_samples() {
    let pool = EventPool::new();
    let mut a = obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(0, 0.0, 0.0)]);
    let mut b = obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(0, 5.0, 5.0)]);
    b.add_batch_sample(132, &[PointerCoords::at(6.0, 6.0)], 0x10).unwrap();

    assert!(a.add_batch(&pool, &b));
    assert_eq!(a.history_size(), 2);
    assert_eq!(a.historical_x(0, 1), 5.0);
    assert_eq!(a.x(0), 6.0);
    assert_eq!(a.event_time(), 132);
    assert_eq!(a.meta_state(), 0x10);
}

#[test]
fn add_batch_maps_into_receiver_space() {
    let pool = EventPool::new();
    let mut a = obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(0, 0.0, 0.0)]);
    a.offset_location(100.0, 0.0);
    let b = obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(0, 150.0, 5.0)]);

    assert!(a.add_batch(&pool, &b));
    assert_eq!(a.x(0), 150.0);
    assert_eq!(a.raw_pointer_coords(0, HISTORY_CURRENT).x, 50.0);
}

#[test]
fn add_batch_rejects_without_mutation() {
    let pool = EventPool::new();
    let mut a = obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(0, 0.0, 0.0)]);

    let cases = [
        obtain(&pool, ACTION_DOWN, Source::TOUCHSCREEN, &[(0, 1.0, 1.0)]),
        obtain(&pool, ACTION_MOVE, Source::MOUSE, &[(0, 1.0, 1.0)]),
        obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(1, 1.0, 1.0)]),
        obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(0, 1.0, 1.0), (1, 1.0, 1.0)]),
    ];
    for other in &cases {
        assert!(!a.add_batch(&pool, other));
        assert_eq!(a.history_size(), 0);
        assert_eq!(a.x(0), 0.0);
    }

    let mut down = obtain(&pool, ACTION_DOWN, Source::TOUCHSCREEN, &[(0, 0.0, 0.0)]);
    let same_down = obtain(&pool, ACTION_DOWN, Source::TOUCHSCREEN, &[(0, 1.0, 1.0)]);
    assert!(!down.add_batch(&pool, &same_down));
}

// ============================================================================
// CLAMP, CURSOR, TRANSFORMS
// ============================================================================

#[test]
fn clamp_respects_offset() {
    let pool = EventPool::new();
    let mut ev = obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(0, 0.0, 0.0)]);
    ev.offset_location(-50.0, 0.0);
    let clamped = ev.clamp_no_history(&pool, 0.0, 0.0, 10.0, 10.0);
    assert_eq!(clamped.x(0), 0.0);
    assert_eq!(clamped.raw_pointer_coords(0, HISTORY_CURRENT).x, 50.0);
}

#[test]
fn mouse_cursor_is_pointer_centroid() {
    let pool = EventPool::new();
    let ev = obtain(&pool, ACTION_MOVE, Source::MOUSE, &[(0, 0.0, 0.0), (1, 10.0, 20.0)]);
    assert!(ev.is_cursor_position_valid());
    assert_eq!((ev.x_cursor_position(), ev.y_cursor_position()), (5.0, 10.0));

    let touch = obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(0, 1.0, 1.0)]);
    assert!(!touch.is_cursor_position_valid());
    assert!(touch.x_cursor_position().is_nan());
}

#[test]
fn stylus_over_mouse_class_is_not_a_mouse() {
    let pool = EventPool::new();
    let ev = obtain(&pool, ACTION_MOVE, Source::MOUSE | Source::STYLUS, &[(0, 1.0, 1.0)]);
    assert!(!ev.is_cursor_position_valid());
}

#[test]
fn rotation_changes_logical_but_not_raw() {
    let pool = EventPool::new();
    let mut ev = obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(0, 10.0, 20.0)]);
    let rot = Transform::from_rotation(RotationFlags::ROT_180, 100.0, 200.0).unwrap();
    ev.transform_by(&rot.as_matrix());
    assert_eq!((ev.x(0), ev.y(0)), (90.0, 180.0));
    assert_eq!((ev.raw_x(0), ev.raw_y(0)), (10.0, 20.0));
}

#[test]
fn apply_transform_then_query() {
    let pool = EventPool::new();
    let mut ev = obtain(&pool, ACTION_MOVE, Source::MOUSE, &[(0, 4.0, 4.0)]);
    ev.apply_transform(&Matrix3::scale_translate(0.5, 0.5, 0.0, 0.0));
    assert_eq!(ev.x(0), 2.0);
    assert_eq!(ev.raw_x(0), 2.0);
    assert_eq!(ev.x_cursor_position(), 2.0);
}

#[test]
fn invalid_axis_is_an_error() {
    let pool = EventPool::new();
    let ev = obtain(&pool, ACTION_MOVE, Source::TOUCHSCREEN, &[(0, 1.0, 1.0)]);
    assert_eq!(
        ev.checked_axis_value(64, 0, HISTORY_CURRENT),
        Err(MotionError::InvalidAxis(64))
    );
}
