//! Velocity scenarios driven through motion events

use fos_geometry::{BitSet32, Vec2};
use fos_motion::action::*;
use fos_motion::{EventPool, MotionEvent, ObtainArgs, PointerCoords, PointerProperties, Source, ToolType};
use fos_velocity::{AgeWeighting, VelocityTracker, VelocityTrackerState, ACTIVE_POINTER_ID};
use proptest::prelude::*;

const MS: i64 = 1_000_000;

fn event(pool: &EventPool, action: i32, time: i64, points: &[(i32, f32, f32)]) -> MotionEvent {
    let props: Vec<_> = points
        .iter()
        .map(|&(id, _, _)| PointerProperties::new(id, ToolType::Finger))
        .collect();
    let coords: Vec<_> = points.iter().map(|&(_, x, y)| PointerCoords::at(x, y)).collect();
    MotionEvent::obtain(
        pool,
        ObtainArgs {
            down_time: 0,
            event_time: time,
            action,
            properties: &props,
            coords: &coords,
            source: Source::TOUCHSCREEN,
            ..Default::default()
        },
    )
    .unwrap()
}

fn assert_near(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} +/- {tolerance}, got {actual}"
    );
}

#[test]
fn linear_motion_at_625_px_per_second() {
    let pool = EventPool::new();
    let mut state = VelocityTrackerState::new(Some("lsq2")).unwrap();

    state.add_movement(&event(&pool, ACTION_DOWN, 0, &[(0, 0.0, 50.0)]));
    for (i, t) in [16, 32, 48, 64].into_iter().enumerate() {
        let x = 10.0 * (i + 1) as f32;
        state.add_movement(&event(&pool, ACTION_MOVE, t, &[(0, x, 50.0)]));
    }

    state.compute_current_velocity_default(1000);
    assert_near(state.x_velocity(0), 625.0, 625.0 * 0.05);
    assert_near(state.y_velocity(0), 0.0, 1.0);
    assert_eq!(state.x_velocity(ACTIVE_POINTER_ID), state.x_velocity(0));
}

#[test]
fn batched_history_is_replayed() {
    let pool = EventPool::new();
    let mut state = VelocityTrackerState::default();
    state.add_movement(&event(&pool, ACTION_DOWN, 0, &[(0, 0.0, 0.0)]));

    let mut batched = event(&pool, ACTION_MOVE, 16, &[(0, 10.0, 0.0)]);
    for (t, x) in [(32, 20.0), (48, 30.0), (64, 40.0)] {
        batched.add_batch_sample(t, &[PointerCoords::at(x, 0.0)], 0).unwrap();
    }
    state.add_movement(&batched);

    let estimator = state.get_estimator(0).unwrap();
    assert_eq!(estimator.degree, 2);
    assert_eq!(estimator.time, 64 * MS);
    state.compute_current_velocity_default(1000);
    assert_near(state.x_velocity(0), 625.0, 625.0 * 0.05);
}

#[test]
fn stale_pointer_resets_fit() {
    let mut tracker = VelocityTracker::with_strategy(Some("lsq2")).unwrap();
    let mut id = BitSet32::default();
    id.mark_bit(0);

    tracker.add_movement_positions(0, id, &[Vec2::new(0.0, 0.0)]).unwrap();
    tracker.add_movement_positions(50 * MS, id, &[Vec2::new(100.0, 0.0)]).unwrap();
    tracker.add_movement_positions(66 * MS, id, &[Vec2::new(110.0, 0.0)]).unwrap();

    let estimator = tracker.get_estimator(0).unwrap();
    // Only the two post-gap samples remain, so a line is the best fit
    assert_eq!(estimator.degree, 1);
    assert_near(estimator.x_coeff(1), 625.0, 1.0);

    let at_first_sample = estimator.estimate_x(-0.066);
    assert!(
        (at_first_sample - 0.0).abs() > 10.0,
        "pre-gap sample still fits: {at_first_sample}"
    );
}

#[test]
fn short_gap_keeps_history() {
    let mut tracker = VelocityTracker::new();
    let mut id = BitSet32::default();
    id.mark_bit(0);

    tracker.add_movement_positions(0, id, &[Vec2::new(0.0, 0.0)]).unwrap();
    tracker.add_movement_positions(39 * MS, id, &[Vec2::new(39.0, 0.0)]).unwrap();
    tracker.add_movement_positions(50 * MS, id, &[Vec2::new(50.0, 0.0)]).unwrap();
    assert_eq!(tracker.get_estimator(0).unwrap().degree, 2);
}

#[test]
fn two_pointers_tracked_independently() {
    let pool = EventPool::new();
    let mut state = VelocityTrackerState::default();
    state.add_movement(&event(&pool, ACTION_DOWN, 0, &[(1, 0.0, 0.0)]));
    state.add_movement(&event(
        &pool,
        pointer_action(ACTION_POINTER_DOWN, 1),
        0,
        &[(1, 0.0, 0.0), (6, 0.0, 0.0)],
    ));
    for i in 1..=4 {
        let t = 16 * i;
        let step = i as f32;
        state.add_movement(&event(
            &pool,
            ACTION_MOVE,
            t,
            &[(1, 10.0 * step, 0.0), (6, 0.0, -20.0 * step)],
        ));
    }

    state.compute_current_velocity_default(1000);
    assert_near(state.x_velocity(1), 625.0, 30.0);
    assert_near(state.y_velocity(1), 0.0, 1.0);
    assert_near(state.y_velocity(6), -1250.0, 60.0);
    assert_eq!(state.x_velocity(ACTIVE_POINTER_ID), state.x_velocity(1));
}

#[test]
fn pointer_down_restarts_only_new_pointer() {
    let pool = EventPool::new();
    let mut state = VelocityTrackerState::default();
    state.add_movement(&event(&pool, ACTION_DOWN, 0, &[(0, 0.0, 0.0)]));
    state.add_movement(&event(&pool, ACTION_MOVE, 16, &[(0, 10.0, 0.0)]));
    state.add_movement(&event(
        &pool,
        pointer_action(ACTION_POINTER_DOWN, 1),
        32,
        &[(0, 20.0, 0.0), (1, 500.0, 500.0)],
    ));

    let first = state.get_estimator(0).unwrap();
    assert_eq!(first.degree, 2);
    let second = state.get_estimator(1).unwrap();
    assert_eq!(second.degree, 0);
    assert_eq!(second.x_coeff(0), 500.0);
}

#[test]
fn up_and_cancel_preserve_velocity() {
    let pool = EventPool::new();
    let mut state = VelocityTrackerState::default();
    state.add_movement(&event(&pool, ACTION_DOWN, 0, &[(0, 0.0, 0.0)]));
    state.add_movement(&event(&pool, ACTION_MOVE, 16, &[(0, 10.0, 0.0)]));
    state.add_movement(&event(&pool, ACTION_MOVE, 32, &[(0, 20.0, 0.0)]));
    let before = state.get_estimator(0);

    state.add_movement(&event(&pool, ACTION_UP, 48, &[(0, 900.0, 0.0)]));
    state.add_movement(&event(&pool, ACTION_CANCEL, 64, &[(0, -900.0, 0.0)]));
    assert_eq!(state.get_estimator(0), before);
}

#[test]
fn down_clears_everything() {
    let pool = EventPool::new();
    let mut state = VelocityTrackerState::default();
    state.add_movement(&event(&pool, ACTION_DOWN, 0, &[(0, 0.0, 0.0)]));
    state.add_movement(&event(&pool, ACTION_MOVE, 16, &[(0, 10.0, 0.0)]));
    state.add_movement(&event(&pool, ACTION_DOWN, 20, &[(0, 300.0, 0.0)]));

    let estimator = state.get_estimator(0).unwrap();
    assert_eq!(estimator.degree, 0);
    assert_eq!(estimator.x_coeff(0), 300.0);
}

/// Feed pointer 0 with one sample every 10 ms for 90 ms; `x_of` gets the
/// sample time in seconds relative to the newest sample
fn feed_curve(tracker: &mut VelocityTracker, x_of: impl Fn(f64) -> f64, y_of: impl Fn(f64) -> f64) {
    let mut id = BitSet32::default();
    id.mark_bit(0);
    for step in 0..10i64 {
        let t = (step - 9) as f64 * 0.01;
        let p = Vec2::new(x_of(t) as f32, y_of(t) as f32);
        tracker.add_movement_positions(step * 10 * MS, id, &[p]).unwrap();
    }
}

fn cubic(t: f64) -> f64 {
    100.0 + 500.0 * t + 2000.0 * t * t + 100_000.0 * t * t * t
}

fn bent(t: f64) -> f64 {
    500.0 * t + 100_000.0 * t * t * t
}

#[test]
fn cubic_fit_recovers_coefficients() {
    let mut tracker = VelocityTracker::with_strategy(Some("lsq3")).unwrap();
    feed_curve(&mut tracker, cubic, |t| -300.0 * t);

    let estimator = tracker.get_estimator(0).unwrap();
    assert_eq!(estimator.degree, 3);
    assert_near(estimator.x_coeff(0), 100.0, 0.01);
    assert_near(estimator.x_coeff(1), 500.0, 0.5);
    assert_near(estimator.x_coeff(2), 2000.0, 5.0);
    assert_near(estimator.x_coeff(3), 100_000.0, 1000.0);
    assert_near(estimator.y_coeff(1), -300.0, 0.5);
    assert_near(estimator.confidence, 1.0, 1e-3);

    let v = tracker.get_velocity(0).unwrap();
    assert_near(v.x, 500.0, 0.5);
}

#[test]
fn weighted_fits_recover_exact_quadratics() {
    let quadratic = |t: f64| 20.0 + 400.0 * t - 3000.0 * t * t;
    for name in ["wlsq2-central", "wlsq2-recent"] {
        for age_weighting in [AgeWeighting::SelfReferenced, AgeWeighting::NewestSample] {
            let mut tracker = VelocityTracker::with_strategy_weighted(Some(name), age_weighting).unwrap();
            feed_curve(&mut tracker, quadratic, |_| 0.0);

            let estimator = tracker.get_estimator(0).unwrap();
            assert_eq!(estimator.degree, 2, "{name} {age_weighting:?}");
            assert_near(estimator.x_coeff(1), 400.0, 0.5);
            assert_near(estimator.x_coeff(2), -3000.0, 5.0);
        }
    }
}

#[test]
fn self_referenced_age_weighting_matches_unweighted_fit() {
    let mut plain = VelocityTracker::with_strategy(Some("lsq2")).unwrap();
    feed_curve(&mut plain, bent, |_| 0.0);
    let expected = plain.get_velocity(0).unwrap().x;

    for name in ["wlsq2-central", "wlsq2-recent"] {
        let mut tracker = VelocityTracker::with_strategy_weighted(Some(name), AgeWeighting::SelfReferenced).unwrap();
        feed_curve(&mut tracker, bent, |_| 0.0);
        assert_near(tracker.get_velocity(0).unwrap().x, expected, 0.05);
    }
}

#[test]
fn newest_sample_age_weighting_changes_fit() {
    let mut plain = VelocityTracker::with_strategy(Some("lsq2")).unwrap();
    feed_curve(&mut plain, bent, |_| 0.0);
    let unweighted = plain.get_velocity(0).unwrap().x;

    // Central drops the newest and oldest samples to half weight, recent
    // only the oldest; both pull the slope away from the uniform fit
    let mut central = VelocityTracker::with_strategy_weighted(Some("wlsq2-central"), AgeWeighting::NewestSample).unwrap();
    feed_curve(&mut central, bent, |_| 0.0);
    let central_vx = central.get_velocity(0).unwrap().x;
    assert!(unweighted - central_vx > 3.0, "central {central_vx} vs {unweighted}");

    let mut recent = VelocityTracker::with_strategy_weighted(Some("wlsq2-recent"), AgeWeighting::NewestSample).unwrap();
    feed_curve(&mut recent, bent, |_| 0.0);
    let recent_vx = recent.get_velocity(0).unwrap().x;
    assert!(recent_vx - unweighted > 20.0, "recent {recent_vx} vs {unweighted}");
}

proptest! {
    #[test]
    fn estimator_queries_are_pure(
        steps in proptest::collection::vec((1i64..20, -50.0f32..50.0, -50.0f32..50.0), 1..15)
    ) {
        let mut tracker = VelocityTracker::with_strategy(Some("wlsq2-delta")).unwrap();
        let mut id = BitSet32::default();
        id.mark_bit(3);
        let mut t = 0;
        let mut p = Vec2::default();
        for (dt, dx, dy) in steps {
            t += dt * MS;
            p = Vec2::new(p.x + dx, p.y + dy);
            tracker.add_movement_positions(t, id, &[p]).unwrap();
        }

        let first = tracker.get_estimator(3);
        let velocity = tracker.get_velocity(3);
        for _ in 0..3 {
            prop_assert_eq!(tracker.get_estimator(3), first);
            prop_assert_eq!(tracker.get_velocity(3), velocity);
        }
    }
}
