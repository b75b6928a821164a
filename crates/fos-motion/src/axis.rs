//! Motion axes
//!
//! Axis identifiers for pointer samples. Axes 0..=63 are addressable; a fixed
//! subset lives in named fields of `PointerCoords`, the rest are sparse.

pub const AXIS_X: i32 = 0;
pub const AXIS_Y: i32 = 1;
pub const AXIS_PRESSURE: i32 = 2;
pub const AXIS_SIZE: i32 = 3;
pub const AXIS_TOUCH_MAJOR: i32 = 4;
pub const AXIS_TOUCH_MINOR: i32 = 5;
pub const AXIS_TOOL_MAJOR: i32 = 6;
pub const AXIS_TOOL_MINOR: i32 = 7;
pub const AXIS_ORIENTATION: i32 = 8;
pub const AXIS_VSCROLL: i32 = 9;
pub const AXIS_HSCROLL: i32 = 10;
pub const AXIS_Z: i32 = 11;
pub const AXIS_RX: i32 = 12;
pub const AXIS_RY: i32 = 13;
pub const AXIS_RZ: i32 = 14;
pub const AXIS_HAT_X: i32 = 15;
pub const AXIS_HAT_Y: i32 = 16;
pub const AXIS_LTRIGGER: i32 = 17;
pub const AXIS_RTRIGGER: i32 = 18;
pub const AXIS_THROTTLE: i32 = 19;
pub const AXIS_RUDDER: i32 = 20;
pub const AXIS_WHEEL: i32 = 21;
pub const AXIS_GAS: i32 = 22;
pub const AXIS_BRAKE: i32 = 23;
pub const AXIS_DISTANCE: i32 = 24;
pub const AXIS_TILT: i32 = 25;
pub const AXIS_SCROLL: i32 = 26;
pub const AXIS_RELATIVE_X: i32 = 27;
pub const AXIS_RELATIVE_Y: i32 = 28;
pub const AXIS_GENERIC_1: i32 = 32;
pub const AXIS_GENERIC_16: i32 = 47;
pub const AXIS_GESTURE_X_OFFSET: i32 = 48;
pub const AXIS_GESTURE_Y_OFFSET: i32 = 49;
pub const AXIS_GESTURE_SCROLL_X_DISTANCE: i32 = 50;
pub const AXIS_GESTURE_SCROLL_Y_DISTANCE: i32 = 51;
pub const AXIS_GESTURE_PINCH_SCALE_FACTOR: i32 = 52;

/// Highest addressable axis
pub const MAX_AXIS: i32 = 63;

const NAMED_AXES: &[(i32, &str)] = &[
    (AXIS_X, "AXIS_X"),
    (AXIS_Y, "AXIS_Y"),
    (AXIS_PRESSURE, "AXIS_PRESSURE"),
    (AXIS_SIZE, "AXIS_SIZE"),
    (AXIS_TOUCH_MAJOR, "AXIS_TOUCH_MAJOR"),
    (AXIS_TOUCH_MINOR, "AXIS_TOUCH_MINOR"),
    (AXIS_TOOL_MAJOR, "AXIS_TOOL_MAJOR"),
    (AXIS_TOOL_MINOR, "AXIS_TOOL_MINOR"),
    (AXIS_ORIENTATION, "AXIS_ORIENTATION"),
    (AXIS_VSCROLL, "AXIS_VSCROLL"),
    (AXIS_HSCROLL, "AXIS_HSCROLL"),
    (AXIS_Z, "AXIS_Z"),
    (AXIS_RX, "AXIS_RX"),
    (AXIS_RY, "AXIS_RY"),
    (AXIS_RZ, "AXIS_RZ"),
    (AXIS_HAT_X, "AXIS_HAT_X"),
    (AXIS_HAT_Y, "AXIS_HAT_Y"),
    (AXIS_LTRIGGER, "AXIS_LTRIGGER"),
    (AXIS_RTRIGGER, "AXIS_RTRIGGER"),
    (AXIS_THROTTLE, "AXIS_THROTTLE"),
    (AXIS_RUDDER, "AXIS_RUDDER"),
    (AXIS_WHEEL, "AXIS_WHEEL"),
    (AXIS_GAS, "AXIS_GAS"),
    (AXIS_BRAKE, "AXIS_BRAKE"),
    (AXIS_DISTANCE, "AXIS_DISTANCE"),
    (AXIS_TILT, "AXIS_TILT"),
    (AXIS_SCROLL, "AXIS_SCROLL"),
    (AXIS_RELATIVE_X, "AXIS_RELATIVE_X"),
    (AXIS_RELATIVE_Y, "AXIS_RELATIVE_Y"),
    (AXIS_GESTURE_X_OFFSET, "AXIS_GESTURE_X_OFFSET"),
    (AXIS_GESTURE_Y_OFFSET, "AXIS_GESTURE_Y_OFFSET"),
    (AXIS_GESTURE_SCROLL_X_DISTANCE, "AXIS_GESTURE_SCROLL_X_DISTANCE"),
    (AXIS_GESTURE_SCROLL_Y_DISTANCE, "AXIS_GESTURE_SCROLL_Y_DISTANCE"),
    (AXIS_GESTURE_PINCH_SCALE_FACTOR, "AXIS_GESTURE_PINCH_SCALE_FACTOR"),
];

/// Whether `axis` is addressable at all
#[inline]
pub fn is_valid_axis(axis: i32) -> bool {
    (0..=MAX_AXIS).contains(&axis)
}

/// Symbolic name of an axis, or its number when it has none
pub fn axis_to_string(axis: i32) -> String {
    if let Some((_, name)) = NAMED_AXES.iter().find(|(a, _)| *a == axis) {
        return (*name).to_string();
    }
    if (AXIS_GENERIC_1..=AXIS_GENERIC_16).contains(&axis) {
        return format!("AXIS_GENERIC_{}", axis - AXIS_GENERIC_1 + 1);
    }
    axis.to_string()
}

/// Parse a symbolic name (or a plain number) back to an axis
pub fn axis_from_string(name: &str) -> Option<i32> {
    if let Some((axis, _)) = NAMED_AXES.iter().find(|(_, n)| *n == name) {
        return Some(*axis);
    }
    if let Some(generic) = name.strip_prefix("AXIS_GENERIC_") {
        let n: i32 = generic.parse().ok()?;
        return (1..=16).contains(&n).then_some(AXIS_GENERIC_1 + n - 1);
    }
    name.parse().ok().filter(|a| is_valid_axis(*a))
}
