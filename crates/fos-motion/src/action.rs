//! Motion actions and event flags
//!
//! An action packs the masked action in the low byte and, for
//! `ACTION_POINTER_DOWN`/`ACTION_POINTER_UP`, the index of the pointer that
//! changed in the next byte.

use bitflags::bitflags;

pub const ACTION_MASK: i32 = 0xff;
pub const ACTION_POINTER_INDEX_MASK: i32 = 0xff00;
pub const ACTION_POINTER_INDEX_SHIFT: i32 = 8;

pub const ACTION_DOWN: i32 = 0;
pub const ACTION_UP: i32 = 1;
pub const ACTION_MOVE: i32 = 2;
pub const ACTION_CANCEL: i32 = 3;
pub const ACTION_OUTSIDE: i32 = 4;
pub const ACTION_POINTER_DOWN: i32 = 5;
pub const ACTION_POINTER_UP: i32 = 6;
pub const ACTION_HOVER_MOVE: i32 = 7;
pub const ACTION_SCROLL: i32 = 8;
pub const ACTION_HOVER_ENTER: i32 = 9;
pub const ACTION_HOVER_EXIT: i32 = 10;
pub const ACTION_BUTTON_PRESS: i32 = 11;
pub const ACTION_BUTTON_RELEASE: i32 = 12;

/// Action without the pointer index
#[inline]
pub const fn action_masked(action: i32) -> i32 {
    action & ACTION_MASK
}

/// Pointer index carried by a pointer action
#[inline]
pub const fn action_index(action: i32) -> usize {
    ((action & ACTION_POINTER_INDEX_MASK) >> ACTION_POINTER_INDEX_SHIFT) as usize
}

/// Pack a masked action with a pointer index
#[inline]
pub const fn pointer_action(masked: i32, index: usize) -> i32 {
    masked | ((index as i32) << ACTION_POINTER_INDEX_SHIFT)
}

/// Whether the action names a specific pointer through its index byte
#[inline]
pub const fn is_pointer_action(action: i32) -> bool {
    matches!(action_masked(action), ACTION_POINTER_DOWN | ACTION_POINTER_UP)
}

pub fn action_to_string(action: i32) -> String {
    let name = match action_masked(action) {
        ACTION_DOWN => "ACTION_DOWN",
        ACTION_UP => "ACTION_UP",
        ACTION_MOVE => "ACTION_MOVE",
        ACTION_CANCEL => "ACTION_CANCEL",
        ACTION_OUTSIDE => "ACTION_OUTSIDE",
        ACTION_POINTER_DOWN => {
            return format!("ACTION_POINTER_DOWN({})", action_index(action));
        }
        ACTION_POINTER_UP => {
            return format!("ACTION_POINTER_UP({})", action_index(action));
        }
        ACTION_HOVER_MOVE => "ACTION_HOVER_MOVE",
        ACTION_SCROLL => "ACTION_SCROLL",
        ACTION_HOVER_ENTER => "ACTION_HOVER_ENTER",
        ACTION_HOVER_EXIT => "ACTION_HOVER_EXIT",
        ACTION_BUTTON_PRESS => "ACTION_BUTTON_PRESS",
        ACTION_BUTTON_RELEASE => "ACTION_BUTTON_RELEASE",
        _ => return action.to_string(),
    };
    name.to_string()
}

bitflags! {
    /// Per-event flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct MotionFlags: u32 {
        const WINDOW_IS_OBSCURED = 0x1;
        const WINDOW_IS_PARTIALLY_OBSCURED = 0x2;
        const HOVER_EXIT_PENDING = 0x4;
        const IS_GENERATED_GESTURE = 0x8;
        /// The gesture was canceled (pointer-up that must not be acted on)
        const CANCELED = 0x20;
        const NO_FOCUS_CHANGE = 0x40;
        const TARGET_ACCESSIBILITY_FOCUS = 0x4000_0000;
        const TAINTED = 0x8000_0000;
    }
}

bitflags! {
    /// Screen edges touched at the start of a gesture
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct EdgeFlags: u32 {
        const TOP = 0x1;
        const BOTTOM = 0x2;
        const LEFT = 0x4;
        const RIGHT = 0x8;
    }
}

bitflags! {
    /// Pressed buttons
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u32 {
        const PRIMARY = 0x1;
        const SECONDARY = 0x2;
        const TERTIARY = 0x4;
        const BACK = 0x8;
        const FORWARD = 0x10;
        const STYLUS_PRIMARY = 0x20;
        const STYLUS_SECONDARY = 0x40;
    }
}
