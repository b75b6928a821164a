//! fOS Motion
//!
//! Motion events for the fOS input layer:
//! - Axis, action, source and tool vocabulary
//! - Pointer samples with fixed and sparse axes
//! - The event record with logical and raw transforms
//! - Pooled events with batching, splitting and clamping

pub mod action;
pub mod axis;
pub mod event;
pub mod native;
pub mod pointer;
pub mod pool;
pub mod source;

pub use action::{Buttons, EdgeFlags, MotionFlags};
pub use event::{MotionEvent, ObtainArgs};
pub use native::{
    calculate_transformed_axis_value, calculate_transformed_coords, is_touch_event, MotionEventN,
    MotionEventParams, HISTORY_CURRENT, INVALID_CURSOR_POSITION, MAX_POINTERS, MAX_POINTER_ID,
};
pub use pointer::{PointerCoords, PointerProperties, MAX_AXES};
pub use pool::{EventPool, PointerScratch, DEFAULT_POOL_CAPACITY};
pub use source::{Classification, Source, ToolType};

/// Motion event error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MotionError {
    #[error("Invalid axis: {0}")]
    InvalidAxis(i32),

    #[error("Axis table full ({max} entries), cannot add axis {axis}", max = MAX_AXES)]
    AxisCapacity { axis: i32 },

    #[error("Event has no pointers")]
    NoPointers,

    #[error("Pointer count mismatch: {properties} properties, {coords} coords")]
    PointerCountMismatch { properties: usize, coords: usize },

    #[error("Too many pointers: {0} (max {max})", max = MAX_POINTERS)]
    TooManyPointers(usize),

    #[error("Invalid pointer id: {0}")]
    InvalidPointerId(i32),

    #[error("Id bits {0:#010x} matched no pointer")]
    SplitMatchedNothing(u32),

    #[error("Pointer index {index} out of range ({count} pointers)")]
    PointerIndexOutOfRange { index: usize, count: usize },

    #[error("History position {pos} out of range ({size} samples)")]
    HistoryIndexOutOfRange { pos: usize, size: usize },
}
