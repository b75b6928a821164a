//! Input sources, tools and classifications

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

bitflags! {
    /// Input source: a class in the low byte plus device bits above it.
    ///
    /// Device constants already include their class, so
    /// `Source::TOUCHSCREEN.contains(Source::CLASS_POINTER)` holds.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Source: u32 {
        const CLASS_MASK = 0x0000_00ff;
        const CLASS_BUTTON = 0x0000_0001;
        const CLASS_POINTER = 0x0000_0002;
        const CLASS_NAVIGATION = 0x0000_0004;
        const CLASS_POSITION = 0x0000_0008;
        const CLASS_JOYSTICK = 0x0000_0010;

        const KEYBOARD = 0x0000_0100 | Self::CLASS_BUTTON.bits();
        const DPAD = 0x0000_0200 | Self::CLASS_BUTTON.bits();
        const GAMEPAD = 0x0000_0400 | Self::CLASS_BUTTON.bits();
        const TOUCHSCREEN = 0x0000_1000 | Self::CLASS_POINTER.bits();
        const MOUSE = 0x0000_2000 | Self::CLASS_POINTER.bits();
        const STYLUS = 0x0000_4000 | Self::CLASS_POINTER.bits();
        const BLUETOOTH_STYLUS = 0x0000_8000 | Self::STYLUS.bits();
        const TRACKBALL = 0x0001_0000 | Self::CLASS_NAVIGATION.bits();
        const MOUSE_RELATIVE = 0x0002_0000 | Self::CLASS_NAVIGATION.bits();
        const TOUCHPAD = 0x0010_0000 | Self::CLASS_POSITION.bits();
        const TOUCH_NAVIGATION = 0x0020_0000;
        const ROTARY_ENCODER = 0x0040_0000;
        const JOYSTICK = 0x0100_0000 | Self::CLASS_JOYSTICK.bits();
        const HDMI = 0x0200_0000 | Self::CLASS_BUTTON.bits();
        const SENSOR = 0x0400_0000;
    }
}

impl Source {
    pub const UNKNOWN: Self = Self::empty();

    /// Whether every bit of `test` is present
    #[inline]
    pub fn is_from_source(self, test: Source) -> bool {
        self.contains(test)
    }
}

/// Joystick, absolute-position and relative-mouse coordinates are not tied to
/// a screen location, so only the linear part of a transform applies to them.
pub fn should_disregard_transformation(source: Source) -> bool {
    source.is_from_source(Source::CLASS_JOYSTICK)
        || source.is_from_source(Source::CLASS_POSITION)
        || source.is_from_source(Source::MOUSE_RELATIVE)
}

/// Non-pointer sources never take a window offset
pub fn should_disregard_offset(source: Source) -> bool {
    !source.is_from_source(Source::CLASS_POINTER)
}

/// Tool used by a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum ToolType {
    Unknown = 0,
    Finger = 1,
    Stylus = 2,
    Mouse = 3,
    Eraser = 4,
    Palm = 5,
}

impl Default for ToolType {
    fn default() -> Self {
        ToolType::Unknown
    }
}

impl ToolType {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolType::Unknown => "TOOL_TYPE_UNKNOWN",
            ToolType::Finger => "TOOL_TYPE_FINGER",
            ToolType::Stylus => "TOOL_TYPE_STYLUS",
            ToolType::Mouse => "TOOL_TYPE_MOUSE",
            ToolType::Eraser => "TOOL_TYPE_ERASER",
            ToolType::Palm => "TOOL_TYPE_PALM",
        }
    }
}

/// Gesture classification supplied by the input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum Classification {
    None = 0,
    AmbiguousGesture = 1,
    DeepPress = 2,
    TwoFingerSwipe = 3,
    MultiFingerSwipe = 4,
    Pinch = 5,
}

impl Default for Classification {
    fn default() -> Self {
        Classification::None
    }
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::None => "NONE",
            Classification::AmbiguousGesture => "AMBIGUOUS_GESTURE",
            Classification::DeepPress => "DEEP_PRESS",
            Classification::TwoFingerSwipe => "TWO_FINGER_SWIPE",
            Classification::MultiFingerSwipe => "MULTI_FINGER_SWIPE",
            Classification::Pinch => "PINCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_sources_carry_class() {
        assert!(Source::TOUCHSCREEN.is_from_source(Source::CLASS_POINTER));
        assert!(Source::MOUSE.is_from_source(Source::CLASS_POINTER));
        assert!(Source::JOYSTICK.is_from_source(Source::CLASS_JOYSTICK));
        assert!(!Source::KEYBOARD.is_from_source(Source::CLASS_POINTER));
        assert_eq!(Source::TOUCHSCREEN.bits(), 0x1002);
        assert_eq!(Source::BLUETOOTH_STYLUS.bits(), 0xc002);
    }

    #[test]
    fn test_disregard_rules() {
        assert!(should_disregard_transformation(Source::JOYSTICK));
        assert!(should_disregard_transformation(Source::TOUCHPAD));
        assert!(should_disregard_transformation(Source::MOUSE_RELATIVE));
        assert!(!should_disregard_transformation(Source::TOUCHSCREEN));
        assert!(!should_disregard_transformation(Source::TRACKBALL));

        assert!(should_disregard_offset(Source::TRACKBALL));
        assert!(!should_disregard_offset(Source::MOUSE));
    }

    #[test]
    fn test_tool_type_conversion() {
        assert_eq!(ToolType::try_from(2), Ok(ToolType::Stylus));
        assert!(ToolType::try_from(42).is_err());
        assert_eq!(i32::from(ToolType::Palm), 5);
        assert_eq!(Classification::try_from(2).map(Classification::as_str), Ok("DEEP_PRESS"));
    }
}
