//! Pointer samples
//!
//! `PointerCoords` keeps the axes that dominate touch processing in named
//! fields and packs every other axis into a sparse table keyed by a
//! `BitSet64`. Zero is the implicit value of an absent axis.

use fos_geometry::{transform_angle, BitSet64, SparseTable, Transform, Vec2};

use crate::axis::*;
use crate::source::ToolType;
use crate::MotionError;

/// Maximum number of sparse axes a single sample can hold
pub const MAX_AXES: usize = 30;

/// Coordinates of one pointer in one sample
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerCoords {
    pub x: f32,
    pub y: f32,
    pub pressure: f32,
    pub size: f32,
    pub touch_major: f32,
    pub touch_minor: f32,
    pub tool_major: f32,
    pub tool_minor: f32,
    pub orientation: f32,
    pub relative_x: f32,
    pub relative_y: f32,
    /// Synthesized by resampling rather than reported by the device
    pub is_resampled: bool,
    sparse: SparseTable<BitSet64, f32>,
}

impl PointerCoords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a plain position
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Reset every axis to zero
    pub fn clear(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
        self.pressure = 0.0;
        self.size = 0.0;
        self.touch_major = 0.0;
        self.touch_minor = 0.0;
        self.tool_major = 0.0;
        self.tool_minor = 0.0;
        self.orientation = 0.0;
        self.relative_x = 0.0;
        self.relative_y = 0.0;
        self.is_resampled = false;
        self.sparse.clear();
    }

    /// Deep copy, reusing this sample's sparse storage
    pub fn copy_from(&mut self, other: &PointerCoords) {
        self.clone_from(other);
    }

    #[inline]
    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn set_xy(&mut self, xy: Vec2) {
        self.x = xy.x;
        self.y = xy.y;
    }

    fn fixed(&self, axis: i32) -> Option<f32> {
        let value = match axis {
            AXIS_X => self.x,
            AXIS_Y => self.y,
            AXIS_PRESSURE => self.pressure,
            AXIS_SIZE => self.size,
            AXIS_TOUCH_MAJOR => self.touch_major,
            AXIS_TOUCH_MINOR => self.touch_minor,
            AXIS_TOOL_MAJOR => self.tool_major,
            AXIS_TOOL_MINOR => self.tool_minor,
            AXIS_ORIENTATION => self.orientation,
            AXIS_RELATIVE_X => self.relative_x,
            AXIS_RELATIVE_Y => self.relative_y,
            _ => return None,
        };
        Some(value)
    }

    fn fixed_mut(&mut self, axis: i32) -> Option<&mut f32> {
        let field = match axis {
            AXIS_X => &mut self.x,
            AXIS_Y => &mut self.y,
            AXIS_PRESSURE => &mut self.pressure,
            AXIS_SIZE => &mut self.size,
            AXIS_TOUCH_MAJOR => &mut self.touch_major,
            AXIS_TOUCH_MINOR => &mut self.touch_minor,
            AXIS_TOOL_MAJOR => &mut self.tool_major,
            AXIS_TOOL_MINOR => &mut self.tool_minor,
            AXIS_ORIENTATION => &mut self.orientation,
            AXIS_RELATIVE_X => &mut self.relative_x,
            AXIS_RELATIVE_Y => &mut self.relative_y,
            _ => return None,
        };
        Some(field)
    }

    /// Value of `axis`; absent sparse axes read as zero
    pub fn axis_value(&self, axis: i32) -> Result<f32, MotionError> {
        if !is_valid_axis(axis) {
            return Err(MotionError::InvalidAxis(axis));
        }
        Ok(self
            .fixed(axis)
            .unwrap_or_else(|| self.sparse.get(axis as u32).copied().unwrap_or(0.0)))
    }

    /// Set `axis`.
    ///
    /// Writing zero to an absent sparse axis stores nothing. A present axis
    /// is overwritten in place, even with zero. A new nonzero axis is
    /// inserted at its sorted slot unless the table already holds
    /// [`MAX_AXES`] values.
    pub fn set_axis_value(&mut self, axis: i32, value: f32) -> Result<(), MotionError> {
        if !is_valid_axis(axis) {
            return Err(MotionError::InvalidAxis(axis));
        }
        if let Some(field) = self.fixed_mut(axis) {
            *field = value;
            return Ok(());
        }

        let bit = axis as u32;
        if let Some(slot) = self.sparse.get_mut(bit) {
            *slot = value;
            return Ok(());
        }
        if value == 0.0 {
            return Ok(());
        }
        if self.sparse.len() >= MAX_AXES {
            return Err(MotionError::AxisCapacity { axis });
        }
        self.sparse.insert(bit, value);
        Ok(())
    }

    /// Whether a sparse axis has been stored (fixed axes are always present)
    pub fn has_axis(&self, axis: i32) -> bool {
        is_valid_axis(axis) && (self.fixed(axis).is_some() || self.sparse.contains(axis as u32))
    }

    /// Presence map of the sparse axes
    pub fn sparse_bits(&self) -> BitSet64 {
        self.sparse.bits()
    }

    /// Stored sparse axes in ascending order
    pub fn iter_sparse(&self) -> impl Iterator<Item = (i32, f32)> + '_ {
        self.sparse.iter().map(|(bit, value)| (bit as i32, *value))
    }

    /// Scale positions and relative motion by the window factors.
    ///
    /// Pressure, size, contact extents and orientation are normalized or
    /// angular and stay as they are, so `_global_scale_factor` has nothing
    /// to act on here.
    pub fn scale(&mut self, _global_scale_factor: f32, window_x_scale: f32, window_y_scale: f32) {
        self.x *= window_x_scale;
        self.y *= window_y_scale;
        self.relative_x *= window_x_scale;
        self.relative_y *= window_y_scale;
    }

    /// Map this sample through `transform`.
    ///
    /// Position takes the full transform, relative motion only its linear
    /// part, and orientation goes through [`transform_angle`].
    pub fn transform(&mut self, transform: &Transform) {
        self.set_xy(transform.transform_point(self.xy()));

        let relative = transform.transform_vector(self.relative_x, self.relative_y);
        self.relative_x = relative.x;
        self.relative_y = relative.y;

        self.orientation = transform_angle(transform, self.orientation);
    }
}

/// Identity and tool of one pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerProperties {
    /// Stable id from down to up; -1 when unset
    pub id: i32,
    pub tool_type: ToolType,
}

impl Default for PointerProperties {
    fn default() -> Self {
        Self {
            id: -1,
            tool_type: ToolType::Unknown,
        }
    }
}

impl PointerProperties {
    pub const fn new(id: i32, tool_type: ToolType) -> Self {
        Self { id, tool_type }
    }

    pub fn finger(id: i32) -> Self {
        Self::new(id, ToolType::Finger)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_geometry::{Matrix3, RotationFlags};

    #[test]
    fn test_fixed_axes_dispatch_to_fields() {
        let mut c = PointerCoords::new();
        c.set_axis_value(AXIS_X, 10.0).unwrap();
        c.set_axis_value(AXIS_PRESSURE, 0.5).unwrap();
        c.set_axis_value(AXIS_RELATIVE_Y, -2.0).unwrap();
        assert_eq!(c.x, 10.0);
        assert_eq!(c.pressure, 0.5);
        assert_eq!(c.relative_y, -2.0);
        assert!(c.sparse_bits().is_empty());
    }

    #[test]
    fn test_sparse_insert_keeps_order() {
        let mut c = PointerCoords::new();
        c.set_axis_value(AXIS_GENERIC_1, 3.0).unwrap();
        c.set_axis_value(AXIS_VSCROLL, 1.0).unwrap();
        c.set_axis_value(AXIS_TILT, 2.0).unwrap();
        let axes: Vec<i32> = c.iter_sparse().map(|(a, _)| a).collect();
        assert_eq!(axes, vec![AXIS_VSCROLL, AXIS_TILT, AXIS_GENERIC_1]);
        assert_eq!(c.axis_value(AXIS_TILT), Ok(2.0));
        assert_eq!(c.axis_value(AXIS_HSCROLL), Ok(0.0));
    }

    #[test]
    fn test_zero_write_to_absent_axis_is_noop() {
        let mut c = PointerCoords::new();
        c.set_axis_value(AXIS_HSCROLL, 0.0).unwrap();
        assert!(!c.has_axis(AXIS_HSCROLL));
        assert_eq!(c.sparse_bits().count(), 0);
    }

    #[test]
    fn test_zero_overwrite_of_present_axis() {
        let mut c = PointerCoords::new();
        c.set_axis_value(AXIS_HSCROLL, 4.0).unwrap();
        c.set_axis_value(AXIS_HSCROLL, 0.0).unwrap();
        // Still stored, now as an explicit zero
        assert!(c.has_axis(AXIS_HSCROLL));
        assert_eq!(c.axis_value(AXIS_HSCROLL), Ok(0.0));
    }

    #[test]
    fn test_invalid_axis() {
        let mut c = PointerCoords::new();
        assert_eq!(c.set_axis_value(64, 1.0), Err(MotionError::InvalidAxis(64)));
        assert_eq!(c.axis_value(-1), Err(MotionError::InvalidAxis(-1)));
    }

    #[test]
    fn test_capacity_exhaustion() {
        let mut c = PointerCoords::new();
        let sparse_axes: Vec<i32> = (9..=63)
            .filter(|a| *a != AXIS_RELATIVE_X && *a != AXIS_RELATIVE_Y)
            .collect();
        for &axis in sparse_axes.iter().take(MAX_AXES) {
            c.set_axis_value(axis, 1.0).unwrap();
        }
        let overflow = sparse_axes[MAX_AXES];
        assert_eq!(
            c.set_axis_value(overflow, 1.0),
            Err(MotionError::AxisCapacity { axis: overflow })
        );
        // Overwrites still succeed when full
        assert!(c.set_axis_value(sparse_axes[0], 7.0).is_ok());
        assert_eq!(c.sparse_bits().count() as usize, MAX_AXES);
    }

    #[test]
    fn test_copy_from() {
        let mut a = PointerCoords::at(1.0, 2.0);
        a.set_axis_value(AXIS_WHEEL, 5.0).unwrap();
        let mut b = PointerCoords::new();
        b.set_axis_value(AXIS_GAS, 9.0).unwrap();
        b.copy_from(&a);
        assert_eq!(a, b);
        assert!(!b.has_axis(AXIS_GAS));
    }

    #[test]
    fn test_scale() {
        let mut c = PointerCoords::at(10.0, 20.0);
        c.relative_x = 1.0;
        c.relative_y = 2.0;
        c.pressure = 0.8;
        c.orientation = 0.5;
        c.touch_major = 4.0;
        c.scale(2.0, 2.0, 3.0);
        assert_eq!(c.xy(), Vec2::new(20.0, 60.0));
        assert_eq!((c.relative_x, c.relative_y), (2.0, 6.0));
        assert_eq!(c.pressure, 0.8);
        assert_eq!(c.orientation, 0.5);
        assert_eq!(c.touch_major, 4.0);
    }

    #[test]
    fn test_transform_skips_translation_for_relative() {
        let mut c = PointerCoords::at(1.0, 1.0);
        c.relative_x = 3.0;
        c.relative_y = 4.0;
        let t = Transform::from_matrix(&Matrix3::scale_translate(2.0, 2.0, 100.0, 100.0));
        c.transform(&t);
        assert_eq!(c.xy(), Vec2::new(102.0, 102.0));
        assert_eq!((c.relative_x, c.relative_y), (6.0, 8.0));
    }

    #[test]
    fn test_transform_rotates_orientation() {
        let mut c = PointerCoords::new();
        let t = Transform::from_rotation(RotationFlags::ROT_180, 100.0, 100.0).unwrap();
        c.transform(&t);
        assert!((c.orientation.abs() - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn test_pointer_properties_default_is_unset() {
        let mut p = PointerProperties::finger(3);
        p.clear();
        assert_eq!(p.id, -1);
        assert_eq!(p.tool_type, ToolType::Unknown);
    }
}
