//! Display transforms
//!
//! 2D affine transform with a lazily computed classification. The matrix is
//! stored row-major:
//!
//! ```text
//! | dsdx dtdx tx |
//! | dtdy dsdy ty |
//! |  0    0    1 |
//! ```
//!
//! The cached type word packs a [`TransformType`] in the low byte and the
//! [`RotationFlags`] orientation in the next byte. When the top bit
//! (`UNKNOWN_TYPE`) is set the classification is stale and is recomputed on
//! the next query.

use std::cell::Cell;
use std::fmt;
use std::ops::Mul;

use bitflags::bitflags;

use crate::primitives::{Rect, RectF, RowMajor3x3, Vec2, Vec3};
use crate::GeometryError;

/// Tolerance used by every zero test. It is the smallest positive `f32`, so
/// only exact zeros (and denormal dust) count as zero.
pub const EPSILON: f32 = f32::from_bits(1);

const UNKNOWN_TYPE: u32 = 0x8000_0000;
const ORIENTATION_SHIFT: u32 = 8;

bitflags! {
    /// Coarse classification of a transform (empty = identity)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TransformType: u32 {
        const TRANSLATE = 0x1;
        const ROTATE = 0x2;
        const SCALE = 0x4;
        const UNKNOWN = 0x8;
    }
}

bitflags! {
    /// Orientation as a composition of flips and a quarter turn
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RotationFlags: u32 {
        const FLIP_H = 0x1;
        const FLIP_V = 0x2;
        const ROT_90 = 0x4;
        const ROT_180 = Self::FLIP_H.bits() | Self::FLIP_V.bits();
        const ROT_270 = Self::ROT_180.bits() | Self::ROT_90.bits();
        const ROT_INVALID = 0x80;
    }
}

impl RotationFlags {
    pub const ROT_0: Self = Self::empty();
}

#[inline]
fn is_zero(f: f32) -> bool {
    f.abs() <= EPSILON
}

#[inline]
fn abs_is_one(f: f32) -> bool {
    is_zero(f.abs() - 1.0)
}

/// 2D affine transform
#[derive(Clone)]
pub struct Transform {
    m: [f32; 9],
    ty: Cell<u32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity transform
    pub const fn identity() -> Self {
        Self {
            m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            ty: Cell::new(0),
        }
    }

    /// Pure translation
    pub fn from_translation(tx: f32, ty: f32) -> Self {
        let mut t = Self::identity();
        t.set_translation(tx, ty);
        t
    }

    /// Display rotation for a `w` x `h` frame
    pub fn from_rotation(flags: RotationFlags, w: f32, h: f32) -> Result<Self, GeometryError> {
        let mut t = Self::identity();
        t.set_rotation(flags, w, h)?;
        Ok(t)
    }

    /// Load a row-major 3x3 matrix
    pub fn from_matrix(matrix: &impl RowMajor3x3) -> Self {
        let mut t = Self::identity();
        t.set_matrix(matrix);
        t
    }

    pub fn reset(&mut self) {
        *self = Self::identity();
    }

    /// Replace the translation, updating the type incrementally
    pub fn set_translation(&mut self, tx: f32, ty: f32) {
        self.m[2] = tx;
        self.m[5] = ty;
        self.m[8] = 1.0;

        let t = TransformType::TRANSLATE.bits();
        if is_zero(tx) && is_zero(ty) {
            self.ty.set(self.ty.get() & !t);
        } else {
            self.ty.set(self.ty.get() | t);
        }
    }

    /// Replace the 2x2 linear part
    pub fn set_linear(&mut self, dsdx: f32, dtdx: f32, dtdy: f32, dsdy: f32) {
        self.m[0] = dsdx;
        self.m[1] = dtdx;
        self.m[3] = dtdy;
        self.m[4] = dsdy;
        self.m[6] = 0.0;
        self.m[7] = 0.0;
        self.ty.set(UNKNOWN_TYPE);
    }

    /// Load a row-major matrix and classify it immediately
    pub fn set_matrix(&mut self, matrix: &impl RowMajor3x3) {
        self.m = matrix.row_major();
        self.ty.set(UNKNOWN_TYPE);
        self.type_mask();
    }

    /// Build a display rotation from orientation flags.
    ///
    /// The flips and the quarter turn each carry their own translation so the
    /// content stays inside `[0, w) x [0, h)`, and they compose as
    /// `R * (H * V)`. A quarter turn swaps `w` and `h` first.
    pub fn set_rotation(&mut self, flags: RotationFlags, w: f32, h: f32) -> Result<(), GeometryError> {
        if flags.contains(RotationFlags::ROT_INVALID) {
            self.reset();
            return Err(GeometryError::InvalidRotation(flags.bits()));
        }

        let (w, h) = if flags.contains(RotationFlags::ROT_90) {
            (h, w)
        } else {
            (w, h)
        };

        let mut flip_h = Transform::identity();
        let mut flip_v = Transform::identity();
        let mut rot = Transform::identity();

        if flags.contains(RotationFlags::FLIP_H) {
            flip_h.m[0] = -1.0;
            flip_h.m[2] = w;
            flip_h.ty.set(Self::pack(
                RotationFlags::FLIP_H,
                TransformType::SCALE | Self::translate_bit(w),
            ));
        }

        if flags.contains(RotationFlags::FLIP_V) {
            flip_v.m[4] = -1.0;
            flip_v.m[5] = h;
            flip_v.ty.set(Self::pack(
                RotationFlags::FLIP_V,
                TransformType::SCALE | Self::translate_bit(h),
            ));
        }

        if flags.contains(RotationFlags::ROT_90) {
            let original_w = h;
            rot.m[0] = 0.0;
            rot.m[1] = -1.0;
            rot.m[2] = original_w;
            rot.m[3] = 1.0;
            rot.m[4] = 0.0;
            rot.ty.set(Self::pack(
                RotationFlags::ROT_90,
                TransformType::ROTATE | Self::translate_bit(original_w),
            ));
        }

        *self = &rot * &(&flip_h * &flip_v);
        Ok(())
    }

    fn pack(orientation: RotationFlags, ty: TransformType) -> u32 {
        (orientation.bits() << ORIENTATION_SHIFT) | ty.bits()
    }

    fn translate_bit(offset: f32) -> TransformType {
        if is_zero(offset) {
            TransformType::empty()
        } else {
            TransformType::TRANSLATE
        }
    }

    #[inline]
    pub fn tx(&self) -> f32 {
        self.m[2]
    }

    #[inline]
    pub fn ty(&self) -> f32 {
        self.m[5]
    }

    #[inline]
    pub fn dsdx(&self) -> f32 {
        self.m[0]
    }

    #[inline]
    pub fn dtdx(&self) -> f32 {
        self.m[1]
    }

    #[inline]
    pub fn dtdy(&self) -> f32 {
        self.m[3]
    }

    #[inline]
    pub fn dsdy(&self) -> f32 {
        self.m[4]
    }

    /// Determinant of the linear part
    pub fn det(&self) -> f32 {
        self.m[0] * self.m[4] - self.m[3] * self.m[1]
    }

    pub fn scale_x(&self) -> f32 {
        (self.dsdx() * self.dsdx() + self.dtdx() * self.dtdx()).sqrt()
    }

    pub fn scale_y(&self) -> f32 {
        (self.dtdy() * self.dtdy() + self.dsdy() * self.dsdy()).sqrt()
    }

    /// Matrix as nine row-major floats
    pub fn as_matrix(&self) -> [f32; 9] {
        self.m
    }

    /// Packed type word, recomputed first if stale
    pub fn type_mask(&self) -> u32 {
        if self.ty.get() & UNKNOWN_TYPE != 0 {
            self.ty.set(self.classify());
        }
        self.ty.get()
    }

    fn classify(&self) -> u32 {
        let a = self.m[0];
        let b = self.m[1];
        let c = self.m[3];
        let d = self.m[4];
        let x = self.m[2];
        let y = self.m[5];

        let mut scale = false;
        let mut flags = RotationFlags::ROT_0;

        if is_zero(b) && is_zero(c) {
            if a < 0.0 {
                flags |= RotationFlags::FLIP_H;
            }
            if d < 0.0 {
                flags |= RotationFlags::FLIP_V;
            }
            if !abs_is_one(a) || !abs_is_one(d) {
                scale = true;
            }
        } else if is_zero(a) && is_zero(d) {
            flags |= RotationFlags::ROT_90;
            if b > 0.0 {
                flags |= RotationFlags::FLIP_V;
            }
            if c < 0.0 {
                flags |= RotationFlags::FLIP_H;
            }
            if !abs_is_one(b) || !abs_is_one(c) {
                scale = true;
            }
        } else {
            // skew, or a rotation that is not a multiple of 90 degrees
            flags = RotationFlags::ROT_INVALID;
        }

        let mut ty = flags.bits() << ORIENTATION_SHIFT;
        if flags.contains(RotationFlags::ROT_INVALID) {
            ty |= TransformType::UNKNOWN.bits();
        } else {
            if flags.contains(RotationFlags::ROT_90) || flags.contains(RotationFlags::ROT_180) {
                ty |= TransformType::ROTATE.bits();
            }
            if flags.contains(RotationFlags::FLIP_H) {
                ty ^= TransformType::SCALE.bits();
            }
            if flags.contains(RotationFlags::FLIP_V) {
                ty ^= TransformType::SCALE.bits();
            }
            if scale {
                ty |= TransformType::SCALE.bits();
            }
        }

        if !is_zero(x) || !is_zero(y) {
            ty |= TransformType::TRANSLATE.bits();
        }
        ty
    }

    /// Classification (low byte of the type word)
    pub fn get_type(&self) -> TransformType {
        TransformType::from_bits_truncate(self.type_mask() & 0xFF)
    }

    /// Orientation flags
    pub fn get_orientation(&self) -> RotationFlags {
        RotationFlags::from_bits_truncate((self.type_mask() >> ORIENTATION_SHIFT) & 0xFF)
    }

    /// Whether axis-aligned rects stay axis-aligned
    pub fn preserve_rects(&self) -> bool {
        !self.get_orientation().contains(RotationFlags::ROT_INVALID)
    }

    pub fn is_identity(&self) -> bool {
        self.get_type().is_empty()
    }

    #[inline]
    pub fn transform_xy(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            self.m[0] * x + self.m[1] * y + self.m[2],
            self.m[3] * x + self.m[4] * y + self.m[5],
        )
    }

    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        self.transform_xy(p.x, p.y)
    }

    /// Apply the full 3x3 matrix to a homogeneous coordinate
    pub fn transform_vec3(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z,
            m[3] * v.x + m[4] * v.y + m[5] * v.z,
            m[6] * v.x + m[7] * v.y + m[8] * v.z,
        )
    }

    /// Apply only the linear part (translation cancels out)
    pub fn transform_vector(&self, x: f32, y: f32) -> Vec2 {
        self.transform_xy(x, y) - self.transform_xy(0.0, 0.0)
    }

    fn corners(&self, left: f32, top: f32, right: f32, bottom: f32) -> (f32, f32, f32, f32) {
        let pts = [
            self.transform_xy(left, top),
            self.transform_xy(right, top),
            self.transform_xy(left, bottom),
            self.transform_xy(right, bottom),
        ];
        let min_x = pts.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let min_y = pts.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_x = pts.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let max_y = pts.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        (min_x, min_y, max_x, max_y)
    }

    /// Transform all four corners and take the axis-aligned bounds.
    ///
    /// `round_outwards` floors the minimum and ceils the maximum; otherwise
    /// every edge is rounded to nearest with `floor(v + 0.5)`.
    pub fn transform_rect(&self, bounds: &Rect, round_outwards: bool) -> Rect {
        let (min_x, min_y, max_x, max_y) = self.corners(
            bounds.left as f32,
            bounds.top as f32,
            bounds.right as f32,
            bounds.bottom as f32,
        );

        if round_outwards {
            Rect::new(
                min_x.floor() as i32,
                min_y.floor() as i32,
                max_x.ceil() as i32,
                max_y.ceil() as i32,
            )
        } else {
            Rect::new(
                (min_x + 0.5).floor() as i32,
                (min_y + 0.5).floor() as i32,
                (max_x + 0.5).floor() as i32,
                (max_y + 0.5).floor() as i32,
            )
        }
    }

    /// Float bounds of the transformed rect
    pub fn transform_rect_f(&self, bounds: &RectF) -> RectF {
        let (min_x, min_y, max_x, max_y) =
            self.corners(bounds.left, bounds.top, bounds.right, bounds.bottom);
        RectF::new(min_x, min_y, max_x, max_y)
    }

    /// Inverse transform.
    ///
    /// Translation-only transforms negate their offset. Otherwise the 2x2
    /// part is inverted through the determinant and the new offset is
    /// `inverse(-tx, -ty)`. A quarter-turn component marks the result stale,
    /// since ROT_90 and ROT_270 trade places.
    pub fn inverse(&self) -> Transform {
        if self.ty.get() <= TransformType::TRANSLATE.bits() {
            let mut result = self.clone();
            result.m[2] = -result.m[2];
            result.m[5] = -result.m[5];
            return result;
        }

        let a = self.m[0];
        let b = self.m[1];
        let c = self.m[3];
        let d = self.m[4];
        let x = self.m[2];
        let y = self.m[5];
        let idet = 1.0 / self.det();

        let mut result = Transform::identity();
        result.m[0] = d * idet;
        result.m[3] = -c * idet;
        result.m[1] = -b * idet;
        result.m[4] = a * idet;
        result.ty.set(self.ty.get());

        if self.get_orientation().contains(RotationFlags::ROT_90) {
            result.ty.set(result.ty.get() | UNKNOWN_TYPE);
        }

        let t = result.transform_xy(-x, -y);
        result.m[2] = t.x;
        result.m[5] = t.y;
        result
    }
}

impl Mul for &Transform {
    type Output = Transform;

    /// `self * rhs` applies `rhs` first, then `self`
    fn mul(self, rhs: &Transform) -> Transform {
        if self.ty.get() == 0 {
            return rhs.clone();
        }
        if rhs.ty.get() == 0 {
            return self.clone();
        }

        let a = &self.m;
        let b = &rhs.m;
        let mut m = [0.0f32; 9];
        for row in 0..3 {
            for col in 0..3 {
                m[row * 3 + col] = a[row * 3] * b[col]
                    + a[row * 3 + 1] * b[3 + col]
                    + a[row * 3 + 2] * b[6 + col];
            }
        }

        let ty = ((self.ty.get() | rhs.ty.get()) & 0xFF) | UNKNOWN_TYPE;
        Transform { m, ty: Cell::new(ty) }
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        &self * &rhs
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.m == other.m
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("matrix", &self.m)
            .field("type", &format_args!("{:#010x}", self.ty.get()))
            .finish()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = self.get_type();
        let orientation = self.get_orientation();
        write!(f, "Transform (")?;
        if ty.is_empty() {
            write!(f, "IDENTITY")?;
        } else {
            let names: Vec<&str> = ty.iter_names().map(|(name, _)| name).collect();
            write!(f, "{}", names.join("|"))?;
        }
        write!(f, ", orientation={:#04x})", orientation.bits())?;
        for row in 0..3 {
            write!(
                f,
                "\n    {:.4}  {:.4}  {:.4}",
                self.m[row * 3],
                self.m[row * 3 + 1],
                self.m[row * 3 + 2]
            )?;
        }
        Ok(())
    }
}

/// Map a touch orientation angle through `transform`.
///
/// The angle is measured clockwise from vertical with y pointing down.
/// Translation cancels out and scale only affects the vector length.
pub fn transform_angle(transform: &Transform, angle_radians: f32) -> f32 {
    let x = angle_radians.sin();
    let y = -angle_radians.cos();
    let v = transform.transform_xy(x, y) - transform.transform_xy(0.0, 0.0);
    v.x.atan2(-v.y)
}
