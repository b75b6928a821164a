//! fOS Geometry
//!
//! Low-level geometry for the fOS input layer:
//! - MSB-first bitsets and bit-keyed sparse tables
//! - Points, rects and row-major 3x3 matrices
//! - Display transforms with lazy orientation classification

pub mod bitset;
pub mod primitives;
pub mod transform;

pub use bitset::{BitSet32, BitSet64, SparseBits, SparseTable};
pub use primitives::{Matrix3, Rect, RectF, RowMajor3x3, Vec2, Vec3};
pub use transform::{transform_angle, RotationFlags, Transform, TransformType, EPSILON};

/// Geometry error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("Invalid rotation flags: {0:#x}")]
    InvalidRotation(u32),
}
