//! Collision Shapes
//!
//! Circles and axis-aligned boxes. A body's shape never changes after it is
//! created, and it is stored inside the body record in a packed, fixed-size
//! form ([`ShapeData`]) so the whole body buffer can be copied as raw bytes.

use bytemuck::{Pod, Zeroable};

use crate::math::{Fix32, Vec2Fix};

/// Shape tag stored in [`ShapeData::kind`] for circles.
pub const SHAPE_CIRCLE: u32 = 0;

/// Shape tag stored in [`ShapeData::kind`] for axis-aligned boxes.
pub const SHAPE_AABB: u32 = 1;

/// 2D collision shape, centered on the body position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// Circle defined by its radius.
    Circle {
        /// Radius of the circle.
        radius: Fix32,
    },
    /// Axis-aligned box spanning `center ± half` on each axis.
    Aabb {
        /// Half of the box width.
        half_width: Fix32,
        /// Half of the box height.
        half_height: Fix32,
    },
}

impl Shape {
    /// Circle with the given radius.
    #[inline]
    #[must_use]
    pub const fn circle(radius: Fix32) -> Self {
        Self::Circle { radius }
    }

    /// Axis-aligned box with the given half-extents.
    #[inline]
    #[must_use]
    pub const fn aabb(half_width: Fix32, half_height: Fix32) -> Self {
        Self::Aabb {
            half_width,
            half_height,
        }
    }

    /// Packed form for storage inside a [`crate::Body`].
    #[must_use]
    pub const fn to_data(self) -> ShapeData {
        match self {
            Self::Circle { radius } => ShapeData {
                kind: SHAPE_CIRCLE,
                extents: Vec2Fix::new(radius, Fix32::ZERO),
            },
            Self::Aabb {
                half_width,
                half_height,
            } => ShapeData {
                kind: SHAPE_AABB,
                extents: Vec2Fix::new(half_width, half_height),
            },
        }
    }

    /// Decode a packed shape. Returns `None` for an unknown tag, which can
    /// only come from a buffer this crate did not write.
    #[must_use]
    pub const fn from_data(data: ShapeData) -> Option<Self> {
        match data.kind {
            SHAPE_CIRCLE => Some(Self::Circle {
                radius: data.extents.x,
            }),
            SHAPE_AABB => Some(Self::Aabb {
                half_width: data.extents.x,
                half_height: data.extents.y,
            }),
            _ => None,
        }
    }
}

/// Fixed-size tagged shape record (12 bytes).
///
/// Circles keep the radius in `extents.x`; boxes keep their half-width and
/// half-height in `extents`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct ShapeData {
    /// [`SHAPE_CIRCLE`] or [`SHAPE_AABB`]
    pub kind: u32,
    /// Shape parameters
    pub extents: Vec2Fix,
}

static_assertions::assert_eq_size!(ShapeData, [u8; 12]);
