//! Narrow-Phase Collision Detection
//!
//! Exact analytic tests for each shape pair, producing a [`Manifold`]:
//! contact normal (always pointing from body A toward body B) and penetration
//! depth. Three routines cover the four ordered pairs; box-vs-circle reuses
//! circle-vs-box with the arguments swapped.
//!
//! Degenerate geometry has fixed, documented fallbacks instead of errors:
//!
//! - Coincident circle centers resolve along +X with depth `rA + rB`.
//! - A circle center inside (or on) a box resolves along the axis with the
//!   strictly greater offset (ties go to Y), with depth equal to the radius.
//!
//! Squared radii are computed widened and saturate at [`Fix32::MAX`]. When
//! [`Vec2Fix::len_sqr`] saturates (a component offset beyond about 76 units)
//! the circle tests fall back to the 64-bit [`Vec2Fix::len`] and compare
//! lengths instead of squares.

use crate::body::Body;
use crate::math::{Fix32, Vec2Fix};
use crate::shape::Shape;

/// Result of a narrow-phase test that found an overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Manifold {
    /// Index of the first body in the body buffer
    pub body_a: usize,
    /// Index of the second body in the body buffer
    pub body_b: usize,
    /// Unit contact normal, from `body_a` toward `body_b`
    pub normal: Vec2Fix,
    /// Penetration depth (positive means overlapping)
    pub depth: Fix32,
}

impl Manifold {
    #[inline]
    fn new(normal: Vec2Fix, depth: Fix32) -> Self {
        Self {
            body_a: 0,
            body_b: 0,
            normal,
            depth,
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Test bodies `idx_a` and `idx_b` of `bodies` for overlap.
///
/// Returns `None` when the shapes do not overlap, when either index is out of
/// range, or when either record carries an unknown shape tag.
#[must_use]
pub fn collide(bodies: &[Body], idx_a: usize, idx_b: usize) -> Option<Manifold> {
    let body_a = bodies.get(idx_a)?;
    let body_b = bodies.get(idx_b)?;

    let result = match (body_a.shape()?, body_b.shape()?) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_vs_circle(body_a.position, ra, body_b.position, rb)
        }
        (
            Shape::Aabb {
                half_width: wa,
                half_height: ha,
            },
            Shape::Aabb {
                half_width: wb,
                half_height: hb,
            },
        ) => aabb_vs_aabb(
            body_a.position,
            Vec2Fix::new(wa, ha),
            body_b.position,
            Vec2Fix::new(wb, hb),
        ),
        (
            Shape::Circle { radius },
            Shape::Aabb {
                half_width,
                half_height,
            },
        ) => circle_vs_aabb(
            body_a.position,
            radius,
            body_b.position,
            Vec2Fix::new(half_width, half_height),
        ),
        (
            Shape::Aabb {
                half_width,
                half_height,
            },
            Shape::Circle { radius },
        ) => circle_vs_aabb(
            body_b.position,
            radius,
            body_a.position,
            Vec2Fix::new(half_width, half_height),
        )
        .map(|mut m| {
            m.normal = -m.normal;
            m
        }),
    };

    result.map(|mut m| {
        m.body_a = idx_a;
        m.body_b = idx_b;
        m
    })
}

// ============================================================================
// Shape-Pair Tests
// ============================================================================

/// Circle vs circle.
#[must_use]
pub fn circle_vs_circle(
    pos_a: Vec2Fix,
    radius_a: Fix32,
    pos_b: Vec2Fix,
    radius_b: Fix32,
) -> Option<Manifold> {
    let n = pos_b - pos_a;
    let dist_sqr = n.len_sqr();
    let r = radius_a + radius_b;

    let dist = if dist_sqr == Fix32::MAX {
        let dist = n.len();
        if dist >= r {
            return None;
        }
        dist
    } else {
        if dist_sqr >= r.saturating_square() {
            return None;
        }
        if dist_sqr.is_zero() {
            return Some(Manifold::new(Vec2Fix::UNIT_X, r));
        }
        dist_sqr.sqrt()
    };

    Some(Manifold::new(n.scale(Fix32::ONE / dist), r - dist))
}

/// Axis-aligned box vs axis-aligned box, resolved along the axis of least
/// overlap. Equal overlaps resolve along X.
#[must_use]
pub fn aabb_vs_aabb(
    pos_a: Vec2Fix,
    half_a: Vec2Fix,
    pos_b: Vec2Fix,
    half_b: Vec2Fix,
) -> Option<Manifold> {
    let n = pos_b - pos_a;

    let x_overlap = (half_a.x + half_b.x) - n.x.abs();
    if !x_overlap.is_positive() {
        return None;
    }

    let y_overlap = (half_a.y + half_b.y) - n.y.abs();
    if !y_overlap.is_positive() {
        return None;
    }

    if y_overlap < x_overlap {
        Some(Manifold::new(Vec2Fix::new(Fix32::ZERO, unit_sign(n.y)), y_overlap))
    } else {
        Some(Manifold::new(Vec2Fix::new(unit_sign(n.x), Fix32::ZERO), x_overlap))
    }
}

/// Circle (body A) vs axis-aligned box (body B).
#[must_use]
pub fn circle_vs_aabb(
    circle_pos: Vec2Fix,
    radius: Fix32,
    box_pos: Vec2Fix,
    half: Vec2Fix,
) -> Option<Manifold> {
    let diff = circle_pos - box_pos;
    let closest = Vec2Fix::new(
        diff.x.min(half.x).max(-half.x),
        diff.y.min(half.y).max(-half.y),
    );

    let n = diff - closest;
    let dist_sqr = n.len_sqr();

    let dist = if dist_sqr == Fix32::MAX {
        let dist = n.len();
        if dist > radius {
            return None;
        }
        dist
    } else {
        if dist_sqr > radius.saturating_square() {
            return None;
        }
        if dist_sqr.is_zero() {
            // Center inside or on the box: push out along the dominant offset axis.
            let normal = if diff.x.abs() > diff.y.abs() {
                Vec2Fix::new(away_from(diff.x), Fix32::ZERO)
            } else {
                Vec2Fix::new(Fix32::ZERO, away_from(diff.y))
            };
            return Some(Manifold::new(normal, radius));
        }
        dist_sqr.sqrt()
    };

    // `n` points box -> circle; the manifold wants circle -> box.
    Some(Manifold::new(n.scale(-(Fix32::ONE / dist)), radius - dist))
}

/// +1 for non-negative, -1 for negative.
#[inline]
fn unit_sign(v: Fix32) -> Fix32 {
    if v.is_negative() {
        Fix32::NEG_ONE
    } else {
        Fix32::ONE
    }
}

/// Circle-to-box normal component for a circle offset `v` from the box center.
#[inline]
fn away_from(v: Fix32) -> Fix32 {
    if v.is_positive() {
        Fix32::NEG_ONE
    } else {
        Fix32::ONE
    }
}

// ============================================================================
// Tests
// ============================================================================
