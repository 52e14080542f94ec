//! Impulse Resolution and Tether Solver
//!
//! Single-pass sequential impulses: each detected manifold is resolved once
//! per step, in pair order, with no global iteration to convergence.
//!
//! # Collision response
//!
//! 1. Separating pairs (`v_rel · n > 0`) are left alone.
//! 2. Impulse `j = -(1 + e) · v_rel·n / (wA + wB)` with `e = min(eA, eB)`.
//! 3. Penetration bias: `max(depth - slop, 0) · percent / (wA + wB)` along
//!    the normal, shared by inverse mass.
//!
//! # Tethers
//!
//! A soft positional correction (`excess · stiffness`, clamped per step) plus
//! a velocity bias that removes the endpoints' separating velocity along the
//! tether, so the next integration does not immediately re-violate it.

use bytemuck::{Pod, Zeroable};

use crate::body::{Body, BodyId, Tether};
use crate::collision::Manifold;
use crate::error::PhysicsError;
use crate::math::{Fix32, Vec2Fix};

// ============================================================================
// SolverConfig
// ============================================================================

/// Solver tuning constants. Travels inside the step frame, so it is plain data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct SolverConfig {
    /// Penetration left uncorrected to avoid jitter (default 0.01)
    pub slop: Fix32,
    /// Fraction of the remaining penetration corrected per step (default 0.2)
    pub percent: Fix32,
    /// Fraction of a tether's excess length corrected per step (default 0.5)
    pub tether_stiffness: Fix32,
    /// Largest tether correction applied in one step (default 5.0)
    pub tether_max_correction: Fix32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            slop: Fix32::from_ratio(1, 100),
            percent: Fix32::from_ratio(1, 5),
            tether_stiffness: Fix32::HALF,
            tether_max_correction: Fix32::from_int(5),
        }
    }
}

impl SolverConfig {
    /// Check that every constant is in its usable range.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.slop.is_negative() {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "slop must be >= 0",
            });
        }
        if !self.percent.is_positive() || self.percent > Fix32::ONE {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "percent must be in (0, 1]",
            });
        }
        if !self.tether_stiffness.is_positive() || self.tether_stiffness > Fix32::ONE {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "tether_stiffness must be in (0, 1]",
            });
        }
        if !self.tether_max_correction.is_positive() {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "tether_max_correction must be > 0",
            });
        }
        Ok(())
    }
}

// ============================================================================
// Collision Resolution
// ============================================================================

/// Resolve one manifold in place. Returns `true` if an impulse was applied.
///
/// Separating pairs, static-static pairs and manifolds with invalid or equal
/// body indices are skipped.
pub fn resolve_collision(bodies: &mut [Body], manifold: &Manifold, config: &SolverConfig) -> bool {
    let Some((a, b)) = pair_mut(bodies, manifold.body_a, manifold.body_b) else {
        return false;
    };
    let normal = manifold.normal;

    let vel_along_normal = (b.velocity - a.velocity).dot(normal);
    if vel_along_normal.is_positive() {
        return false;
    }

    let inv_mass_sum = a.inv_mass + b.inv_mass;
    if inv_mass_sum.is_zero() {
        return false;
    }

    let e = a.restitution.min(b.restitution);
    let j = (-(Fix32::ONE + e) * vel_along_normal) / inv_mass_sum;
    let impulse = normal * j;

    if !a.is_static() {
        a.velocity -= impulse * a.inv_mass;
    }
    if !b.is_static() {
        b.velocity += impulse * b.inv_mass;
    }

    let penetration = (manifold.depth - config.slop).max(Fix32::ZERO);
    let correction = normal * ((penetration * config.percent) / inv_mass_sum);

    if !a.is_static() {
        a.position -= correction * a.inv_mass;
    }
    if !b.is_static() {
        b.position += correction * b.inv_mass;
    }

    true
}

// ============================================================================
// Tether Resolution
// ============================================================================

/// Resolve every tether, in order. Endpoints are looked up by id, so the body
/// buffer may have been compacted since the tethers were created.
pub fn resolve_tethers(bodies: &mut [Body], tethers: &[Tether], config: &SolverConfig) {
    for tether in tethers {
        resolve_tether(bodies, tether, config);
    }
}

/// Resolve a single tether. Returns `true` if a correction was applied.
///
/// Missing endpoints, slack tethers and tethers between two static bodies
/// are skipped.
pub fn resolve_tether(bodies: &mut [Body], tether: &Tether, config: &SolverConfig) -> bool {
    let (Some(idx_a), Some(idx_b)) = (
        find_slot(bodies, tether.body_a),
        find_slot(bodies, tether.body_b),
    ) else {
        return false;
    };
    let Some((a, b)) = pair_mut(bodies, idx_a, idx_b) else {
        return false;
    };

    let diff = b.position - a.position;

    // Fast accept; len_sqr saturates, so far-apart endpoints fall through.
    if diff.len_sqr() < tether.max_length_sqr {
        return false;
    }

    let dist = diff.len();
    if dist <= tether.max_length {
        return false;
    }

    let inv_mass_sum = a.inv_mass + b.inv_mass;
    if inv_mass_sum.is_zero() {
        return false;
    }

    let excess = dist - tether.max_length;
    let n = diff.scale(Fix32::ONE / dist);
    let magnitude = (excess * config.tether_stiffness).min(config.tether_max_correction);
    let shift = n * magnitude;

    let vrel = (b.velocity - a.velocity).dot(n);
    let bias = if vrel.is_positive() {
        n * (vrel / inv_mass_sum)
    } else {
        Vec2Fix::ZERO
    };

    if !a.is_static() {
        a.position += shift * (a.inv_mass / inv_mass_sum);
        a.velocity += bias * a.inv_mass;
    }
    if !b.is_static() {
        b.position -= shift * (b.inv_mass / inv_mass_sum);
        b.velocity -= bias * b.inv_mass;
    }

    true
}

// ============================================================================
// Helpers
// ============================================================================

/// Slot of the body with the given id, by linear scan.
#[inline]
#[must_use]
pub fn find_slot(bodies: &[Body], id: BodyId) -> Option<usize> {
    bodies.iter().position(|b| b.id == id)
}

/// Two distinct mutable bodies out of one buffer.
fn pair_mut(bodies: &mut [Body], a: usize, b: usize) -> Option<(&mut Body, &mut Body)> {
    if a == b || a >= bodies.len() || b >= bodies.len() {
        return None;
    }
    if a < b {
        let (lo, hi) = bodies.split_at_mut(b);
        Some((&mut lo[a], &mut hi[0]))
    } else {
        let (lo, hi) = bodies.split_at_mut(a);
        Some((&mut hi[0], &mut lo[b]))
    }
}

// ============================================================================
// Tests
// ============================================================================
