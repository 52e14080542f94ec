//! Body, Tether and Contact Records
//!
//! All three are plain-old-data with a fixed, explicit layout: the step can be
//! handed to an executor as one flat byte buffer, and bodies may be bulk
//! copied to a co-processor. [`Body`] is padded to 64 bytes and aligned to 16.

use bytemuck::{Pod, Zeroable};

use crate::math::{Fix32, Vec2Fix};
use crate::shape::{Shape, ShapeData};

// ============================================================================
// BodyId
// ============================================================================

/// Stable body identifier. Assigned monotonically by the world and never
/// reused, even after the body is removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct BodyId(pub u32);

impl core::fmt::Display for BodyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Body
// ============================================================================

/// Rigid body: a circle or box with position, velocity and mass.
///
/// Bodies with `mass <= 0` are static: their inverse mass is exactly zero and
/// the solver never moves them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C, align(16))]
pub struct Body {
    pub(crate) id: BodyId,
    /// Center position
    pub position: Vec2Fix,
    /// Linear velocity
    pub velocity: Vec2Fix,
    /// Force accumulated since the last step; cleared by integration
    pub force: Vec2Fix,
    pub(crate) mass: Fix32,
    pub(crate) inv_mass: Fix32,
    /// Coefficient of restitution (bounciness, 0..1)
    pub restitution: Fix32,
    shape: ShapeData,
    is_static: u32,
    _pad: [u32; 2],
}

static_assertions::assert_eq_size!(Body, [u8; 64]);
static_assertions::const_assert_eq!(core::mem::align_of::<Body>(), 16);

/// Default coefficient of restitution for new bodies (0.5).
pub const DEFAULT_RESTITUTION: Fix32 = Fix32::HALF;

impl Body {
    /// Create a body at rest.
    ///
    /// `mass <= 0` creates a static body.
    #[must_use]
    pub fn new(id: BodyId, shape: Shape, position: Vec2Fix, mass: Fix32) -> Self {
        let is_static = !mass.is_positive();
        let inv_mass = if is_static {
            Fix32::ZERO
        } else {
            Fix32::ONE / mass
        };
        Self {
            id,
            position,
            velocity: Vec2Fix::ZERO,
            force: Vec2Fix::ZERO,
            mass,
            inv_mass,
            restitution: DEFAULT_RESTITUTION,
            shape: shape.to_data(),
            is_static: u32::from(is_static),
            _pad: [0; 2],
        }
    }

    /// Stable identifier, assigned by the world.
    #[inline]
    #[must_use]
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Mass as given at creation (`<= 0` means static).
    #[inline]
    #[must_use]
    pub fn mass(&self) -> Fix32 {
        self.mass
    }

    /// `1 / mass`, or zero for static bodies.
    #[inline]
    #[must_use]
    pub fn inv_mass(&self) -> Fix32 {
        self.inv_mass
    }

    /// Collision shape. `None` only for a record that was not built by
    /// [`Body::new`] (e.g. arbitrary bytes cast into a body).
    #[inline]
    #[must_use]
    pub fn shape(&self) -> Option<Shape> {
        Shape::from_data(self.shape)
    }

    /// Packed shape record.
    #[inline]
    #[must_use]
    pub fn shape_data(&self) -> ShapeData {
        self.shape
    }

    /// Returns `true` if the body never moves.
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static != 0
    }

    /// Override the coefficient of restitution.
    #[inline]
    pub fn set_restitution(&mut self, restitution: Fix32) {
        self.restitution = restitution;
    }

    /// Accumulate a force, integrated at the next step.
    #[inline]
    pub fn apply_force(&mut self, force: Vec2Fix) {
        if self.is_static() {
            return;
        }
        self.force += force;
    }

    /// Apply a linear impulse at the center of mass.
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vec2Fix) {
        if self.is_static() {
            return;
        }
        self.velocity += impulse * self.inv_mass;
    }
}

// ============================================================================
// Tether
// ============================================================================

/// Soft maximum-distance constraint between two bodies, referenced by id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Tether {
    /// First endpoint
    pub body_a: BodyId,
    /// Second endpoint
    pub body_b: BodyId,
    /// Maximum allowed distance between the endpoints
    pub max_length: Fix32,
    /// `max_length²`, saturated at [`Fix32::MAX`]
    pub max_length_sqr: Fix32,
}

static_assertions::assert_eq_size!(Tether, [u8; 16]);

impl Tether {
    /// Create a tether, precomputing the squared length.
    #[must_use]
    pub fn new(body_a: BodyId, body_b: BodyId, max_length: Fix32) -> Self {
        Self {
            body_a,
            body_b,
            max_length,
            max_length_sqr: max_length.saturating_square(),
        }
    }

    /// Returns `true` if `id` is one of the endpoints.
    #[inline]
    #[must_use]
    pub fn involves(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b == id
    }
}

// ============================================================================
// Contact
// ============================================================================

/// One collision detected during a step. Not retained across steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Contact {
    /// First body
    pub body_a: BodyId,
    /// Second body
    pub body_b: BodyId,
    /// Contact normal, pointing from `body_a` toward `body_b`
    pub normal: Vec2Fix,
}

static_assertions::assert_eq_size!(Contact, [u8; 16]);

impl Contact {
    /// Returns `true` if the contact is between `a` and `b`, in either order.
    #[inline]
    #[must_use]
    pub fn is_between(&self, a: BodyId, b: BodyId) -> bool {
        (self.body_a == a && self.body_b == b) || (self.body_a == b && self.body_b == a)
    }

    /// Returns `true` if `id` takes part in the contact.
    #[inline]
    #[must_use]
    pub fn involves(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b == id
    }
}
