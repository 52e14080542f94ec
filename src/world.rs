//! Physics World
//!
//! Fixed-capacity owner of all bodies and tethers. Bodies live in a dense
//! prefix of a `[Body; MAX_BODIES]` array, so the step can run over one
//! contiguous slice (or be copied into a [`crate::executor::StepFrame`]).
//!
//! Bodies are addressed by [`BodyId`], never by slot: removal swap-removes
//! and therefore moves the last body into the freed slot.
//!
//! # Examples
//!
//! ```
//! use jag_physics::{Fix32, Shape, Vec2Fix, World};
//!
//! let mut world = World::new(Vec2Fix::from_int(0, 100));
//! let ground = world
//!     .add_body(Shape::aabb(Fix32::from_int(100), Fix32::from_int(10)),
//!               Fix32::from_int(160), Fix32::from_int(220), Fix32::ZERO)
//!     .unwrap();
//! let ball = world
//!     .add_body(Shape::circle(Fix32::from_int(10)),
//!               Fix32::from_int(160), Fix32::from_int(50), Fix32::ONE)
//!     .unwrap();
//!
//! world.step(Fix32::from_ratio(1, 60));
//! assert!(world.body(ball).unwrap().position.y > Fix32::from_int(50));
//! assert_eq!(world.body(ground).unwrap().position.y, Fix32::from_int(220));
//! ```

use bytemuck::Zeroable;

use crate::body::{Body, BodyId, Contact, Tether, DEFAULT_RESTITUTION};
use crate::error::PhysicsError;
use crate::math::{Fix32, Vec2Fix};
use crate::pipeline;
use crate::shape::Shape;
use crate::solver::{find_slot, SolverConfig};
use crate::{MAX_BODIES, MAX_TETHERS};

// ============================================================================
// WorldConfig
// ============================================================================

/// Configuration for a [`World`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldConfig {
    /// Gravitational acceleration. Positive Y points down the screen.
    pub gravity: Vec2Fix,
    /// Restitution given to every new body.
    pub default_restitution: Fix32,
    /// Solver tuning.
    pub solver: SolverConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2Fix::from_int(0, 100),
            default_restitution: DEFAULT_RESTITUTION,
            solver: SolverConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Check that every parameter is in its usable range.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.default_restitution.is_negative() || self.default_restitution > Fix32::ONE {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "default_restitution must be in [0, 1]",
            });
        }
        self.solver.validate()
    }
}

// ============================================================================
// World
// ============================================================================

/// Rigid-body world with fixed body and tether capacity.
#[derive(Clone)]
pub struct World {
    pub(crate) bodies: [Body; MAX_BODIES],
    pub(crate) body_count: usize,
    tethers: [Tether; MAX_TETHERS],
    tether_count: usize,
    config: WorldConfig,
    next_id: u32,
}

impl World {
    /// Empty world with the given gravity and default tuning.
    #[must_use]
    pub fn new(gravity: Vec2Fix) -> Self {
        Self::from_valid_config(WorldConfig {
            gravity,
            ..WorldConfig::default()
        })
    }

    /// Empty world with a validated configuration.
    pub fn with_config(config: WorldConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: WorldConfig) -> Self {
        Self {
            bodies: [Body::zeroed(); MAX_BODIES],
            body_count: 0,
            tethers: [Tether::default(); MAX_TETHERS],
            tether_count: 0,
            config,
            next_id: 0,
        }
    }

    // ---- Construction ----

    /// Add a body at `(x, y)`. `mass <= 0` makes it static.
    ///
    /// Fails with [`PhysicsError::CapacityExceeded`] when the world already
    /// holds [`MAX_BODIES`] bodies; the world is left unchanged.
    pub fn add_body(
        &mut self,
        shape: Shape,
        x: Fix32,
        y: Fix32,
        mass: Fix32,
    ) -> Result<BodyId, PhysicsError> {
        if self.body_count >= MAX_BODIES {
            log::debug!("add_body rejected: world holds {} bodies", self.body_count);
            return Err(PhysicsError::CapacityExceeded {
                resource: "bodies",
                limit: MAX_BODIES,
            });
        }
        let Some(following) = self.next_id.checked_add(1) else {
            log::debug!("add_body rejected: body ids exhausted");
            return Err(PhysicsError::CapacityExceeded {
                resource: "body ids",
                limit: u32::MAX as usize,
            });
        };

        let id = BodyId(self.next_id);
        let mut body = Body::new(id, shape, Vec2Fix::new(x, y), mass);
        body.set_restitution(self.config.default_restitution);

        self.bodies[self.body_count] = body;
        self.body_count += 1;
        self.next_id = following;
        Ok(id)
    }

    /// Limit the distance between two existing bodies to `max_length`.
    ///
    /// Fails when the tether store is full, when either endpoint is unknown,
    /// when both endpoints are the same body, or when `max_length <= 0`.
    pub fn add_tether(
        &mut self,
        a: BodyId,
        b: BodyId,
        max_length: Fix32,
    ) -> Result<(), PhysicsError> {
        if self.tether_count >= MAX_TETHERS {
            log::debug!("add_tether rejected: world holds {} tethers", self.tether_count);
            return Err(PhysicsError::CapacityExceeded {
                resource: "tethers",
                limit: MAX_TETHERS,
            });
        }
        for id in [a, b] {
            if self.slot_of(id).is_none() {
                log::debug!("add_tether rejected: unknown body {}", id);
                return Err(PhysicsError::UnknownBody { id: id.0 });
            }
        }
        if a == b {
            log::debug!("add_tether rejected: {} tethered to itself", a);
            return Err(PhysicsError::InvalidConstraint {
                reason: "tether endpoints must differ",
            });
        }
        if !max_length.is_positive() {
            log::debug!("add_tether rejected: max_length {:?}", max_length);
            return Err(PhysicsError::InvalidConstraint {
                reason: "tether max_length must be > 0",
            });
        }

        self.tethers[self.tether_count] = Tether::new(a, b, max_length);
        self.tether_count += 1;
        Ok(())
    }

    /// Remove a body and every tether attached to it.
    ///
    /// The last body moves into the freed slot; ids are unaffected.
    pub fn remove_body(&mut self, id: BodyId) -> Result<Body, PhysicsError> {
        let Some(slot) = self.slot_of(id) else {
            log::debug!("remove_body rejected: unknown body {}", id);
            return Err(PhysicsError::UnknownBody { id: id.0 });
        };

        let removed = self.bodies[slot];
        let last = self.body_count - 1;
        self.bodies[slot] = self.bodies[last];
        self.bodies[last] = Body::zeroed();
        self.body_count = last;

        let mut kept = 0;
        for i in 0..self.tether_count {
            let tether = self.tethers[i];
            if tether.involves(id) {
                log::debug!(
                    "dropping tether {} <-> {} with removed body",
                    tether.body_a,
                    tether.body_b
                );
                continue;
            }
            self.tethers[kept] = tether;
            kept += 1;
        }
        for tether in &mut self.tethers[kept..self.tether_count] {
            *tether = Tether::default();
        }
        self.tether_count = kept;

        Ok(removed)
    }

    // ---- Simulation ----

    /// Advance the world by `dt` without reporting contacts.
    pub fn step(&mut self, dt: Fix32) {
        self.step_with_contacts(dt, &mut []);
    }

    /// Advance the world by `dt`, writing up to `contacts.len()` contacts.
    /// Returns the number written.
    pub fn step_with_contacts(&mut self, dt: Fix32, contacts: &mut [Contact]) -> usize {
        pipeline::step(
            &mut self.bodies[..self.body_count],
            &self.tethers[..self.tether_count],
            self.config.gravity,
            dt,
            &self.config.solver,
            contacts,
        )
    }

    // ---- Access ----

    /// Current slot of a body, if present.
    #[inline]
    #[must_use]
    pub fn slot_of(&self, id: BodyId) -> Option<usize> {
        find_slot(self.bodies(), id)
    }

    /// Body with the given id.
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        let slot = self.slot_of(id)?;
        Some(&self.bodies[slot])
    }

    /// Mutable access to the body with the given id.
    ///
    /// Position, velocity, force and restitution are editable; the id and
    /// mass are fixed at creation.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let slot = self.slot_of(id)?;
        Some(&mut self.bodies[slot])
    }

    /// Live bodies, in slot order.
    #[inline]
    #[must_use]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies[..self.body_count]
    }

    /// Live tethers, in creation order.
    #[inline]
    #[must_use]
    pub fn tethers(&self) -> &[Tether] {
        &self.tethers[..self.tether_count]
    }

    /// Number of live bodies.
    #[inline]
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.body_count
    }

    /// Number of live tethers.
    #[inline]
    #[must_use]
    pub fn tether_count(&self) -> usize {
        self.tether_count
    }

    /// Gravity applied to every dynamic body.
    #[inline]
    #[must_use]
    pub fn gravity(&self) -> Vec2Fix {
        self.config.gravity
    }

    /// Change gravity for subsequent steps.
    #[inline]
    pub fn set_gravity(&mut self, gravity: Vec2Fix) {
        self.config.gravity = gravity;
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }
}

impl Default for World {
    fn default() -> Self {
        Self::from_valid_config(WorldConfig::default())
    }
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("bodies", &self.body_count)
            .field("tethers", &self.tether_count)
            .field("next_id", &self.next_id)
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(world: &mut World, x: i32, y: i32) -> BodyId {
        world
            .add_body(
                Shape::circle(Fix32::from_int(5)),
                Fix32::from_int(x),
                Fix32::from_int(y),
                Fix32::ONE,
            )
            .unwrap()
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut world = World::new(Vec2Fix::ZERO);
        let a = ball(&mut world, 0, 0);
        let b = ball(&mut world, 20, 0);
        assert_eq!(a, BodyId(0));
        assert_eq!(b, BodyId(1));
        world.remove_body(a).unwrap();
        let c = ball(&mut world, 40, 0);
        assert_eq!(c, BodyId(2), "ids are never reused");
    }

    #[test]
    fn test_new_body_state() {
        let mut world = World::new(Vec2Fix::ZERO);
        let id = world
            .add_body(
                Shape::circle(Fix32::from_int(10)),
                Fix32::from_int(3),
                Fix32::from_int(4),
                Fix32::from_int(2),
            )
            .unwrap();
        let body = world.body(id).unwrap();
        assert_eq!(body.position, Vec2Fix::from_int(3, 4));
        assert_eq!(body.velocity, Vec2Fix::ZERO);
        assert_eq!(body.force, Vec2Fix::ZERO);
        assert_eq!(body.inv_mass(), Fix32::HALF);
        assert_eq!(body.restitution, Fix32::HALF);
        assert!(!body.is_static());
    }

    #[test]
    fn test_body_capacity() {
        let mut world = World::default();
        for i in 0..MAX_BODIES {
            assert!(world
                .add_body(
                    Shape::circle(Fix32::ONE),
                    Fix32::from_int(i as i32 * 3),
                    Fix32::ZERO,
                    Fix32::ONE,
                )
                .is_ok());
        }
        let err = world
            .add_body(Shape::circle(Fix32::ONE), Fix32::ZERO, Fix32::ZERO, Fix32::ONE)
            .unwrap_err();
        assert_eq!(
            err,
            PhysicsError::CapacityExceeded {
                resource: "bodies",
                limit: MAX_BODIES
            }
        );
        assert_eq!(world.body_count(), MAX_BODIES);
    }

    #[test]
    fn test_tether_capacity() {
        let mut world = World::new(Vec2Fix::ZERO);
        let a = ball(&mut world, 0, 0);
        let b = ball(&mut world, 20, 0);
        for _ in 0..MAX_TETHERS {
            world.add_tether(a, b, Fix32::from_int(50)).unwrap();
        }
        assert!(matches!(
            world.add_tether(a, b, Fix32::from_int(50)),
            Err(PhysicsError::CapacityExceeded { resource: "tethers", .. })
        ));
        assert_eq!(world.tether_count(), MAX_TETHERS);
    }

    #[test]
    fn test_tether_validation() {
        let mut world = World::new(Vec2Fix::ZERO);
        let a = ball(&mut world, 0, 0);
        let b = ball(&mut world, 20, 0);

        assert_eq!(
            world.add_tether(a, BodyId(99), Fix32::ONE),
            Err(PhysicsError::UnknownBody { id: 99 })
        );
        assert!(matches!(
            world.add_tether(a, a, Fix32::ONE),
            Err(PhysicsError::InvalidConstraint { .. })
        ));
        assert!(matches!(
            world.add_tether(a, b, Fix32::ZERO),
            Err(PhysicsError::InvalidConstraint { .. })
        ));
        assert_eq!(world.tether_count(), 0);

        world.add_tether(a, b, Fix32::from_int(50)).unwrap();
        assert_eq!(world.tethers()[0].max_length_sqr, Fix32::from_int(2500));
    }

    #[test]
    fn test_remove_swaps_last_into_slot() {
        let mut world = World::new(Vec2Fix::ZERO);
        let a = ball(&mut world, 0, 0);
        let b = ball(&mut world, 20, 0);
        let c = ball(&mut world, 40, 0);

        let removed = world.remove_body(a).unwrap();
        assert_eq!(removed.id(), a);
        assert_eq!(world.body_count(), 2);
        assert_eq!(world.slot_of(c), Some(0));
        assert_eq!(world.slot_of(b), Some(1));
        assert!(world.body(a).is_none());
        assert_eq!(world.body(c).unwrap().position, Vec2Fix::from_int(40, 0));
    }

    #[test]
    fn test_remove_drops_attached_tethers() {
        let mut world = World::new(Vec2Fix::ZERO);
        let a = ball(&mut world, 0, 0);
        let b = ball(&mut world, 20, 0);
        let c = ball(&mut world, 40, 0);
        world.add_tether(a, b, Fix32::from_int(30)).unwrap();
        world.add_tether(b, c, Fix32::from_int(30)).unwrap();
        world.add_tether(a, c, Fix32::from_int(60)).unwrap();

        world.remove_body(a).unwrap();
        assert_eq!(world.tether_count(), 1);
        assert_eq!(world.tethers()[0].body_a, b);
        assert_eq!(world.tethers()[0].body_b, c);
    }

    #[test]
    fn test_remove_unknown() {
        let mut world = World::new(Vec2Fix::ZERO);
        ball(&mut world, 0, 0);
        assert_eq!(
            world.remove_body(BodyId(7)),
            Err(PhysicsError::UnknownBody { id: 7 })
        );
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_with_config_validates() {
        let bad = WorldConfig {
            default_restitution: Fix32::from_int(2),
            ..WorldConfig::default()
        };
        assert!(World::with_config(bad).is_err());

        let mut solver = SolverConfig::default();
        solver.percent = Fix32::ZERO;
        let bad = WorldConfig {
            solver,
            ..WorldConfig::default()
        };
        assert!(World::with_config(bad).is_err());

        let bouncy = WorldConfig {
            default_restitution: Fix32::ONE,
            ..WorldConfig::default()
        };
        let mut world = World::with_config(bouncy).unwrap();
        let id = ball(&mut world, 0, 0);
        assert_eq!(world.body(id).unwrap().restitution, Fix32::ONE);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_from_json() {
        let mut config = WorldConfig::default();
        config.gravity = Vec2Fix::from_int(0, 50);
        let json = serde_json::to_string(&config).unwrap();
        let back: WorldConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert!(World::with_config(back).is_ok());
    }

    #[test]
    fn test_step_uses_gravity() {
        let mut world = World::new(Vec2Fix::from_int(0, 60));
        let id = ball(&mut world, 0, 0);
        world.step(Fix32::ONE);
        assert_eq!(world.body(id).unwrap().velocity, Vec2Fix::from_int(0, 60));

        world.set_gravity(Vec2Fix::ZERO);
        world.step(Fix32::ONE);
        assert_eq!(world.body(id).unwrap().velocity, Vec2Fix::from_int(0, 60));
        assert_eq!(world.body(id).unwrap().position, Vec2Fix::from_int(0, 120));
    }

    #[test]
    fn test_tethers_follow_ids_after_removal() {
        let mut world = World::new(Vec2Fix::ZERO);
        let a = ball(&mut world, 0, 0);
        let b = ball(&mut world, 0, 100);
        let c = ball(&mut world, 0, 164);
        world.add_tether(b, c, Fix32::from_int(32)).unwrap();
        world.remove_body(a).unwrap();

        // c now occupies slot 0; the tether must still pull b and c together
        world.step(Fix32::from_ratio(1, 60));
        let gap = world.body(c).unwrap().position.y - world.body(b).unwrap().position.y;
        assert!(gap < Fix32::from_int(64));
    }

    #[test]
    fn test_body_mut_keeps_identity_and_static_mass() {
        let mut world = World::new(Vec2Fix::ZERO);
        let ground = world
            .add_body(
                Shape::aabb(Fix32::from_int(100), Fix32::from_int(10)),
                Fix32::ZERO,
                Fix32::from_int(200),
                Fix32::ZERO,
            )
            .unwrap();
        let id = ball(&mut world, 0, 0);

        let body = world.body_mut(ground).unwrap();
        body.velocity = Vec2Fix::from_int(5, 5);
        body.restitution = Fix32::ONE;
        let body = world.body_mut(id).unwrap();
        body.velocity = Vec2Fix::from_int(10, 0);
        body.position = Vec2Fix::from_int(1, 0);

        world.step(Fix32::ONE);

        let g = world.body(ground).unwrap();
        assert_eq!(g.id(), ground);
        assert!(g.is_static());
        assert_eq!(g.mass(), Fix32::ZERO);
        assert_eq!(g.inv_mass(), Fix32::ZERO);
        assert_eq!(g.position, Vec2Fix::from_int(0, 200));

        let b = world.body(id).unwrap();
        assert_eq!(b.id(), id);
        assert_eq!(b.inv_mass(), Fix32::ONE);
        assert_eq!(b.position, Vec2Fix::from_int(11, 0));
        assert_eq!(world.slot_of(id), Some(1));
    }
}
