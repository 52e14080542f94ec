//! World Step Pipeline
//!
//! One step is a fixed linear pipeline over a flat body buffer:
//!
//! ```text
//! forces + gravity -> velocity -> position -> clear contacts
//!     -> every unordered pair: detect, record, resolve -> tethers
//! ```
//!
//! There is no state between steps beyond the buffers themselves, so the same
//! function runs directly on a [`crate::World`] or on a marshalled
//! [`crate::executor::StepFrame`] handed to an executor.
//!
//! # Examples
//!
//! ```
//! use jag_physics::{pipeline, Body, BodyId, Contact, Fix32, Shape, SolverConfig, Vec2Fix};
//!
//! let mut bodies = [
//!     Body::new(BodyId(0), Shape::aabb(Fix32::from_int(100), Fix32::from_int(10)),
//!               Vec2Fix::from_int(160, 220), Fix32::ZERO),
//!     Body::new(BodyId(1), Shape::circle(Fix32::from_int(10)),
//!               Vec2Fix::from_int(160, 201), Fix32::ONE),
//! ];
//! let mut contacts = [Contact::default(); 4];
//! let written = pipeline::step(
//!     &mut bodies,
//!     &[],
//!     Vec2Fix::from_int(0, 100),
//!     Fix32::from_ratio(1, 60),
//!     &SolverConfig::default(),
//!     &mut contacts,
//! );
//! assert_eq!(written, 1);
//! assert!(contacts[0].is_between(BodyId(0), BodyId(1)));
//! ```

use crate::body::{Body, Contact, Tether};
use crate::collision::collide;
use crate::math::{Fix32, Vec2Fix};
use crate::solver::{resolve_collision, resolve_tethers, SolverConfig};

/// Advance `bodies` by `dt` in place and return the number of contacts
/// written to the front of `contacts` (never more than `contacts.len()`).
///
/// Tether endpoints are looked up by id. Pass an empty `contacts` slice to
/// skip contact reporting.
pub fn step(
    bodies: &mut [Body],
    tethers: &[Tether],
    gravity: Vec2Fix,
    dt: Fix32,
    config: &SolverConfig,
    contacts: &mut [Contact],
) -> usize {
    integrate(bodies, gravity, dt);

    let mut written = 0;
    let mut dropped = 0usize;
    let n = bodies.len();

    for i in 0..n {
        for j in (i + 1)..n {
            if bodies[i].is_static() && bodies[j].is_static() {
                continue;
            }
            let Some(manifold) = collide(bodies, i, j) else {
                continue;
            };

            match contacts.get_mut(written) {
                Some(slot) => {
                    *slot = Contact {
                        body_a: bodies[i].id,
                        body_b: bodies[j].id,
                        normal: manifold.normal,
                    };
                    written += 1;
                }
                None => dropped += 1,
            }

            resolve_collision(bodies, &manifold, config);
        }
    }

    if dropped > 0 && !contacts.is_empty() {
        log::warn!(
            "contact buffer full: {} contacts not reported (capacity {})",
            dropped,
            contacts.len()
        );
    }

    resolve_tethers(bodies, tethers, config);

    log::trace!(
        "step: {} bodies, {} tethers, {} contacts",
        n,
        tethers.len(),
        written
    );

    written
}

/// Semi-implicit Euler for every dynamic body: gravity plus accumulated
/// force into velocity, then velocity into position. Clears the force
/// accumulator. Static bodies are untouched.
pub fn integrate(bodies: &mut [Body], gravity: Vec2Fix, dt: Fix32) {
    for body in bodies.iter_mut().filter(|b| !b.is_static()) {
        let acceleration = gravity + body.force * body.inv_mass;
        body.velocity += acceleration * dt;
        body.position += body.velocity * dt;
        body.force = Vec2Fix::ZERO;
    }
}

// ============================================================================
// Tests
// ============================================================================
