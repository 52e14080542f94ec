//! # jag-physics
//!
//! **Deterministic 2D Rigid-Body Physics in Q16.16 Fixed Point**
//!
//! A small physics core for constrained targets without an FPU: circles and
//! axis-aligned boxes, impulse-based collision response, soft distance
//! tethers, and a step that can be handed to an external work executor as a
//! single flat buffer.
//!
//! ## Features
//!
//! | Component | Description |
//! |-----------|-------------|
//! | **`Fix32`** | Q16.16 arithmetic with 64-bit widened `mul`/`div` |
//! | **Narrow phase** | Circle-circle, box-box, circle-box manifolds |
//! | **Solver** | Sequential impulses with restitution and positional correction |
//! | **Tethers** | Soft max-distance constraints with velocity bias |
//! | **Executor** | Flat `StepFrame` + kernel, run/wait handshake, contact callback |
//!
//! ## Design Principles
//!
//! - **Zero Allocation**: bodies, tethers and contacts live in fixed arrays
//! - **Deterministic**: integer arithmetic only; same inputs, same bits
//! - **no_std Compatible**: disable the default `std` feature
//! - **Plain Data**: every record that crosses the executor boundary is `Pod`
//!
//! ## Quick Start
//!
//! ```rust
//! use jag_physics::prelude::*;
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
//! let dt = Fix32::from_ratio(1, 60);
//! let mut stepper = Stepper::new(InlineExecutor::new());
//! let mut landed = false;
//! for _ in 0..600 {
//!     stepper
//!         .tick(&mut world, dt, &mut |_: &mut World, contacts: &[Contact]| {
//!             landed |= contacts.iter().any(|c| c.is_between(ground, ball));
//!         })
//!         .unwrap();
//! }
//! assert!(landed);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

pub mod body;
pub mod collision;
pub mod error;
pub mod executor;
pub mod math;
pub mod pipeline;
pub mod shape;
pub mod solver;
pub mod world;

/// Maximum number of bodies in a [`World`].
pub const MAX_BODIES: usize = 64;

/// Maximum number of tethers in a [`World`].
pub const MAX_TETHERS: usize = 16;

/// Contact output capacity of a [`executor::StepFrame`].
pub const MAX_CONTACTS: usize = 16;

pub use body::{Body, BodyId, Contact, Tether};
pub use collision::Manifold;
pub use error::PhysicsError;
pub use executor::{ContactHandler, InlineExecutor, StepFrame, Stepper, WorkExecutor};
pub use math::{Fix32, Vec2Fix};
pub use shape::Shape;
pub use solver::SolverConfig;
pub use world::{World, WorldConfig};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::body::{Body, BodyId, Contact, Tether};
    pub use crate::error::PhysicsError;
    pub use crate::executor::{
        step_kernel, ContactHandler, InlineExecutor, Kernel, StepFrame, Stepper, WorkExecutor,
    };
    pub use crate::math::{Fix32, Vec2Fix};
    pub use crate::shape::Shape;
    pub use crate::solver::SolverConfig;
    pub use crate::world::{World, WorldConfig};
    pub use crate::{MAX_BODIES, MAX_CONTACTS, MAX_TETHERS};
}
