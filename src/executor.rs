//! Step Offload: Frames, Kernels and Executors
//!
//! A step can be handed to a work executor as one opaque unit: the world is
//! marshalled into a flat [`StepFrame`], the executor runs [`step_kernel`]
//! against the frame's bytes, and the caller collects the result after
//! `wait`. At most one step is outstanding at a time.
//!
//! ```text
//! load(world) -> run(kernel, bytes) -> wait(bytes) -> store(world) -> on_contacts(world)
//! ```
//!
//! The world must not be edited between `load` and `store`; [`Stepper`] holds
//! `&mut World` across the whole cycle so this cannot happen by accident.
//! Collision handlers run strictly after `wait`, so they may add or remove
//! bodies before the next step.

use bytemuck::{Pod, Zeroable};

use crate::body::{Body, Contact, Tether};
use crate::error::PhysicsError;
use crate::math::{Fix32, Vec2Fix};
use crate::pipeline;
use crate::solver::SolverConfig;
use crate::world::World;
use crate::{MAX_BODIES, MAX_CONTACTS, MAX_TETHERS};

/// Function an executor runs against a marshalled data blob.
pub type Kernel = fn(&mut [u8]);

// ============================================================================
// StepFrame
// ============================================================================

/// Flat, self-contained input and output of one world step.
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C, align(16))]
pub struct StepFrame {
    /// Body buffer; the first `body_count` entries are live
    pub bodies: [Body; MAX_BODIES],
    /// Tether buffer; the first `tether_count` entries are live
    pub tethers: [Tether; MAX_TETHERS],
    /// Contact output; the first `contact_count` entries are valid after a run
    pub contacts: [Contact; MAX_CONTACTS],
    /// Solver tuning
    pub config: SolverConfig,
    /// Gravity for this step
    pub gravity: Vec2Fix,
    /// Timestep
    pub dt: Fix32,
    /// Live bodies
    pub body_count: u32,
    /// Live tethers
    pub tether_count: u32,
    /// Contacts written by the last run
    pub contact_count: u32,
    /// Contact output capacity for the next run
    pub max_contacts: u32,
    _reserved: u32,
}

static_assertions::assert_eq_size!(StepFrame, [u8; 4656]);
static_assertions::const_assert_eq!(core::mem::align_of::<StepFrame>(), 16);

impl StepFrame {
    /// Size of a frame in bytes.
    pub const SIZE: usize = core::mem::size_of::<Self>();

    /// Empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::zeroed()
    }

    /// View a byte buffer as a frame. The buffer must be exactly
    /// [`StepFrame::SIZE`] bytes and 16-byte aligned.
    pub fn from_bytes_mut(data: &mut [u8]) -> Result<&mut Self, PhysicsError> {
        let len = data.len();
        bytemuck::try_from_bytes_mut(data).map_err(|_| PhysicsError::MalformedFrame {
            len,
            expected: Self::SIZE,
        })
    }

    /// Frame bytes, for handing to an executor.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::bytes_of_mut(self)
    }

    /// Marshal the world's bodies, tethers and tuning for one step of `dt`.
    pub fn load(&mut self, world: &World, dt: Fix32) {
        let bodies = world.bodies();
        let tethers = world.tethers();
        self.bodies[..bodies.len()].copy_from_slice(bodies);
        self.tethers[..tethers.len()].copy_from_slice(tethers);
        self.body_count = bodies.len() as u32;
        self.tether_count = tethers.len() as u32;
        self.contact_count = 0;
        self.max_contacts = MAX_CONTACTS as u32;
        self.config = world.config().solver;
        self.gravity = world.gravity();
        self.dt = dt;
    }

    /// Limit the contacts reported by the next run.
    #[inline]
    pub fn set_contact_capacity(&mut self, capacity: usize) {
        self.max_contacts = capacity.min(MAX_CONTACTS) as u32;
    }

    /// Run the step in place. Out-of-range counts are clamped to capacity.
    pub fn run(&mut self) -> usize {
        let bodies = (self.body_count as usize).min(MAX_BODIES);
        let tethers = (self.tether_count as usize).min(MAX_TETHERS);
        let capacity = (self.max_contacts as usize).min(MAX_CONTACTS);

        let written = pipeline::step(
            &mut self.bodies[..bodies],
            &self.tethers[..tethers],
            self.gravity,
            self.dt,
            &self.config,
            &mut self.contacts[..capacity],
        );
        self.contact_count = written as u32;
        written
    }

    /// Write the stepped bodies back into the world they were loaded from.
    pub fn store(&self, world: &mut World) {
        let n = (self.body_count as usize).min(world.body_count);
        world.bodies[..n].copy_from_slice(&self.bodies[..n]);
    }

    /// Contacts written by the last run.
    #[inline]
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        let n = (self.contact_count as usize).min(MAX_CONTACTS);
        &self.contacts[..n]
    }
}

impl Default for StepFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Kernel that runs one step over a marshalled [`StepFrame`].
///
/// A buffer of the wrong size or alignment is logged and left untouched.
pub fn step_kernel(data: &mut [u8]) {
    match StepFrame::from_bytes_mut(data) {
        Ok(frame) => {
            frame.run();
        }
        Err(e) => log::error!("step kernel: {}", e),
    }
}

// ============================================================================
// Executors
// ============================================================================

/// Runs a kernel against a data blob, possibly elsewhere.
///
/// `run` starts the work; `wait` blocks until it has finished and leaves the
/// results in `data`. An executor that works on a copy (e.g. a co-processor)
/// copies in during `run` and back out during `wait`; one that works in
/// place may ignore the buffer passed to `wait`. Calling `run` again before
/// `wait` fails with [`PhysicsError::ExecutorBusy`].
pub trait WorkExecutor {
    /// Start `kernel` on `data`.
    fn run(&mut self, kernel: Kernel, data: &mut [u8]) -> Result<(), PhysicsError>;

    /// Block until the outstanding run, if any, has finished.
    fn wait(&mut self, data: &mut [u8]) -> Result<(), PhysicsError>;

    /// Returns `true` between `run` and `wait`.
    fn is_busy(&self) -> bool;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum InlineState {
    #[default]
    Idle,
    Finished,
}

/// Executor that runs the kernel synchronously inside `run`.
#[derive(Debug, Default)]
pub struct InlineExecutor {
    state: InlineState,
    completed: u64,
}

impl InlineExecutor {
    /// New idle executor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of runs collected with `wait`.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

impl WorkExecutor for InlineExecutor {
    fn run(&mut self, kernel: Kernel, data: &mut [u8]) -> Result<(), PhysicsError> {
        if self.state == InlineState::Finished {
            log::warn!("inline executor: run while previous result not collected");
            return Err(PhysicsError::ExecutorBusy);
        }
        kernel(data);
        self.state = InlineState::Finished;
        Ok(())
    }

    fn wait(&mut self, _data: &mut [u8]) -> Result<(), PhysicsError> {
        if self.state == InlineState::Finished {
            self.state = InlineState::Idle;
            self.completed += 1;
        }
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.state == InlineState::Finished
    }
}

// ============================================================================
// Contact handling
// ============================================================================

/// Receives the contacts of each step once the executor has finished, and
/// may edit the world before the next step.
pub trait ContactHandler {
    /// Called once per step, possibly with an empty slice.
    fn on_contacts(&mut self, world: &mut World, contacts: &[Contact]);
}

impl<F> ContactHandler for F
where
    F: FnMut(&mut World, &[Contact]),
{
    fn on_contacts(&mut self, world: &mut World, contacts: &[Contact]) {
        self(world, contacts)
    }
}

// ============================================================================
// Stepper
// ============================================================================

/// Drives the load, run, wait, store, handle cycle through an executor.
#[derive(Debug)]
pub struct Stepper<E> {
    executor: E,
    frame: StepFrame,
}

impl<E: WorkExecutor> Stepper<E> {
    /// Stepper using `executor`.
    #[must_use]
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            frame: StepFrame::new(),
        }
    }

    /// Advance `world` by `dt` through the executor, then pass the step's
    /// contacts to `handler`. Returns the number of contacts.
    pub fn tick<H: ContactHandler>(
        &mut self,
        world: &mut World,
        dt: Fix32,
        handler: &mut H,
    ) -> Result<usize, PhysicsError> {
        self.frame.load(world, dt);

        let bytes = bytemuck::bytes_of_mut(&mut self.frame);
        self.executor.run(step_kernel, bytes)?;
        self.executor.wait(bytes)?;

        self.frame.store(world);
        let contacts = self.frame.contacts();
        handler.on_contacts(world, contacts);
        Ok(contacts.len())
    }

    /// Frame of the last tick.
    #[must_use]
    pub fn frame(&self) -> &StepFrame {
        &self.frame
    }

    /// Underlying executor.
    #[must_use]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Consume the stepper, returning the executor.
    pub fn into_executor(self) -> E {
        self.executor
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyId;
    use crate::shape::Shape;

    fn scene() -> (World, BodyId, BodyId) {
        let mut world = World::new(Vec2Fix::from_int(0, 100));
        let ground = world
            .add_body(
                Shape::aabb(Fix32::from_int(100), Fix32::from_int(10)),
                Fix32::from_int(160),
                Fix32::from_int(220),
                Fix32::ZERO,
            )
            .unwrap();
        let ball = world
            .add_body(
                Shape::circle(Fix32::from_int(10)),
                Fix32::from_int(160),
                Fix32::from_int(201),
                Fix32::ONE,
            )
            .unwrap();
        (world, ground, ball)
    }

    #[test]
    fn test_frame_layout() {
        assert_eq!(StepFrame::SIZE, 4656);
        assert_eq!(StepFrame::SIZE % 16, 0);
        assert_eq!(core::mem::align_of::<StepFrame>(), 16);
    }

    #[test]
    fn test_load_store_round_trip() {
        let (world, _, _) = scene();
        let mut frame = StepFrame::new();
        frame.load(&world, Fix32::from_ratio(1, 60));
        assert_eq!(frame.body_count, 2);
        assert_eq!(&frame.bodies[..2], world.bodies());

        let mut copy = world.clone();
        frame.store(&mut copy);
        assert_eq!(copy.bodies(), world.bodies());
    }

    #[test]
    fn test_kernel_matches_direct_step() {
        let (mut direct, _, _) = scene();
        let (offloaded, _, _) = scene();
        let dt = Fix32::from_ratio(1, 60);

        let mut contacts = [Contact::default(); MAX_CONTACTS];
        let written = direct.step_with_contacts(dt, &mut contacts);

        let mut frame = StepFrame::new();
        frame.load(&offloaded, dt);
        step_kernel(frame.as_bytes_mut());

        assert_eq!(&frame.bodies[..2], direct.bodies());
        assert_eq!(frame.contacts(), &contacts[..written]);
        assert_eq!(written, 1);
    }

    #[test]
    fn test_kernel_rejects_short_buffer() {
        let mut data = [0u8; 12];
        step_kernel(&mut data);
        assert_eq!(data, [0u8; 12]);
        assert_eq!(
            StepFrame::from_bytes_mut(&mut data).unwrap_err(),
            PhysicsError::MalformedFrame {
                len: 12,
                expected: StepFrame::SIZE
            }
        );
    }

    #[test]
    fn test_kernel_rejects_misaligned_buffer() {
        let mut frames = [StepFrame::new(); 2];
        let bytes = bytemuck::bytes_of_mut(&mut frames);
        let shifted = &mut bytes[1..1 + StepFrame::SIZE];
        assert!(StepFrame::from_bytes_mut(shifted).is_err());
        step_kernel(shifted);
    }

    #[test]
    fn test_run_clamps_counts() {
        let mut frame = StepFrame::new();
        frame.body_count = u32::MAX;
        frame.tether_count = u32::MAX;
        frame.max_contacts = u32::MAX;
        frame.dt = Fix32::ONE;
        // All-zero bodies are dynamic circles of radius 0: no contacts
        let written = frame.run();
        assert!(written <= MAX_CONTACTS);
        assert_eq!(frame.contacts().len(), written);
    }

    #[test]
    fn test_inline_executor_busy() {
        let mut exec = InlineExecutor::new();
        let mut frame = StepFrame::new();
        assert!(!exec.is_busy());

        exec.run(step_kernel, frame.as_bytes_mut()).unwrap();
        assert!(exec.is_busy());
        assert_eq!(
            exec.run(step_kernel, frame.as_bytes_mut()),
            Err(PhysicsError::ExecutorBusy)
        );

        exec.wait(frame.as_bytes_mut()).unwrap();
        assert!(!exec.is_busy());
        assert_eq!(exec.completed(), 1);
        assert!(exec.run(step_kernel, frame.as_bytes_mut()).is_ok());
    }

    #[test]
    fn test_wait_without_run() {
        let mut exec = InlineExecutor::new();
        let mut data = [0u8; 4];
        assert!(exec.wait(&mut data).is_ok());
        assert_eq!(exec.completed(), 0);
    }

    #[test]
    fn test_stepper_handler_removes_body() {
        let (mut world, ground, ball) = scene();
        let mut stepper = Stepper::new(InlineExecutor::new());
        let mut hits = 0;

        let mut handler = |world: &mut World, contacts: &[Contact]| {
            for contact in contacts {
                if contact.is_between(ground, ball) && world.remove_body(ball).is_ok() {
                    hits += 1;
                }
            }
        };

        let n = stepper
            .tick(&mut world, Fix32::from_ratio(1, 60), &mut handler)
            .unwrap();
        assert_eq!(n, 1);
        assert!(world.body(ball).is_none());
        assert_eq!(world.body_count(), 1);

        let n = stepper
            .tick(&mut world, Fix32::from_ratio(1, 60), &mut handler)
            .unwrap();
        assert_eq!(n, 0);
        assert_eq!(hits, 1);
        assert_eq!(stepper.executor().completed(), 2);
    }
}
