#![no_main]
use arbitrary::Arbitrary;
use jag_physics::{BodyId, Fix32, Shape, Vec2Fix, World};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzBody {
    /// Circle when true, box otherwise
    circle: bool,
    /// Raw 16.16 extents (radius, or half-width / half-height)
    extents: (i32, i32),
    /// Raw 16.16 position
    position: (i32, i32),
    /// Raw 16.16 mass; <= 0 makes the body static
    mass: i32,
    /// Raw 16.16 initial velocity
    velocity: (i32, i32),
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    bodies: Vec<FuzzBody>,
    /// (endpoint a, endpoint b, raw max length)
    tethers: Vec<(u8, u8, i32)>,
    /// Raw gravity
    gravity: (i32, i32),
    /// Raw timestep
    dt: i32,
    /// Number of simulation steps (capped)
    step_count: u8,
    /// Body to remove halfway through
    remove: Option<u8>,
}

// Arbitrary scenes, including extreme coordinates and degenerate shapes,
// must step without panicking.
fuzz_target!(|input: FuzzInput| {
    let mut world = World::new(Vec2Fix::new(
        Fix32::from_raw(input.gravity.0),
        Fix32::from_raw(input.gravity.1),
    ));

    for body in input.bodies.iter().take(80) {
        let shape = if body.circle {
            Shape::circle(Fix32::from_raw(body.extents.0))
        } else {
            Shape::aabb(Fix32::from_raw(body.extents.0), Fix32::from_raw(body.extents.1))
        };
        let Ok(id) = world.add_body(
            shape,
            Fix32::from_raw(body.position.0),
            Fix32::from_raw(body.position.1),
            Fix32::from_raw(body.mass),
        ) else {
            continue;
        };
        if let Some(b) = world.body_mut(id) {
            b.velocity = Vec2Fix::new(
                Fix32::from_raw(body.velocity.0),
                Fix32::from_raw(body.velocity.1),
            );
        }
    }

    for &(a, b, len) in input.tethers.iter().take(24) {
        let _ = world.add_tether(BodyId(a as u32), BodyId(b as u32), Fix32::from_raw(len));
    }

    let dt = Fix32::from_raw(input.dt);
    let steps = (input.step_count as usize).min(64);
    let mut contacts = [jag_physics::Contact::default(); jag_physics::MAX_CONTACTS];
    for i in 0..steps {
        if i == steps / 2 {
            if let Some(id) = input.remove {
                let _ = world.remove_body(BodyId(id as u32));
            }
        }
        let n = world.step_with_contacts(dt, &mut contacts);
        assert!(n <= contacts.len());
    }
});
