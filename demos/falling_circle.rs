//! Falling circle demo
//!
//! A static ground slab, a falling circle and a heavy falling box on a
//! 320x240 screen. Every frame is offloaded through an executor; when the
//! circle touches the ground it is removed from the world.
//!
//! Run with: `RUST_LOG=info cargo run --example falling_circle`

use jag_physics::prelude::*;

const FRAMES: usize = 300;

fn main() -> Result<(), PhysicsError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut world = World::new(Vec2Fix::from_int(0, 100));

    let ground = world.add_body(
        Shape::aabb(Fix32::from_int(100), Fix32::from_int(10)),
        Fix32::from_int(160),
        Fix32::from_int(220),
        Fix32::ZERO,
    )?;
    let circle = world.add_body(
        Shape::circle(Fix32::from_int(10)),
        Fix32::from_int(169),
        Fix32::ZERO,
        Fix32::ONE,
    )?;
    let crate_box = world.add_body(
        Shape::aabb(Fix32::from_int(10), Fix32::from_int(10)),
        Fix32::from_int(180),
        Fix32::from_int(30),
        Fix32::from_int(100),
    )?;

    let dt = Fix32::from_ratio(1, 60);
    let mut stepper = Stepper::new(InlineExecutor::new());

    let mut on_contacts = |world: &mut World, contacts: &[Contact]| {
        for contact in contacts {
            if contact.is_between(circle, ground) {
                log::info!("circle {} hit ground {}, removing it", circle, ground);
                let _ = world.remove_body(circle);
            } else if contact.involves(circle) {
                log::info!("circle hit {} / {}", contact.body_a, contact.body_b);
            }
        }
    };

    for frame in 0..FRAMES {
        stepper.tick(&mut world, dt, &mut on_contacts)?;

        if frame % 30 == 0 {
            for body in world.bodies() {
                log::info!(
                    "frame {:3} body {} at ({:7.2}, {:7.2})",
                    frame,
                    body.id(),
                    body.position.x.to_f32(),
                    body.position.y.to_f32()
                );
            }
        }
    }

    let resting = world
        .body(crate_box)
        .map(|b| b.position.y.to_f32())
        .unwrap_or_default();
    log::info!(
        "done: {} bodies left, box resting at y = {:.2}",
        world.body_count(),
        resting
    );
    Ok(())
}
