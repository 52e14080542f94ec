#![no_main]
use arbitrary::Arbitrary;
use jag_physics::collision::{aabb_vs_aabb, circle_vs_aabb, circle_vs_circle};
use jag_physics::{Fix32, Vec2Fix};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct CollisionInput {
    /// Positions, small so most pairs overlap
    a: (i16, i16),
    b: (i16, i16),
    /// Extents in 1/256 units
    ea: (u16, u16),
    eb: (u16, u16),
}

fn v(p: (i16, i16)) -> Vec2Fix {
    Vec2Fix::new(Fix32::from_raw(p.0 as i32 * 64), Fix32::from_raw(p.1 as i32 * 64))
}

fn e(x: u16) -> Fix32 {
    Fix32::from_raw(x as i32 * 256)
}

// Every narrow-phase routine must return a finite manifold or nothing, and
// an overlap must report a unit-axis or normalized normal with depth > 0.
fuzz_target!(|input: CollisionInput| {
    let (pa, pb) = (v(input.a), v(input.b));
    let half_a = Vec2Fix::new(e(input.ea.0), e(input.ea.1));
    let half_b = Vec2Fix::new(e(input.eb.0), e(input.eb.1));

    if let Some(m) = circle_vs_circle(pa, e(input.ea.0), pb, e(input.eb.0)) {
        assert!(m.depth.is_positive());
    }
    if let Some(m) = aabb_vs_aabb(pa, half_a, pb, half_b) {
        assert!(m.depth.is_positive());
        assert!(m.normal.x.is_zero() != m.normal.y.is_zero());
    }
    if let Some(m) = circle_vs_aabb(pa, e(input.ea.0), pb, half_b) {
        assert!(m.normal.len() <= Fix32::from_int(2));
    }
});
