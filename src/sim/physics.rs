//! Dynamics phase
//!
//! After the handoff the molecules are discs under constant gravity, bouncing
//! off each other and the viewport edges. Contacts use an impulse solver with
//! restitution and Coulomb friction; friction also spins the discs.

use std::f32::consts::FRAC_PI_3;

use glam::Vec2;

use super::collision::Rect;
use super::state::Transform;
use crate::consts::*;
use crate::normalize_angle;

/// Surface and world parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Downward acceleration (points/s², y grows downward)
    pub gravity: f32,
    pub elasticity: f32,
    pub friction: f32,
}

impl Material {
    /// Restitution for an approach at `normal_speed` (negative = closing)
    fn restitution(&self, normal_speed: f32) -> f32 {
        if normal_speed > -RESTING_SPEED {
            0.0
        } else {
            self.elasticity
        }
    }
}

/// A disc in the physics world
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub angular_velocity: f32,
    pub radius: f32,
    pub mass: f32,
}

impl PhysicsBody {
    #[inline]
    fn inv_mass(&self) -> f32 {
        1.0 / self.mass
    }

    /// Solid disc moment of inertia, inverted
    #[inline]
    fn inv_inertia(&self) -> f32 {
        2.0 / (self.mass * self.radius * self.radius)
    }
}

#[derive(Debug, Clone)]
pub struct PhysicsSimulator {
    bodies: [PhysicsBody; 3],
    bounds: Rect,
    material: Material,
    accumulator: f32,
    steps: u64,
}

impl PhysicsSimulator {
    /// Start from rest at the given poses
    pub fn seeded(seeds: [Transform; 3], radius: f32, mass: f32, bounds: Rect, material: Material) -> Self {
        let radius = radius.max(f32::EPSILON);
        Self {
            bodies: seeds.map(|seed| PhysicsBody {
                position: seed.position,
                velocity: Vec2::ZERO,
                rotation: seed.rotation,
                angular_velocity: 0.0,
                radius,
                mass,
            }),
            bounds,
            material,
            accumulator: 0.0,
            steps: 0,
        }
    }

    pub fn bodies(&self) -> &[PhysicsBody; 3] {
        &self.bodies
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advance by a frame, in fixed substeps; returns substeps taken
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);
        let mut substeps = 0;
        while self.accumulator >= PHYSICS_DT && substeps < MAX_SUBSTEPS {
            self.step(PHYSICS_DT);
            self.accumulator -= PHYSICS_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than spiral
            self.accumulator = self.accumulator.min(PHYSICS_DT);
        }
        substeps
    }

    /// One fixed step: integrate, then solve contacts
    pub fn step(&mut self, dt: f32) {
        let gravity = Vec2::new(0.0, self.material.gravity);
        for body in &mut self.bodies {
            body.velocity += gravity * dt;
            body.position += body.velocity * dt;
            body.rotation = normalize_angle(body.rotation + body.angular_velocity * dt);
        }

        for _ in 0..SOLVER_ITERATIONS {
            for (i, j) in [(0, 1), (0, 2), (1, 2)] {
                self.resolve_pair(i, j);
            }
            for i in 0..self.bodies.len() {
                self.resolve_bounds(i);
            }
        }
        self.steps += 1;
    }

    fn resolve_pair(&mut self, i: usize, j: usize) {
        let (a, b) = {
            let (left, right) = self.bodies.split_at_mut(j);
            (&mut left[i], &mut right[0])
        };

        let delta = b.position - a.position;
        let dist = delta.length();
        let min_dist = a.radius + b.radius;
        if dist >= min_dist {
            return;
        }
        // Coincident centers: any fixed direction separates them
        let normal = if dist > 1e-4 {
            delta / dist
        } else {
            Vec2::from_angle(FRAC_PI_3 * (i + j) as f32)
        };

        let (wa, wb) = (a.inv_mass(), b.inv_mass());
        let penetration = min_dist - dist;
        a.position -= normal * (penetration * wa / (wa + wb));
        b.position += normal * (penetration * wb / (wa + wb));

        let tangent = normal.perp();
        let contact_velocity = |a: &PhysicsBody, b: &PhysicsBody| {
            (b.velocity - b.angular_velocity * b.radius * tangent)
                - (a.velocity + a.angular_velocity * a.radius * tangent)
        };

        let vn = contact_velocity(&*a, &*b).dot(normal);
        if vn >= 0.0 {
            return;
        }
        let e = self.material.restitution(vn);
        let jn = -(1.0 + e) * vn / (wa + wb);
        a.velocity -= normal * (jn * wa);
        b.velocity += normal * (jn * wb);

        let vt = contact_velocity(&*a, &*b).dot(tangent);
        let k = wa + wb + a.radius * a.radius * a.inv_inertia() + b.radius * b.radius * b.inv_inertia();
        let limit = self.material.friction * jn;
        let jt = (-vt / k).clamp(-limit, limit);
        a.velocity -= tangent * (jt * wa);
        b.velocity += tangent * (jt * wb);
        a.angular_velocity -= jt * a.radius * a.inv_inertia();
        b.angular_velocity -= jt * b.radius * b.inv_inertia();
    }

    fn resolve_bounds(&mut self, i: usize) {
        let bounds = self.bounds;
        // Inward normals with the distance from each edge to the center
        let walls = {
            let p = self.bodies[i].position;
            [
                (Vec2::X, p.x - bounds.min.x),
                (Vec2::NEG_X, bounds.max.x - p.x),
                (Vec2::Y, p.y - bounds.min.y),
                (Vec2::NEG_Y, bounds.max.y - p.y),
            ]
        };

        for (normal, distance) in walls {
            let radius = self.bodies[i].radius;
            let penetration = radius - distance;
            if penetration <= 0.0 {
                continue;
            }
            let body = &mut self.bodies[i];
            body.position += normal * penetration;

            let vn = body.velocity.dot(normal);
            if vn >= 0.0 {
                continue;
            }
            let e = self.material.restitution(vn);
            let jn = -(1.0 + e) * vn * body.mass;
            body.velocity += normal * (jn / body.mass);

            // Contact point sits at -radius * normal
            let tangent = normal.perp();
            let vt = body.velocity.dot(tangent) - body.angular_velocity * body.radius;
            let k = body.inv_mass() + body.radius * body.radius * body.inv_inertia();
            let limit = self.material.friction * jn;
            let jt = (-vt / k).clamp(-limit, limit);
            body.velocity += tangent * (jt * body.inv_mass());
            body.angular_velocity -= jt * body.radius * body.inv_inertia();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADIUS: f32 = 16.25;

    fn bounds() -> Rect {
        Rect::new(Vec2::ZERO, Vec2::new(390.0, 844.0))
    }

    fn material() -> Material {
        Material {
            gravity: 1000.0,
            elasticity: 0.8,
            friction: 0.2,
        }
    }

    fn world(positions: [Vec2; 3]) -> PhysicsSimulator {
        PhysicsSimulator::seeded(
            positions.map(|p| Transform::new(p, 0.0)),
            RADIUS,
            1.0,
            bounds(),
            material(),
        )
    }

    fn run(world: &mut PhysicsSimulator, seconds: f32) {
        let frames = (seconds * 60.0) as usize;
        for _ in 0..frames {
            world.advance(1.0 / 60.0);
        }
    }

    #[test]
    fn test_bodies_fall_under_gravity() {
        let mut world = world([
            Vec2::new(50.0, 100.0),
            Vec2::new(195.0, 100.0),
            Vec2::new(340.0, 100.0),
        ]);
        run(&mut world, 0.25);
        for body in world.bodies() {
            assert!(body.position.y > 100.0);
            assert!(body.velocity.y > 0.0);
        }
    }

    #[test]
    fn test_coincident_seeds_do_not_explode() {
        let p = Vec2::new(195.0, 300.0);
        let mut world = world([p, p, p + Vec2::new(0.001, 0.0)]);
        run(&mut world, 3.0);
        for body in world.bodies() {
            assert!(body.position.is_finite());
            assert!(body.velocity.is_finite());
            assert!(body.angular_velocity.is_finite());
        }
        // Pushed apart
        let b = world.bodies();
        assert!(b[0].position.distance(b[1].position) > RADIUS);
    }

    #[test]
    fn test_bodies_stay_inside_viewport() {
        let mut world = world([
            Vec2::new(30.0, 30.0),
            Vec2::new(200.0, 400.0),
            Vec2::new(360.0, 800.0),
        ]);
        run(&mut world, 5.0);
        let slack = 1.0;
        for body in world.bodies() {
            assert!(body.position.x >= RADIUS - slack && body.position.x <= 390.0 - RADIUS + slack);
            assert!(body.position.y >= RADIUS - slack && body.position.y <= 844.0 - RADIUS + slack);
        }
    }

    #[test]
    fn test_floor_bounce_loses_energy() {
        let mut world = world([
            Vec2::new(50.0, 700.0),
            Vec2::new(200.0, 100.0),
            Vec2::new(340.0, 100.0),
        ]);
        world.bodies[0].velocity = Vec2::new(0.0, 600.0);
        let impact = world.bodies[0].velocity.y;
        let mut rebound = 0.0f32;
        for _ in 0..60 {
            world.advance(1.0 / 60.0);
            rebound = rebound.max(-world.bodies()[0].velocity.y);
        }
        assert!(rebound > 0.0);
        assert!(rebound < impact + 1000.0 * 0.3);
    }

    #[test]
    fn test_glancing_contact_spins_discs() {
        let mut world = world([
            Vec2::new(100.0, 400.0),
            Vec2::new(100.0 + RADIUS * 1.9, 400.0 + RADIUS),
            Vec2::new(340.0, 100.0),
        ]);
        world.material.gravity = 0.0;
        world.bodies[0].velocity = Vec2::new(400.0, 0.0);
        world.step(PHYSICS_DT);
        let b = world.bodies();
        assert!(b[0].angular_velocity != 0.0);
        assert!(b[1].angular_velocity != 0.0);
        assert!(b[1].velocity.x > 0.0);
    }

    #[test]
    fn test_advance_uses_fixed_substeps() {
        let mut world = world([Vec2::splat(100.0), Vec2::splat(200.0), Vec2::splat(300.0)]);
        assert_eq!(world.advance(PHYSICS_DT * 2.5), 2);
        assert_eq!(world.advance(PHYSICS_DT * 0.75), 1);
        assert_eq!(world.advance(10.0), MAX_SUBSTEPS);
        assert_eq!(world.steps(), 3 + MAX_SUBSTEPS as u64);
    }
}
