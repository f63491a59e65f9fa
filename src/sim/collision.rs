//! Collision sampling between orbiting molecules
//!
//! Once per frame the sampler reads the rendered position of every body and
//! tests each unordered pair: a cheap frame-overlap reject first, then the
//! center distance against the molecule width. Frames alone are too generous
//! for discs, so a pair collides only if both tests pass.

use glam::Vec2;

use super::state::{Body, BodyId};
use crate::error::EngineError;

/// Pairs in sampling order; the first colliding pair of a tick wins
pub const SAMPLE_PAIRS: [(BodyId, BodyId); 3] = [
    (BodyId::Red, BodyId::Green),
    (BodyId::Yellow, BodyId::Green),
    (BodyId::Red, BodyId::Yellow),
];

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_half(center: Vec2, half: Vec2) -> Self {
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Overlap with positive area (touching edges do not count)
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Frame of a square molecule of width `size` turned by `rotation`
pub fn footprint(position: Vec2, size: f32, rotation: f32) -> Rect {
    let (sin, cos) = rotation.sin_cos();
    let half = size / 2.0 * (cos.abs() + sin.abs());
    Rect::from_center_half(position, Vec2::splat(half))
}

/// Coarse frame test followed by the fine distance test
pub fn discs_collide(
    a: Vec2,
    a_rotation: f32,
    b: Vec2,
    b_rotation: f32,
    size: f32,
    threshold: f32,
) -> bool {
    if !footprint(a, size, a_rotation).intersects(&footprint(b, size, b_rotation)) {
        return false;
    }
    a.distance(b) < threshold
}

/// Per-frame collision sampler
#[derive(Debug, Clone, Default)]
pub struct CollisionSampler {
    running: bool,
    /// Seconds left before the first sample
    delay: f32,
    /// Ticks actually sampled this round
    samples: u64,
}

impl CollisionSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the sampler; the first test happens after `delay` seconds
    pub fn start(&mut self, delay: f32) {
        self.running = true;
        self.delay = delay.max(0.0);
        self.samples = 0;
    }

    /// Stop sampling. Safe to call when already stopped.
    ///
    /// Returns whether the sampler was running.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Running and past the start delay
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.running && self.delay <= 0.0
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Count down the start delay
    pub fn advance(&mut self, dt: f32) {
        if self.running && self.delay > 0.0 {
            self.delay -= dt;
        }
    }

    /// Test one pair from the bodies' rendered positions
    pub fn check_pair(
        a: &Body,
        b: &Body,
        size: f32,
        threshold: f32,
    ) -> Result<bool, EngineError> {
        let pa = a.rendered_position.ok_or(EngineError::MissingRenderState(a.id))?;
        let pb = b.rendered_position.ok_or(EngineError::MissingRenderState(b.id))?;
        Ok(discs_collide(pa, a.rotation, pb, b.rotation, size, threshold))
    }

    /// Run one sampler tick, returning the first colliding pair
    pub fn sample(&mut self, bodies: &[Body; 3], size: f32, threshold: f32) -> Option<(BodyId, BodyId)> {
        if !self.is_armed() {
            return None;
        }
        self.samples += 1;

        for (a, b) in SAMPLE_PAIRS {
            match Self::check_pair(&bodies[a.index()], &bodies[b.index()], size, threshold) {
                Ok(true) => return Some((a, b)),
                Ok(false) => {}
                Err(e) => log::debug!("Skipping {}-{} this tick: {}", a, b, e),
            }
        }
        None
    }
}
