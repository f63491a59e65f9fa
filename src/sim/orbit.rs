//! Orbit motion
//!
//! Each body runs an infinitely repeating lap of its [`EllipsePath`]. Live
//! speed changes warp the body's clock instead of restarting the lap: the
//! local time reached under the old multiplier becomes the new origin.

use super::ellipse::EllipsePath;
use super::state::{BodyId, Transform};

/// Layer-style clock: `local = offset + (now - anchor) * speed`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitClock {
    offset: f64,
    anchor: f64,
    speed: f32,
}

impl OrbitClock {
    pub fn started(now: f64, speed: f32) -> Self {
        Self {
            offset: 0.0,
            anchor: now,
            speed,
        }
    }

    #[inline]
    pub fn local_time(&self, now: f64) -> f64 {
        self.offset + (now - self.anchor) * self.speed as f64
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Re-anchor at `now` and continue at `speed`
    pub fn warp(&mut self, now: f64, speed: f32) {
        self.offset = self.local_time(now);
        self.anchor = now;
        self.speed = speed;
    }
}

/// A running lap
#[derive(Debug, Clone)]
struct Orbit {
    path: EllipsePath,
    clock: OrbitClock,
    period: f32,
}

impl Orbit {
    fn transform(&self, now: f64, animation_speed: f32) -> Transform {
        let laps = self.clock.local_time(now) * animation_speed as f64 / self.period as f64;
        self.path.point_at(laps.fract() as f32)
    }
}

/// Drives the three bodies along their ellipses
#[derive(Debug, Clone)]
pub struct OrbitMotionController {
    orbits: [Option<Orbit>; 3],
    /// Playback rate of every lap; one lap lasts `period / animation_speed`
    animation_speed: f32,
}

impl Default for OrbitMotionController {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitMotionController {
    pub fn new() -> Self {
        Self {
            orbits: [None, None, None],
            animation_speed: 1.0,
        }
    }

    pub fn set_animation_speed(&mut self, animation_speed: f32) {
        self.animation_speed = animation_speed;
    }

    pub fn is_running(&self, id: BodyId) -> bool {
        self.orbits[id.index()].is_some()
    }

    /// Begin a repeating lap of `path` with cycle length `period`
    pub fn start(&mut self, id: BodyId, path: EllipsePath, period: f32, now: f64, multiplier: f32) {
        self.orbits[id.index()] = Some(Orbit {
            path,
            clock: OrbitClock::started(now, multiplier),
            period: period.max(f32::EPSILON),
        });
    }

    /// Change a body's multiplier without a positional jump
    ///
    /// Returns false if the body has no running orbit.
    pub fn set_speed(&mut self, id: BodyId, multiplier: f32, now: f64) -> bool {
        match &mut self.orbits[id.index()] {
            Some(orbit) => {
                orbit.clock.warp(now, multiplier);
                true
            }
            None => false,
        }
    }

    /// Current interpolated transform of a running orbit
    pub fn sample(&self, id: BodyId, now: f64) -> Option<Transform> {
        self.orbits[id.index()]
            .as_ref()
            .map(|orbit| orbit.transform(now, self.animation_speed))
    }

    /// Halt a body, returning where it stopped
    pub fn stop(&mut self, id: BodyId, now: f64) -> Option<Transform> {
        let last = self.sample(id, now);
        self.orbits[id.index()] = None;
        last
    }

    pub fn stop_all(&mut self) {
        self.orbits = [None, None, None];
    }

    /// Swap in a new path after a viewport change, keeping the clock
    pub fn reshape(&mut self, id: BodyId, path: EllipsePath) {
        if let Some(orbit) = &mut self.orbits[id.index()] {
            orbit.path = path;
        }
    }
}
