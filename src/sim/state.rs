//! Engine state and core simulation types
//!
//! Everything a round needs lives in one owned [`Engine`]: the three bodies,
//! the phase machine, orbit clocks, the sampler and the physics world.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionSampler;
use super::ellipse::Geometry;
use super::orbit::OrbitMotionController;
use super::physics::PhysicsSimulator;
use super::shake::Shake;
use super::transition::PhaseTransitionManager;
use crate::config::EngineConfig;

/// One of the three molecules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyId {
    Red,
    Green,
    Yellow,
}

impl BodyId {
    /// All bodies in storage order
    pub const ALL: [BodyId; 3] = [BodyId::Red, BodyId::Green, BodyId::Yellow];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            BodyId::Red => 0,
            BodyId::Green => 1,
            BodyId::Yellow => 2,
        }
    }

    /// Rotation of this body's ellipse around the shared center
    pub fn orbit_phase(self) -> f32 {
        match self {
            BodyId::Red => FRAC_PI_4,
            BodyId::Green => -FRAC_PI_4,
            BodyId::Yellow => FRAC_PI_2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BodyId::Red => "red",
            BodyId::Green => "green",
            BodyId::Yellow => "yellow",
        }
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Bodies hidden at the center, countdown running
    Prestart,
    /// Bodies on their orbits, sampler armed
    Orbiting,
    /// Orbits stopped, positions captured
    Frozen,
    /// Physics running until reload
    Simulating,
}

/// Position and heading pushed to the host each frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f32,
}

impl Transform {
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }
}

/// A molecule
#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub orbit_phase: f32,
    /// Orbit period for the current round
    pub orbit_period: f32,
    pub speed_multiplier: f32,
    /// Logical position (orbit output or physics state)
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    /// Interpolated position read back from the host this frame
    pub rendered_position: Option<Vec2>,
    /// Captured at the orbit -> physics handoff, once per round
    pub frozen_position: Option<Vec2>,
    pub visible: bool,
}

impl Body {
    pub fn new(id: BodyId) -> Self {
        Self {
            id,
            orbit_phase: id.orbit_phase(),
            orbit_period: 0.0,
            speed_multiplier: 1.0,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            rendered_position: None,
            frozen_position: None,
            visible: false,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    /// Hide at `center` with no motion (pre-start pose)
    pub fn park(&mut self, center: Vec2) {
        self.position = center;
        self.rotation = 0.0;
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.speed_multiplier = 1.0;
        self.rendered_position = None;
        self.frozen_position = None;
        self.visible = false;
    }
}

/// Notifications for the host, drained once per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { round: u32 },
    CountdownTick { remaining: u32 },
    OrbitStarted { periods: [f32; 3] },
    Collision { a: BodyId, b: BodyId },
    Frozen { positions: [Vec2; 3] },
    SimulationStarted,
    Reset,
}

/// Pre-start countdown (whole ticks of a fixed interval)
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    pub ticks: u32,
    elapsed: f32,
}

impl Countdown {
    /// Accumulate `dt`; returns the number of ticks that elapsed
    pub fn advance(&mut self, dt: f32, interval: f32) -> u32 {
        if interval <= 0.0 {
            self.ticks += 1;
            return 1;
        }
        self.elapsed += dt;
        let mut fired = 0;
        while self.elapsed >= interval {
            self.elapsed -= interval;
            self.ticks += 1;
            fired += 1;
        }
        fired
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// RNG state wrapper for reproducible rounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Independent stream for one round
    pub fn for_round(&self, round: u32) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ (round as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// The single owned game context
#[derive(Debug)]
pub struct Engine {
    pub config: EngineConfig,
    pub rng_state: RngState,
    /// Round counter (1-based)
    pub round: u32,
    /// Engine clock (seconds)
    pub time: f64,
    pub time_ticks: u64,
    pub bodies: [Body; 3],
    /// Derived from the viewport; `None` until the host is laid out
    pub geometry: Option<Geometry>,
    pub transitions: PhaseTransitionManager,
    pub orbits: OrbitMotionController,
    pub sampler: CollisionSampler,
    pub physics: Option<PhysicsSimulator>,
    pub countdown: Countdown,
    pub shake: Option<Shake>,
    pub reload_visible: bool,
    /// Visibility last pushed to the host: (bodies, reload)
    pub(crate) announced: Option<([bool; 3], bool)>,
    events: Vec<GameEvent>,
}

impl Engine {
    /// Create an engine with the first round in pre-start
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        let mut engine = Self {
            config,
            rng_state: RngState::new(seed),
            round: 1,
            time: 0.0,
            time_ticks: 0,
            bodies: BodyId::ALL.map(Body::new),
            geometry: None,
            transitions: PhaseTransitionManager::new(),
            orbits: OrbitMotionController::new(),
            sampler: CollisionSampler::new(),
            physics: None,
            countdown: Countdown::default(),
            shake: None,
            reload_visible: false,
            announced: None,
            events: Vec::new(),
        };
        engine.config.sanitize();
        engine.push_event(GameEvent::RoundStarted { round: 1 });
        log::info!("Engine created (seed {}, {} variant)", seed, engine.config.variant.as_str());
        engine
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.transitions.phase()
    }

    #[inline]
    pub fn body(&self, id: BodyId) -> &Body {
        &self.bodies[id.index()]
    }

    #[inline]
    pub fn body_mut(&mut self, id: BodyId) -> &mut Body {
        &mut self.bodies[id.index()]
    }

    /// Center of the viewport, or the origin before layout
    pub fn center(&self) -> Vec2 {
        self.geometry.as_ref().map_or(Vec2::ZERO, |g| g.center)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events produced since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_new_engine_starts_hidden_in_prestart() {
        let engine = Engine::new(EngineConfig::default(), 7);
        assert_eq!(engine.phase(), Phase::Prestart);
        assert_eq!(engine.round, 1);
        assert!(engine.bodies.iter().all(|b| !b.visible));
        assert_eq!(engine.events(), &[GameEvent::RoundStarted { round: 1 }]);
    }

    #[test]
    fn test_body_identities_are_fixed() {
        let engine = Engine::new(EngineConfig::default(), 7);
        for (i, id) in BodyId::ALL.into_iter().enumerate() {
            assert_eq!(engine.bodies[i].id, id);
            assert_eq!(id.index(), i);
        }
        assert_eq!(engine.body(BodyId::Green).orbit_phase, -FRAC_PI_4);
    }

    #[test]
    fn test_countdown_counts_whole_intervals() {
        let mut countdown = Countdown::default();
        assert_eq!(countdown.advance(0.6, 1.0), 0);
        assert_eq!(countdown.advance(0.6, 1.0), 1);
        assert_eq!(countdown.advance(2.0, 1.0), 2);
        assert_eq!(countdown.ticks, 3);
        countdown.reset();
        assert_eq!(countdown.ticks, 0);
    }

    #[test]
    fn test_round_streams_are_reproducible_and_distinct() {
        let rng = RngState::new(42);
        let a: u32 = rng.for_round(1).random();
        let b: u32 = rng.for_round(1).random();
        let c: u32 = rng.for_round(2).random();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
