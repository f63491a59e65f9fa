//! Orbit-collision-physics simulation
//!
//! All round logic lives here. It never touches the screen directly:
//! - Host boundary only (see `platform`)
//! - Seeded RNG only
//! - Stable pair order for collision sampling

pub mod collision;
pub mod ellipse;
pub mod orbit;
pub mod physics;
pub mod shake;
pub mod state;
pub mod tick;
pub mod transition;

pub use collision::{CollisionSampler, Rect, SAMPLE_PAIRS, discs_collide, footprint};
pub use ellipse::{EllipsePath, Geometry};
pub use orbit::{OrbitClock, OrbitMotionController};
pub use physics::{Material, PhysicsBody, PhysicsSimulator};
pub use shake::Shake;
pub use state::{Body, BodyId, Engine, GameEvent, Phase, Transform};
pub use tick::{TickInput, reset_round, set_speed, tick, trigger_collision};
pub use transition::PhaseTransitionManager;
