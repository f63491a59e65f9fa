//! Molecules - three orbiting discs, one collision, then gravity
//!
//! Core modules:
//! - `sim`: Orbit, collision sampling, phase transitions and physics
//! - `platform`: Host boundary (transform/visibility sinks, viewport provider)
//! - `config`: Tunables and the two game variant presets
//! - `error`: Engine error taxonomy

pub mod config;
pub mod error;
pub mod platform;
pub mod sim;

pub use config::{EngineConfig, Variant};
pub use error::{EngineError, TransitionError};

/// Engine constants
pub mod consts {
    /// Fixed physics timestep (120 Hz for smooth bounces)
    pub const PHYSICS_DT: f32 = 1.0 / 120.0;
    /// Maximum physics substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the engine will integrate at once (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Orbit ellipse inset inside its bounding box (points)
    pub const ORBIT_INSET: f32 = 5.0;
    /// Ellipse bounding box height is viewport width / ORBIT_ASPECT
    pub const ORBIT_ASPECT: f32 = 2.5;
    /// Distance from viewport center up to the ellipse box top edge
    pub const PHONE_VERTICAL_OFFSET: f32 = 75.0;
    pub const TABLET_VERTICAL_OFFSET: f32 = 150.0;
    /// Viewports at least this wide use the tablet offset
    pub const TABLET_MIN_WIDTH: f32 = 600.0;
    /// Segments in the arc-length lookup table of an orbit path
    pub const ARC_LENGTH_SAMPLES: usize = 256;

    /// Approach speed below which a contact is treated as resting (points/s)
    pub const RESTING_SPEED: f32 = 20.0;
    /// Contact solver passes per physics step
    pub const SOLVER_ITERATIONS: u32 = 4;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
