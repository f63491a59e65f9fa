//! Engine error taxonomy
//!
//! None of these ever reach the player. Callers log them and carry on:
//! a missing render state skips a sample, degenerate geometry is retried on
//! the next tick, and a rejected transition is simply ignored.

use thiserror::Error;

use crate::sim::{BodyId, Phase};

/// A phase change the state machine refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Requested `to` from a state that does not lead there (e.g. a second
    /// freeze in the same round).
    #[error("transition {from:?} -> {to:?} is not allowed")]
    Invalid { from: Phase, to: Phase },
}

/// Error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The host has not produced an interpolated position for this body yet.
    #[error("no rendered position for {0} yet")]
    MissingRenderState(BodyId),
    /// Viewport is empty or not laid out.
    #[error("degenerate viewport {width}x{height}")]
    DegenerateGeometry { width: f32, height: f32 },
    /// Rejected phase transition.
    #[error(transparent)]
    Transition(#[from] TransitionError),
    /// Config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Config JSON was malformed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
