//! Engine tunables and variant presets
//!
//! Two variants of the game shipped with slightly different constants. Both
//! are expressed as presets of the same [`EngineConfig`]; everything else is a
//! field that can be overridden from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Game variant presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Small molecules, slow orbits, shake on collision
    #[default]
    Classic,
    /// Larger molecules on faster orbits, no shake
    Scene,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::Scene => "Scene",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Variant::Classic),
            "scene" => Some(Variant::Scene),
            _ => None,
        }
    }

    /// Molecule width as a fraction of viewport width
    pub fn body_size_ratio(&self) -> f32 {
        match self {
            Variant::Classic => 1.0 / 12.0,
            Variant::Scene => 1.0 / 10.0,
        }
    }

    /// Range orbit periods are drawn from each round
    pub fn period_range(&self) -> (f32, f32) {
        match self {
            Variant::Classic => (1.0, 1.8),
            Variant::Scene => (1.5, 2.5),
        }
    }

    /// Playback rate of the orbit animation itself
    pub fn animation_speed(&self) -> f32 {
        match self {
            Variant::Classic => 0.3,
            Variant::Scene => 1.0,
        }
    }

    pub fn shake(&self) -> bool {
        match self {
            Variant::Classic => true,
            Variant::Scene => false,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub variant: Variant,

    // === Geometry ===
    /// Molecule width as a fraction of viewport width
    pub body_size_ratio: f32,

    // === Orbit ===
    /// Inclusive range periods are drawn from each round
    pub period_range: (f32, f32),
    /// Pin the (red, green, yellow) periods instead of drawing them
    pub fixed_periods: Option<[f32; 3]>,
    /// Orbit animation playback rate; a cycle lasts `period / animation_speed`
    pub animation_speed: f32,
    /// Speed multiplier while a molecule's control is held
    pub boost_multiplier: f32,

    // === Round flow ===
    /// Countdown ticks before the orbit starts
    pub countdown_ticks: u32,
    /// Seconds per countdown tick
    pub countdown_interval: f32,
    /// Seconds between orbit start and the first collision sample
    pub sampler_delay: f32,

    // === Collision ===
    /// Center distance threshold as a multiple of molecule width
    pub collision_tolerance: f32,
    /// Shake the view when the molecules collide
    pub shake: bool,

    // === Physics ===
    /// Downward acceleration (points/s²)
    pub gravity: f32,
    pub elasticity: f32,
    pub friction: f32,
    pub mass: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_variant(Variant::Classic)
    }
}

impl EngineConfig {
    /// Create a config from a variant preset
    pub fn from_variant(variant: Variant) -> Self {
        Self {
            variant,
            body_size_ratio: variant.body_size_ratio(),
            period_range: variant.period_range(),
            fixed_periods: None,
            animation_speed: variant.animation_speed(),
            boost_multiplier: 2.5,
            countdown_ticks: 3,
            countdown_interval: 1.0,
            sampler_delay: 0.4,
            collision_tolerance: 1.0,
            shake: variant.shake(),
            gravity: 1000.0,
            elasticity: 0.8,
            friction: 0.2,
            mass: 1.0,
        }
    }

    /// Parse a config; missing keys keep their Classic defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Clamp values that would stall or break a round
    pub fn sanitize(&mut self) {
        let (lo, hi) = self.period_range;
        let lo = if lo.is_finite() && lo > 0.0 { lo } else { 1.0 };
        let hi = if hi.is_finite() && hi >= lo { hi } else { lo };
        self.period_range = (lo, hi);
        if !(self.animation_speed.is_finite() && self.animation_speed > 0.0) {
            self.animation_speed = 1.0;
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            self.mass = 1.0;
        }
        self.elasticity = self.elasticity.clamp(0.0, 1.0);
        self.friction = self.friction.max(0.0);
        self.countdown_interval = self.countdown_interval.max(0.0);
        self.sampler_delay = self.sampler_delay.max(0.0);
    }

    /// Center distance below which two molecules collide
    pub fn collision_threshold(&self, body_size: f32) -> f32 {
        body_size * self.collision_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_classic() {
        let config = EngineConfig::default();
        assert_eq!(config.variant, Variant::Classic);
        assert_eq!(config.period_range, (1.0, 1.8));
        assert!((config.body_size_ratio - 1.0 / 12.0).abs() < 1e-6);
        assert!(config.shake);
        assert_eq!(config.countdown_ticks, 3);
    }

    #[test]
    fn test_scene_preset() {
        let config = EngineConfig::from_variant(Variant::Scene);
        assert_eq!(config.period_range, (1.5, 2.5));
        assert!((config.body_size_ratio - 0.1).abs() < 1e-6);
        assert!(!config.shake);
        assert_eq!(config.animation_speed, 1.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "boost_multiplier": 3.0, "shake": false }"#)
            .unwrap();
        assert_eq!(config.boost_multiplier, 3.0);
        assert!(!config.shake);
        assert_eq!(config.elasticity, 0.8);
        assert_eq!(config.friction, 0.2);
    }

    #[test]
    fn test_json_round_trip_preserves_overrides() {
        let mut config = EngineConfig::from_variant(Variant::Scene);
        config.fixed_periods = Some([1.2, 1.5, 1.7]);
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_sanitize_repairs_bad_values() {
        let config = EngineConfig::from_json(
            r#"{ "period_range": [2.0, 1.0], "animation_speed": 0.0, "elasticity": 4.0 }"#,
        )
        .unwrap();
        assert_eq!(config.period_range, (2.0, 2.0));
        assert_eq!(config.animation_speed, 1.0);
        assert_eq!(config.elasticity, 1.0);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!(Variant::from_str("SCENE"), Some(Variant::Scene));
        assert_eq!(Variant::from_str("classic"), Some(Variant::Classic));
        assert_eq!(Variant::from_str("arcade"), None);
    }
}
