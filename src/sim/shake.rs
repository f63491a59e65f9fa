//! Collision shake
//!
//! A short horizontal keyframe wobble of the whole view, played once when the
//! molecules collide.

/// Offsets in points at each key time
const KEY_VALUES: [f32; 5] = [0.0, 10.0, -10.0, 10.0, 0.0];
/// Normalized key times
const KEY_TIMES: [f32; 5] = [0.0, 0.16, 0.5, 0.83, 1.0];
/// Seconds
pub const SHAKE_DURATION: f32 = 0.2;

#[derive(Debug, Clone, Default)]
pub struct Shake {
    elapsed: f32,
}

impl Shake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Horizontal offset at normalized time `t` (linear between keys)
    pub fn offset_at(t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        for i in 1..KEY_TIMES.len() {
            if t <= KEY_TIMES[i] {
                let span = KEY_TIMES[i] - KEY_TIMES[i - 1];
                let u = (t - KEY_TIMES[i - 1]) / span;
                return KEY_VALUES[i - 1] + (KEY_VALUES[i] - KEY_VALUES[i - 1]) * u;
            }
        }
        0.0
    }

    /// Advance; `None` once the shake has finished
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        self.elapsed += dt;
        if self.elapsed >= SHAKE_DURATION {
            return None;
        }
        Some(Self::offset_at(self.elapsed / SHAKE_DURATION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyframes() {
        assert_eq!(Shake::offset_at(0.0), 0.0);
        assert!((Shake::offset_at(0.16) - 10.0).abs() < 1e-4);
        assert!((Shake::offset_at(0.5) + 10.0).abs() < 1e-4);
        assert!((Shake::offset_at(0.83) - 10.0).abs() < 1e-4);
        assert!(Shake::offset_at(1.0).abs() < 1e-4);
        // Halfway between -10 and 10
        assert!(Shake::offset_at(0.665).abs() < 1e-3);
    }

    #[test]
    fn test_shake_ends_after_duration() {
        let mut shake = Shake::new();
        let mut frames = 0;
        while shake.advance(1.0 / 60.0).is_some() {
            frames += 1;
            assert!(frames < 100);
        }
        assert!((11..=12).contains(&frames));
    }
}
