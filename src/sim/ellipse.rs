//! Orbit geometry
//!
//! The three molecules share one logical ellipse whose bounding box spans the
//! viewport width. Each body follows a copy rotated about the ellipse center by
//! its orbit phase. Positions along a path are paced by arc length, so a body
//! moves at constant speed instead of constant angle.

use std::f32::consts::TAU;

use glam::Vec2;

use super::state::Transform;
use crate::consts::*;
use crate::error::EngineError;

/// Layout derived from the viewport size
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub viewport: Vec2,
    /// Viewport center (pre-start pose of the bodies)
    pub center: Vec2,
    /// Center of the orbit ellipse
    pub orbit_center: Vec2,
    /// Semi-axes of the unrotated ellipse
    pub radii: Vec2,
    /// Molecule width (and height)
    pub body_size: f32,
}

impl Geometry {
    pub fn from_viewport(viewport: Vec2, body_size_ratio: f32) -> Result<Self, EngineError> {
        let degenerate = EngineError::DegenerateGeometry {
            width: viewport.x,
            height: viewport.y,
        };
        if !viewport.is_finite() || viewport.x <= 0.0 || viewport.y <= 0.0 {
            return Err(degenerate);
        }

        let width = viewport.x;
        let box_height = width / ORBIT_ASPECT;
        let offset = if width >= TABLET_MIN_WIDTH {
            TABLET_VERTICAL_OFFSET
        } else {
            PHONE_VERTICAL_OFFSET
        };

        let center = viewport / 2.0;
        let radii = Vec2::new(width / 2.0, box_height / 2.0) - Vec2::splat(ORBIT_INSET);
        if radii.y <= 0.0 {
            return Err(degenerate);
        }

        Ok(Self {
            viewport,
            center,
            orbit_center: Vec2::new(center.x, center.y - offset + box_height / 2.0),
            radii,
            body_size: width * body_size_ratio,
        })
    }

    /// Path for a body rotated by `phase`
    pub fn path_for(&self, phase: f32) -> EllipsePath {
        EllipsePath::new(self.orbit_center, self.radii, phase)
    }
}

/// An ellipse rotated about its center, sampled by arc length
#[derive(Debug, Clone, PartialEq)]
pub struct EllipsePath {
    pub center: Vec2,
    pub radii: Vec2,
    /// Rotation of the major axis (radians)
    pub rotation: f32,
    /// `cumulative[i]` = arc length from parameter 0 to sample `i`
    cumulative: Vec<f32>,
}

impl EllipsePath {
    pub fn new(center: Vec2, radii: Vec2, rotation: f32) -> Self {
        let mut cumulative = Vec::with_capacity(ARC_LENGTH_SAMPLES + 1);
        cumulative.push(0.0);
        let mut prev = Vec2::new(radii.x, 0.0);
        let mut total = 0.0;
        for i in 1..=ARC_LENGTH_SAMPLES {
            let t = TAU * i as f32 / ARC_LENGTH_SAMPLES as f32;
            let p = Vec2::new(radii.x * t.cos(), radii.y * t.sin());
            total += p.distance(prev);
            cumulative.push(total);
            prev = p;
        }
        Self {
            center,
            radii,
            rotation,
            cumulative,
        }
    }

    /// Perimeter (polyline approximation)
    #[inline]
    pub fn length(&self) -> f32 {
        self.cumulative[ARC_LENGTH_SAMPLES]
    }

    /// Ellipse parameter reached after `fraction` of the perimeter
    fn parameter_at(&self, fraction: f32) -> f32 {
        let total = self.length();
        if total <= 0.0 {
            return 0.0;
        }
        let s = fraction.rem_euclid(1.0) * total;
        // Segment whose end is the first sample past `s`
        let end = self
            .cumulative
            .partition_point(|&c| c <= s)
            .clamp(1, ARC_LENGTH_SAMPLES);
        let start = end - 1;
        let seg = self.cumulative[end] - self.cumulative[start];
        let u = if seg > 0.0 {
            ((s - self.cumulative[start]) / seg).clamp(0.0, 1.0)
        } else {
            0.0
        };
        TAU * (start as f32 + u) / ARC_LENGTH_SAMPLES as f32
    }

    /// Position and heading after `fraction` of one lap
    ///
    /// Heading follows the path tangent, so bodies turn with the orbit.
    pub fn point_at(&self, fraction: f32) -> Transform {
        let t = self.parameter_at(fraction);
        let (sin, cos) = t.sin_cos();
        let local = Vec2::new(self.radii.x * cos, self.radii.y * sin);
        let tangent = Vec2::new(-self.radii.x * sin, self.radii.y * cos);
        let rot = Vec2::from_angle(self.rotation);
        let heading = rot.rotate(tangent);
        Transform::new(self.center + rot.rotate(local), heading.y.atan2(heading.x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn phone() -> Geometry {
        Geometry::from_viewport(Vec2::new(390.0, 844.0), 1.0 / 12.0).unwrap()
    }

    #[test]
    fn test_geometry_from_phone_viewport() {
        let g = phone();
        assert_eq!(g.center, Vec2::new(195.0, 422.0));
        assert!((g.radii.x - 190.0).abs() < 1e-4);
        assert!((g.radii.y - 73.0).abs() < 1e-4);
        // Box top edge 75 above center, box height 156
        assert!((g.orbit_center.y - (422.0 - 75.0 + 78.0)).abs() < 1e-4);
        assert!((g.body_size - 32.5).abs() < 1e-4);
    }

    #[test]
    fn test_tablet_viewport_uses_larger_offset() {
        let g = Geometry::from_viewport(Vec2::new(1024.0, 1366.0), 0.1).unwrap();
        let box_height = 1024.0 / ORBIT_ASPECT;
        assert!((g.orbit_center.y - (683.0 - 150.0 + box_height / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_viewports_rejected() {
        for viewport in [Vec2::ZERO, Vec2::new(390.0, 0.0), Vec2::new(8.0, 100.0)] {
            assert!(matches!(
                Geometry::from_viewport(viewport, 0.1),
                Err(EngineError::DegenerateGeometry { .. })
            ));
        }
        assert!(Geometry::from_viewport(Vec2::new(f32::NAN, 10.0), 0.1).is_err());
    }

    #[test]
    fn test_path_starts_on_rotated_major_axis() {
        let g = phone();
        let path = g.path_for(FRAC_PI_2);
        let start = path.point_at(0.0);
        let expected = g.orbit_center + Vec2::new(0.0, g.radii.x);
        assert!(start.position.distance(expected) < 1e-3);
        // Tangent at parameter 0 is +y in local space, rotated a quarter turn
        let off = crate::normalize_angle(start.rotation - std::f32::consts::PI);
        assert!(off.abs() < 1e-3);
    }

    #[test]
    fn test_point_at_wraps_whole_laps() {
        let path = phone().path_for(FRAC_PI_4);
        let a = path.point_at(0.3).position;
        let b = path.point_at(2.3).position;
        let c = path.point_at(-0.7).position;
        assert!(a.distance(b) < 1e-2);
        assert!(a.distance(c) < 1e-2);
    }

    #[test]
    fn test_pacing_is_even_by_arc_length() {
        let path = phone().path_for(-FRAC_PI_4);
        let steps = 64;
        let chords: Vec<f32> = (0..steps)
            .map(|i| {
                let a = path.point_at(i as f32 / steps as f32).position;
                let b = path.point_at((i + 1) as f32 / steps as f32).position;
                a.distance(b)
            })
            .collect();
        let min = chords.iter().cloned().fold(f32::MAX, f32::min);
        let max = chords.iter().cloned().fold(0.0, f32::max);
        // Constant-angle sampling of this ellipse would differ by ~2.5x
        assert!(max / min < 1.05, "chords vary {min}..{max}");
    }

    #[test]
    fn test_rotated_paths_share_center_and_perimeter() {
        let g = phone();
        let paths: Vec<_> = [FRAC_PI_4, -FRAC_PI_4, FRAC_PI_2]
            .into_iter()
            .map(|phase| g.path_for(phase))
            .collect();
        for path in &paths {
            assert_eq!(path.center, g.orbit_center);
            assert!((path.length() - paths[0].length()).abs() < 1e-3);
        }
        // Distinct starting points
        assert!(paths[0].point_at(0.0).position.distance(paths[1].point_at(0.0).position) > 10.0);
        assert!(paths[0].point_at(0.0).position.distance(paths[2].point_at(0.0).position) > 10.0);
    }
}
