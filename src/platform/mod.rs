//! Platform abstraction layer
//!
//! The engine never draws. Each frame it pushes transforms and visibility to a
//! [`Host`], then reads back the positions the host actually rendered, so
//! collision tests see what is on screen for that same frame.

use glam::Vec2;

use crate::sim::{BodyId, Transform};

/// Rendering/UI layer seen from the engine
pub trait Host {
    /// Current bounds size; zero while not laid out
    fn viewport(&self) -> Vec2;

    /// Transform sink for one body
    fn present(&mut self, id: BodyId, transform: Transform);

    /// Interpolated on-screen position, if the body has been rendered
    fn rendered_position(&self, id: BodyId) -> Option<Vec2>;

    fn set_body_visible(&mut self, id: BodyId, visible: bool);

    fn set_reload_visible(&mut self, visible: bool);

    /// Whole-view offset used by the collision shake
    fn set_view_offset(&mut self, _offset: Vec2) {}
}

/// In-memory host: renders exactly what it is given
///
/// Used by the native runner and tests. `overrides` replace a body's rendered
/// position; `unavailable` makes it report none, as before first layout.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    pub viewport: Vec2,
    pub transforms: [Option<Transform>; 3],
    pub overrides: [Option<Vec2>; 3],
    pub unavailable: [bool; 3],
    pub body_visible: [bool; 3],
    pub reload_visible: bool,
    pub view_offset: Vec2,
    pub frames_presented: u64,
}

impl HeadlessHost {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    /// Force a body's rendered position
    pub fn set_override(&mut self, id: BodyId, position: Option<Vec2>) {
        self.overrides[id.index()] = position;
    }
}

impl Host for HeadlessHost {
    fn viewport(&self) -> Vec2 {
        self.viewport
    }

    fn present(&mut self, id: BodyId, transform: Transform) {
        self.transforms[id.index()] = Some(transform);
        if id == BodyId::Yellow {
            self.frames_presented += 1;
        }
    }

    fn rendered_position(&self, id: BodyId) -> Option<Vec2> {
        let i = id.index();
        if self.unavailable[i] {
            return None;
        }
        self.overrides[i].or(self.transforms[i].map(|t| t.position))
    }

    fn set_body_visible(&mut self, id: BodyId, visible: bool) {
        self.body_visible[id.index()] = visible;
    }

    fn set_reload_visible(&mut self, visible: bool) {
        self.reload_visible = visible;
    }

    fn set_view_offset(&mut self, offset: Vec2) {
        self.view_offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_mirrors_presented_position() {
        let mut host = HeadlessHost::new(Vec2::new(390.0, 844.0));
        assert_eq!(host.rendered_position(BodyId::Red), None);
        host.present(BodyId::Red, Transform::new(Vec2::new(1.0, 2.0), 0.5));
        assert_eq!(host.rendered_position(BodyId::Red), Some(Vec2::new(1.0, 2.0)));

        host.set_override(BodyId::Red, Some(Vec2::splat(9.0)));
        assert_eq!(host.rendered_position(BodyId::Red), Some(Vec2::splat(9.0)));

        host.unavailable[0] = true;
        assert_eq!(host.rendered_position(BodyId::Red), None);
    }
}
