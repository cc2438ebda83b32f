//! Math types and glam re-exports.
//!
//! [`Vec2`] covers the vector algebra (add, sub, scale, component multiply,
//! `length`, `normalize_or_zero`, `dot`, `distance`). [`Transform2d`] is the
//! local position/rotation/scale of an entity, and [`Rect`] is the axis-aligned
//! box shared by physics and hit testing.

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Rotate `v` counter-clockwise by `degrees` (Y-up world space).
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// A 2D transform: position, rotation in degrees, and scale.
///
/// Only local values are stored. World values are composed on demand with
/// [`Transform2d::compose`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform2d {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Transform2d {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation: 0.0,
        scale: Vec2::ONE,
    };

    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Express `local` (a child of `self`) in the space `self` lives in.
    ///
    /// The child's position is scaled by this scale, rotated by this rotation,
    /// then offset by this position. Rotations add and scales multiply.
    pub fn compose(&self, local: &Transform2d) -> Transform2d {
        Transform2d {
            position: self.position + rotate_deg(local.position * self.scale, self.rotation),
            rotation: self.rotation + local.rotation,
            scale: self.scale * local.scale,
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

impl Default for Transform2d {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// An axis-aligned rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Inclusive point test.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Shortest push-out distance on each axis. Only meaningful when the
    /// rects overlap; differs from the overlap width when one contains the other.
    pub fn penetration(&self, other: &Rect) -> Vec2 {
        Vec2::new(
            (self.max.x - other.min.x).min(other.max.x - self.min.x),
            (self.max.y - other.min.y).min(other.max.y - self.min.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn vector_algebra() {
        let a = Vec2::new(3.0, 4.0);
        assert!((a.length() - 5.0).abs() < EPS);
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
        assert!((a.normalize_or_zero().length() - 1.0).abs() < EPS);
        assert_eq!(a * Vec2::new(2.0, 0.5), Vec2::new(6.0, 2.0));
        assert!((a.dot(Vec2::new(1.0, 1.0)) - 7.0).abs() < EPS);
        assert!((a.distance(Vec2::ZERO) - 5.0).abs() < EPS);
    }

    #[test]
    fn rotation_is_counter_clockwise() {
        let v = rotate_deg(Vec2::new(1.0, 0.0), 90.0);
        assert!(v.x.abs() < EPS);
        assert!((v.y - 1.0).abs() < EPS);
    }

    #[test]
    fn compose_scales_then_rotates_then_translates() {
        let parent = Transform2d::from_xy(10.0, 5.0)
            .with_rotation(90.0)
            .with_scale(Vec2::splat(2.0));
        let child = Transform2d::from_xy(1.0, 0.0).with_rotation(15.0);
        let world = parent.compose(&child);

        assert!((world.position.x - 10.0).abs() < EPS);
        assert!((world.position.y - 7.0).abs() < EPS);
        assert!((world.rotation - 105.0).abs() < EPS);
        assert_eq!(world.scale, Vec2::splat(2.0));
    }

    #[test]
    fn rect_overlap_is_strict() {
        let a = Rect::from_center_size(Vec2::ZERO, Vec2::splat(10.0));
        let touching = Rect::from_center_size(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        let inside = Rect::from_center_size(Vec2::new(8.0, 1.0), Vec2::splat(10.0));

        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        let pen = a.penetration(&inside);
        assert!((pen.x - 2.0).abs() < EPS);
        assert!((pen.y - 9.0).abs() < EPS);
        assert!(a.contains(Vec2::new(5.0, -5.0)));
    }

    #[test]
    fn penetration_of_contained_rect_is_push_out_distance() {
        let small = Rect::from_center_size(Vec2::ZERO, Vec2::new(2.0, 4.0));
        let wide = Rect::from_center_size(Vec2::ZERO, Vec2::new(20.0, 6.0));
        let pen = small.penetration(&wide);
        assert!((pen.x - 11.0).abs() < EPS);
        assert!((pen.y - 5.0).abs() < EPS);
        assert_eq!(wide.penetration(&small), pen);
    }
}
