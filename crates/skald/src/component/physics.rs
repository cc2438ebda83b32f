use serde::{Deserialize, Serialize};

use crate::math::{Rect, Transform2d, Vec2};

/// Linear dynamics for an entity. Rotation is never simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RigidBody {
    pub velocity: Vec2,
    /// Accumulated this frame, cleared after integration.
    pub acceleration: Vec2,
    pub mass: f32,
    pub gravity_scale: f32,
    pub is_kinematic: bool,
    pub drag: f32,
    pub bounciness: f32,
}

impl RigidBody {
    pub fn kinematic() -> Self {
        Self {
            is_kinematic: true,
            ..Default::default()
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_bounciness(mut self, bounciness: f32) -> Self {
        self.set_bounciness(bounciness);
        self
    }

    /// Mass must stay positive.
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = if mass > 0.0 { mass } else { f32::EPSILON };
    }

    pub fn set_bounciness(&mut self, bounciness: f32) {
        self.bounciness = bounciness.clamp(0.0, 1.0);
    }

    /// Queue a force for the next integration step. Kinematic bodies ignore it.
    pub fn apply_force(&mut self, force: Vec2) {
        if self.is_kinematic {
            return;
        }
        self.acceleration += force / self.mass.max(f32::EPSILON);
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            mass: 1.0,
            gravity_scale: 1.0,
            is_kinematic: false,
            drag: 0.01,
            bounciness: 0.5,
        }
    }
}

/// Axis-aligned box collider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Collider {
    pub width: f32,
    pub height: f32,
    pub offset: Vec2,
    /// Report overlaps without pushing bodies apart.
    pub is_trigger: bool,
}

impl Collider {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn trigger(width: f32, height: f32) -> Self {
        Self {
            is_trigger: true,
            ..Self::new(width, height)
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * 0.5
    }

    /// Bounding box centred on `transform.position + offset`, sized by the
    /// collider extents times the transform's scale.
    pub fn aabb(&self, transform: &Transform2d) -> Rect {
        Rect::from_center_size(
            transform.position + self.offset,
            self.half_extents() * 2.0 * transform.scale,
        )
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            offset: Vec2::ZERO,
            is_trigger: false,
        }
    }
}
