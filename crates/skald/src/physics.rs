//! # Physics
//!
//! A deliberately small AABB simulation over the scene's local transforms:
//!
//! 1. integrate every non-kinematic [`RigidBody`] (gravity, accumulated
//!    acceleration, frame-rate independent drag, semi-implicit Euler),
//! 2. test every pair of [`Collider`]s for strict AABB overlap,
//! 3. record a [`CollisionEvent`] per overlapping pair,
//! 4. push solid pairs apart along the axis of least penetration and reflect
//!    that velocity component scaled by each body's bounciness.
//!
//! There is no rotation, no continuous collision and no impulse solver.

use crate::component::{Collider, RigidBody};
use crate::entity::EntityId;
use crate::math::{Rect, Vec2};
use crate::scene::Scene;

/// An overlapping collider pair from the last [`PhysicsSystem::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// Either collider is a trigger; no physical response was applied.
    pub is_trigger: bool,
}

impl CollisionEvent {
    pub fn involves(&self, id: EntityId) -> bool {
        self.entity_a == id || self.entity_b == id
    }
}

#[derive(Debug, Clone)]
pub struct PhysicsSystem {
    gravity: Vec2,
    events: Vec<CollisionEvent>,
}

impl PhysicsSystem {
    /// Default gravity is 400 units/s² pointing down (Y-up world).
    pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -400.0);

    pub fn new() -> Self {
        Self {
            gravity: Self::DEFAULT_GRAVITY,
            events: Vec::new(),
        }
    }

    /// Set gravity (builder pattern).
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Collision events of the last update. Replaced, not accumulated.
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Step every entity of `scene` by `dt` seconds.
    pub fn update(&mut self, scene: &mut Scene, dt: f32) {
        self.events.clear();
        let order = scene.flatten();

        // ── Integration ──────────────────────────────────────────────
        for &id in &order {
            let Some(entity) = scene.get_mut(id) else {
                continue;
            };
            let Some(body) = entity.get_mut::<RigidBody>() else {
                continue;
            };
            if body.is_kinematic {
                continue;
            }
            body.velocity += self.gravity * body.gravity_scale * dt;
            body.velocity += body.acceleration * dt;
            body.velocity *= (1.0 - body.drag).powf(dt * 60.0);
            body.acceleration = Vec2::ZERO;
            let step = body.velocity * dt;
            entity.transform_mut().position += step;
        }

        // ── Detection & response ─────────────────────────────────────
        let collidables: Vec<EntityId> = order
            .into_iter()
            .filter(|id| scene.get(*id).is_some_and(|e| e.get::<Collider>().is_some()))
            .collect();

        for (i, &a) in collidables.iter().enumerate() {
            for &b in &collidables[i + 1..] {
                let (Some(shape_a), Some(shape_b)) = (Self::shape(scene, a), Self::shape(scene, b))
                else {
                    continue;
                };
                if !shape_a.aabb.overlaps(&shape_b.aabb) {
                    continue;
                }
                let is_trigger = shape_a.is_trigger || shape_b.is_trigger;
                self.events.push(CollisionEvent {
                    entity_a: a,
                    entity_b: b,
                    is_trigger,
                });
                if !is_trigger {
                    Self::resolve(scene, (a, &shape_a), (b, &shape_b));
                }
            }
        }
    }

    fn shape(scene: &Scene, id: EntityId) -> Option<Shape> {
        let entity = scene.get(id)?;
        let collider = entity.get::<Collider>()?;
        Some(Shape {
            aabb: collider.aabb(entity.transform()),
            position: entity.transform().position,
            is_trigger: collider.is_trigger,
        })
    }

    /// Split the penetration evenly: each non-kinematic body moves half of
    /// it, and reflects its velocity on that axis.
    fn resolve(scene: &mut Scene, (a, shape_a): (EntityId, &Shape), (b, shape_b): (EntityId, &Shape)) {
        let overlap = shape_a.aabb.penetration(&shape_b.aabb);
        let axis = if overlap.x < overlap.y { Vec2::X } else { Vec2::Y };
        let depth = overlap.dot(axis);
        let sign = if shape_a.position.dot(axis) < shape_b.position.dot(axis) { -1.0 } else { 1.0 };

        for (id, direction) in [(a, sign), (b, -sign)] {
            let Some(entity) = scene.get_mut(id) else {
                continue;
            };
            let Some(body) = entity.get_mut::<RigidBody>() else {
                continue;
            };
            if body.is_kinematic {
                continue;
            }
            let bounce = -body.bounciness;
            if axis == Vec2::X {
                body.velocity.x *= bounce;
            } else {
                body.velocity.y *= bounce;
            }
            entity.transform_mut().position += axis * (depth * 0.5 * direction);
        }
    }
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new()
    }
}

struct Shape {
    aabb: Rect,
    position: Vec2,
    is_trigger: bool,
}
