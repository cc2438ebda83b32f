//! # Entities
//!
//! An [`Entity`] is a node of the scene graph: identity, display name, a free
//! form tag, an active flag, an ordered set of components and links to its
//! parent and children. Links are [`EntityId`]s into the owning
//! [`Scene`](crate::scene::Scene); the parent link is non-owning.
//!
//! Every entity has exactly one Transform, created with it and never removed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::component::{
    Component, ComponentData, ComponentId, ComponentKind, ComponentType, Script, Transform2d,
};
use crate::scene::SceneError;

/// Unique identity of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    pub name: String,
    pub tag: String,
    pub active: bool,
    transform_id: ComponentId,
    transform: Transform2d,
    components: Vec<Component>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) parent: Option<EntityId>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(EntityId::new(), name)
    }

    pub fn with_id(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tag: String::new(),
            active: true,
            transform_id: ComponentId::next(),
            transform: Transform2d::default(),
            components: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    // ── Builder ──────────────────────────────────────────────────────

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_transform(mut self, transform: Transform2d) -> Self {
        self.transform = transform;
        self
    }

    /// Attach a component, ignoring a rejected duplicate.
    pub fn with(mut self, data: impl Into<ComponentData>) -> Self {
        if let Err(err) = self.add_component(data.into()) {
            log::debug!("{}: {err}", self.name);
        }
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub fn transform(&self) -> &Transform2d {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform2d {
        &mut self.transform
    }

    pub fn transform_id(&self) -> ComponentId {
        self.transform_id
    }

    /// First component of type `T`.
    pub fn get<T: EntityComponent>(&self) -> Option<&T> {
        T::get(self)
    }

    pub fn get_mut<T: EntityComponent>(&mut self) -> Option<&mut T> {
        T::get_mut(self)
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        kind == ComponentKind::Transform || self.components.iter().any(|c| c.kind() == kind)
    }

    /// Non-transform components in insertion order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// All component data, Transform first. This is the serialized order.
    pub fn component_data(&self) -> impl Iterator<Item = ComponentData> + '_ {
        std::iter::once(ComponentData::Transform(self.transform))
            .chain(self.components.iter().map(|c| c.data.clone()))
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id == id)
    }

    /// Scripts in attachment order.
    pub fn scripts(&self) -> impl Iterator<Item = (ComponentId, &Script)> {
        self.components
            .iter()
            .filter_map(|c| Script::from_data(&c.data).map(|s| (c.id, s)))
    }

    pub fn count(&self, kind: ComponentKind) -> usize {
        if kind == ComponentKind::Transform {
            return 1;
        }
        self.components.iter().filter(|c| c.kind() == kind).count()
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Attach a component. A Transform replaces the existing transform state
    /// (keeping its id); any other singleton kind already present is rejected.
    pub fn add_component(&mut self, data: ComponentData) -> Result<ComponentId, SceneError> {
        let kind = data.kind();
        if let ComponentData::Transform(transform) = data {
            self.transform = transform;
            return Ok(self.transform_id);
        }
        if kind.is_singleton() && self.has(kind) {
            return Err(SceneError::DuplicateComponent { kind });
        }
        let component = Component::new(data);
        let id = component.id;
        self.components.push(component);
        Ok(id)
    }

    pub fn remove_component(&mut self, id: ComponentId) -> Result<Component, SceneError> {
        if id == self.transform_id {
            return Err(SceneError::TransformRequired);
        }
        let index = self
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or(SceneError::ComponentNotFound(id))?;
        Ok(self.components.remove(index))
    }

    /// Drop every component except the transform.
    pub(crate) fn clear_components(&mut self) {
        self.components.clear();
    }

    /// Give the entity a fresh identity (and fresh component ids).
    pub(crate) fn refresh_ids(&mut self, id: EntityId) {
        self.id = id;
        self.transform_id = ComponentId::next();
        for component in &mut self.components {
            component.id = ComponentId::next();
        }
    }
}

/// Typed lookup on an entity. Transform is stored apart from the other kinds.
pub trait EntityComponent: ComponentType {
    fn get(entity: &Entity) -> Option<&Self> {
        entity.components.iter().find_map(|c| Self::from_data(&c.data))
    }

    fn get_mut(entity: &mut Entity) -> Option<&mut Self> {
        entity
            .components
            .iter_mut()
            .find_map(|c| Self::from_data_mut(&mut c.data))
    }
}

impl EntityComponent for Transform2d {
    fn get(entity: &Entity) -> Option<&Self> {
        Some(&entity.transform)
    }

    fn get_mut(entity: &mut Entity) -> Option<&mut Self> {
        Some(&mut entity.transform)
    }
}

impl EntityComponent for crate::component::SpriteRenderer {}
impl EntityComponent for crate::component::RigidBody {}
impl EntityComponent for crate::component::Collider {}
impl EntityComponent for crate::component::Script {}
impl EntityComponent for crate::component::Camera {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Camera, Collider, RigidBody};
    use crate::math::Vec2;

    #[test]
    fn new_entity_has_transform() {
        let entity = Entity::new("Ball");
        assert!(entity.has(ComponentKind::Transform));
        assert_eq!(entity.get::<Transform2d>(), Some(&Transform2d::IDENTITY));
        assert!(entity.active);
        assert!(entity.tag.is_empty());
    }

    #[test]
    fn transform_cannot_be_removed() {
        let mut entity = Entity::new("Ball");
        let id = entity.transform_id();
        assert_eq!(entity.remove_component(id), Err(SceneError::TransformRequired));
    }

    #[test]
    fn singletons_reject_duplicates_but_scripts_repeat() {
        let mut entity = Entity::new("Player").with(RigidBody::default());
        assert_eq!(
            entity.add_component(RigidBody::default().into()),
            Err(SceneError::DuplicateComponent {
                kind: ComponentKind::RigidBody
            })
        );

        entity.add_component(Script::new("A", "").into()).unwrap();
        entity.add_component(Script::new("B", "").into()).unwrap();
        let names: Vec<_> = entity.scripts().map(|(_, s)| s.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn adding_transform_replaces_state() {
        let mut entity = Entity::new("Box");
        let before = entity.transform_id();
        let id = entity
            .add_component(Transform2d::from_xy(3.0, 4.0).into())
            .unwrap();
        assert_eq!(id, before);
        assert_eq!(entity.transform().position, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn typed_access_and_removal() {
        let mut entity = Entity::new("Wall")
            .with(Collider::new(10.0, 10.0))
            .with(Camera::default());
        entity.get_mut::<Collider>().unwrap().is_trigger = true;
        assert!(entity.get::<Collider>().unwrap().is_trigger);

        let camera_id = entity.components()[1].id;
        let removed = entity.remove_component(camera_id).unwrap();
        assert_eq!(removed.kind(), ComponentKind::Camera);
        assert!(!entity.has(ComponentKind::Camera));
    }

    #[test]
    fn component_data_lists_transform_first() {
        let entity = Entity::new("Ball").with(RigidBody::default());
        let kinds: Vec<_> = entity.component_data().map(|d| d.kind()).collect();
        assert_eq!(kinds, [ComponentKind::Transform, ComponentKind::RigidBody]);
    }
}
