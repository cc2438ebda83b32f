//! # Scene Graph
//!
//! A [`Scene`] is a named forest of entities stored in an arena keyed by
//! [`EntityId`]. Parents own their children (ordered id lists); a child only
//! keeps a non-owning link back to its parent.
//!
//! Structural edits (`reparent`, `reorder`, `despawn`) validate first and
//! then detach-before-attach, so a rejected edit leaves the scene untouched
//! and no entity is ever listed twice or becomes its own ancestor.
//!
//! One entity may be designated as the scene camera. It cannot be removed
//! or moved under another entity.

use std::collections::HashMap;

use thiserror::Error;

use crate::color::Color;
use crate::component::{
    Camera, ComponentData, ComponentId, ComponentKind, Script, ShapeKind, SpriteRenderer,
    Transform2d,
};
use crate::entity::{Entity, EntityId};

pub const CAMERA_ENTITY_NAME: &str = "Camera";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("entity {0} is not in the scene")]
    NotFound(EntityId),
    #[error("component {0} is not attached")]
    ComponentNotFound(ComponentId),
    #[error("the camera entity cannot be removed or reparented")]
    CameraLocked,
    #[error("the camera entity must stay at root level")]
    CameraRequiresRoot,
    #[error("an entity cannot be moved inside its own subtree")]
    WouldCreateCycle,
    #[error("an entity cannot be dropped onto itself")]
    SelfTarget,
    #[error("entity already has a {kind} component")]
    DuplicateComponent { kind: ComponentKind },
    #[error("the transform component cannot be removed")]
    TransformRequired,
}

/// Where [`Scene::reorder`] places the moved entity relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
    /// Last child of the target.
    Inside,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: String,
    roots: Vec<EntityId>,
    entities: HashMap<EntityId, Entity>,
    camera: Option<EntityId>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A scene holding only the designated camera entity.
    pub fn with_camera(name: impl Into<String>) -> Self {
        let mut scene = Self::new(name);
        scene.ensure_camera();
        scene
    }

    // ── Lookup ───────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    pub fn camera(&self) -> Option<EntityId> {
        self.camera
    }

    /// First entity named `name`, depth-first across the forest.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.flatten()
            .into_iter()
            .find(|id| self.entities.get(id).is_some_and(|e| e.name == name))
    }

    /// Every entity in depth-first pre-order: each root, then its subtree.
    pub fn flatten(&self) -> Vec<EntityId> {
        let mut out = Vec::with_capacity(self.entities.len());
        for &root in &self.roots {
            self.collect_subtree(root, &mut out);
        }
        out
    }

    /// `id` followed by all of its descendants, pre-order.
    pub fn subtree(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.collect_subtree(id, &mut out);
        out
    }

    fn collect_subtree(&self, id: EntityId, out: &mut Vec<EntityId>) {
        let Some(entity) = self.entities.get(&id) else {
            return;
        };
        out.push(id);
        for &child in &entity.children {
            self.collect_subtree(child, out);
        }
    }

    /// True when `id` lies strictly below `ancestor`.
    pub fn is_descendant(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut cursor = self.entities.get(&id).and_then(|e| e.parent);
        while let Some(parent) = cursor {
            if parent == ancestor {
                return true;
            }
            cursor = self.entities.get(&parent).and_then(|e| e.parent);
        }
        false
    }

    /// Compose local transforms from the root down to `id`.
    pub fn world_transform(&self, id: EntityId) -> Option<Transform2d> {
        let entity = self.entities.get(&id)?;
        let local = *entity.transform();
        match entity.parent {
            Some(parent) => Some(self.world_transform(parent)?.compose(&local)),
            None => Some(local),
        }
    }

    // ── Insertion ────────────────────────────────────────────────────

    /// Add a detached entity at the end of the root list. An entity whose id
    /// is already in the scene is ignored.
    pub fn add_root(&mut self, entity: Entity) -> EntityId {
        self.insert_detached(entity, None)
    }

    pub fn add_child(&mut self, parent: EntityId, entity: Entity) -> Result<EntityId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::NotFound(parent));
        }
        Ok(self.insert_detached(entity, Some(parent)))
    }

    fn insert_detached(&mut self, mut entity: Entity, parent: Option<EntityId>) -> EntityId {
        let id = entity.id();
        if self.contains(id) {
            log::warn!("entity {id} ({}) is already in the scene", entity.name);
            return id;
        }
        entity.children.clear();
        entity.parent = parent;
        match parent.and_then(|p| self.entities.get_mut(&p)) {
            Some(owner) => owner.children.push(id),
            None => {
                entity.parent = None;
                self.roots.push(id);
            }
        }
        if self.camera.is_none() && entity.has(ComponentKind::Camera) && parent.is_none() {
            self.camera = Some(id);
        }
        self.entities.insert(id, entity);
        id
    }

    /// Insert a pre-linked subtree (as produced by the serializer). The first
    /// entity is the subtree root; the others keep their own child lists.
    pub(crate) fn insert_subtree(
        &mut self,
        entities: Vec<Entity>,
        parent: Option<EntityId>,
    ) -> Option<EntityId> {
        let mut iter = entities.into_iter();
        let mut root = iter.next()?;
        let root_id = root.id();
        if self.contains(root_id) {
            log::warn!("subtree root {root_id} is already in the scene");
            return None;
        }
        let root_children = std::mem::take(&mut root.children);
        self.insert_detached(root, parent);
        if let Some(entity) = self.entities.get_mut(&root_id) {
            entity.children = root_children;
        }
        for entity in iter {
            self.entities.entry(entity.id()).or_insert(entity);
        }
        Some(root_id)
    }

    /// Editor-style "add entity": a transform plus a white 50×50 rectangle,
    /// under `parent` when it exists, otherwise at root.
    pub fn spawn(&mut self, name: Option<&str>, parent: Option<EntityId>) -> EntityId {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("Entity_{}", self.roots.len()));
        let entity = Entity::new(name).with(SpriteRenderer::new(
            Color::WHITE,
            ShapeKind::Rectangle,
            50.0,
            50.0,
        ));
        let parent = parent.filter(|p| self.contains(*p));
        self.insert_detached(entity, parent)
    }

    /// Designate the first entity carrying a Camera, or create one at root.
    pub fn ensure_camera(&mut self) -> EntityId {
        if let Some(id) = self.camera.filter(|id| self.contains(*id)) {
            return id;
        }
        let found = self.flatten().into_iter().find(|id| {
            self.entities
                .get(id)
                .is_some_and(|e| e.has(ComponentKind::Camera))
        });
        if let Some(id) = found {
            if self.entities.get(&id).is_some_and(|e| e.parent.is_some()) {
                self.detach(id);
                self.roots.push(id);
            }
            self.camera = Some(id);
            return id;
        }
        let camera = Entity::new(CAMERA_ENTITY_NAME).with(Camera::new(Color::MIDNIGHT));
        let id = self.add_root(camera);
        self.camera = Some(id);
        id
    }

    // ── Removal ──────────────────────────────────────────────────────

    /// Remove a root entity and its subtree.
    pub fn remove_root(&mut self, id: EntityId) -> Result<Vec<EntityId>, SceneError> {
        if !self.roots.contains(&id) {
            return Err(SceneError::NotFound(id));
        }
        self.despawn(id)
    }

    /// Remove an entity anywhere in the graph, cascading to its descendants.
    /// Returns the removed ids in pre-order.
    pub fn despawn(&mut self, id: EntityId) -> Result<Vec<EntityId>, SceneError> {
        if !self.contains(id) {
            return Err(SceneError::NotFound(id));
        }
        let removed = self.subtree(id);
        if self.camera.is_some_and(|camera| removed.contains(&camera)) {
            return Err(SceneError::CameraLocked);
        }
        self.detach(id);
        // Children first, then the node itself.
        for removed_id in removed.iter().rev() {
            if let Some(mut entity) = self.entities.remove(removed_id) {
                entity.clear_components();
                entity.children.clear();
            }
        }
        Ok(removed)
    }

    /// Drop every entity, including the camera.
    pub fn clear(&mut self) {
        self.roots.clear();
        self.entities.clear();
        self.camera = None;
    }

    // ── Restructuring ────────────────────────────────────────────────

    /// Move `id` to the end of `new_parent`'s children, or to the end of the
    /// root list when `new_parent` is `None`.
    pub fn reparent(&mut self, id: EntityId, new_parent: Option<EntityId>) -> Result<(), SceneError> {
        if !self.contains(id) {
            return Err(SceneError::NotFound(id));
        }
        if self.camera == Some(id) {
            return Err(SceneError::CameraLocked);
        }
        if let Some(parent) = new_parent {
            if !self.contains(parent) {
                return Err(SceneError::NotFound(parent));
            }
            if parent == id || self.is_descendant(id, parent) {
                return Err(SceneError::WouldCreateCycle);
            }
        }

        self.detach(id);
        self.attach(id, new_parent, None);
        Ok(())
    }

    /// Move `id` next to (or inside) `target`.
    pub fn reorder(
        &mut self,
        id: EntityId,
        target: EntityId,
        position: DropPosition,
    ) -> Result<(), SceneError> {
        if id == target {
            return Err(SceneError::SelfTarget);
        }
        if !self.contains(id) {
            return Err(SceneError::NotFound(id));
        }
        let target_parent = self
            .entities
            .get(&target)
            .ok_or(SceneError::NotFound(target))?
            .parent;
        if self.is_descendant(id, target) {
            return Err(SceneError::WouldCreateCycle);
        }
        if self.camera == Some(id) && (position == DropPosition::Inside || target_parent.is_some()) {
            return Err(SceneError::CameraRequiresRoot);
        }

        self.detach(id);
        match position {
            DropPosition::Inside => self.attach(id, Some(target), None),
            DropPosition::Before | DropPosition::After => {
                let siblings = match target_parent {
                    Some(parent) => self.entities.get(&parent).map(|e| &e.children),
                    None => Some(&self.roots),
                };
                let index = siblings
                    .and_then(|s| s.iter().position(|&s| s == target))
                    .map(|i| if position == DropPosition::After { i + 1 } else { i });
                self.attach(id, target_parent, index);
            }
        }
        Ok(())
    }

    fn detach(&mut self, id: EntityId) {
        let parent = self.entities.get_mut(&id).and_then(|e| e.parent.take());
        let siblings = match parent.and_then(|p| self.entities.get_mut(&p)) {
            Some(owner) => &mut owner.children,
            None => &mut self.roots,
        };
        siblings.retain(|&s| s != id);
    }

    fn attach(&mut self, id: EntityId, parent: Option<EntityId>, index: Option<usize>) {
        let parent = parent.filter(|p| self.entities.contains_key(p));
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.parent = parent;
        }
        let siblings = match parent.and_then(|p| self.entities.get_mut(&p)) {
            Some(owner) => &mut owner.children,
            None => &mut self.roots,
        };
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, id);
    }

    // ── Entity edits ─────────────────────────────────────────────────

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, SceneError> {
        self.entities.get_mut(&id).ok_or(SceneError::NotFound(id))
    }

    pub fn rename(&mut self, id: EntityId, name: impl Into<String>) -> Result<(), SceneError> {
        self.entity_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_tag(&mut self, id: EntityId, tag: impl Into<String>) -> Result<(), SceneError> {
        self.entity_mut(id)?.tag = tag.into();
        Ok(())
    }

    pub fn set_active(&mut self, id: EntityId, active: bool) -> Result<(), SceneError> {
        self.entity_mut(id)?.active = active;
        Ok(())
    }

    /// Attach a default component of `kind`. New scripts are named after the
    /// entity (`PlayerScript`, `PlayerScript_1`, ...) and filled from the
    /// default template.
    pub fn add_component(&mut self, id: EntityId, kind: ComponentKind) -> Result<ComponentId, SceneError> {
        let entity = self.entity_mut(id)?;
        if kind.is_singleton() && entity.has(kind) {
            return Err(SceneError::DuplicateComponent { kind });
        }
        let data = match kind {
            ComponentKind::Script => {
                let existing = entity.count(ComponentKind::Script);
                let suffix = if existing > 0 { format!("_{existing}") } else { String::new() };
                let name = format!("{}Script{suffix}", entity.name);
                ComponentData::Script(Script::templated(name, &entity.name))
            }
            other => ComponentData::default_for(other),
        };
        entity.add_component(data)
    }

    pub fn remove_component(&mut self, id: EntityId, component: ComponentId) -> Result<(), SceneError> {
        let is_camera = self.camera == Some(id);
        let entity = self.entity_mut(id)?;
        if is_camera
            && entity
                .component(component)
                .is_some_and(|c| c.kind() == ComponentKind::Camera)
        {
            return Err(SceneError::CameraLocked);
        }
        entity.remove_component(component).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    fn named(scene: &Scene, name: &str) -> EntityId {
        scene.find_by_name(name).unwrap()
    }

    fn sample() -> Scene {
        let mut scene = Scene::with_camera("Main Scene");
        let a = scene.add_root(Entity::new("A"));
        let b = scene.add_root(Entity::new("B"));
        scene.add_child(a, Entity::new("A1")).unwrap();
        let a2 = scene.add_child(a, Entity::new("A2")).unwrap();
        scene.add_child(a2, Entity::new("A2x")).unwrap();
        scene.add_child(b, Entity::new("B1")).unwrap();
        scene
    }

    fn names(scene: &Scene, ids: &[EntityId]) -> Vec<String> {
        ids.iter().map(|id| scene.get(*id).unwrap().name.clone()).collect()
    }

    fn assert_well_formed(scene: &Scene) {
        let flat = scene.flatten();
        let mut seen = std::collections::HashSet::new();
        for id in &flat {
            assert!(seen.insert(*id), "entity listed twice");
            assert!(!scene.is_descendant(*id, *id), "entity is its own ancestor");
            let entity = scene.get(*id).unwrap();
            match entity.parent() {
                Some(p) => assert!(scene.get(p).unwrap().children().contains(id)),
                None => assert!(scene.roots().contains(id)),
            }
        }
        assert_eq!(flat.len(), scene.len());
    }

    #[test]
    fn flatten_is_depth_first_pre_order() {
        let scene = sample();
        assert_eq!(
            names(&scene, &scene.flatten()),
            ["Camera", "A", "A1", "A2", "A2x", "B", "B1"]
        );
    }

    #[test]
    fn find_by_name_returns_first_depth_first_match() {
        let mut scene = sample();
        let a1 = named(&scene, "A1");
        scene.add_root(Entity::new("A1"));
        assert_eq!(scene.find_by_name("A1"), Some(a1));
        assert_eq!(scene.find_by_name("nope"), None);
    }

    #[test]
    fn reparent_moves_subtree() {
        let mut scene = sample();
        let a2 = named(&scene, "A2");
        let b = named(&scene, "B");
        scene.reparent(a2, Some(b)).unwrap();
        assert_eq!(names(&scene, scene.get(b).unwrap().children()), ["B1", "A2"]);
        assert_eq!(scene.get(a2).unwrap().parent(), Some(b));

        scene.reparent(a2, None).unwrap();
        assert_eq!(scene.roots().last(), Some(&a2));
        assert_well_formed(&scene);
    }

    #[test]
    fn reparent_rejects_cycles_and_camera() {
        let mut scene = sample();
        let a = named(&scene, "A");
        let a2x = named(&scene, "A2x");
        assert_eq!(scene.reparent(a, Some(a2x)), Err(SceneError::WouldCreateCycle));
        assert_eq!(scene.reparent(a, Some(a)), Err(SceneError::WouldCreateCycle));

        let camera = scene.camera().unwrap();
        assert_eq!(scene.reparent(camera, Some(a)), Err(SceneError::CameraLocked));
        assert_well_formed(&scene);
    }

    #[test]
    fn reorder_before_after_inside() {
        let mut scene = sample();
        let a = named(&scene, "A");
        let b = named(&scene, "B");
        let b1 = named(&scene, "B1");
        let a1 = named(&scene, "A1");

        scene.reorder(b, a, DropPosition::Before).unwrap();
        assert_eq!(names(&scene, scene.roots()), ["Camera", "B", "A"]);

        scene.reorder(b1, a1, DropPosition::After).unwrap();
        assert_eq!(names(&scene, scene.get(a).unwrap().children()), ["A1", "B1", "A2"]);
        assert_eq!(scene.get(b1).unwrap().parent(), Some(a));

        scene.reorder(a1, b, DropPosition::Inside).unwrap();
        assert_eq!(scene.get(a1).unwrap().parent(), Some(b));
        assert_well_formed(&scene);
    }

    #[test]
    fn reorder_rejects_targets_inside_own_subtree() {
        let mut scene = sample();
        let a = named(&scene, "A");
        let a2x = named(&scene, "A2x");
        for position in [DropPosition::Before, DropPosition::After, DropPosition::Inside] {
            assert_eq!(scene.reorder(a, a2x, position), Err(SceneError::WouldCreateCycle));
        }
        assert_eq!(scene.reorder(a, a, DropPosition::Inside), Err(SceneError::SelfTarget));
        assert_well_formed(&scene);
    }

    #[test]
    fn camera_reorders_only_among_roots() {
        let mut scene = sample();
        let camera = scene.camera().unwrap();
        let b = named(&scene, "B");
        let a1 = named(&scene, "A1");

        scene.reorder(camera, b, DropPosition::After).unwrap();
        assert_eq!(scene.roots().last(), Some(&camera));
        assert_eq!(
            scene.reorder(camera, b, DropPosition::Inside),
            Err(SceneError::CameraRequiresRoot)
        );
        assert_eq!(
            scene.reorder(camera, a1, DropPosition::Before),
            Err(SceneError::CameraRequiresRoot)
        );
    }

    #[test]
    fn random_edits_preserve_hierarchy() {
        let mut scene = sample();
        for i in 0..6 {
            scene.spawn(Some(&format!("extra{i}")), None);
        }
        let ids = scene.flatten();
        let positions = [DropPosition::Before, DropPosition::After, DropPosition::Inside];
        let mut seed: u64 = 0x2545_f491;
        let mut next = |n: usize| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) as usize) % n
        };
        for _ in 0..500 {
            let id = ids[next(ids.len())];
            let target = ids[next(ids.len())];
            if next(4) == 0 {
                let parent = if next(3) == 0 { None } else { Some(target) };
                let _ = scene.reparent(id, parent);
            } else {
                let _ = scene.reorder(id, target, positions[next(3)]);
            }
            assert_well_formed(&scene);
        }
        assert_eq!(scene.len(), ids.len());
    }

    #[test]
    fn despawn_cascades_and_protects_camera() {
        let mut scene = sample();
        let a = named(&scene, "A");
        let removed = scene.despawn(a).unwrap();
        assert_eq!(removed.len(), 4);
        assert!(scene.find_by_name("A2x").is_none());
        assert_eq!(names(&scene, scene.roots()), ["Camera", "B"]);

        let camera = scene.camera().unwrap();
        assert_eq!(scene.remove_root(camera), Err(SceneError::CameraLocked));
        let b1 = named(&scene, "B1");
        assert_eq!(scene.remove_root(b1), Err(SceneError::NotFound(b1)));
        assert_well_formed(&scene);
    }

    #[test]
    fn world_transform_composes_parents() {
        let mut scene = Scene::new("t");
        let root = scene.add_root(Entity::new("R").with_transform(
            Transform2d::from_xy(10.0, 20.0)
                .with_rotation(90.0)
                .with_scale(Vec2::splat(2.0)),
        ));
        let child = scene
            .add_child(root, Entity::new("C").with_transform(Transform2d::from_xy(1.0, 0.0)))
            .unwrap();

        let world = scene.world_transform(child).unwrap();
        assert!((world.position.x - 10.0).abs() < 1e-4);
        assert!((world.position.y - 22.0).abs() < 1e-4);
        assert!((world.rotation - 90.0).abs() < 1e-4);
        assert_eq!(world.scale, Vec2::splat(2.0));
    }

    #[test]
    fn add_component_names_scripts_and_rejects_singletons() {
        let mut scene = Scene::new("s");
        let player = scene.add_root(Entity::new("Player"));
        scene.add_component(player, ComponentKind::Script).unwrap();
        scene.add_component(player, ComponentKind::Script).unwrap();
        let names: Vec<_> = scene
            .get(player)
            .unwrap()
            .scripts()
            .map(|(_, s)| s.name.clone())
            .collect();
        assert_eq!(names, ["PlayerScript", "PlayerScript_1"]);

        scene.add_component(player, ComponentKind::Collider).unwrap();
        assert_eq!(
            scene.add_component(player, ComponentKind::Collider),
            Err(SceneError::DuplicateComponent {
                kind: ComponentKind::Collider
            })
        );
    }

    #[test]
    fn camera_component_is_protected() {
        let mut scene = Scene::with_camera("s");
        let camera = scene.camera().unwrap();
        let component = scene.get(camera).unwrap().components()[0].id;
        assert_eq!(
            scene.remove_component(camera, component),
            Err(SceneError::CameraLocked)
        );
    }

    #[test]
    fn re_adding_an_entity_keeps_one_listing() {
        let mut scene = Scene::new("test");
        let entity = Entity::new("Twin");
        let id = scene.add_root(entity.clone());
        assert_eq!(scene.add_root(entity.clone()), id);
        let other = scene.add_root(Entity::new("Other"));
        assert_eq!(scene.add_child(other, entity).unwrap(), id);

        assert_eq!(scene.len(), 2);
        assert_eq!(scene.flatten().len(), 2);
        assert_eq!(scene.roots(), [id, other]);
        assert!(scene.get(other).unwrap().children().is_empty());
        assert_eq!(scene.get(id).unwrap().parent(), None);
        assert_well_formed(&scene);
    }

    #[test]
    fn spawn_defaults() {
        let mut scene = Scene::with_camera("s");
        let id = scene.spawn(None, None);
        let entity = scene.get(id).unwrap();
        assert_eq!(entity.name, "Entity_1");
        let sprite = entity.get::<SpriteRenderer>().unwrap();
        assert_eq!((sprite.width, sprite.height), (50.0, 50.0));
    }
}
