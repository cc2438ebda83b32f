//! # Scene Serialization
//!
//! Round-trips a [`Scene`] through a JSON document:
//!
//! ```json
//! { "name": "Main Scene",
//!   "entities": [ { "id": "...", "name": "Ball", "active": true,
//!                   "components": [ { "kind": "Transform", ... } ],
//!                   "children": [ ... ] } ] }
//! ```
//!
//! Component records are dispatched on their `kind` through a
//! [`ComponentRegistry`]. An unknown kind is skipped with a warning; a
//! structurally malformed document fails the whole load.
//!
//! A single entity subtree can be captured on its own ([`SceneSerializer::serialize_entity`])
//! and re-instantiated later as a prefab with fresh ids.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::component::{
    Camera, Collider, ComponentData, ComponentKind, ComponentType, RigidBody, Script,
    SpriteRenderer, Transform2d,
};
use crate::entity::{Entity, EntityId};
use crate::math::Vec2;
use crate::scene::Scene;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("malformed scene document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scene file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("component record has no `kind` tag")]
    MissingKind,
    #[error("malformed {kind} component: {source}")]
    Component {
        kind: ComponentKind,
        source: serde_json::Error,
    },
    #[error("entity id {0} appears more than once")]
    DuplicateId(EntityId),
    #[error("prefab produced no entities")]
    EmptyPrefab,
}

// ── Document format ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub name: String,
    pub entities: Vec<EntityDocument>,
}

/// One entity and, recursively, its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    pub id: EntityId,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    pub components: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntityDocument>,
}

fn default_active() -> bool {
    true
}

impl EntityDocument {
    /// Set the position recorded in this document's Transform record.
    fn set_position(&mut self, position: Vec2) {
        for record in &mut self.components {
            if record.get("kind").and_then(|k| k.as_str()) == Some(ComponentKind::Transform.name()) {
                if let Ok(value) = serde_json::to_value(position) {
                    record["position"] = value;
                }
                return;
            }
        }
        let transform = ComponentData::Transform(Transform2d {
            position,
            ..Transform2d::IDENTITY
        });
        if let Ok(record) = serde_json::to_value(transform) {
            self.components.insert(0, record);
        }
    }
}

// ── ComponentRegistry ────────────────────────────────────────────────────

type DeserializeFn = fn(serde_json::Value) -> Result<ComponentData, serde_json::Error>;

/// Maps `kind` tags to component constructors.
pub struct ComponentRegistry {
    by_name: HashMap<&'static str, (ComponentKind, DeserializeFn)>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }

    /// Registry with every built-in component kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register::<Transform2d>();
        registry.register::<SpriteRenderer>();
        registry.register::<RigidBody>();
        registry.register::<Collider>();
        registry.register::<Script>();
        registry.register::<Camera>();
        registry
    }

    pub fn register<T>(&mut self)
    where
        T: ComponentType + DeserializeOwned,
    {
        let deserialize: DeserializeFn = |json| serde_json::from_value::<T>(json).map(Into::into);
        self.by_name.insert(T::KIND.name(), (T::KIND, deserialize));
    }

    pub fn kind_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Decode one component record. `Ok(None)` means the kind is not registered.
    pub fn deserialize(&self, record: &serde_json::Value) -> Result<Option<ComponentData>, SerializeError> {
        let name = record
            .get("kind")
            .and_then(|k| k.as_str())
            .ok_or(SerializeError::MissingKind)?;
        let Some(&(kind, deserialize)) = self.by_name.get(name) else {
            return Ok(None);
        };
        deserialize(record.clone())
            .map(Some)
            .map_err(|source| SerializeError::Component { kind, source })
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ── SceneSerializer ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct SceneSerializer {
    registry: ComponentRegistry,
}

impl SceneSerializer {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn serialize(&self, scene: &Scene) -> SceneDocument {
        SceneDocument {
            name: scene.name.clone(),
            entities: scene
                .roots()
                .iter()
                .filter_map(|&id| self.serialize_entity(scene, id))
                .collect(),
        }
    }

    /// Capture `id` and its descendants, independent of the owning scene.
    pub fn serialize_entity(&self, scene: &Scene, id: EntityId) -> Option<EntityDocument> {
        let entity = scene.get(id)?;
        let components = entity
            .component_data()
            .filter_map(|data| match serde_json::to_value(&data) {
                Ok(value) => Some(value),
                Err(err) => {
                    log::warn!("{}: failed to serialize {}: {err}", entity.name, data.kind());
                    None
                }
            })
            .collect();
        Some(EntityDocument {
            id,
            name: entity.name.clone(),
            active: entity.active,
            tag: entity.tag.clone(),
            components,
            children: entity
                .children()
                .iter()
                .filter_map(|&child| self.serialize_entity(scene, child))
                .collect(),
        })
    }

    pub fn deserialize(&self, document: &SceneDocument) -> Result<Scene, SerializeError> {
        let mut scene = Scene::new(document.name.clone());
        let mut seen = HashSet::new();
        for root in &document.entities {
            let mut entities = Vec::new();
            self.build_entity(root, false, &mut seen, &mut entities)?;
            scene.insert_subtree(entities, None);
        }
        Ok(scene)
    }

    /// Rebuild a detached subtree. The first entity is the subtree root.
    pub fn deserialize_entity(&self, document: &EntityDocument) -> Result<Vec<Entity>, SerializeError> {
        let mut entities = Vec::new();
        self.build_entity(document, false, &mut HashSet::new(), &mut entities)?;
        Ok(entities)
    }

    /// Instantiate a captured subtree into `scene` at root level with fresh
    /// entity ids, its root placed at `position`.
    pub fn instantiate_prefab(
        &self,
        scene: &mut Scene,
        prefab: &EntityDocument,
        position: Vec2,
    ) -> Result<EntityId, SerializeError> {
        let entities = self.prefab_entities(prefab, position)?;
        scene
            .insert_subtree(entities, None)
            .ok_or(SerializeError::EmptyPrefab)
    }

    /// Build a detached, freshly identified copy of `prefab` without adding
    /// it to any scene. The first entity is the subtree root.
    pub fn prefab_entities(
        &self,
        prefab: &EntityDocument,
        position: Vec2,
    ) -> Result<Vec<Entity>, SerializeError> {
        let mut document = prefab.clone();
        document.set_position(position);
        let mut entities = Vec::new();
        self.build_entity(&document, true, &mut HashSet::new(), &mut entities)?;
        Ok(entities)
    }

    fn build_entity(
        &self,
        document: &EntityDocument,
        fresh_ids: bool,
        seen: &mut HashSet<EntityId>,
        out: &mut Vec<Entity>,
    ) -> Result<EntityId, SerializeError> {
        let id = if fresh_ids { EntityId::new() } else { document.id };
        if !seen.insert(id) {
            return Err(SerializeError::DuplicateId(id));
        }

        let mut entity = Entity::with_id(id, document.name.clone());
        entity.active = document.active;
        entity.tag = document.tag.clone();
        for record in &document.components {
            match self.registry.deserialize(record)? {
                Some(data) => {
                    if let Err(err) = entity.add_component(data) {
                        log::warn!("{}: skipping component: {err}", document.name);
                    }
                }
                None => log::warn!(
                    "{}: skipping unknown component kind {}",
                    document.name,
                    record["kind"]
                ),
            }
        }

        let index = out.len();
        out.push(entity);
        let mut children = Vec::with_capacity(document.children.len());
        for child in &document.children {
            let child_index = out.len();
            let child_id = self.build_entity(child, fresh_ids, seen, out)?;
            out[child_index].parent = Some(id);
            children.push(child_id);
        }
        out[index].children = children;
        Ok(id)
    }

    // ── Text & files ─────────────────────────────────────────────────

    pub fn to_json(&self, scene: &Scene) -> Result<String, SerializeError> {
        Ok(serde_json::to_string_pretty(&self.serialize(scene))?)
    }

    pub fn from_json(&self, json: &str) -> Result<Scene, SerializeError> {
        let document: SceneDocument = serde_json::from_str(json)?;
        self.deserialize(&document)
    }

    pub fn entity_to_json(&self, scene: &Scene, id: EntityId) -> Option<String> {
        let document = self.serialize_entity(scene, id)?;
        serde_json::to_string_pretty(&document).ok()
    }

    pub fn save_to_file(&self, scene: &Scene, path: impl AsRef<Path>) -> Result<(), SerializeError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json(scene)?)?;
        log::info!("saved scene `{}` to {}", scene.name, path.display());
        Ok(())
    }

    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<Scene, SerializeError> {
        let json = std::fs::read_to_string(path)?;
        self.from_json(&json)
    }
}

/// Serialize with the built-in registry.
pub fn to_json(scene: &Scene) -> Result<String, SerializeError> {
    SceneSerializer::default().to_json(scene)
}

/// Deserialize with the built-in registry.
pub fn from_json(json: &str) -> Result<Scene, SerializeError> {
    SceneSerializer::default().from_json(json)
}

// ── Prefabs ──────────────────────────────────────────────────────────────

/// Named entity captures that scripts can spawn from.
#[derive(Debug, Clone, Default)]
pub struct PrefabLibrary {
    prefabs: BTreeMap<String, EntityDocument>,
}

impl PrefabLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, prefab: EntityDocument) {
        self.prefabs.insert(name.into(), prefab);
    }

    pub fn insert_json(&mut self, name: impl Into<String>, json: &str) -> Result<(), SerializeError> {
        let prefab: EntityDocument = serde_json::from_str(json)?;
        self.insert(name, prefab);
        Ok(())
    }

    /// Capture the subtree at `id` under `name`. Returns false if `id` is missing.
    pub fn capture(&mut self, scene: &Scene, id: EntityId, name: impl Into<String>) -> bool {
        match SceneSerializer::default().serialize_entity(scene, id) {
            Some(prefab) => {
                self.insert(name, prefab);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&EntityDocument> {
        self.prefabs.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<EntityDocument> {
        self.prefabs.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.prefabs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::component::ShapeKind;

    fn populated() -> Scene {
        let mut scene = Scene::with_camera("Level 1");
        let camera = scene.camera().unwrap();
        {
            let cam = scene.get_mut(camera).unwrap();
            cam.transform_mut().position = Vec2::new(-12.5, 3.25);
            let settings = cam.get_mut::<Camera>().unwrap();
            settings.zoom = 1.75;
            settings.background_image = Some("sky.png".into());
        }

        let player = Entity::new("Player")
            .with_tag("hero")
            .with_transform(
                Transform2d::from_xy(0.1, -7.3)
                    .with_rotation(33.3)
                    .with_scale(Vec2::new(1.5, 0.25)),
            )
            .with(
                SpriteRenderer::new(Color::rgba(1, 2, 3, 4), ShapeKind::Triangle, 12.5, 7.0)
                    .with_layer(-3)
                    .with_stroke(Color::BLACK),
            )
            .with(RigidBody {
                velocity: Vec2::new(3.3, -1.1),
                acceleration: Vec2::new(0.7, 0.0),
                mass: 2.5,
                gravity_scale: 0.3,
                is_kinematic: false,
                drag: 0.123,
                bounciness: 0.77,
            })
            .with(Collider::trigger(10.0, 4.0).with_offset(Vec2::new(0.5, -0.5)))
            .with(Script::new("Move", "fn onUpdate(dt) { transform.x += dt; }"))
            .with(Script::new("Jump", "fn onStart() { console.log(\"hi\"); }"));
        let player = scene.add_root(player);
        let mut hat = Entity::new("Hat").with(SpriteRenderer::default().with_image("hat.png"));
        hat.active = false;
        let hat = scene.add_child(player, hat).unwrap();
        scene.add_child(hat, Entity::new("Feather")).unwrap();
        scene
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let serializer = SceneSerializer::default();
        let scene = populated();
        let json = serializer.to_json(&scene).unwrap();
        let loaded = serializer.from_json(&json).unwrap();

        assert_eq!(loaded.name, "Level 1");
        assert_eq!(loaded.len(), scene.len());
        assert_eq!(loaded.camera(), scene.camera());
        for id in scene.flatten() {
            let a = scene.get(id).unwrap();
            let b = loaded.get(id).unwrap();
            assert_eq!(a.name, b.name);
            assert_eq!(a.tag, b.tag);
            assert_eq!(a.active, b.active);
            assert_eq!(a.parent(), b.parent());
            assert_eq!(a.children(), b.children());
            let da: Vec<_> = a.component_data().collect();
            let db: Vec<_> = b.component_data().collect();
            assert_eq!(da, db);
        }
        assert_eq!(serializer.to_json(&loaded).unwrap(), json);
    }

    #[test]
    fn unknown_kind_skips_only_that_component() {
        let id = EntityId::new();
        let json = format!(
            r#"{{ "name": "s", "entities": [ {{
                "id": "{id}", "name": "Thing", "active": true,
                "components": [
                    {{ "kind": "Transform", "position": [4.0, 5.0], "rotation": 0.0, "scale": [1.0, 1.0] }},
                    {{ "kind": "ParticleEmitter", "rate": 10 }},
                    {{ "kind": "Collider", "width": 8.0 }}
                ] }} ] }}"#
        );
        let scene = from_json(&json).unwrap();
        let entity = scene.get(id).unwrap();
        assert_eq!(entity.transform().position, Vec2::new(4.0, 5.0));
        let collider = entity.get::<Collider>().unwrap();
        assert_eq!(collider.width, 8.0);
        assert_eq!(collider.height, 50.0);
        assert_eq!(entity.components().len(), 1);
    }

    #[test]
    fn malformed_documents_fail() {
        assert!(matches!(from_json("{ not json"), Err(SerializeError::Json(_))));
        assert!(matches!(
            from_json(r#"{ "name": "s" }"#),
            Err(SerializeError::Json(_))
        ));

        let id = EntityId::new();
        let bad_field = format!(
            r#"{{ "name": "s", "entities": [ {{ "id": "{id}", "name": "x",
                "components": [ {{ "kind": "RigidBody", "mass": "heavy" }} ] }} ] }}"#
        );
        assert!(matches!(
            from_json(&bad_field),
            Err(SerializeError::Component { kind: ComponentKind::RigidBody, .. })
        ));

        let untagged = format!(
            r#"{{ "name": "s", "entities": [ {{ "id": "{id}", "name": "x",
                "components": [ {{ "width": 3.0 }} ] }} ] }}"#
        );
        assert!(matches!(from_json(&untagged), Err(SerializeError::MissingKind)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let id = EntityId::new();
        let json = format!(
            r#"{{ "name": "s", "entities": [
                {{ "id": "{id}", "name": "a", "components": [] }},
                {{ "id": "{id}", "name": "b", "components": [] }} ] }}"#
        );
        assert!(matches!(from_json(&json), Err(SerializeError::DuplicateId(_))));
    }

    #[test]
    fn prefab_instances_get_fresh_ids() {
        let serializer = SceneSerializer::default();
        let mut scene = populated();
        let player = scene.find_by_name("Player").unwrap();

        let mut library = PrefabLibrary::new();
        assert!(library.capture(&scene, player, "player"));
        let prefab = library.get("player").unwrap().clone();

        let first = serializer
            .instantiate_prefab(&mut scene, &prefab, Vec2::new(100.0, 50.0))
            .unwrap();
        let second = serializer
            .instantiate_prefab(&mut scene, &prefab, Vec2::new(-5.0, 0.0))
            .unwrap();

        assert_ne!(first, player);
        assert_ne!(first, second);
        assert_eq!(scene.len(), 4 + 2 * 3);
        assert_eq!(scene.get(first).unwrap().transform().position, Vec2::new(100.0, 50.0));
        assert_eq!(scene.get(second).unwrap().transform().position, Vec2::new(-5.0, 0.0));
        assert_eq!(scene.subtree(first).len(), 3);
        assert!(scene.roots().contains(&first));
        let original_rotation = scene.get(player).unwrap().transform().rotation;
        assert_eq!(scene.get(first).unwrap().transform().rotation, original_rotation);
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.json");
        let serializer = SceneSerializer::default();
        let scene = populated();

        serializer.save_to_file(&scene, &path).unwrap();
        let loaded = serializer.load_from_file(&path).unwrap();
        assert_eq!(serializer.serialize(&loaded), serializer.serialize(&scene));

        assert!(matches!(
            serializer.load_from_file(dir.path().join("missing.json")),
            Err(SerializeError::Io(_))
        ));
    }
}
