//! # Components
//!
//! The closed set of component kinds an [`Entity`](crate::entity::Entity)
//! can carry. Every attached component gets a process-unique
//! [`ComponentId`]; its state lives in [`ComponentData`], a tagged union
//! that doubles as the serialized record (`{"kind": "...", ...}`).
//!
//! Typed access goes through [`ComponentType`]:
//!
//! ```ignore
//! let body = entity.get_mut::<RigidBody>()?;
//! body.velocity.y = 10.0;
//! ```

mod camera;
mod physics;
mod script;
mod sprite;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use camera::Camera;
pub use physics::{Collider, RigidBody};
pub use script::{Script, default_script_template};
pub use sprite::{ShapeKind, SpriteRenderer};

pub use crate::math::Transform2d;

// ── Identity ─────────────────────────────────────────────────────────────

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one attached component instance.
///
/// Unique for the lifetime of the process, so it is also unique within any
/// scene. Not persisted: loading a document assigns fresh ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    pub fn next() -> Self {
        Self(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

// ── Kinds ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown component kind `{0}`")]
pub struct UnknownKind(pub String);

/// Discriminator for [`ComponentData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Transform,
    SpriteRenderer,
    RigidBody,
    Collider,
    Script,
    Camera,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 6] = [
        ComponentKind::Transform,
        ComponentKind::SpriteRenderer,
        ComponentKind::RigidBody,
        ComponentKind::Collider,
        ComponentKind::Script,
        ComponentKind::Camera,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "Transform",
            ComponentKind::SpriteRenderer => "SpriteRenderer",
            ComponentKind::RigidBody => "RigidBody",
            ComponentKind::Collider => "Collider",
            ComponentKind::Script => "Script",
            ComponentKind::Camera => "Camera",
        }
    }

    /// Scripts may repeat on an entity; every other kind appears at most once.
    pub fn is_singleton(self) -> bool {
        self != ComponentKind::Script
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComponentKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

// ── Data ─────────────────────────────────────────────────────────────────

/// The state of one component, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ComponentData {
    Transform(Transform2d),
    SpriteRenderer(SpriteRenderer),
    RigidBody(RigidBody),
    Collider(Collider),
    Script(Script),
    Camera(Camera),
}

impl ComponentData {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentData::Transform(_) => ComponentKind::Transform,
            ComponentData::SpriteRenderer(_) => ComponentKind::SpriteRenderer,
            ComponentData::RigidBody(_) => ComponentKind::RigidBody,
            ComponentData::Collider(_) => ComponentKind::Collider,
            ComponentData::Script(_) => ComponentKind::Script,
            ComponentData::Camera(_) => ComponentKind::Camera,
        }
    }

    /// A default-initialized component of `kind`.
    pub fn default_for(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Transform => ComponentData::Transform(Transform2d::default()),
            ComponentKind::SpriteRenderer => ComponentData::SpriteRenderer(SpriteRenderer::default()),
            ComponentKind::RigidBody => ComponentData::RigidBody(RigidBody::default()),
            ComponentKind::Collider => ComponentData::Collider(Collider::default()),
            ComponentKind::Script => ComponentData::Script(Script::default()),
            ComponentKind::Camera => ComponentData::Camera(Camera::default()),
        }
    }
}

/// An attached component: identity plus state.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: ComponentId,
    pub data: ComponentData,
}

impl Component {
    pub fn new(data: ComponentData) -> Self {
        Self {
            id: ComponentId::next(),
            data,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.data.kind()
    }
}

// ── Typed access ─────────────────────────────────────────────────────────

/// A Rust type that is the payload of one [`ComponentKind`].
pub trait ComponentType: Sized + Into<ComponentData> {
    const KIND: ComponentKind;

    fn from_data(data: &ComponentData) -> Option<&Self>;
    fn from_data_mut(data: &mut ComponentData) -> Option<&mut Self>;
}

macro_rules! component_type {
    ($ty:ty, $variant:ident) => {
        impl ComponentType for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn from_data(data: &ComponentData) -> Option<&Self> {
                match data {
                    ComponentData::$variant(value) => Some(value),
                    _ => None,
                }
            }

            fn from_data_mut(data: &mut ComponentData) -> Option<&mut Self> {
                match data {
                    ComponentData::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }

        impl From<$ty> for ComponentData {
            fn from(value: $ty) -> Self {
                ComponentData::$variant(value)
            }
        }
    };
}

component_type!(Transform2d, Transform);
component_type!(SpriteRenderer, SpriteRenderer);
component_type!(RigidBody, RigidBody);
component_type!(Collider, Collider);
component_type!(Script, Script);
component_type!(Camera, Camera);
