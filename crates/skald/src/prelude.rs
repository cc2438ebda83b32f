//! Convenience re-exports: `use skald::prelude::*` for the common items.

// Data model
pub use crate::color::Color;
pub use crate::component::{
    Camera, Collider, Component, ComponentData, ComponentId, ComponentKind, RigidBody, Script,
    ShapeKind, SpriteRenderer,
};
pub use crate::entity::{Entity, EntityId};
pub use crate::math::{Rect, Transform2d, Vec2};
pub use crate::scene::{DropPosition, Scene, SceneError};

// Persistence
pub use crate::serializer::{
    EntityDocument, PrefabLibrary, SceneDocument, SceneSerializer, SerializeError,
};

// Runtime
pub use crate::config::EngineConfig;
pub use crate::game_loop::{EngineState, FrameRequest, GameLoop, TickOutcome};
pub use crate::input::InputSnapshot;
pub use crate::physics::{CollisionEvent, PhysicsSystem};
pub use crate::render::{DrawCommand, DrawList, RenderSurface, Renderer2d};
pub use crate::script::{ConsoleBuffer, LogLevel, LogSink, ScriptDiagnostic, ScriptRunner};
pub use crate::time::FrameTime;
