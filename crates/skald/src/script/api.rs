//! Capability proxies exposed to scripts.
//!
//! Every proxy is a small handle onto the shared [`ScriptWorld`]; reads and
//! writes go straight to the live component state of the scene while hooks
//! run. Proxies are registered with by-value receivers because the runner
//! injects them as read-only variables.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use rhai::{Array, Dynamic, Engine, EvalAltResult, FLOAT, INT, ImmutableString, Map};

use super::console::{LogLevel, LogSink, emit};
use super::diagnostic::{DiagnosticKind, ScriptDiagnostic};
use crate::color::Color;
use crate::component::{
    Camera, Collider, ComponentKind, RigidBody, Script, ShapeKind, SpriteRenderer, Transform2d,
};
use crate::entity::{Entity, EntityComponent, EntityId};
use crate::input::InputSnapshot;
use crate::math::Vec2;
use crate::scene::Scene;
use crate::serializer::{PrefabLibrary, SceneSerializer};
use crate::time::FrameTime;

pub(crate) type Shared = Rc<RefCell<ScriptWorld>>;
type ApiResult<T> = Result<T, Box<EvalAltResult>>;

/// Structural change requested by a script, applied between hook passes.
#[derive(Debug)]
pub(crate) enum ScriptCommand {
    Spawn { entities: Vec<Entity> },
    Destroy { entity: EntityId },
}

/// The script and entity whose hook is currently running.
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub entity: EntityId,
    pub entity_name: String,
    pub script: String,
}

/// State shared between the runner and the proxies.
pub(crate) struct ScriptWorld {
    /// The live scene, swapped in while hooks run.
    pub scene: Scene,
    pub input: InputSnapshot,
    pub time: FrameTime,
    pub prefabs: PrefabLibrary,
    pub serializer: SceneSerializer,
    pub current: Option<Binding>,
    pub commands: Vec<ScriptCommand>,
    pub diagnostics: Vec<ScriptDiagnostic>,
    pub sink: Rc<dyn LogSink>,
}

impl ScriptWorld {
    pub fn new(sink: Rc<dyn LogSink>) -> Self {
        Self {
            scene: Scene::default(),
            input: InputSnapshot::default(),
            time: FrameTime::default(),
            prefabs: PrefabLibrary::default(),
            serializer: SceneSerializer::default(),
            current: None,
            commands: Vec::new(),
            diagnostics: Vec::new(),
            sink,
        }
    }

    /// Record a rejected proxy call against the running script.
    pub fn diagnose(&mut self, message: impl Into<String>) {
        let Some(binding) = &self.current else {
            return;
        };
        let diagnostic = ScriptDiagnostic {
            kind: DiagnosticKind::Api,
            script: binding.script.clone(),
            entity: binding.entity_name.clone(),
            entity_id: binding.entity,
            message: message.into(),
        };
        emit(&*self.sink, LogLevel::Warn, diagnostic.to_string());
        self.diagnostics.push(diagnostic);
    }

    pub fn request_destroy(&mut self, id: EntityId) {
        if !self.scene.contains(id) {
            self.diagnose(format!("cannot destroy {id}: no such entity"));
            return;
        }
        if self
            .scene
            .camera()
            .is_some_and(|camera| self.scene.subtree(id).contains(&camera))
        {
            self.diagnose("the camera entity cannot be destroyed");
            return;
        }
        let queued = self
            .commands
            .iter()
            .any(|c| matches!(c, ScriptCommand::Destroy { entity } if *entity == id));
        if !queued {
            self.commands.push(ScriptCommand::Destroy { entity: id });
        }
    }

    /// Resolve `#{id}`, `#{name}`, an id string or a name string.
    fn resolve_target(&self, target: &Dynamic) -> Option<EntityId> {
        if let Some(map) = target.clone().try_cast::<Map>() {
            if let Some(id) = map.get("id").and_then(|v| v.clone().into_string().ok()) {
                return id.parse().ok().filter(|id| self.scene.contains(*id));
            }
            let name = map.get("name")?.clone().into_string().ok()?;
            return self.scene.find_by_name(&name);
        }
        let text = target.clone().into_string().ok()?;
        match text.parse::<EntityId>() {
            Ok(id) if self.scene.contains(id) => Some(id),
            _ => self.scene.find_by_name(&text),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn number(value: &Dynamic, what: &str) -> ApiResult<f32> {
    if let Ok(f) = value.as_float() {
        return Ok(f as f32);
    }
    if let Ok(i) = value.as_int() {
        return Ok(i as f32);
    }
    Err(format!("`{what}` expects a number, got {}", value.type_name()).into())
}

/// Read-only view of an entity handed to other scripts.
fn snapshot(entity: &Entity) -> Map {
    let position = entity.transform().position;
    let mut map = Map::new();
    map.insert("id".into(), Dynamic::from(entity.id().to_string()));
    map.insert("name".into(), Dynamic::from(entity.name.clone()));
    map.insert("tag".into(), Dynamic::from(entity.tag.clone()));
    map.insert("active".into(), Dynamic::from(entity.active));
    map.insert("x".into(), Dynamic::from(position.x as FLOAT));
    map.insert("y".into(), Dynamic::from(position.y as FLOAT));
    map
}

fn handle(entity: &Entity) -> Map {
    let mut map = Map::new();
    map.insert("id".into(), Dynamic::from(entity.id().to_string()));
    map.insert("name".into(), Dynamic::from(entity.name.clone()));
    map.insert("tag".into(), Dynamic::from(entity.tag.clone()));
    map
}

/// What `onCollision` receives about the other entity.
pub(crate) fn collision_info(entity: &Entity, is_trigger: bool) -> Map {
    let mut map = handle(entity);
    map.insert("isTrigger".into(), Dynamic::from(is_trigger));
    map
}

// ── Proxies ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub(crate) struct EntityProxy {
    world: Shared,
    entity: EntityId,
}

impl EntityProxy {
    pub fn new(world: Shared, entity: EntityId) -> Self {
        Self { world, entity }
    }

    fn read<R>(&self, f: impl FnOnce(&Entity) -> R) -> Option<R> {
        self.world.borrow().scene.get(self.entity).map(f)
    }

    fn write(&self, f: impl FnOnce(&mut Entity)) {
        if let Some(entity) = self.world.borrow_mut().scene.get_mut(self.entity) {
            f(entity);
        }
    }

    fn get_component(&self, kind: &str) -> Dynamic {
        let kind = match kind.parse::<ComponentKind>() {
            Ok(kind) => kind,
            Err(err) => {
                self.world.borrow_mut().diagnose(err.to_string());
                return Dynamic::UNIT;
            }
        };
        if !self.read(|e| e.has(kind)).unwrap_or(false) {
            self.world
                .borrow_mut()
                .diagnose(format!("entity has no {kind} component"));
            return Dynamic::UNIT;
        }
        let world = self.world.clone();
        match kind {
            ComponentKind::Transform => Dynamic::from(ComponentProxy::<Transform2d>::new(world, self.entity)),
            ComponentKind::SpriteRenderer => Dynamic::from(ComponentProxy::<SpriteRenderer>::new(world, self.entity)),
            ComponentKind::RigidBody => Dynamic::from(ComponentProxy::<RigidBody>::new(world, self.entity)),
            ComponentKind::Collider => Dynamic::from(ComponentProxy::<Collider>::new(world, self.entity)),
            ComponentKind::Script => Dynamic::from(ComponentProxy::<Script>::new(world, self.entity)),
            ComponentKind::Camera => Dynamic::from(ComponentProxy::<Camera>::new(world, self.entity)),
        }
    }

    fn apply_force(&self, x: &Dynamic, y: &Dynamic) -> ApiResult<()> {
        let force = Vec2::new(number(x, "x")?, number(y, "y")?);
        let mut world = self.world.borrow_mut();
        let applied = world
            .scene
            .get_mut(self.entity)
            .and_then(|e| e.get_mut::<RigidBody>())
            .map(|body| body.apply_force(force))
            .is_some();
        if !applied {
            world.diagnose("applyForce requires a RigidBody component");
        }
        Ok(())
    }
}

/// Handle onto one component kind of one entity.
pub(crate) struct ComponentProxy<T> {
    world: Shared,
    entity: EntityId,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for ComponentProxy<T> {
    fn clone(&self) -> Self {
        Self {
            world: self.world.clone(),
            entity: self.entity,
            _kind: PhantomData,
        }
    }
}

impl<T: EntityComponent> ComponentProxy<T> {
    pub fn new(world: Shared, entity: EntityId) -> Self {
        Self {
            world,
            entity,
            _kind: PhantomData,
        }
    }

    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let world = self.world.borrow();
        world.scene.get(self.entity).and_then(|e| e.get::<T>()).map(f)
    }

    fn write(&self, f: impl FnOnce(&mut T)) {
        let mut world = self.world.borrow_mut();
        if let Some(component) = world.scene.get_mut(self.entity).and_then(|e| e.get_mut::<T>()) {
            f(component);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VecField {
    Position,
    Scale,
    Velocity,
}

/// A vector field (`transform.position`, `body.velocity`, ...) viewed in place.
#[derive(Clone)]
pub(crate) struct Vec2Proxy {
    world: Shared,
    entity: EntityId,
    field: VecField,
}

impl Vec2Proxy {
    fn with<R>(&self, f: impl FnOnce(&mut Vec2) -> R) -> Option<R> {
        let mut world = self.world.borrow_mut();
        let entity = world.scene.get_mut(self.entity)?;
        match self.field {
            VecField::Position => Some(f(&mut entity.transform_mut().position)),
            VecField::Scale => Some(f(&mut entity.transform_mut().scale)),
            VecField::Velocity => entity.get_mut::<RigidBody>().map(|b| f(&mut b.velocity)),
        }
    }

    fn get(&self) -> Vec2 {
        self.with(|v| *v).unwrap_or_default()
    }
}

#[derive(Clone)]
pub(crate) struct InputProxy(Shared);

#[derive(Clone)]
pub(crate) struct TimeProxy(Shared);

#[derive(Clone)]
pub(crate) struct SceneProxy(Shared);

#[derive(Clone)]
pub(crate) struct ConsoleProxy(Shared);

impl InputProxy {
    pub fn new(world: Shared) -> Self {
        Self(world)
    }
}

impl TimeProxy {
    pub fn new(world: Shared) -> Self {
        Self(world)
    }
}

impl SceneProxy {
    pub fn new(world: Shared) -> Self {
        Self(world)
    }

    fn spawn(&self, prefab: &str, x: &Dynamic, y: &Dynamic) -> ApiResult<Dynamic> {
        let position = Vec2::new(number(x, "x")?, number(y, "y")?);
        let mut world = self.0.borrow_mut();
        let Some(document) = world.prefabs.get(prefab) else {
            world.diagnose(format!("no prefab named `{prefab}`"));
            return Ok(Dynamic::UNIT);
        };
        match world.serializer.prefab_entities(document, position) {
            Ok(entities) => {
                let Some(root) = entities.first().map(handle) else {
                    return Ok(Dynamic::UNIT);
                };
                world.commands.push(ScriptCommand::Spawn { entities });
                Ok(Dynamic::from_map(root))
            }
            Err(err) => {
                world.diagnose(format!("prefab `{prefab}` failed to instantiate: {err}"));
                Ok(Dynamic::UNIT)
            }
        }
    }

    fn destroy(&self, target: &Dynamic) {
        let mut world = self.0.borrow_mut();
        match world.resolve_target(target) {
            Some(id) => world.request_destroy(id),
            None => world.diagnose(format!("destroy: no entity matches {target}")),
        }
    }
}

impl ConsoleProxy {
    pub fn new(world: Shared) -> Self {
        Self(world)
    }

    fn write(&self, level: LogLevel, args: &[Dynamic]) {
        let message = args
            .iter()
            .map(|arg| match arg.clone().into_string() {
                Ok(text) => text,
                Err(_) => arg.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        let sink = self.0.borrow().sink.clone();
        emit(&*sink, level, message);
    }
}

// ── Registration ─────────────────────────────────────────────────────────

/// `get$name` / `set$name` for an `f32` field of component `T`.
macro_rules! float_property {
    ($engine:ident, $ty:ty, $name:literal, |$c:ident| $get:expr, |$m:ident, $v:ident| $set:expr) => {
        $engine.register_fn(concat!("get$", $name), |proxy: ComponentProxy<$ty>| -> FLOAT {
            proxy.read(|$c: &$ty| $get as FLOAT).unwrap_or_default()
        });
        $engine.register_fn(
            concat!("set$", $name),
            |proxy: ComponentProxy<$ty>, value: Dynamic| -> ApiResult<()> {
                let $v = number(&value, $name)?;
                proxy.write(|$m: &mut $ty| $set);
                Ok(())
            },
        );
    };
}

/// `get$name` / `set$name` for a `bool` field of component `T`.
macro_rules! bool_property {
    ($engine:ident, $ty:ty, $name:literal, $field:ident) => {
        $engine.register_fn(concat!("get$", $name), |proxy: ComponentProxy<$ty>| -> bool {
            proxy.read(|c: &$ty| c.$field).unwrap_or_default()
        });
        $engine.register_fn(concat!("set$", $name), |proxy: ComponentProxy<$ty>, value: bool| {
            proxy.write(|c: &mut $ty| c.$field = value);
        });
    };
}

/// One `console.<level>(...)` overload taking the listed arguments.
macro_rules! console_fn {
    ($engine:ident, $level:ident $(, $arg:ident)*) => {
        $engine.register_fn($level.name(), move |console: ConsoleProxy $(, $arg: Dynamic)*| {
            console.write($level, &[$($arg),*])
        });
    };
}

pub(crate) fn register_api(engine: &mut Engine) {
    register_entity(engine);
    register_transform(engine);
    register_components(engine);
    register_services(engine);
}

fn register_entity(engine: &mut Engine) {
    engine.register_type_with_name::<EntityProxy>("Entity");
    engine.register_fn("get$id", |e: EntityProxy| e.entity.to_string());
    engine.register_fn("get$name", |e: EntityProxy| e.read(|e| e.name.clone()).unwrap_or_default());
    engine.register_fn("get$tag", |e: EntityProxy| e.read(|e| e.tag.clone()).unwrap_or_default());
    engine.register_fn("set$tag", |e: EntityProxy, tag: ImmutableString| {
        e.write(|e| e.tag = tag.to_string());
    });
    engine.register_fn("get$active", |e: EntityProxy| e.read(|e| e.active).unwrap_or_default());
    engine.register_fn("set$active", |e: EntityProxy, active: bool| e.write(|e| e.active = active));
    engine.register_fn("getComponent", |e: EntityProxy, kind: ImmutableString| {
        e.get_component(&kind)
    });
    engine.register_fn("hasComponent", |e: EntityProxy, kind: ImmutableString| {
        kind.parse::<ComponentKind>()
            .ok()
            .and_then(|kind| e.read(|e| e.has(kind)))
            .unwrap_or(false)
    });
    engine.register_fn("applyForce", |e: EntityProxy, x: Dynamic, y: Dynamic| {
        e.apply_force(&x, &y)
    });
    engine.register_fn("destroy", |e: EntityProxy| {
        e.world.borrow_mut().request_destroy(e.entity);
    });
    engine.register_fn("to_string", |e: EntityProxy| {
        format!("Entity({})", e.read(|e| e.name.clone()).unwrap_or_default())
    });
}

fn register_transform(engine: &mut Engine) {
    engine.register_type_with_name::<ComponentProxy<Transform2d>>("Transform");
    float_property!(engine, Transform2d, "x", |t| t.position.x, |t, v| t.position.x = v);
    float_property!(engine, Transform2d, "y", |t| t.position.y, |t, v| t.position.y = v);
    float_property!(engine, Transform2d, "rotation", |t| t.rotation, |t, v| t.rotation = v);
    float_property!(engine, Transform2d, "scaleX", |t| t.scale.x, |t, v| t.scale.x = v);
    float_property!(engine, Transform2d, "scaleY", |t| t.scale.y, |t, v| t.scale.y = v);
    engine.register_fn("get$position", |t: ComponentProxy<Transform2d>| Vec2Proxy {
        world: t.world.clone(),
        entity: t.entity,
        field: VecField::Position,
    });
    engine.register_fn("get$scale", |t: ComponentProxy<Transform2d>| Vec2Proxy {
        world: t.world.clone(),
        entity: t.entity,
        field: VecField::Scale,
    });
    engine.register_fn("translate", |t: ComponentProxy<Transform2d>, dx: Dynamic, dy: Dynamic| -> ApiResult<()> {
        let delta = Vec2::new(number(&dx, "dx")?, number(&dy, "dy")?);
        t.write(|t| t.translate(delta));
        Ok(())
    });

    engine.register_type_with_name::<Vec2Proxy>("Vec2");
    engine.register_fn("get$x", |v: Vec2Proxy| v.get().x as FLOAT);
    engine.register_fn("get$y", |v: Vec2Proxy| v.get().y as FLOAT);
    engine.register_fn("set$x", |v: Vec2Proxy, value: Dynamic| -> ApiResult<()> {
        let x = number(&value, "x")?;
        v.with(|v| v.x = x);
        Ok(())
    });
    engine.register_fn("set$y", |v: Vec2Proxy, value: Dynamic| -> ApiResult<()> {
        let y = number(&value, "y")?;
        v.with(|v| v.y = y);
        Ok(())
    });
    engine.register_fn("to_string", |v: Vec2Proxy| {
        let v = v.get();
        format!("({}, {})", v.x, v.y)
    });
}

fn register_components(engine: &mut Engine) {
    engine.register_type_with_name::<ComponentProxy<RigidBody>>("RigidBody");
    float_property!(engine, RigidBody, "mass", |b| b.mass, |b, v| b.set_mass(v));
    float_property!(engine, RigidBody, "gravityScale", |b| b.gravity_scale, |b, v| b.gravity_scale = v);
    float_property!(engine, RigidBody, "drag", |b| b.drag, |b, v| b.drag = v);
    float_property!(engine, RigidBody, "bounciness", |b| b.bounciness, |b, v| b.set_bounciness(v));
    float_property!(engine, RigidBody, "velocityX", |b| b.velocity.x, |b, v| b.velocity.x = v);
    float_property!(engine, RigidBody, "velocityY", |b| b.velocity.y, |b, v| b.velocity.y = v);
    bool_property!(engine, RigidBody, "isKinematic", is_kinematic);
    engine.register_fn("get$velocity", |b: ComponentProxy<RigidBody>| Vec2Proxy {
        world: b.world.clone(),
        entity: b.entity,
        field: VecField::Velocity,
    });
    engine.register_fn("applyForce", |b: ComponentProxy<RigidBody>, x: Dynamic, y: Dynamic| -> ApiResult<()> {
        let force = Vec2::new(number(&x, "x")?, number(&y, "y")?);
        b.write(|b| b.apply_force(force));
        Ok(())
    });

    engine.register_type_with_name::<ComponentProxy<Collider>>("Collider");
    float_property!(engine, Collider, "width", |c| c.width, |c, v| c.width = v);
    float_property!(engine, Collider, "height", |c| c.height, |c, v| c.height = v);
    float_property!(engine, Collider, "offsetX", |c| c.offset.x, |c, v| c.offset.x = v);
    float_property!(engine, Collider, "offsetY", |c| c.offset.y, |c, v| c.offset.y = v);
    bool_property!(engine, Collider, "isTrigger", is_trigger);

    engine.register_type_with_name::<ComponentProxy<SpriteRenderer>>("SpriteRenderer");
    float_property!(engine, SpriteRenderer, "width", |s| s.width, |s, v| s.width = v);
    float_property!(engine, SpriteRenderer, "height", |s| s.height, |s, v| s.height = v);
    bool_property!(engine, SpriteRenderer, "visible", visible);
    engine.register_fn("get$layer", |s: ComponentProxy<SpriteRenderer>| {
        s.read(|s| s.layer as INT).unwrap_or_default()
    });
    engine.register_fn("set$layer", |s: ComponentProxy<SpriteRenderer>, layer: INT| {
        s.write(|s| s.layer = layer.clamp(i32::MIN as INT, i32::MAX as INT) as i32);
    });
    engine.register_fn("get$color", |s: ComponentProxy<SpriteRenderer>| {
        s.read(|s| s.color.to_string()).unwrap_or_default()
    });
    engine.register_fn("set$color", |s: ComponentProxy<SpriteRenderer>, color: ImmutableString| -> ApiResult<()> {
        let color: Color = color.parse().map_err(|err| format!("{err}"))?;
        s.write(|s| s.color = color);
        Ok(())
    });
    engine.register_fn("get$shape", |s: ComponentProxy<SpriteRenderer>| {
        s.read(|s| match s.shape {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Sprite => "sprite",
        })
        .unwrap_or("rectangle")
        .to_string()
    });
    engine.register_fn("set$shape", |s: ComponentProxy<SpriteRenderer>, shape: ImmutableString| -> ApiResult<()> {
        let shape = match shape.as_str() {
            "rectangle" => ShapeKind::Rectangle,
            "circle" => ShapeKind::Circle,
            "triangle" => ShapeKind::Triangle,
            "sprite" => ShapeKind::Sprite,
            other => return Err(format!("unknown shape `{other}`").into()),
        };
        s.write(|s| s.shape = shape);
        Ok(())
    });

    engine.register_type_with_name::<ComponentProxy<Camera>>("Camera");
    float_property!(engine, Camera, "zoom", |c| c.zoom, |c, v| c.set_zoom(v));
    engine.register_fn("get$background", |c: ComponentProxy<Camera>| {
        c.read(|c| c.background.to_string()).unwrap_or_default()
    });
    engine.register_fn("set$background", |c: ComponentProxy<Camera>, color: ImmutableString| -> ApiResult<()> {
        let color: Color = color.parse().map_err(|err| format!("{err}"))?;
        c.write(|c| c.background = color);
        Ok(())
    });

    engine.register_type_with_name::<ComponentProxy<Script>>("Script");
    engine.register_fn("get$name", |s: ComponentProxy<Script>| {
        s.read(|s| s.name.clone()).unwrap_or_default()
    });
}

fn register_services(engine: &mut Engine) {
    engine.register_type_with_name::<InputProxy>("Input");
    engine.register_fn("isKeyDown", |i: InputProxy, key: ImmutableString| {
        i.0.borrow().input.is_key_down(&key)
    });
    engine.register_fn("isKeyPressed", |i: InputProxy, key: ImmutableString| {
        i.0.borrow().input.is_key_pressed(&key)
    });
    engine.register_fn("isMouseButtonDown", |i: InputProxy, button: INT| {
        u8::try_from(button).is_ok_and(|b| i.0.borrow().input.is_mouse_button_down(b))
    });
    engine.register_fn("getMousePosition", |i: InputProxy| {
        let position = i.0.borrow().input.mouse_position();
        let mut map = Map::new();
        map.insert("x".into(), Dynamic::from(position.x as FLOAT));
        map.insert("y".into(), Dynamic::from(position.y as FLOAT));
        map
    });

    engine.register_type_with_name::<TimeProxy>("Time");
    engine.register_fn("get$deltaTime", |t: TimeProxy| t.0.borrow().time.delta_secs() as FLOAT);
    engine.register_fn("get$elapsed", |t: TimeProxy| t.0.borrow().time.elapsed_secs() as FLOAT);
    engine.register_fn("get$frameCount", |t: TimeProxy| t.0.borrow().time.frame_count() as INT);

    engine.register_type_with_name::<SceneProxy>("Scene");
    engine.register_fn("getEntityByName", |s: SceneProxy, name: ImmutableString| {
        let world = s.0.borrow();
        world
            .scene
            .find_by_name(&name)
            .and_then(|id| world.scene.get(id))
            .map(|e| Dynamic::from_map(snapshot(e)))
            .unwrap_or(Dynamic::UNIT)
    });
    engine.register_fn("getAllEntities", |s: SceneProxy| {
        let world = s.0.borrow();
        world
            .scene
            .flatten()
            .into_iter()
            .filter_map(|id| world.scene.get(id))
            .map(|e| Dynamic::from_map(snapshot(e)))
            .collect::<Array>()
    });
    // `spawn` is a reserved keyword in Rhai.
    engine.register_fn("spawnPrefab", |s: SceneProxy, prefab: ImmutableString, x: Dynamic, y: Dynamic| {
        s.spawn(&prefab, &x, &y)
    });
    engine.register_fn("destroy", |s: SceneProxy, target: Dynamic| s.destroy(&target));

    // Rhai has no variadics: each console method takes up to six values.
    engine.register_type_with_name::<ConsoleProxy>("Console");
    for level in [LogLevel::Log, LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
        console_fn!(engine, level);
        console_fn!(engine, level, a);
        console_fn!(engine, level, a, b);
        console_fn!(engine, level, a, b, c);
        console_fn!(engine, level, a, b, c, d);
        console_fn!(engine, level, a, b, c, d, e);
        console_fn!(engine, level, a, b, c, d, e, f);
    }
}
