//! # Scripting
//!
//! Per-entity behaviour scripts written in [Rhai](https://rhai.rs).
//!
//! A script defines any of four hooks and is otherwise inert:
//!
//! ```text
//! fn onStart() { }
//! fn onUpdate(deltaTime) { }
//! fn onDestroy() { }
//! fn onCollision(other) { }
//! ```
//!
//! Inside a hook the only resolvable names are the capability proxies
//! `entity`, `transform`, `input`, `time`, `scene` (alias `assets`) and
//! `console`, plus `this`, an object map that persists across the hooks of
//! one script instance. Imports and `eval` are unavailable.
//!
//! Spawns and destroys requested by scripts are queued and applied between
//! hook passes, never while the runner is iterating.

mod api;
mod console;
mod diagnostic;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use rhai::module_resolvers::DummyModuleResolver;
use rhai::{AST, CallFnOptions, Dynamic, Engine, FLOAT, FuncArgs, Map, Scope};

use api::{
    Binding, ComponentProxy, ConsoleProxy, EntityProxy, InputProxy, SceneProxy, ScriptCommand,
    ScriptWorld, Shared, TimeProxy,
};
pub use console::{ConsoleBuffer, LogEntry, LogLevel, LogSink};
pub use diagnostic::{DiagnosticKind, Hook, ScriptDiagnostic};

use crate::component::{ComponentId, Transform2d};
use crate::entity::{Entity, EntityId};
use crate::input::InputSnapshot;
use crate::physics::CollisionEvent;
use crate::scene::Scene;
use crate::serializer::PrefabLibrary;
use crate::time::FrameTime;

type InstanceKey = (EntityId, ComponentId);

struct Compiled {
    ast: AST,
    hooks: Vec<Hook>,
    /// Bound as `this` for every hook call.
    state: Dynamic,
}

struct ScriptInstance {
    script: String,
    entity: String,
    /// `None` once compilation failed; the instance stays disabled.
    compiled: Option<Compiled>,
}

/// Compiles scripts and dispatches their lifecycle hooks.
pub struct ScriptRunner {
    engine: Engine,
    world: Shared,
    instances: HashMap<InstanceKey, ScriptInstance>,
    max_command_passes: usize,
}

impl ScriptRunner {
    pub fn new(sink: Rc<dyn LogSink>) -> Self {
        let world: Shared = Rc::new(RefCell::new(ScriptWorld::new(sink.clone())));

        let mut engine = Engine::new();
        engine.set_module_resolver(DummyModuleResolver::new());
        engine.disable_symbol("eval");

        let print_sink = sink.clone();
        engine.on_print(move |text| console::emit(&*print_sink, LogLevel::Log, text));
        let debug_sink = sink;
        engine.on_debug(move |text, _source, _pos| {
            console::emit(&*debug_sink, LogLevel::Info, text)
        });

        let vars = world.clone();
        engine.on_var(move |name, index, context| {
            if index > 0 || context.scope().contains(name) {
                return Ok(None);
            }
            let Some(entity) = vars.borrow().current.as_ref().map(|b| b.entity) else {
                return Ok(None);
            };
            let world = vars.clone();
            Ok(match name {
                "entity" => Some(Dynamic::from(EntityProxy::new(world, entity))),
                "transform" => Some(Dynamic::from(ComponentProxy::<Transform2d>::new(world, entity))),
                "input" => Some(Dynamic::from(InputProxy::new(world))),
                "time" => Some(Dynamic::from(TimeProxy::new(world))),
                "scene" | "assets" => Some(Dynamic::from(SceneProxy::new(world))),
                "console" => Some(Dynamic::from(ConsoleProxy::new(world))),
                _ => None,
            })
        });

        api::register_api(&mut engine);

        Self {
            engine,
            world,
            instances: HashMap::new(),
            max_command_passes: 8,
        }
    }

    /// Bound how many rounds of queued commands are applied per flush.
    /// Commands queued by hooks of the last round are dropped with a warning.
    pub fn with_command_passes(mut self, passes: usize) -> Self {
        self.max_command_passes = passes.max(1);
        self
    }

    pub fn set_prefabs(&mut self, prefabs: PrefabLibrary) {
        self.world.borrow_mut().prefabs = prefabs;
    }

    /// Refresh what the `input` and `time` proxies report.
    pub fn sync(&mut self, input: &InputSnapshot, time: &FrameTime) {
        let mut world = self.world.borrow_mut();
        world.input = input.clone();
        world.time = *time;
    }

    /// Number of compiled (or disabled) script instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Whether the script compiled and is receiving hooks.
    pub fn is_enabled(&self, entity: EntityId, component: ComponentId) -> bool {
        self.instances
            .get(&(entity, component))
            .is_some_and(|i| i.compiled.is_some())
    }

    pub fn diagnostics(&self) -> Vec<ScriptDiagnostic> {
        self.world.borrow().diagnostics.clone()
    }

    pub fn take_diagnostics(&mut self) -> Vec<ScriptDiagnostic> {
        std::mem::take(&mut self.world.borrow_mut().diagnostics)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Compile every script in `scene` and run `onStart`, entity by entity.
    pub fn start_all(&mut self, scene: &mut Scene) {
        self.instances.clear();
        self.world.borrow_mut().commands.clear();
        self.with_scene(scene, |runner| {
            let order = runner.world.borrow().scene.flatten();
            runner.start_entities(&order);
            runner.flush_commands();
        });
    }

    /// Run `onUpdate(dt)` on every started script.
    pub fn update_all(&mut self, scene: &mut Scene, dt: f32) {
        self.with_scene(scene, |runner| {
            runner.flush_commands();
            for key in runner.started_keys() {
                runner.call_hook(key, Hook::Update, (dt as FLOAT,));
            }
            runner.flush_commands();
        });
    }

    /// Deliver `onCollision` to both sides of every event.
    pub fn dispatch_collisions(&mut self, scene: &mut Scene, events: &[CollisionEvent]) {
        if events.is_empty() {
            return;
        }
        self.with_scene(scene, |runner| {
            for event in events {
                runner.notify_collision(event.entity_a, event.entity_b, event.is_trigger);
                runner.notify_collision(event.entity_b, event.entity_a, event.is_trigger);
            }
            runner.flush_commands();
        });
    }

    /// Run `onDestroy` on every started script and discard all compiled state.
    pub fn destroy_all(&mut self, scene: &mut Scene) {
        self.with_scene(scene, |runner| {
            for key in runner.started_keys() {
                runner.call_hook(key, Hook::Destroy, ());
            }
        });
        self.instances.clear();
        let mut world = self.world.borrow_mut();
        world.commands.clear();
        world.current = None;
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Lend `scene` to the proxies for the duration of `f`.
    fn with_scene<R>(&mut self, scene: &mut Scene, f: impl FnOnce(&mut Self) -> R) -> R {
        std::mem::swap(&mut self.world.borrow_mut().scene, scene);
        let out = f(self);
        std::mem::swap(&mut self.world.borrow_mut().scene, scene);
        out
    }

    /// Script components of `id`, in component order.
    fn script_keys(&self, id: EntityId) -> Vec<(InstanceKey, String, String, String)> {
        let world = self.world.borrow();
        let Some(entity) = world.scene.get(id) else {
            return Vec::new();
        };
        entity
            .scripts()
            .map(|(cid, script)| {
                (
                    (id, cid),
                    script.name.clone(),
                    script.source.clone(),
                    entity.name.clone(),
                )
            })
            .collect()
    }

    /// Live instances in entity-then-script order.
    fn started_keys(&self) -> Vec<InstanceKey> {
        let order = self.world.borrow().scene.flatten();
        order
            .into_iter()
            .flat_map(|id| self.entity_keys(id))
            .collect()
    }

    fn entity_keys(&self, id: EntityId) -> Vec<InstanceKey> {
        let world = self.world.borrow();
        let Some(entity) = world.scene.get(id) else {
            return Vec::new();
        };
        entity
            .scripts()
            .map(|(cid, _)| (id, cid))
            .filter(|key| self.instances.contains_key(key))
            .collect()
    }

    fn start_entities(&mut self, ids: &[EntityId]) {
        for &id in ids {
            for (key, script, source, entity) in self.script_keys(id) {
                if self.instances.contains_key(&key) {
                    continue;
                }
                let compiled = match self.compile(&source) {
                    Ok(compiled) => Some(compiled),
                    Err(message) => {
                        let binding = Binding {
                            entity: id,
                            entity_name: entity.clone(),
                            script: script.clone(),
                        };
                        self.report(DiagnosticKind::Compile, &binding, message);
                        None
                    }
                };
                self.instances.insert(
                    key,
                    ScriptInstance {
                        script,
                        entity,
                        compiled,
                    },
                );
                self.call_hook(key, Hook::Start, ());
            }
        }
    }

    /// Parse `source` and check the arity of every hook it defines. Top-level
    /// statements are discarded, never executed.
    fn compile(&self, source: &str) -> Result<Compiled, String> {
        let ast = self.engine.compile(source).map_err(|err| err.to_string())?;
        let mut hooks = Vec::new();
        for hook in Hook::ALL {
            let arities: Vec<usize> = ast
                .iter_functions()
                .filter(|f| f.name == hook.name())
                .map(|f| f.params.len())
                .collect();
            if arities.contains(&hook.arity()) {
                hooks.push(hook);
            } else if let Some(found) = arities.first() {
                return Err(format!(
                    "{}() takes {} parameter(s), found {found}",
                    hook.name(),
                    hook.arity()
                ));
            }
        }
        Ok(Compiled {
            ast: ast.clone_functions_only(),
            hooks,
            state: Dynamic::from_map(Map::new()),
        })
    }

    fn call_hook(&mut self, key: InstanceKey, hook: Hook, args: impl FuncArgs) {
        let Some(instance) = self.instances.get_mut(&key) else {
            return;
        };
        let Some(compiled) = instance.compiled.as_mut() else {
            return;
        };
        if !compiled.hooks.contains(&hook) {
            return;
        }

        let entity_name = self
            .world
            .borrow()
            .scene
            .get(key.0)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| instance.entity.clone());
        let binding = Binding {
            entity: key.0,
            entity_name,
            script: instance.script.clone(),
        };
        self.world.borrow_mut().current = Some(binding.clone());

        let options = CallFnOptions::new()
            .eval_ast(false)
            .rewind_scope(true)
            .bind_this_ptr(&mut compiled.state);
        let result = self.engine.call_fn_with_options::<Dynamic>(
            options,
            &mut Scope::new(),
            &compiled.ast,
            hook.name(),
            args,
        );

        self.world.borrow_mut().current = None;
        if let Err(err) = result {
            self.report(DiagnosticKind::Runtime { hook }, &binding, err.to_string());
        }
    }

    fn notify_collision(&mut self, id: EntityId, other: EntityId, is_trigger: bool) {
        let info = {
            let world = self.world.borrow();
            match world.scene.get(other) {
                Some(entity) => api::collision_info(entity, is_trigger),
                None => return,
            }
        };
        for key in self.entity_keys(id) {
            self.call_hook(key, Hook::Collision, (Dynamic::from_map(info.clone()),));
        }
    }

    fn report(&self, kind: DiagnosticKind, binding: &Binding, message: String) {
        let diagnostic = ScriptDiagnostic {
            kind,
            script: binding.script.clone(),
            entity: binding.entity_name.clone(),
            entity_id: binding.entity,
            message,
        };
        let mut world = self.world.borrow_mut();
        console::emit(&*world.sink, LogLevel::Error, diagnostic.to_string());
        world.diagnostics.push(diagnostic);
    }

    /// Apply queued spawns and destroys. Hooks run while applying them may
    /// queue more; those are applied in the next round.
    fn flush_commands(&mut self) {
        for _ in 0..self.max_command_passes {
            let commands = std::mem::take(&mut self.world.borrow_mut().commands);
            if commands.is_empty() {
                return;
            }
            for command in commands {
                match command {
                    ScriptCommand::Spawn { entities } => self.apply_spawn(entities),
                    ScriptCommand::Destroy { entity } => self.apply_destroy(entity),
                }
            }
        }
        let dropped = std::mem::take(&mut self.world.borrow_mut().commands).len();
        if dropped > 0 {
            log::warn!(
                "dropped {dropped} script commands after {} passes",
                self.max_command_passes
            );
        }
    }

    fn apply_spawn(&mut self, entities: Vec<Entity>) {
        let root = self.world.borrow_mut().scene.insert_subtree(entities, None);
        let Some(root) = root else {
            return;
        };
        let ids = self.world.borrow().scene.subtree(root);
        log::debug!("script spawned {} entities", ids.len());
        self.start_entities(&ids);
    }

    fn apply_destroy(&mut self, id: EntityId) {
        let subtree = {
            let world = self.world.borrow();
            if !world.scene.contains(id) {
                return;
            }
            world.scene.subtree(id)
        };
        for &entity in &subtree {
            for key in self.entity_keys(entity) {
                self.call_hook(key, Hook::Destroy, ());
            }
        }
        let removed: HashSet<EntityId> = subtree.into_iter().collect();
        self.instances.retain(|(entity, _), _| !removed.contains(entity));
        let result = self.world.borrow_mut().scene.despawn(id);
        if let Err(err) = result {
            log::warn!("script destroy of {id} failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{RigidBody, Script};

    fn runner() -> (ScriptRunner, Rc<ConsoleBuffer>) {
        let console = Rc::new(ConsoleBuffer::new(64));
        (ScriptRunner::new(console.clone()), console)
    }

    fn scripted(name: &str, source: &str) -> Entity {
        Entity::new(name).with(Script::new(format!("{name}Script"), source))
    }

    fn logs(console: &ConsoleBuffer) -> Vec<String> {
        console.messages(LogLevel::Log)
    }

    #[test]
    fn failing_hook_does_not_stop_other_scripts() {
        let (mut runner, _console) = runner();
        let mut scene = Scene::with_camera("test");
        scene.add_root(scripted("Bad", "fn onUpdate(dt) { throw \"boom\"; }"));
        let good = scene.add_root(scripted(
            "Good",
            "fn onUpdate(dt) { transform.x = transform.x + 1.0; }",
        ));

        runner.start_all(&mut scene);
        runner.update_all(&mut scene, 0.016);

        assert_eq!(scene.get(good).unwrap().transform().position.x, 1.0);
        let diagnostics = runner.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Runtime { hook: Hook::Update });
        assert_eq!(diagnostics[0].entity, "Bad");
        assert_eq!(diagnostics[0].script, "BadScript");
    }

    #[test]
    fn compile_error_disables_instance() {
        let (mut runner, console) = runner();
        let mut scene = Scene::new("test");
        let id = scene.add_root(scripted("Broken", "fn onUpdate(dt) { console.log(\"x\" "));

        runner.start_all(&mut scene);
        runner.update_all(&mut scene, 0.016);
        runner.update_all(&mut scene, 0.016);

        let diagnostics = runner.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Compile);
        let (cid, _) = scene.get(id).unwrap().scripts().next().unwrap();
        assert!(!runner.is_enabled(id, cid));
        assert!(logs(&console).is_empty());
        assert_eq!(console.messages(LogLevel::Error).len(), 1);
    }

    #[test]
    fn hook_with_wrong_arity_is_a_compile_error() {
        let (mut runner, _console) = runner();
        let mut scene = Scene::new("test");
        scene.add_root(scripted("E", "fn onUpdate() { }"));

        runner.start_all(&mut scene);

        let diagnostics = runner.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Compile);
        assert!(diagnostics[0].message.contains("onUpdate"));
    }

    #[test]
    fn top_level_statements_do_not_run() {
        let (mut runner, console) = runner();
        let mut scene = Scene::new("test");
        scene.add_root(scripted("E", "console.log(\"top\");\nfn onStart() { console.log(\"start\"); }"));

        runner.start_all(&mut scene);

        assert_eq!(logs(&console), ["start"]);
    }

    #[test]
    fn hooks_run_in_entity_then_script_order() {
        let (mut runner, console) = runner();
        let mut scene = Scene::new("test");
        let parent = scene.add_root(
            scripted("A", "fn onStart() { console.log(\"a1\"); }")
                .with(Script::new("Second", "fn onStart() { console.log(\"a2\"); }")),
        );
        scene
            .add_child(parent, scripted("Child", "fn onStart() { console.log(\"child\"); }"))
            .unwrap();
        scene.add_root(scripted("B", "fn onStart() { console.log(\"b\"); }"));

        runner.start_all(&mut scene);

        assert_eq!(logs(&console), ["a1", "a2", "child", "b"]);
        assert_eq!(runner.instance_count(), 4);
    }

    #[test]
    fn proxies_write_live_component_state() {
        let (mut runner, _console) = runner();
        let mut scene = Scene::new("test");
        let id = scene.add_root(
            scripted(
                "Mover",
                r#"
                fn onStart() {
                    let body = entity.getComponent("RigidBody");
                    body.velocityX = 5;
                    body.velocity.y = 3.5;
                    transform.position.x = 10;
                    transform.rotation = 45;
                    transform.translate(1, 2);
                    entity.tag = "player";
                }
                "#,
            )
            .with(RigidBody::default()),
        );

        runner.start_all(&mut scene);

        assert!(runner.diagnostics().is_empty(), "{:?}", runner.diagnostics());
        let entity = scene.get(id).unwrap();
        let body = entity.get::<RigidBody>().unwrap();
        assert_eq!(body.velocity, crate::math::Vec2::new(5.0, 3.5));
        assert_eq!(entity.transform().position, crate::math::Vec2::new(11.0, 2.0));
        assert_eq!(entity.transform().rotation, 45.0);
        assert_eq!(entity.tag, "player");
    }

    #[test]
    fn invalid_component_kind_yields_unit_and_diagnostic() {
        let (mut runner, console) = runner();
        let mut scene = Scene::new("test");
        scene.add_root(scripted(
            "E",
            r#"
            fn onStart() {
                let c = entity.getComponent("Banana");
                console.log(type_of(c));
                entity.applyForce(1, 2);
            }
            "#,
        ));

        runner.start_all(&mut scene);

        assert_eq!(logs(&console), ["()"]);
        let diagnostics = runner.diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.kind == DiagnosticKind::Api));
    }

    #[test]
    fn apply_force_accumulates_on_rigid_body() {
        let (mut runner, _console) = runner();
        let mut scene = Scene::new("test");
        let id = scene.add_root(
            scripted("E", "fn onStart() { entity.applyForce(10, 0); }")
                .with(RigidBody::default().with_mass(2.0)),
        );

        runner.start_all(&mut scene);

        let body = scene.get(id).unwrap().get::<RigidBody>().unwrap();
        assert_eq!(body.acceleration.x, 5.0);
    }

    #[test]
    fn spawn_is_applied_after_the_hook_and_started() {
        let (mut runner, console) = runner();
        let mut template = Scene::new("prefabs");
        let bullet = template.add_root(scripted("Bullet", "fn onStart() { console.log(\"bullet\"); }"));
        let mut prefabs = PrefabLibrary::new();
        assert!(prefabs.capture(&template, bullet, "Bullet"));
        runner.set_prefabs(prefabs);

        let mut scene = Scene::new("test");
        scene.add_root(scripted(
            "Gun",
            r#"
            fn onStart() {
                let handle = scene.spawnPrefab("Bullet", 10, 20);
                console.log(handle.name);
                console.log(type_of(scene.getEntityByName("Bullet")));
            }
            "#,
        ));

        runner.start_all(&mut scene);

        assert_eq!(logs(&console), ["Bullet", "()", "bullet"]);
        assert!(runner.diagnostics().is_empty());
        let spawned = scene.find_by_name("Bullet").unwrap();
        assert_ne!(spawned, bullet);
        assert_eq!(
            scene.get(spawned).unwrap().transform().position,
            crate::math::Vec2::new(10.0, 20.0)
        );
    }

    #[test]
    fn destroy_is_deferred_and_runs_on_destroy() {
        let (mut runner, console) = runner();
        let mut scene = Scene::with_camera("test");
        scene.add_root(scripted(
            "Killer",
            r#"
            fn onStart() {
                scene.destroy("Target");
                console.log(type_of(scene.getEntityByName("Target")));
            }
            "#,
        ));
        let target = scene.add_root(scripted("Target", "fn onDestroy() { console.log(\"bye\"); }"));
        scene
            .add_child(target, scripted("Child", "fn onDestroy() { console.log(\"child bye\"); }"))
            .unwrap();

        runner.start_all(&mut scene);

        assert_eq!(logs(&console), ["map", "bye", "child bye"]);
        assert!(scene.find_by_name("Target").is_none());
        assert!(scene.find_by_name("Child").is_none());
        assert_eq!(runner.instance_count(), 1);
    }

    #[test]
    fn camera_cannot_be_destroyed_by_script() {
        let (mut runner, _console) = runner();
        let mut scene = Scene::with_camera("test");
        scene.add_root(scripted("E", "fn onStart() { scene.destroy(#{ name: \"Camera\" }); }"));

        runner.start_all(&mut scene);

        assert!(scene.camera().is_some_and(|id| scene.contains(id)));
        let diagnostics = runner.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::Api);
    }

    #[test]
    fn collisions_reach_both_sides() {
        let (mut runner, console) = runner();
        let mut scene = Scene::new("test");
        let source = "fn onCollision(other) { console.log(other.name, other.isTrigger); }";
        let a = scene.add_root(scripted("A", source));
        let b = scene.add_root(scripted("B", source));

        runner.start_all(&mut scene);
        runner.dispatch_collisions(
            &mut scene,
            &[CollisionEvent {
                entity_a: a,
                entity_b: b,
                is_trigger: true,
            }],
        );

        assert_eq!(logs(&console), ["B true", "A true"]);
    }

    #[test]
    fn this_persists_between_hooks() {
        let (mut runner, console) = runner();
        let mut scene = Scene::new("test");
        scene.add_root(scripted(
            "Counter",
            r#"
            fn onStart() { this.count = 0; }
            fn onUpdate(dt) {
                this.count += 1;
                console.log(this.count);
            }
            "#,
        ));

        runner.start_all(&mut scene);
        runner.update_all(&mut scene, 0.016);
        runner.update_all(&mut scene, 0.016);

        assert_eq!(logs(&console), ["1", "2"]);
    }

    #[test]
    fn sandbox_rejects_eval_and_imports() {
        let (mut runner, console) = runner();
        let mut scene = Scene::new("test");
        scene.add_root(scripted("Eval", "fn onStart() { eval(\"40 + 2\"); console.log(\"ran\"); }"));
        scene.add_root(scripted(
            "Import",
            "fn onStart() { import \"std\" as fs; console.log(\"ran\"); }",
        ));

        runner.start_all(&mut scene);

        assert!(logs(&console).is_empty());
        assert_eq!(runner.diagnostics().len(), 2);
    }

    #[test]
    fn print_and_time_are_routed() {
        let (mut runner, console) = runner();
        let mut scene = Scene::new("test");
        scene.add_root(scripted(
            "E",
            "fn onUpdate(dt) { print(`frame ${time.frameCount}`); console.warn(\"careful\"); }",
        ));
        let mut time = FrameTime::new();
        let start = std::time::Instant::now();
        time.rebase(start);
        time.advance(start + std::time::Duration::from_millis(16), 0.05);

        runner.start_all(&mut scene);
        runner.sync(&InputSnapshot::default(), &time);
        runner.update_all(&mut scene, time.delta_secs());

        assert_eq!(logs(&console), ["frame 1"]);
        assert_eq!(console.messages(LogLevel::Warn), ["careful"]);
    }

    #[test]
    fn console_accepts_zero_to_six_values() {
        let (mut runner, console) = runner();
        let mut scene = Scene::new("test");
        scene.add_root(scripted(
            "E",
            r#"
            fn onStart() {
                console.log();
                console.log("a", 1, true, "b", 2.5, ());
                console.error("x", "y", "z", "w");
            }
            "#,
        ));

        runner.start_all(&mut scene);

        assert!(runner.diagnostics().is_empty());
        assert_eq!(logs(&console), ["", "a 1 true b 2.5 ()"]);
        assert_eq!(console.messages(LogLevel::Error), ["x y z w"]);
    }

    #[test]
    fn destroy_all_runs_on_destroy_once() {
        let (mut runner, console) = runner();
        let mut scene = Scene::new("test");
        scene.add_root(scripted("E", "fn onDestroy() { console.log(\"gone\"); }"));

        runner.start_all(&mut scene);
        runner.destroy_all(&mut scene);
        runner.destroy_all(&mut scene);

        assert_eq!(logs(&console), ["gone"]);
        assert_eq!(runner.instance_count(), 0);
        assert_eq!(scene.len(), 1);
    }
}
