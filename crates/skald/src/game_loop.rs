//! # Game Loop
//!
//! [`GameLoop`] owns a scene and every system that acts on it, and switches
//! between editing and simulation:
//!
//! ```text
//!            play()               pause()
//!  EDITING ─────────► PLAYING ─────────► PAUSED
//!     ▲                │  ▲                │
//!     │     stop()     │  └─── play() ─────┘
//!     └────────────────┴──────── stop() ◄──┘
//! ```
//!
//! The host owns the clock and the frame scheduling. Every transition into
//! PLAYING hands out a [`FrameRequest`]; the host calls [`GameLoop::tick`]
//! with it when the frame is due. `pause` and `stop` invalidate the
//! outstanding request, so a tick that was already queued by the host is
//! ignored instead of running a frame in the wrong state.
//!
//! One simulated frame runs, in order: delta time, script `onUpdate`,
//! physics, `onCollision`, camera sync, render, frame callback, input edge
//! reset.

use std::rc::Rc;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::entity::EntityId;
use crate::input::InputSnapshot;
use crate::physics::PhysicsSystem;
use crate::render::{RenderSurface, Renderer2d};
use crate::scene::Scene;
use crate::script::{ConsoleBuffer, ScriptDiagnostic, ScriptRunner};
use crate::serializer::{PrefabLibrary, SceneDocument, SceneSerializer, SerializeError};
use crate::time::FrameTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Editing,
    Playing,
    Paused,
}

/// Permission to run exactly one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame ran; schedule `next`.
    Ran { next: FrameRequest },
    /// The request was stale or the loop is not playing.
    Ignored,
}

type FrameCallback = Box<dyn FnMut(&Scene, &FrameTime)>;

pub struct GameLoop {
    config: EngineConfig,
    state: EngineState,
    scene: Scene,
    serializer: SceneSerializer,
    renderer: Renderer2d,
    physics: PhysicsSystem,
    scripts: ScriptRunner,
    console: Rc<ConsoleBuffer>,
    input: InputSnapshot,
    time: FrameTime,
    snapshot: Option<SceneDocument>,
    pending: Option<FrameRequest>,
    next_request: u64,
    on_frame: Option<FrameCallback>,
}

impl GameLoop {
    pub fn new(config: EngineConfig) -> Self {
        let console = Rc::new(ConsoleBuffer::new(config.console_capacity));
        let scripts = ScriptRunner::new(console.clone()).with_command_passes(config.max_command_passes);
        let scene = Scene::with_camera("Untitled");
        Self {
            state: EngineState::Editing,
            scene,
            serializer: SceneSerializer::default(),
            renderer: Renderer2d::new(0.0, 0.0).with_editor_background(config.editor_background),
            physics: PhysicsSystem::new().with_gravity(config.gravity),
            scripts,
            console,
            input: InputSnapshot::default(),
            time: FrameTime::new(),
            snapshot: None,
            pending: None,
            next_request: 0,
            on_frame: None,
            config,
        }
    }

    /// Replace the initial scene (builder pattern).
    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.load_scene(scene);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == EngineState::Playing
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct scene access for editing operations.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn renderer(&self) -> &Renderer2d {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer2d {
        &mut self.renderer
    }

    pub fn physics(&self) -> &PhysicsSystem {
        &self.physics
    }

    pub fn console(&self) -> &Rc<ConsoleBuffer> {
        &self.console
    }

    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    /// Feed host input events here between ticks.
    pub fn input_mut(&mut self) -> &mut InputSnapshot {
        &mut self.input
    }

    pub fn time(&self) -> &FrameTime {
        &self.time
    }

    pub fn pending_request(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn diagnostics(&self) -> Vec<ScriptDiagnostic> {
        self.scripts.diagnostics()
    }

    pub fn take_diagnostics(&mut self) -> Vec<ScriptDiagnostic> {
        self.scripts.take_diagnostics()
    }

    /// Prefabs that scripts can spawn with `scene.spawn(name, x, y)`.
    pub fn set_prefabs(&mut self, prefabs: PrefabLibrary) {
        self.scripts.set_prefabs(prefabs);
    }

    /// Called after every simulated frame has rendered.
    pub fn set_frame_callback(&mut self, callback: impl FnMut(&Scene, &FrameTime) + 'static) {
        self.on_frame = Some(Box::new(callback));
    }

    // ── Scenes ───────────────────────────────────────────────────────

    /// Stop, then replace the scene. A camera is created if it has none.
    pub fn load_scene(&mut self, mut scene: Scene) {
        self.stop();
        scene.ensure_camera();
        log::info!("loaded scene \"{}\" ({} entities)", scene.name, scene.len());
        self.scene = scene;
        self.snapshot = None;
    }

    pub fn load_document(&mut self, document: &SceneDocument) -> Result<(), SerializeError> {
        let scene = self.serializer.deserialize(document)?;
        self.load_scene(scene);
        Ok(())
    }

    pub fn load_json(&mut self, json: &str) -> Result<(), SerializeError> {
        let scene = self.serializer.from_json(json)?;
        self.load_scene(scene);
        Ok(())
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Enter PLAYING. From EDITING this snapshots the scene and runs every
    /// script's `onStart`; from PAUSED it only resumes the clock.
    pub fn play(&mut self, now: Instant) -> FrameRequest {
        match self.state {
            EngineState::Playing => {
                if let Some(request) = self.pending {
                    return request;
                }
            }
            EngineState::Editing => {
                // Presses made while editing are not this frame's presses.
                self.input.end_frame();
                self.snapshot = Some(self.serializer.serialize(&self.scene));
                if self.time.elapsed_secs() == 0.0 {
                    self.time.reset();
                }
                self.physics.clear_events();
                self.scripts.sync(&self.input, &self.time);
                self.scripts.start_all(&mut self.scene);
                log::info!("play \"{}\"", self.scene.name);
            }
            EngineState::Paused => {
                self.input.end_frame();
                log::debug!("resume at {:.3}s", self.time.elapsed_secs());
            }
        }
        self.state = EngineState::Playing;
        self.time.rebase(now);
        self.arm()
    }

    /// PLAYING → PAUSED. Entity state and elapsed time are kept.
    pub fn pause(&mut self) {
        if self.state != EngineState::Playing {
            return;
        }
        self.state = EngineState::Paused;
        self.pending = None;
        log::debug!("paused at {:.3}s", self.time.elapsed_secs());
    }

    /// Back to EDITING: run every `onDestroy`, zero the clock and, when
    /// configured, restore the scene captured by `play`.
    pub fn stop(&mut self) {
        if self.state == EngineState::Editing {
            return;
        }
        self.pending = None;
        self.scripts.destroy_all(&mut self.scene);
        self.time.reset();
        self.physics.clear_events();
        self.input.reset();
        self.state = EngineState::Editing;

        let Some(snapshot) = self.snapshot.take() else {
            return;
        };
        if !self.config.restore_scene_on_stop {
            return;
        }
        match self.serializer.deserialize(&snapshot) {
            Ok(scene) => self.scene = scene,
            Err(err) => log::error!("failed to restore scene after stop: {err}"),
        }
        log::info!("stopped; restored \"{}\"", self.scene.name);
    }

    fn arm(&mut self) -> FrameRequest {
        self.next_request += 1;
        let request = FrameRequest(self.next_request);
        self.pending = Some(request);
        request
    }

    // ── Frames ───────────────────────────────────────────────────────

    /// Run one frame if `request` is the outstanding one.
    pub fn tick(
        &mut self,
        now: Instant,
        request: FrameRequest,
        surface: &mut dyn RenderSurface,
    ) -> TickOutcome {
        if self.state != EngineState::Playing || self.pending != Some(request) {
            log::trace!("ignoring stale frame request {request:?}");
            return TickOutcome::Ignored;
        }
        self.pending = None;

        let dt = self.time.advance(now, self.config.max_frame_delta);
        self.scripts.sync(&self.input, &self.time);
        self.scripts.update_all(&mut self.scene, dt);

        self.physics.update(&mut self.scene, dt);
        let events = self.physics.events().to_vec();
        self.scripts.dispatch_collisions(&mut self.scene, &events);

        self.renderer.sync_camera(&self.scene);
        self.renderer.resolve_images(&mut self.scene);
        self.renderer.clear(surface, &self.scene, true);
        self.renderer.render_scene(surface, &self.scene, None);

        if let Some(callback) = self.on_frame.as_mut() {
            callback(&self.scene, &self.time);
        }
        self.input.end_frame();

        if self.state != EngineState::Playing {
            return TickOutcome::Ignored;
        }
        TickOutcome::Ran { next: self.arm() }
    }

    /// Draw without simulating. While editing this uses the editor
    /// background, grid and selection; otherwise the last simulated state is
    /// drawn through the scene camera.
    pub fn render(&mut self, surface: &mut dyn RenderSurface, selected: Option<EntityId>) {
        self.renderer.resolve_images(&mut self.scene);
        if self.state == EngineState::Editing {
            self.renderer.clear(surface, &self.scene, false);
            if self.config.draw_grid {
                self.renderer.draw_grid(surface);
            }
            self.renderer.render_scene(surface, &self.scene, selected);
        } else {
            self.renderer.sync_camera(&self.scene);
            self.renderer.clear(surface, &self.scene, true);
            self.renderer.render_scene(surface, &self.scene, None);
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
