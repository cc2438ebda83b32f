//! # Renderer
//!
//! Resolves entities to screen space and emits [`DrawCommand`]s.
//!
//! ## Coordinates
//!
//! ```text
//!   world                              screen (pixels)
//!
//!         │                            (0,0) ──────────► +x
//!         │    camera.position           │
//!   ──────┼──────► +x         ──►        │      viewport / 2
//!         │                              │           ●
//!         ▼ +y                           ▼ +y
//! ```
//!
//! `screen = viewport/2 + (world − camera) · zoom`. Both axes keep their
//! direction, so rotations carry over unchanged (degrees become radians).
//!
//! ## Draw order
//!
//! Entities are stably sorted by [`SpriteRenderer::layer`] (no renderer
//! counts as layer 0), so ties keep scene order. Hit testing walks the same
//! order backwards so whatever is drawn on top is picked first.

pub mod image;
mod surface;

pub use image::{ImageCache, ImageHandle, ImageState};
pub use surface::{DrawCommand, DrawList, RenderSurface, Stroke};

use crate::color::Color;
use crate::component::{Camera, ShapeKind, SpriteRenderer, Transform2d};
use crate::entity::EntityId;
use crate::math::{Rect, Vec2};
use crate::scene::Scene;

/// World units between editor grid lines at zoom 1.
pub const GRID_SPACING: f32 = 50.0;
/// Hit box used when an entity has neither a collider nor a sprite.
pub const DEFAULT_BOUNDS: Vec2 = Vec2::new(50.0, 50.0);

const SELECTION_PADDING: f32 = 4.0;
const SELECTION_HANDLE: f32 = 6.0;
const SELECTION_WIDTH: f32 = 2.0;

/// The view the renderer projects through: pan and zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

#[derive(Debug)]
pub struct Renderer2d {
    viewport: Vec2,
    camera: CameraView,
    images: ImageCache,
    editor_background: Color,
}

impl Renderer2d {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Vec2::new(width, height),
            camera: CameraView::default(),
            images: ImageCache::default(),
            editor_background: Color::MIDNIGHT,
        }
    }

    pub fn with_images(mut self, images: ImageCache) -> Self {
        self.images = images;
        self
    }

    pub fn with_editor_background(mut self, color: Color) -> Self {
        self.editor_background = color;
        self
    }

    /// Adopt the surface's size as the viewport.
    pub fn attach(&mut self, surface: &dyn RenderSurface) {
        self.viewport = surface.size();
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn camera(&self) -> &CameraView {
        &self.camera
    }

    /// Editor pan/zoom. Overwritten by [`sync_camera`](Self::sync_camera)
    /// while playing.
    pub fn camera_mut(&mut self) -> &mut CameraView {
        &mut self.camera
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut ImageCache {
        &mut self.images
    }

    // ── Projection ───────────────────────────────────────────────────

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.camera.position) * self.camera.zoom + self.viewport * 0.5
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.viewport * 0.5) / self.camera.zoom + self.camera.position
    }

    /// World transform of `id`, composed up the parent chain.
    pub fn world_transform(&self, scene: &Scene, id: EntityId) -> Option<Transform2d> {
        scene.world_transform(id)
    }

    /// Follow the scene's camera entity. Returns `false` when there is none.
    pub fn sync_camera(&mut self, scene: &Scene) -> bool {
        let Some(id) = scene.camera() else {
            return false;
        };
        let Some(camera) = scene.get(id).and_then(|e| e.get::<Camera>()) else {
            return false;
        };
        let zoom = camera.zoom;
        let Some(world) = scene.world_transform(id) else {
            return false;
        };
        self.camera.position = world.position;
        self.camera.zoom = zoom;
        true
    }

    /// Cache image handles on sprites and the camera, then decode whatever
    /// is pending. Returns how many images finished loading.
    pub fn resolve_images(&mut self, scene: &mut Scene) -> usize {
        for id in scene.flatten() {
            let Some(entity) = scene.get_mut(id) else {
                continue;
            };
            if let Some(sprite) = entity.get_mut::<SpriteRenderer>() {
                if let (Some(path), None) = (&sprite.image, sprite.image_handle) {
                    sprite.image_handle = Some(self.images.request(path));
                }
            }
            if let Some(camera) = entity.get_mut::<Camera>() {
                if let (Some(path), None) = (&camera.background_image, camera.background_handle) {
                    camera.background_handle = Some(self.images.request(path));
                }
            }
        }
        self.images.poll()
    }

    fn loaded(&self, handle: Option<ImageHandle>, path: Option<&str>) -> Option<ImageHandle> {
        handle
            .or_else(|| path.and_then(|p| self.images.lookup(p)))
            .filter(|h| self.images.is_ready(*h))
    }

    // ── Frame ────────────────────────────────────────────────────────

    /// Fill the viewport. With `use_camera_background` the scene camera's
    /// colour (and background image, once loaded) is used, otherwise the
    /// editor background.
    pub fn clear(&mut self, surface: &mut dyn RenderSurface, scene: &Scene, use_camera_background: bool) {
        self.attach(surface);
        let camera = scene
            .camera()
            .and_then(|id| scene.get(id))
            .and_then(|e| e.get::<Camera>())
            .filter(|_| use_camera_background);

        let Some(camera) = camera else {
            surface.submit(DrawCommand::Clear(self.editor_background));
            return;
        };
        surface.submit(DrawCommand::Clear(camera.background));
        let image = self.loaded(camera.background_handle, camera.background_image.as_deref());
        if let Some(handle) = image {
            surface.submit(DrawCommand::Image {
                handle,
                center: self.viewport * 0.5,
                size: self.viewport,
                rotation: 0.0,
            });
        }
    }

    /// Editor grid plus the two world axes.
    pub fn draw_grid(&self, surface: &mut dyn RenderSurface) {
        let size = surface.size();
        let step = GRID_SPACING * self.camera.zoom;
        let origin = self.world_to_screen(Vec2::ZERO);

        if step >= 2.0 {
            let grid = Stroke::solid(Color::GRID, 1.0);
            let mut x = origin.x.rem_euclid(step);
            while x < size.x {
                surface.submit(DrawCommand::Line {
                    from: Vec2::new(x, 0.0),
                    to: Vec2::new(x, size.y),
                    stroke: grid,
                });
                x += step;
            }
            let mut y = origin.y.rem_euclid(step);
            while y < size.y {
                surface.submit(DrawCommand::Line {
                    from: Vec2::new(0.0, y),
                    to: Vec2::new(size.x, y),
                    stroke: grid,
                });
                y += step;
            }
        }

        surface.submit(DrawCommand::Line {
            from: Vec2::new(origin.x, 0.0),
            to: Vec2::new(origin.x, size.y),
            stroke: Stroke::solid(Color::AXIS_VERTICAL, 2.0),
        });
        surface.submit(DrawCommand::Line {
            from: Vec2::new(0.0, origin.y),
            to: Vec2::new(size.x, origin.y),
            stroke: Stroke::solid(Color::AXIS_HORIZONTAL, 2.0),
        });
    }

    /// Draw `ids` in layer order, then the selection box for `selected`.
    pub fn render_entities(
        &mut self,
        surface: &mut dyn RenderSurface,
        scene: &Scene,
        ids: &[EntityId],
        selected: Option<EntityId>,
    ) {
        self.attach(surface);
        for id in layer_order(scene, ids) {
            self.draw_entity(surface, scene, id);
        }
        if let Some(id) = selected.filter(|id| ids.contains(id)) {
            self.draw_selection(surface, scene, id);
        }
    }

    /// [`render_entities`](Self::render_entities) over the whole scene.
    pub fn render_scene(&mut self, surface: &mut dyn RenderSurface, scene: &Scene, selected: Option<EntityId>) {
        let ids = scene.flatten();
        self.render_entities(surface, scene, &ids, selected);
    }

    fn draw_entity(&self, surface: &mut dyn RenderSurface, scene: &Scene, id: EntityId) {
        if scene.camera() == Some(id) {
            return;
        }
        let Some(entity) = scene.get(id).filter(|e| e.active) else {
            return;
        };
        let Some(sprite) = entity.get::<SpriteRenderer>().filter(|s| s.visible) else {
            return;
        };
        let Some(world) = scene.world_transform(id) else {
            return;
        };

        let center = self.world_to_screen(world.position);
        let size = (Vec2::new(sprite.width, sprite.height) * world.scale * self.camera.zoom).abs();
        let rotation = screen_rotation(world.rotation);
        let fill = Some(sprite.color);
        let stroke = sprite.stroke.map(|color| Stroke::solid(color, 1.0));

        let command = match sprite.shape {
            ShapeKind::Rectangle => DrawCommand::Rect {
                center,
                size,
                rotation,
                fill,
                stroke,
            },
            ShapeKind::Circle => DrawCommand::Ellipse {
                center,
                radii: size * 0.5,
                rotation,
                fill,
                stroke,
            },
            ShapeKind::Triangle => {
                let half = size * 0.5;
                let points = [
                    Vec2::new(0.0, -half.y),
                    Vec2::new(-half.x, half.y),
                    Vec2::new(half.x, half.y),
                ]
                .map(|p| center + Vec2::from_angle(rotation).rotate(p));
                DrawCommand::Polygon {
                    points: points.to_vec(),
                    fill,
                    stroke,
                }
            }
            ShapeKind::Sprite => {
                let Some(handle) = self.loaded(sprite.image_handle, sprite.image.as_deref()) else {
                    return;
                };
                DrawCommand::Image {
                    handle,
                    center,
                    size,
                    rotation,
                }
            }
        };
        surface.submit(command);
    }

    /// Dashed outline padded by a few pixels, with square corner handles.
    fn draw_selection(&self, surface: &mut dyn RenderSurface, scene: &Scene, id: EntityId) {
        let Some(entity) = scene.get(id) else {
            return;
        };
        let Some(world) = scene.world_transform(id) else {
            return;
        };
        let base = entity
            .get::<SpriteRenderer>()
            .map(|s| Vec2::new(s.width, s.height))
            .unwrap_or(DEFAULT_BOUNDS);
        let center = self.world_to_screen(world.position);
        let rotation = screen_rotation(world.rotation);
        let size = (base * world.scale * self.camera.zoom).abs() + Vec2::splat(SELECTION_PADDING * 2.0);

        surface.submit(DrawCommand::Rect {
            center,
            size,
            rotation,
            fill: None,
            stroke: Some(Stroke::dashed(Color::SELECTION, SELECTION_WIDTH)),
        });

        let half = size * 0.5;
        let turn = Vec2::from_angle(rotation);
        for corner in [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(-half.x, half.y),
            Vec2::new(half.x, half.y),
        ] {
            surface.submit(DrawCommand::Rect {
                center: center + turn.rotate(corner),
                size: Vec2::splat(SELECTION_HANDLE),
                rotation,
                fill: Some(Color::SELECTION),
                stroke: None,
            });
        }
    }

    // ── Picking ──────────────────────────────────────────────────────

    /// Topmost entity of `ids` (camera excluded) whose world box contains
    /// the screen point.
    pub fn hit_test(&self, scene: &Scene, ids: &[EntityId], screen: Vec2) -> Option<EntityId> {
        let point = self.screen_to_world(screen);
        layer_order(scene, ids)
            .into_iter()
            .rev()
            .filter(|id| scene.camera() != Some(*id))
            .find(|id| world_bounds(scene, *id).is_some_and(|b| b.contains(point)))
    }
}

/// World-space pick box: the sprite size, else [`DEFAULT_BOUNDS`], scaled
/// by the world scale. Colliders play no part in picking.
pub fn world_bounds(scene: &Scene, id: EntityId) -> Option<Rect> {
    let entity = scene.get(id)?;
    let world = scene.world_transform(id)?;
    let size = entity
        .get::<SpriteRenderer>()
        .map(|s| Vec2::new(s.width, s.height))
        .unwrap_or(DEFAULT_BOUNDS);
    Some(Rect::from_center_size(world.position, (size * world.scale).abs()))
}

fn layer_order(scene: &Scene, ids: &[EntityId]) -> Vec<EntityId> {
    let mut order = ids.to_vec();
    order.sort_by_key(|id| {
        scene
            .get(*id)
            .and_then(|e| e.get::<SpriteRenderer>())
            .map_or(0, |s| s.layer)
    });
    order
}

fn screen_rotation(degrees: f32) -> f32 {
    degrees.to_radians()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    const EPS: f32 = 1e-4;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < EPS
    }

    fn rect(color: Color, layer: i32) -> SpriteRenderer {
        SpriteRenderer::new(color, ShapeKind::Rectangle, 50.0, 50.0).with_layer(layer)
    }

    fn drawn_centers(list: &DrawList) -> Vec<Vec2> {
        list.commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { center, fill: Some(_), .. } => Some(*center),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn projection_round_trips_with_pan_and_zoom() {
        let mut renderer = Renderer2d::new(800.0, 600.0);
        *renderer.camera_mut() = CameraView {
            position: Vec2::new(100.0, -50.0),
            zoom: 2.0,
        };

        assert!(close(renderer.world_to_screen(Vec2::new(100.0, -50.0)), Vec2::new(400.0, 300.0)));
        // One world unit along +y is two pixels down the screen.
        assert!(close(renderer.world_to_screen(Vec2::new(100.0, -49.0)), Vec2::new(400.0, 302.0)));
        assert!(close(renderer.world_to_screen(Vec2::new(101.0, -50.0)), Vec2::new(402.0, 300.0)));

        let p = Vec2::new(37.5, 12.25);
        assert!(close(renderer.screen_to_world(renderer.world_to_screen(p)), p));
    }

    #[test]
    fn children_draw_at_their_world_position() {
        let mut scene = Scene::new("test");
        let parent = scene.add_root(
            Entity::new("Parent")
                .with_transform(Transform2d::from_xy(10.0, 0.0).with_rotation(90.0).with_scale(Vec2::splat(2.0))),
        );
        scene
            .add_child(
                parent,
                Entity::new("Child")
                    .with_transform(Transform2d::from_xy(1.0, 0.0))
                    .with(rect(Color::WHITE, 0)),
            )
            .unwrap();

        let mut renderer = Renderer2d::new(100.0, 100.0);
        let mut list = DrawList::new(100.0, 100.0);
        renderer.render_scene(&mut list, &scene, None);

        // World (10, 2) -> screen (60, 52).
        assert_eq!(list.len(), 1);
        match &list.commands()[0] {
            DrawCommand::Rect { center, size, rotation, .. } => {
                assert!(close(*center, Vec2::new(60.0, 52.0)));
                assert!(close(*size, Vec2::new(100.0, 100.0)));
                assert!((rotation - std::f32::consts::FRAC_PI_2).abs() < EPS);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn layers_sort_stably_and_skip_hidden_entities() {
        let mut scene = Scene::with_camera("test");
        scene.add_root(Entity::new("Top").with_transform(Transform2d::from_xy(3.0, 0.0)).with(rect(Color::WHITE, 2)));
        scene.add_root(Entity::new("A").with_transform(Transform2d::from_xy(1.0, 0.0)).with(rect(Color::WHITE, 0)));
        scene.add_root(Entity::new("Bare").with_transform(Transform2d::from_xy(9.0, 0.0)));
        scene.add_root(Entity::new("B").with_transform(Transform2d::from_xy(2.0, 0.0)).with(rect(Color::WHITE, 0)));
        scene.add_root(Entity::new("Under").with_transform(Transform2d::from_xy(-1.0, 0.0)).with(rect(Color::WHITE, -1)));
        let mut hidden = rect(Color::WHITE, 5);
        hidden.visible = false;
        scene.add_root(Entity::new("Hidden").with(hidden));
        let inactive = scene.add_root(Entity::new("Off").with(rect(Color::WHITE, 5)));
        scene.set_active(inactive, false).unwrap();

        let mut renderer = Renderer2d::new(0.0, 0.0);
        let mut list = DrawList::new(0.0, 0.0);
        renderer.render_scene(&mut list, &scene, None);

        let xs: Vec<f32> = drawn_centers(&list).iter().map(|c| c.x).collect();
        assert_eq!(xs, [-1.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn sprite_without_loaded_image_draws_nothing() {
        let mut scene = Scene::new("test");
        scene.add_root(Entity::new("Img").with(SpriteRenderer::default().with_image("nope.png")));

        let mut renderer = Renderer2d::new(10.0, 10.0);
        let mut list = DrawList::new(10.0, 10.0);
        renderer.resolve_images(&mut scene);
        renderer.render_scene(&mut list, &scene, None);
        assert!(list.is_empty());

        let handle = renderer.images_mut().insert("nope.png", ::image::RgbaImage::new(1, 1));
        renderer.render_scene(&mut list, &scene, None);
        assert!(matches!(list.commands(), [DrawCommand::Image { handle: h, .. }] if *h == handle));
    }

    #[test]
    fn selection_is_drawn_last_with_handles() {
        let mut scene = Scene::new("test");
        let a = scene.add_root(Entity::new("A").with(rect(Color::WHITE, 0)));
        scene.add_root(Entity::new("B").with(rect(Color::WHITE, 1)));

        let mut renderer = Renderer2d::new(200.0, 200.0);
        let mut list = DrawList::new(200.0, 200.0);
        renderer.render_scene(&mut list, &scene, Some(a));

        let commands = list.commands();
        assert_eq!(commands.len(), 2 + 1 + 4);
        match &commands[2] {
            DrawCommand::Rect { size, fill: None, stroke: Some(stroke), .. } => {
                assert!(stroke.dashed);
                assert_eq!(stroke.color, Color::SELECTION);
                assert!(close(*size, Vec2::new(58.0, 58.0)));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &commands[3] {
            DrawCommand::Rect { center, size, .. } => {
                assert!(close(*center, Vec2::new(71.0, 71.0)));
                assert!(close(*size, Vec2::splat(6.0)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn hit_test_prefers_top_layer_and_skips_camera() {
        let mut scene = Scene::with_camera("test");
        let low = scene.add_root(Entity::new("Low").with(rect(Color::WHITE, 0)));
        let high = scene.add_root(Entity::new("High").with(rect(Color::WHITE, 3)));
        let boxed = scene.add_root(
            Entity::new("Boxed")
                .with_transform(Transform2d::from_xy(200.0, 0.0))
                .with(rect(Color::WHITE, 0)),
        );
        let bare = scene.add_root(Entity::new("Bare").with_transform(Transform2d::from_xy(-200.0, 0.0)));

        let renderer = Renderer2d::new(800.0, 600.0);
        let ids = scene.flatten();
        let at = |world: Vec2| renderer.hit_test(&scene, &ids, renderer.world_to_screen(world));

        assert_eq!(at(Vec2::ZERO), Some(high));
        assert_eq!(at(Vec2::new(200.0, 4.0)), Some(boxed));
        assert_eq!(at(Vec2::new(200.0, 20.0)), Some(boxed));
        assert_eq!(at(Vec2::new(200.0, 30.0)), None);
        assert_eq!(at(Vec2::new(-180.0, 20.0)), Some(bare));
        assert_eq!(at(Vec2::new(1000.0, 1000.0)), None);

        let only_low = [low];
        assert_eq!(renderer.hit_test(&scene, &only_low, renderer.world_to_screen(Vec2::ZERO)), Some(low));
    }

    #[test]
    fn hit_box_is_the_sprite_not_the_collider() {
        let mut scene = Scene::new("test");
        let big = scene.add_root(
            Entity::new("Big")
                .with(SpriteRenderer::new(Color::WHITE, ShapeKind::Rectangle, 100.0, 100.0))
                .with(crate::component::Collider::new(10.0, 10.0)),
        );

        let renderer = Renderer2d::new(400.0, 400.0);
        let ids = scene.flatten();
        let hit = renderer.hit_test(&scene, &ids, renderer.world_to_screen(Vec2::new(30.0, 0.0)));
        assert_eq!(hit, Some(big));
        assert_eq!(
            world_bounds(&scene, big),
            Some(Rect::from_center_size(Vec2::ZERO, Vec2::splat(100.0)))
        );
    }

    #[test]
    fn clear_uses_camera_background_only_in_play() {
        let mut scene = Scene::with_camera("test");
        let camera = scene.camera().unwrap();
        scene.get_mut(camera).unwrap().get_mut::<Camera>().unwrap().background = Color::rgb(1, 2, 3);

        let mut renderer = Renderer2d::new(10.0, 10.0).with_editor_background(Color::BLACK);
        let mut list = DrawList::new(10.0, 10.0);
        renderer.clear(&mut list, &scene, true);
        renderer.clear(&mut list, &scene, false);

        assert_eq!(
            list.commands(),
            [DrawCommand::Clear(Color::rgb(1, 2, 3)), DrawCommand::Clear(Color::BLACK)]
        );
    }

    #[test]
    fn grid_lines_follow_zoom() {
        let renderer = Renderer2d::new(100.0, 100.0);
        let mut list = DrawList::new(100.0, 100.0);
        renderer.draw_grid(&mut list);

        // Origin at (50, 50): verticals at 0 and 50, horizontals at 0 and 50, plus two axes.
        assert_eq!(list.len(), 2 + 2 + 2);
        assert!(matches!(
            list.commands().last(),
            Some(DrawCommand::Line { stroke, .. }) if stroke.color == Color::AXIS_HORIZONTAL
        ));
    }

    #[test]
    fn sync_camera_follows_camera_entity() {
        let mut scene = Scene::with_camera("test");
        let camera = scene.camera().unwrap();
        let entity = scene.get_mut(camera).unwrap();
        entity.transform_mut().position = Vec2::new(30.0, 40.0);
        entity.get_mut::<Camera>().unwrap().set_zoom(1.5);

        let mut renderer = Renderer2d::new(100.0, 100.0);
        assert!(renderer.sync_camera(&scene));
        assert_eq!(renderer.camera().position, Vec2::new(30.0, 40.0));
        assert_eq!(renderer.camera().zoom, 1.5);
    }
}
