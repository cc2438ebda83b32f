use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::render::image::ImageHandle;

/// Outline drawn for a [`SpriteRenderer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Triangle,
    /// Blit of the sprite's image once it has loaded.
    Sprite,
}

/// Visual representation of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpriteRenderer {
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    pub shape: ShapeKind,
    pub width: f32,
    pub height: f32,
    pub visible: bool,
    /// Draw order. Lower layers draw first; ties keep entity order.
    pub layer: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip)]
    pub image_handle: Option<ImageHandle>,
}

impl SpriteRenderer {
    pub fn new(color: Color, shape: ShapeKind, width: f32, height: f32) -> Self {
        Self {
            color,
            shape,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_stroke(mut self, stroke: Color) -> Self {
        self.stroke = Some(stroke);
        self
    }

    /// Switch to image mode. The handle is resolved lazily by the renderer.
    pub fn with_image(mut self, path: impl Into<String>) -> Self {
        self.shape = ShapeKind::Sprite;
        self.set_image(Some(path.into()));
        self
    }

    pub fn set_image(&mut self, path: Option<String>) {
        self.image = path;
        self.image_handle = None;
    }
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            stroke: None,
            shape: ShapeKind::Rectangle,
            width: 50.0,
            height: 50.0,
            visible: true,
            layer: 0,
            image: None,
            image_handle: None,
        }
    }
}
