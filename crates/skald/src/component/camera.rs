use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::render::image::ImageHandle;

/// Viewport settings. Position comes from the owning entity's transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Camera {
    pub background: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    pub zoom: f32,
    #[serde(skip)]
    pub background_handle: Option<ImageHandle>,
}

impl Camera {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            ..Default::default()
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.set_zoom(zoom);
        self
    }

    /// Zoom must stay positive.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = if zoom > 0.0 { zoom } else { f32::EPSILON };
    }

    pub fn set_background_image(&mut self, path: Option<String>) {
        self.background_image = path;
        self.background_handle = None;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            background: Color::MIDNIGHT,
            background_image: None,
            zoom: 1.0,
            background_handle: None,
        }
    }
}
