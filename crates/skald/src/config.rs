//! Engine configuration.
//!
//! [`EngineConfig`] collects the tunables of the runtime. It can be built in
//! code with `with_*` methods or read from JSON; missing fields keep their
//! defaults.

use serde::Deserialize;

use crate::color::Color;
use crate::math::Vec2;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// World-space gravity in units/s². The world is Y-up.
    pub gravity: Vec2,
    /// Upper bound for a single frame's delta time, in seconds.
    pub max_frame_delta: f32,
    /// Clear color while editing.
    pub editor_background: Color,
    /// Draw the world grid and axes while editing.
    pub draw_grid: bool,
    /// Restore the scene captured at play start when stopping.
    pub restore_scene_on_stop: bool,
    /// Entries kept by the script console before the oldest are dropped.
    pub console_capacity: usize,
    /// How many times per frame queued spawn/destroy commands are drained.
    pub max_command_passes: usize,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_max_frame_delta(mut self, seconds: f32) -> Self {
        self.max_frame_delta = seconds;
        self
    }

    pub fn with_editor_background(mut self, color: Color) -> Self {
        self.editor_background = color;
        self
    }

    pub fn with_grid(mut self, draw: bool) -> Self {
        self.draw_grid = draw;
        self
    }

    pub fn with_restore_on_stop(mut self, restore: bool) -> Self {
        self.restore_scene_on_stop = restore;
        self
    }

    pub fn with_console_capacity(mut self, entries: usize) -> Self {
        self.console_capacity = entries;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -400.0),
            max_frame_delta: 0.05,
            editor_background: Color::MIDNIGHT,
            draw_grid: true,
            restore_scene_on_stop: true,
            console_capacity: 200,
            max_command_passes: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "gravity": [0.0, -9.8], "drawGrid": false }"#).unwrap();
        assert_eq!(config.gravity, Vec2::new(0.0, -9.8));
        assert!(!config.draw_grid);
        assert_eq!(config.max_frame_delta, 0.05);
        assert_eq!(config.console_capacity, 200);
        assert_eq!(config.editor_background, Color::MIDNIGHT);
    }
}
