//! Draw targets.
//!
//! The renderer never rasterizes. It resolves everything to screen space
//! (pixels, origin top-left, y down) and hands [`DrawCommand`]s to a
//! [`RenderSurface`]. A host backs the surface with whatever it has: a
//! canvas, a GPU batcher, a software rasterizer. [`DrawList`] just records.

use crate::color::Color;
use crate::math::Vec2;

use super::image::ImageHandle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    pub dashed: bool,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dashed: false,
        }
    }

    pub fn dashed(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dashed: true,
        }
    }
}

/// One screen-space drawing operation.
///
/// `rotation` is in radians, clockwise on screen, about `center`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect {
        center: Vec2,
        size: Vec2,
        rotation: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Polygon {
        points: Vec<Vec2>,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Line {
        from: Vec2,
        to: Vec2,
        stroke: Stroke,
    },
    /// Blit a loaded image stretched to `size`.
    Image {
        handle: ImageHandle,
        center: Vec2,
        size: Vec2,
        rotation: f32,
    },
}

pub trait RenderSurface {
    /// Viewport size in pixels.
    fn size(&self) -> Vec2;

    fn submit(&mut self, command: DrawCommand);
}

/// A surface that records commands in submission order.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    size: Vec2,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl RenderSurface for DrawList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn submit(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}
