//! Rendering
//!
//! The scene is expressed as a list of `DrawCommand`s issued to a
//! `DrawSurface`. Only relative layout matters to gameplay; the exact pixels
//! are up to the surface.

pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use glam::Vec2;

use crate::Rect;
use crate::assets::ImageAsset;

pub use scene::draw_scene;

/// RGBA color (alpha in 0..=1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS color string
    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            format!("rgb({},{},{})", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a.max(0.0))
        }
    }
}

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Font and placement of a text run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Pixel size
    pub size: f32,
    pub color: Color,
    pub bold: bool,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl TextStyle {
    pub fn new(size: f32, color: Color) -> Self {
        Self {
            size,
            color,
            bold: true,
            align: TextAlign::Left,
            baseline: TextBaseline::Top,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    pub fn aligned(mut self, align: TextAlign, baseline: TextBaseline) -> Self {
        self.align = align;
        self.baseline = baseline;
        self
    }
}

/// One drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled and/or outlined (optionally rounded) rectangle
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<(Color, f32)>,
        radius: f32,
    },
    /// Left-to-right gradient through `(offset, color)` stops
    HorizontalGradient { rect: Rect, stops: Vec<(f32, Color)> },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
    },
    /// Image scaled to `size` and rotated (degrees, counter-clockwise) about `center`
    Image {
        asset: ImageAsset,
        center: Vec2,
        size: Vec2,
        rotation_deg: f32,
    },
    /// Text rotated (degrees, counter-clockwise) about its anchor
    Text {
        text: String,
        pos: Vec2,
        style: TextStyle,
        rotation_deg: f32,
    },
}

/// Something the scene can be drawn onto
pub trait DrawSurface {
    /// Called once before the first command of a frame
    fn begin_frame(&mut self) {}
    fn draw(&mut self, command: DrawCommand);
}

/// Surface that records commands (headless runs and tests)
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<DrawCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every text run drawn, in order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

impl DrawSurface for CommandBuffer {
    fn begin_frame(&mut self) {
        self.commands.clear();
    }

    fn draw(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}
