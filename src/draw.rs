// File: ./src/draw.rs
//! Drawing operations and the per-page canvas.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.
//! Every `DrawOp` carries its fully resolved style, so writers never track
//! ambient state. Style changes on a `Canvas` are scoped with
//! [`Canvas::scoped`] and cannot leak into later drawing.
use crate::page::Bookmark;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

pub const INCH: f32 = 72.0;

/// Courier advance width, as a fraction of the font size.
const COURIER_ADVANCE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// `#RRGGBB`
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as f32 / 255.0,
            g: ((value >> 8) & 0xFF) as f32 / 255.0,
            b: (value & 0xFF) as f32 / 255.0,
        }
    }
}

pub const COLOR_GRID: Color = Color::hex(0xE0E0E0);
pub const COLOR_TEXT: Color = Color::hex(0x000000);
pub const COLOR_LINK: Color = Color::hex(0x0066CC);
pub const COLOR_EVENT: Color = Color::hex(0x2C5F8D);
pub const COLOR_WEEKEND: Color = Color::hex(0xF5F5F5);
/// rgb(0.29, 0.56, 0.89) at 10 % over white.
pub const COLOR_EVENT_FILL: Color = Color::rgb(0.929, 0.956, 0.989);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Font {
    Header,
    Body,
}

impl Font {
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Header => "Courier-Bold",
            Font::Body => "Courier",
        }
    }
}

/// Width of `text` set in Courier at `size` points.
pub fn string_width(text: &str, size: f32) -> f32 {
    text.width() as f32 * COURIER_ADVANCE * size
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// From the bottom-left corner and a size.
    pub fn from_origin(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        font: Font,
        size: f32,
        color: Color,
        align: Align,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Color,
        width: f32,
    },
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<(Color, f32)>,
    },
    Dot {
        x: f32,
        y: f32,
        radius: f32,
        color: Color,
    },
}

/// A navigation hotspot whose destination is only known by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRequest {
    pub rect: Rect,
    pub destination: Bookmark,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Color,
    pub stroke: Color,
    pub line_width: f32,
    pub font: Font,
    pub font_size: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: COLOR_TEXT,
            stroke: COLOR_GRID,
            line_width: 0.5,
            font: Font::Body,
            font_size: 10.0,
        }
    }
}

/// Output of rendering one page: drawing operations plus link requests.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    ops: Vec<DrawOp>,
    links: Vec<LinkRequest>,
    style: Style,
    saved: Vec<Style>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// Applies `change` for the duration of `body`, then restores the style.
    pub fn scoped<R>(&mut self, change: impl FnOnce(&mut Style), body: impl FnOnce(&mut Canvas) -> R) -> R {
        self.saved.push(self.style);
        change(&mut self.style);
        let result = body(self);
        if let Some(previous) = self.saved.pop() {
            self.style = previous;
        }
        result
    }

    pub fn set_font(&mut self, font: Font, size: f32) {
        self.style.font = font;
        self.style.font_size = size;
    }

    pub fn set_fill(&mut self, color: Color) {
        self.style.fill = color;
    }

    pub fn text(&mut self, x: f32, y: f32, text: impl Into<String>) {
        self.push_text(x, y, text.into(), Align::Left);
    }

    /// `x` is the right edge of the text.
    pub fn text_right(&mut self, x: f32, y: f32, text: impl Into<String>) {
        self.push_text(x, y, text.into(), Align::Right);
    }

    fn push_text(&mut self, x: f32, y: f32, text: String, align: Align) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text,
            font: self.style.font,
            size: self.style.font_size,
            color: self.style.fill,
            align,
        });
    }

    /// Width of `text` in the current font.
    pub fn text_width(&self, text: &str) -> f32 {
        string_width(text, self.style.font_size)
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color: self.style.stroke,
            width: self.style.line_width,
        });
    }

    pub fn fill_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Rect {
            rect,
            fill: Some(self.style.fill),
            stroke: None,
        });
    }

    pub fn stroke_rect(&mut self, rect: Rect) {
        self.ops.push(DrawOp::Rect {
            rect,
            fill: None,
            stroke: Some((self.style.stroke, self.style.line_width)),
        });
    }

    pub fn dot(&mut self, x: f32, y: f32, radius: f32) {
        self.ops.push(DrawOp::Dot {
            x,
            y,
            radius,
            color: self.style.fill,
        });
    }

    /// Records a link to `destination`. Valid at any point of rendering;
    /// the destination does not need to exist yet.
    pub fn add_link(&mut self, rect: Rect, destination: Bookmark) {
        self.links.push(LinkRequest { rect, destination });
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn links(&self) -> &[LinkRequest] {
        &self.links
    }

    pub fn into_parts(self) -> (Vec<DrawOp>, Vec<LinkRequest>) {
        (self.ops, self.links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_style_is_restored() {
        let mut canvas = Canvas::new();
        canvas.scoped(
            |s| {
                s.fill = COLOR_LINK;
                s.font = Font::Header;
            },
            |c| c.text(0.0, 0.0, "link"),
        );
        canvas.text(0.0, 10.0, "plain");

        match &canvas.ops()[1] {
            DrawOp::Text { color, font, .. } => {
                assert_eq!(*color, COLOR_TEXT);
                assert_eq!(*font, Font::Body);
            }
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn courier_width_is_monospace() {
        assert!((string_width("abcd", 10.0) - 24.0).abs() < 1e-3);
        assert_eq!(string_width("", 10.0), 0.0);
    }
}
