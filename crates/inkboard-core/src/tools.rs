//! Drawing tools and stroke style.

use serde::{Deserialize, Serialize};

/// Default pen width in surface pixels.
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;
/// Eraser width in surface pixels.
pub const ERASER_WIDTH: f64 = 20.0;
/// Smallest line width the user can pick.
pub const MIN_LINE_WIDTH: f64 = 1.0;
/// Largest line width the user can pick.
pub const MAX_LINE_WIDTH: f64 = 50.0;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. Returns `None` for anything else.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = channel(0..1)? * 17;
                let g = channel(1..2)? * 17;
                let b = channel(2..3)? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Parse a hex color, falling back to black.
    pub fn parse(color: &str) -> Self {
        Self::from_hex(color).unwrap_or_else(Self::black)
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Rectangle,
}

impl ToolKind {
    /// Compositing used when this tool paints.
    pub fn composite(&self) -> CompositeMode {
        match self {
            ToolKind::Eraser => CompositeMode::DestinationOut,
            ToolKind::Pen | ToolKind::Rectangle => CompositeMode::SourceOver,
        }
    }
}

/// How painted pixels combine with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompositeMode {
    /// Paint over existing pixels.
    #[default]
    SourceOver,
    /// Remove existing pixels where the brush covers them.
    DestinationOut,
}

/// Style applied to the stroke being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub composite: CompositeMode,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::black(),
            width: DEFAULT_LINE_WIDTH,
            composite: CompositeMode::SourceOver,
        }
    }
}

/// Current tool plus the pen settings that survive switching to the eraser.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    tool: ToolKind,
    color: Color,
    pen_width: f64,
    eraser_width: f64,
    min_width: f64,
    max_width: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_WIDTH, ERASER_WIDTH, MIN_LINE_WIDTH, MAX_LINE_WIDTH)
    }
}

impl ToolSettings {
    pub fn new(pen_width: f64, eraser_width: f64, min_width: f64, max_width: f64) -> Self {
        Self {
            tool: ToolKind::default(),
            color: Color::black(),
            pen_width: pen_width.clamp(min_width, max_width),
            eraser_width,
            min_width,
            max_width,
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Set the width of the active tool, clamped to the allowed range.
    pub fn set_line_width(&mut self, width: f64) {
        let width = if width.is_nan() { self.min_width } else { width };
        let width = width.clamp(self.min_width, self.max_width);
        match self.tool {
            ToolKind::Eraser => self.eraser_width = width,
            ToolKind::Pen | ToolKind::Rectangle => self.pen_width = width,
        }
    }

    /// Width of the active tool.
    pub fn line_width(&self) -> f64 {
        match self.tool {
            ToolKind::Eraser => self.eraser_width,
            ToolKind::Pen | ToolKind::Rectangle => self.pen_width,
        }
    }

    /// The style a stroke started now would use.
    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle {
            color: self.color,
            width: self.line_width(),
            composite: self.tool.composite(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::white()));
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::new(255, 128, 0, 255)));
        assert_eq!(Color::from_hex("#11223344"), Some(Color::new(0x11, 0x22, 0x33, 0x44)));
        assert_eq!(Color::from_hex(" #000000 "), Some(Color::black()));
    }

    #[test]
    fn test_parse_invalid_falls_back_to_black() {
        assert_eq!(Color::from_hex("red"), None);
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#gggggg"), None);
        assert_eq!(Color::parse("hsl(10, 100%, 50%)"), Color::black());
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!(Color::new(255, 128, 0, 255).to_hex(), "#ff8000");
        assert_eq!(Color::new(1, 2, 3, 4).to_hex(), "#01020304");
    }

    #[test]
    fn test_eraser_uses_destination_out() {
        let mut settings = ToolSettings::default();
        assert_eq!(settings.stroke_style().composite, CompositeMode::SourceOver);

        settings.set_tool(ToolKind::Eraser);
        let style = settings.stroke_style();
        assert_eq!(style.composite, CompositeMode::DestinationOut);
        assert_eq!(style.width, ERASER_WIDTH);
    }

    #[test]
    fn test_pen_width_survives_eraser() {
        let mut settings = ToolSettings::default();
        settings.set_line_width(8.0);
        settings.set_tool(ToolKind::Eraser);
        assert_eq!(settings.line_width(), ERASER_WIDTH);

        settings.set_tool(ToolKind::Pen);
        assert_eq!(settings.line_width(), 8.0);
    }

    #[test]
    fn test_line_width_clamped() {
        let mut settings = ToolSettings::default();
        settings.set_line_width(0.2);
        assert_eq!(settings.line_width(), MIN_LINE_WIDTH);
        settings.set_line_width(400.0);
        assert_eq!(settings.line_width(), MAX_LINE_WIDTH);
        settings.set_line_width(f64::NAN);
        assert_eq!(settings.line_width(), MIN_LINE_WIDTH);
    }
}
