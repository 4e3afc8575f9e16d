//! Annotation records layered on top of a drawing
//!
//! All annotation types store positions as fractions (0..1) of the drawing's
//! width and height, so they are independent of the export resolution.

use serde::{Deserialize, Serialize};

use super::color::RgbColor;

/// Color category of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PinColor {
    #[default]
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Gray,
}

impl PinColor {
    pub fn name(self) -> &'static str {
        match self {
            PinColor::Red => "red",
            PinColor::Orange => "orange",
            PinColor::Yellow => "yellow",
            PinColor::Green => "green",
            PinColor::Blue => "blue",
            PinColor::Purple => "purple",
            PinColor::Gray => "gray",
        }
    }

    /// Fill color of the marker body
    pub fn rgb(self) -> RgbColor {
        match self {
            PinColor::Red => RgbColor::new(0xdc, 0x26, 0x26),
            PinColor::Orange => RgbColor::new(0xea, 0x58, 0x0c),
            PinColor::Yellow => RgbColor::new(0xca, 0x8a, 0x04),
            PinColor::Green => RgbColor::new(0x16, 0xa3, 0x4a),
            PinColor::Blue => RgbColor::new(0x25, 0x63, 0xeb),
            PinColor::Purple => RgbColor::new(0x93, 0x33, 0xea),
            PinColor::Gray => RgbColor::new(0x4b, 0x55, 0x63),
        }
    }
}

impl From<String> for PinColor {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "orange" => PinColor::Orange,
            "yellow" => PinColor::Yellow,
            "green" => PinColor::Green,
            "blue" => PinColor::Blue,
            "purple" => PinColor::Purple,
            "gray" | "grey" => PinColor::Gray,
            "red" => PinColor::Red,
            other => {
                log::debug!("Unknown pin color {:?}, using default", other);
                PinColor::default()
            }
        }
    }
}

impl From<PinColor> for String {
    fn from(c: PinColor) -> Self {
        c.name().to_string()
    }
}

/// Workflow status of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PinStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl PinStatus {
    pub fn name(self) -> &'static str {
        match self {
            PinStatus::Todo => "todo",
            PinStatus::InProgress => "in-progress",
            PinStatus::Done => "done",
        }
    }

    /// Badge color: red, amber, green
    pub fn badge_rgb(self) -> RgbColor {
        match self {
            PinStatus::Todo => RgbColor::new(0xef, 0x44, 0x44),
            PinStatus::InProgress => RgbColor::new(0xf5, 0x9e, 0x0b),
            PinStatus::Done => RgbColor::new(0x22, 0xc5, 0x5e),
        }
    }
}

impl From<String> for PinStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "in-progress" | "inprogress" | "progress" => PinStatus::InProgress,
            "done" | "complete" | "completed" => PinStatus::Done,
            _ => PinStatus::Todo,
        }
    }
}

impl From<PinStatus> for String {
    fn from(s: PinStatus) -> Self {
        s.name().to_string()
    }
}

/// A positioned workflow marker on a drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Horizontal position as a fraction of the drawing width
    pub x: f32,
    /// Vertical position as a fraction of the drawing height
    pub y: f32,
    #[serde(default)]
    pub color: PinColor,
    #[serde(default)]
    pub status: PinStatus,
}

/// A text label placed on a drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub x: f32,
    pub y: f32,
    /// Font size in logical pixels
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// `#rrggbb`; unparsable values render black
    #[serde(default = "default_text_color")]
    pub color: String,
    pub text: String,
}

fn default_font_size() -> f32 {
    16.0
}

fn default_text_color() -> String {
    "#000000".to_string()
}

impl TextAnnotation {
    /// Whether this annotation would produce any glyphs
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn rgb(&self) -> RgbColor {
        RgbColor::from_hex(&self.color).unwrap_or(RgbColor::BLACK)
    }
}

/// A vector free-hand ink stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InkStroke {
    /// Polyline points as fractions of the drawing size
    pub points: Vec<(f32, f32)>,
    pub color: RgbColor,
    /// Line width in logical pixels
    #[serde(default = "default_ink_width")]
    pub width: f32,
}

fn default_ink_width() -> f32 {
    3.0
}

/// The user's free-hand ink, either already rasterized or as strokes
#[derive(Debug, Clone)]
pub enum FreehandLayer {
    /// Transparent surface covering the displayed drawing
    Raster(image::RgbaImage),
    Strokes(Vec<InkStroke>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_decoding_is_tolerant() {
        let pins: Vec<Pin> = serde_json::from_str(
            r#"[
                {"x": 0.5, "y": 0.25, "color": "Blue", "status": "in_progress", "label": "A1"},
                {"x": 0.1, "y": 0.9, "color": "magenta", "status": "whatever"},
                {"x": 0.0, "y": 0.0}
            ]"#,
        )
        .unwrap();

        assert_eq!(pins[0].color, PinColor::Blue);
        assert_eq!(pins[0].status, PinStatus::InProgress);
        assert_eq!(pins[1].color, PinColor::Red);
        assert_eq!(pins[1].status, PinStatus::Todo);
        assert_eq!(pins[2].color, PinColor::Red);
        assert_eq!(pins[2].status, PinStatus::Todo);
    }

    #[test]
    fn test_status_badge_colors() {
        assert_eq!(PinStatus::Todo.badge_rgb().to_hex(), "#ef4444");
        assert_eq!(PinStatus::InProgress.badge_rgb().to_hex(), "#f59e0b");
        assert_eq!(PinStatus::Done.badge_rgb().to_hex(), "#22c55e");
    }

    #[test]
    fn test_blank_text_detection() {
        let mut text = TextAnnotation {
            x: 0.0,
            y: 0.0,
            font_size: 12.0,
            color: "#123456".to_string(),
            text: " \t\n ".to_string(),
        };
        assert!(text.is_blank());
        text.text = " Wall A ".to_string();
        assert!(!text.is_blank());
    }

    #[test]
    fn test_text_color_falls_back_to_black() {
        let text: TextAnnotation =
            serde_json::from_str(r#"{"x": 0.1, "y": 0.2, "color": "nope", "text": "x"}"#).unwrap();
        assert_eq!(text.rgb(), RgbColor::BLACK);
        assert_eq!(text.font_size, 16.0);
    }
}
