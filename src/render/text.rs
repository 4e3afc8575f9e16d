//! Text label rasterization using resvg
//!
//! Labels are laid out as a small SVG document (one `<text>` per line) and
//! rendered straight into the export canvas, so glyph shaping and font
//! fallback come from fontdb's system font database.

use std::fmt::Write as _;
use std::sync::Arc;

use image::RgbaImage;
use resvg::usvg::{self, fontdb};

use super::geometry::text;
use super::image::with_pixmap;
use crate::domain::TextAnnotation;

/// Renders text annotations; holds the loaded font database
#[derive(Clone)]
pub struct TextRenderer {
    fontdb: Arc<fontdb::Database>,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl TextRenderer {
    /// Load the system fonts (slow, do it once)
    pub fn with_system_fonts() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        log::debug!("Loaded {} font faces", db.len());
        resolve_sans_serif(&mut db);
        Self::with_fontdb(Arc::new(db))
    }

    /// Use an existing font database
    pub fn with_fontdb(fontdb: Arc<fontdb::Database>) -> Self {
        Self { fontdb }
    }

    /// Draw every non-blank annotation onto the canvas
    pub fn draw(&self, canvas: &mut RgbaImage, annotations: &[TextAnnotation], dpr: f32) {
        let Some(svg) = build_svg(canvas.width(), canvas.height(), annotations, dpr) else {
            return;
        };
        if self.fontdb.is_empty() {
            log::warn!("No fonts available, text annotations are left out");
            return;
        }

        let opt = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = match usvg::Tree::from_str(&svg, &opt) {
            Ok(tree) => tree,
            Err(err) => {
                log::error!("Failed to lay out text annotations: {}", err);
                return;
            }
        };

        with_pixmap(canvas, |pixmap| {
            resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
        });
    }
}

/// Families tried for `sans-serif` when fontdb's default is not installed
const SANS_SERIF_FALLBACKS: &[&str] = &[
    "DejaVu Sans",
    "Noto Sans",
    "Liberation Sans",
    "Cantarell",
    "Arial",
];

fn has_family(db: &fontdb::Database, name: &str) -> bool {
    db.faces()
        .any(|face| face.families.iter().any(|(family, _)| family == name))
}

/// Point the generic `sans-serif` family at a face that is installed
///
/// usvg drops `<text>` nodes whose family resolves to nothing, so a stale
/// mapping would leave every label out without an error.
fn resolve_sans_serif(db: &mut fontdb::Database) {
    let current = db.family_name(&fontdb::Family::SansSerif).to_string();
    if has_family(db, &current) {
        return;
    }
    let replacement = SANS_SERIF_FALLBACKS
        .iter()
        .find(|name| has_family(db, name))
        .map(|name| name.to_string())
        .or_else(|| {
            db.faces()
                .find_map(|face| face.families.first().map(|(family, _)| family.clone()))
        });
    if let Some(family) = replacement {
        log::debug!("sans-serif maps to missing {:?}, using {:?}", current, family);
        db.set_sans_serif_family(family);
    }
}

/// Escape text for use inside an XML element or attribute
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Build the SVG for the text layer, or `None` when nothing is visible
pub fn build_svg(
    width: u32,
    height: u32,
    annotations: &[TextAnnotation],
    dpr: f32,
) -> Option<String> {
    let (w, h) = (width as f32, height as f32);
    let mut body = String::new();

    for ann in annotations {
        if ann.is_blank() {
            continue;
        }
        if !ann.x.is_finite() || !ann.y.is_finite() {
            continue;
        }
        let size = ann.font_size * dpr;
        if !size.is_finite() || size <= 0.0 {
            continue;
        }

        let x = ann.x * w;
        let color = ann.rgb().to_hex();
        for (i, line) in ann.text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let y = ann.y * h + i as f32 * size * text::LINE_HEIGHT;
            // paint-order puts the white outline beneath the fill
            let _ = writeln!(
                body,
                r##"<text x="{x}" y="{y}" font-family="{family}" font-size="{size}" fill="{color}" stroke="#ffffff" stroke-width="{outline}" stroke-linejoin="round" paint-order="stroke" text-anchor="start" dominant-baseline="text-before-edge" xml:space="preserve">{content}</text>"##,
                family = text::FONT_FAMILY,
                outline = text::OUTLINE * dpr,
                content = escape_xml(line),
            );
        }
    }

    if body.is_empty() {
        return None;
    }
    Some(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
{body}</svg>"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> TextAnnotation {
        TextAnnotation {
            x: 0.25,
            y: 0.5,
            font_size: 10.0,
            color: "#ff0000".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_blank_labels_produce_no_svg() {
        assert!(build_svg(100, 100, &[label(""), label("  \n\t ")], 1.0).is_none());
        assert!(build_svg(100, 100, &[], 1.0).is_none());
    }

    #[test]
    fn test_blank_labels_leave_canvas_untouched() {
        let renderer = TextRenderer::with_fontdb(Arc::new(fontdb::Database::new()));
        let mut canvas = RgbaImage::from_pixel(32, 32, image::Rgba([255, 255, 255, 255]));
        renderer.draw(&mut canvas, &[label("   ")], 1.0);
        assert!(canvas.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_position_and_scale_follow_dpr() {
        let svg = build_svg(200, 100, &[label("Kitchen")], 2.0).unwrap();
        assert!(svg.contains(r#"x="50""#));
        assert!(svg.contains(r#"y="50""#));
        assert!(svg.contains(r#"font-size="20""#));
        assert!(svg.contains(r#"stroke-width="6""#));
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains(">Kitchen</text>"));
    }

    #[test]
    fn test_multiline_labels_advance_per_line() {
        let svg = build_svg(100, 100, &[label("Wall\nA & B")], 1.0).unwrap();
        assert_eq!(svg.matches("<text ").count(), 2);
        let second = 0.5_f32 * 100.0 + 1.0_f32 * 10.0 * text::LINE_HEIGHT;
        assert!(svg.contains(&format!(r#"y="{second}""#)));
        assert!(svg.contains(">A &amp; B</text>"));
    }

    /// System fonts, or `None` on a machine without any
    fn system_renderer() -> Option<TextRenderer> {
        let renderer = TextRenderer::with_system_fonts();
        if renderer.fontdb.is_empty() {
            eprintln!("no system fonts, skipping raster text check");
            return None;
        }
        Some(renderer)
    }

    fn is_dark(p: &image::Rgba<u8>) -> bool {
        p.0[..3].iter().all(|&c| c < 100)
    }

    #[test]
    fn test_sans_serif_resolves_to_installed_face() {
        let Some(renderer) = system_renderer() else {
            return;
        };
        let family = renderer.fontdb.family_name(&fontdb::Family::SansSerif);
        assert!(has_family(&renderer.fontdb, family), "{family} is not installed");
    }

    #[test]
    fn test_label_draws_glyphs_from_anchor() {
        let Some(renderer) = system_renderer() else {
            return;
        };
        let mut canvas = RgbaImage::from_pixel(200, 100, image::Rgba([255, 255, 255, 255]));
        let mut kitchen = label("Kitchen");
        kitchen.color = "#000000".to_string();
        kitchen.font_size = 20.0;
        renderer.draw(&mut canvas, &[kitchen], 1.0);

        let dark: Vec<(u32, u32)> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| is_dark(p))
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!dark.is_empty(), "label left no glyphs");

        // Anchor is (0.25 * 200, 0.5 * 100); left-aligned, hanging below it
        let min_x = dark.iter().map(|&(x, _)| x).min().unwrap();
        let min_y = dark.iter().map(|&(_, y)| y).min().unwrap();
        assert!(min_x >= 49, "glyphs start left of the anchor at x={min_x}");
        assert!(min_y >= 49, "glyphs start above the anchor at y={min_y}");
        assert!(min_x < 70 && min_y < 70);
    }

    #[test]
    fn test_label_outline_is_white_under_fill() {
        let Some(renderer) = system_renderer() else {
            return;
        };
        let mut canvas = RgbaImage::from_pixel(200, 100, image::Rgba([30, 30, 30, 255]));
        let mut wall = label("Wall");
        wall.font_size = 32.0;
        wall.y = 0.2;
        renderer.draw(&mut canvas, &[wall], 1.0);

        let white = canvas
            .pixels()
            .filter(|p| p.0[..3].iter().all(|&c| c > 240))
            .count();
        let red = canvas
            .pixels()
            .filter(|p| p.0[0] > 200 && p.0[1] < 60 && p.0[2] < 60)
            .count();
        assert!(white > 0, "no outline around the label");
        assert!(red > 0, "fill missing, outline painted over it");
    }

    #[test]
    fn test_markup_is_escaped() {
        let svg = build_svg(10, 10, &[label("<b>\"hi\"</b>")], 1.0).unwrap();
        assert!(svg.contains("&lt;b&gt;&quot;hi&quot;&lt;/b&gt;"));
    }
}
