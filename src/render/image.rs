//! Image rendering for export layers using tiny-skia
//!
//! These functions draw onto the export canvas, an `RgbaImage` that is kept
//! fully opaque (it starts white), so its bytes are valid premultiplied data
//! for tiny-skia as-is.

use image::{RgbaImage, imageops};
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::geometry::{self, ink, pin};
use crate::domain::{ExportSize, InkStroke, Pin, RgbColor};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
pub(crate) fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    // Copy back
    img.copy_from_slice(pixmap.data());
}

fn solid_paint(color: RgbColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Create the export canvas pre-filled with white
pub fn blank_canvas(size: ExportSize) -> RgbaImage {
    RgbaImage::from_pixel(size.width(), size.height(), image::Rgba([255, 255, 255, 255]))
}

/// Draw a raster layer stretched over the whole canvas (source-over)
pub fn draw_stretched(canvas: &mut RgbaImage, layer: &RgbaImage) {
    if layer.width() == 0 || layer.height() == 0 {
        return;
    }
    if layer.dimensions() == canvas.dimensions() {
        imageops::overlay(canvas, layer, 0, 0);
    } else {
        let scaled = imageops::resize(
            layer,
            canvas.width(),
            canvas.height(),
            imageops::FilterType::Triangle,
        );
        imageops::overlay(canvas, &scaled, 0, 0);
    }
}

/// Draw vector ink strokes with rounded caps and joins
pub fn draw_ink_strokes(canvas: &mut RgbaImage, strokes: &[InkStroke], dpr: f32) {
    if strokes.is_empty() {
        return;
    }
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);

    with_pixmap(canvas, |pixmap| {
        for s in strokes {
            let width = (s.width * dpr).max(ink::MIN_WIDTH);
            let paint = solid_paint(s.color);
            let points: Vec<(f32, f32)> = s
                .points
                .iter()
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .map(|&(x, y)| (x * w, y * h))
                .collect();

            match points.as_slice() {
                [] => {}
                [(x, y)] => {
                    // A tap leaves a round dot
                    if let Some(path) = PathBuilder::from_circle(*x, *y, width / 2.0) {
                        pixmap.fill_path(
                            &path,
                            &paint,
                            FillRule::Winding,
                            Transform::identity(),
                            None,
                        );
                    }
                }
                [(x0, y0), rest @ ..] => {
                    let mut pb = PathBuilder::new();
                    pb.move_to(*x0, *y0);
                    for (x, y) in rest {
                        pb.line_to(*x, *y);
                    }
                    let Some(path) = pb.finish() else {
                        continue;
                    };
                    let stroke = Stroke {
                        width,
                        line_cap: LineCap::Round,
                        line_join: LineJoin::Round,
                        ..Default::default()
                    };
                    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                }
            }
        }
    });
}

/// Build a teardrop path whose tip touches (tip_x, tip_y)
fn build_teardrop_path(tip_x: f32, tip_y: f32, radius: f32) -> Option<tiny_skia::Path> {
    let (cx, cy) = pin::head_center(tip_x, tip_y, radius);
    let ((rx, ry), _) = pin::tangent_points(tip_x, tip_y, radius);

    let mut pb = PathBuilder::new();
    pb.move_to(tip_x, tip_y);
    pb.line_to(rx, ry);

    // Over the top of the head, from the right tangent point (30 degrees)
    // round to the left one (150 degrees)
    let start = std::f32::consts::FRAC_PI_6;
    let sweep = -4.0 * std::f32::consts::FRAC_PI_3;
    for (c1, c2, end) in geometry::arc_segments(cx, cy, radius, start, sweep) {
        pb.cubic_to(c1.0, c1.1, c2.0, c2.1, end.0, end.1);
    }

    pb.close();
    pb.finish()
}

/// Draw pin markers with their status badges
pub fn draw_pins(canvas: &mut RgbaImage, pins: &[Pin], dpr: f32) {
    if pins.is_empty() {
        return;
    }
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);

    with_pixmap(canvas, |pixmap| {
        let radius = pin::RADIUS * dpr;
        let outline = Stroke {
            width: pin::OUTLINE * dpr,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        let white = solid_paint(RgbColor::WHITE);

        for p in pins {
            if !p.x.is_finite() || !p.y.is_finite() {
                log::debug!("Skipping pin with invalid position ({}, {})", p.x, p.y);
                continue;
            }
            let (tip_x, tip_y) = (p.x * w, p.y * h);

            if let Some(body) = build_teardrop_path(tip_x, tip_y, radius) {
                pixmap.stroke_path(&body, &white, &outline, Transform::identity(), None);
                pixmap.fill_path(
                    &body,
                    &solid_paint(p.color.rgb()),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }

            let (cx, cy) = pin::head_center(tip_x, tip_y, radius);
            if let Some(dot) = PathBuilder::from_circle(cx, cy, radius * pin::DOT_RATIO) {
                pixmap.fill_path(&dot, &white, FillRule::Winding, Transform::identity(), None);
            }

            let (bx, by) = pin::badge_center(tip_x, tip_y, radius);
            let badge_radius = pin::BADGE_RADIUS * dpr;
            if let Some(ring) =
                PathBuilder::from_circle(bx, by, badge_radius + pin::BADGE_RING * dpr)
            {
                pixmap.fill_path(&ring, &white, FillRule::Winding, Transform::identity(), None);
            }
            if let Some(badge) = PathBuilder::from_circle(bx, by, badge_radius) {
                pixmap.fill_path(
                    &badge,
                    &solid_paint(p.status.badge_rgb()),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
        }
    });
}
