//! Layer compositing
//!
//! Layer order is fixed: white background, base drawing, free-hand ink,
//! pins, text. Each layer is drawn source-over on top of the previous ones.

use image::RgbaImage;

use super::ExportError;
use crate::domain::{
    DrawingSurface, ExportSize, FreehandLayer, Pin, TextAnnotation, effective_dpr,
};
use crate::render::image::{blank_canvas, draw_ink_strokes, draw_pins, draw_stretched};
use crate::render::text::TextRenderer;

/// The annotation layers drawn over a drawing
#[derive(Clone, Copy, Debug, Default)]
pub struct Layers<'a> {
    pub freehand: Option<&'a FreehandLayer>,
    pub pins: &'a [Pin],
    pub texts: &'a [TextAnnotation],
}

/// Output size for a drawing, or the precondition error
pub fn export_size(drawing: &DrawingSurface, dpr: f32) -> Result<ExportSize, ExportError> {
    ExportSize::from_display(drawing.display_width, drawing.display_height, dpr).ok_or(
        ExportError::EmptyDrawing {
            width: drawing.display_width,
            height: drawing.display_height,
        },
    )
}

/// Flatten a drawing and its layers into one opaque image
pub fn compose(
    drawing: &DrawingSurface,
    layers: &Layers<'_>,
    dpr: f32,
    text: &TextRenderer,
) -> Result<RgbaImage, ExportError> {
    let size = export_size(drawing, dpr)?;
    let dpr = effective_dpr(dpr);
    log::debug!(
        "Compositing drawing {} at {}x{} (dpr {})",
        drawing.id,
        size.width(),
        size.height(),
        dpr
    );

    let mut canvas = blank_canvas(size);
    draw_stretched(&mut canvas, &drawing.image);

    match layers.freehand {
        Some(FreehandLayer::Raster(ink)) => draw_stretched(&mut canvas, ink),
        Some(FreehandLayer::Strokes(strokes)) => draw_ink_strokes(&mut canvas, strokes, dpr),
        None => {}
    }

    draw_pins(&mut canvas, layers.pins, dpr);
    text.draw(&mut canvas, layers.texts, dpr);

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InkStroke, PinColor, PinStatus, RgbColor};
    use crate::render::geometry::pin;
    use resvg::usvg::fontdb;
    use std::sync::Arc;

    fn no_fonts() -> TextRenderer {
        TextRenderer::with_fontdb(Arc::new(fontdb::Database::new()))
    }

    fn gray_drawing(w: u32, h: u32) -> DrawingSurface {
        let image = RgbaImage::from_pixel(w, h, image::Rgba([128, 128, 128, 255]));
        DrawingSurface::at_native_size("plan", image)
    }

    #[test]
    fn test_output_matches_display_size_times_dpr() {
        // Backing store resolution does not matter, only the measured size
        let drawing = gray_drawing(1000, 800).with_display_size(150.3, 80.4);
        let canvas = compose(&drawing, &Layers::default(), 2.0, &no_fonts()).unwrap();
        assert_eq!(canvas.dimensions(), (301, 161));
    }

    #[test]
    fn test_zero_size_is_a_precondition_error() {
        let drawing = gray_drawing(10, 10).with_display_size(0.0, 100.0);
        let err = compose(&drawing, &Layers::default(), 1.0, &no_fonts()).unwrap_err();
        assert!(matches!(err, ExportError::EmptyDrawing { .. }));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_transparent_drawing_sits_on_white() {
        let drawing = DrawingSurface::at_native_size("plan", RgbaImage::new(16, 16));
        let canvas = compose(&drawing, &Layers::default(), 1.0, &no_fonts()).unwrap();
        assert!(canvas.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_raster_ink_is_drawn_over_drawing() {
        let drawing = gray_drawing(20, 20);
        let mut ink = RgbaImage::new(10, 10);
        ink.put_pixel(0, 0, image::Rgba([0, 0, 255, 255]));
        let freehand = FreehandLayer::Raster(ink);
        let layers = Layers {
            freehand: Some(&freehand),
            ..Default::default()
        };
        let canvas = compose(&drawing, &layers, 1.0, &no_fonts()).unwrap();
        // Far corner keeps the drawing
        assert_eq!(canvas.get_pixel(19, 19).0, [128, 128, 128, 255]);
        assert_ne!(canvas.get_pixel(0, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_pin_occludes_ink_stroke() {
        let drawing = gray_drawing(200, 200);
        let black = RgbColor::new(0, 0, 0);
        // Thick horizontal stroke right through the pin body
        let tip_y = 0.6;
        let body_y = tip_y - pin::RADIUS / 200.0;
        let freehand = FreehandLayer::Strokes(vec![InkStroke {
            points: vec![(0.0, body_y), (1.0, body_y)],
            color: black,
            width: 12.0,
        }]);
        let pins = [Pin {
            x: 0.5,
            y: tip_y,
            color: PinColor::Green,
            status: PinStatus::Todo,
        }];
        let layers = Layers {
            freehand: Some(&freehand),
            pins: &pins,
            texts: &[],
        };
        let canvas = compose(&drawing, &layers, 1.0, &no_fonts()).unwrap();

        let y = (body_y * 200.0) as u32;
        assert_eq!(canvas.get_pixel(100, y).0, PinColor::Green.rgb().to_rgba_u8());
        // Away from the pin the stroke is still visible
        assert_eq!(canvas.get_pixel(20, y).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_blank_text_leaves_no_marks() {
        let drawing = gray_drawing(32, 32);
        let texts = [TextAnnotation {
            x: 0.1,
            y: 0.1,
            font_size: 20.0,
            color: "#000000".to_string(),
            text: "   ".to_string(),
        }];
        let layers = Layers {
            texts: &texts,
            ..Default::default()
        };
        let renderer = TextRenderer::with_system_fonts();
        let canvas = compose(&drawing, &layers, 1.0, &renderer).unwrap();
        assert!(canvas.pixels().all(|p| p.0 == [128, 128, 128, 255]));
    }
}
