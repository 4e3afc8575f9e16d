//! Composite export of an annotated drawing
//!
//! This module consolidates:
//! - Layer compositing (compose.rs)
//! - JPEG encoding (encode.rs)
//! - Failure and warning types (error.rs)
//!
//! `Exporter::export` runs the whole pipeline: precondition checks, pin
//! lookup, compositing, encoding and delivery.

pub mod compose;
pub mod encode;
pub mod error;

pub use compose::{Layers, compose};
pub use encode::{DEFAULT_JPEG_QUALITY, EncodedImage, encode_jpeg};
pub use error::{ExportError, ExportWarning};

use crate::busy::{BusyGuard, BusyIndicator};
use crate::delivery::{
    Delivery, DeliveryOutcome, DownloadTarget, ShareRequest, ShareTarget, today_file_name,
};
use crate::domain::{DrawingSurface, FreehandLayer, TextAnnotation};
use crate::fl;
use crate::render::text::TextRenderer;
use crate::store::PinStore;

/// Everything the export reads, passed in explicitly
pub struct ExportContext<'a, P> {
    /// The drawing on screen, `None` when nothing is shown
    pub drawing: Option<&'a DrawingSurface>,
    pub freehand: Option<&'a FreehandLayer>,
    pub pins: &'a P,
    pub texts: &'a [TextAnnotation],
    pub device_pixel_ratio: f32,
}

/// Tunables for the produced file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSettings {
    pub jpeg_quality: u8,
    pub file_prefix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            file_prefix: "Drawing".to_string(),
        }
    }
}

/// Result of a finished export
#[derive(Debug)]
pub struct ExportReport {
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    pub outcome: DeliveryOutcome,
    pub warnings: Vec<ExportWarning>,
}

/// Runs exports with a shared text renderer
pub struct Exporter {
    text: TextRenderer,
    settings: ExportSettings,
}

impl Exporter {
    pub fn new(text: TextRenderer, settings: ExportSettings) -> Self {
        Self { text, settings }
    }

    /// Composite, encode and deliver the current drawing
    ///
    /// The busy indicator is visible for the whole call and hidden on
    /// every return path.
    pub async fn export<P, S, D, B>(
        &self,
        ctx: ExportContext<'_, P>,
        delivery: &Delivery<S, D>,
        busy: &B,
    ) -> Result<ExportReport, ExportError>
    where
        P: PinStore,
        S: ShareTarget,
        D: DownloadTarget,
        B: BusyIndicator + ?Sized,
    {
        let _busy = BusyGuard::show(busy, &fl!("exporting"));

        let drawing = ctx.drawing.ok_or(ExportError::NoDrawing)?;
        // Checked before any store access or drawing
        compose::export_size(drawing, ctx.device_pixel_ratio)?;

        let mut warnings = Vec::new();
        let pins = match ctx.pins.pins_for(&drawing.id).await {
            Ok(pins) => pins,
            Err(err) => {
                log::warn!(
                    "Could not load pins for {}, exporting without them: {}",
                    drawing.id,
                    err
                );
                warnings.push(ExportWarning::PinsUnavailable(err.to_string()));
                Vec::new()
            }
        };

        // Rasterizing and encoding both run off the runtime thread
        let surface = drawing.clone();
        let freehand = ctx.freehand.cloned();
        let texts = ctx.texts.to_vec();
        let text = self.text.clone();
        let dpr = ctx.device_pixel_ratio;
        let quality = self.settings.jpeg_quality;
        let image = tokio::task::spawn_blocking(move || {
            let layers = Layers {
                freehand: freehand.as_ref(),
                pins: &pins,
                texts: &texts,
            };
            let canvas = compose(&surface, &layers, dpr, &text)?;
            encode_jpeg(canvas, quality)
        })
        .await
        .map_err(|err| ExportError::Encode(err.to_string()))??;

        let request = ShareRequest::new(
            drawing.title.as_deref(),
            today_file_name(&self.settings.file_prefix),
        );
        let outcome = delivery
            .deliver(&image, &request)
            .await
            .map_err(ExportError::Delivery)?;

        Ok(ExportReport {
            width: image.width,
            height: image.height,
            bytes: image.bytes.len(),
            outcome,
            warnings,
        })
    }
}
