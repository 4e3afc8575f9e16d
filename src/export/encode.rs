//! JPEG encoding of the flattened canvas

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, RgbaImage};

use super::ExportError;

/// Quality used unless configured otherwise
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// An encoded export ready for delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub const MIME_TYPE: &'static str = "image/jpeg";
}

/// Encode the canvas as JPEG; alpha is dropped (the canvas is opaque)
pub fn encode_jpeg(canvas: RgbaImage, quality: u8) -> Result<EncodedImage, ExportError> {
    let quality = quality.clamp(1, 100);
    let (width, height) = canvas.dimensions();
    let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|err| ExportError::Encode(err.to_string()))?;

    if bytes.is_empty() {
        return Err(ExportError::Encode("encoder produced no data".to_string()));
    }
    log::debug!(
        "Encoded {}x{} JPEG at quality {}: {} bytes",
        width,
        height,
        quality,
        bytes.len()
    );
    Ok(EncodedImage {
        bytes,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_image_decodes_with_same_size() {
        let canvas = RgbaImage::from_pixel(37, 21, image::Rgba([255, 255, 255, 255]));
        let encoded = encode_jpeg(canvas, DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(&encoded.bytes[..2], &[0xff, 0xd8]);

        let decoded = image::load_from_memory(&encoded.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (37, 21));
    }

    #[test]
    fn test_quality_affects_size() {
        let mut canvas = RgbaImage::new(64, 64);
        for (x, y, p) in canvas.enumerate_pixels_mut() {
            *p = image::Rgba([(x * 4) as u8, (y * 4) as u8, ((x ^ y) * 4) as u8, 255]);
        }
        let low = encode_jpeg(canvas.clone(), 10).unwrap();
        let high = encode_jpeg(canvas, 100).unwrap();
        assert!(low.bytes.len() < high.bytes.len());
    }

    #[test]
    fn test_zero_quality_is_clamped() {
        let canvas = RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 255]));
        assert!(encode_jpeg(canvas, 0).is_ok());
    }
}
