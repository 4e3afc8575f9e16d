//! The drawing currently presented to the user

use image::RgbaImage;

/// A floor plan or blueprint as it is shown on screen
#[derive(Clone, Debug)]
pub struct DrawingSurface {
    /// Identifier used to look up the drawing's pins
    pub id: String,
    /// Optional human readable name, used in share captions
    pub title: Option<String>,
    /// Rendered raster of the drawing (any backing resolution)
    pub image: RgbaImage,
    /// Measured on-screen width in logical pixels
    pub display_width: f32,
    /// Measured on-screen height in logical pixels
    pub display_height: f32,
}

impl DrawingSurface {
    /// Surface displayed at the image's own pixel size
    pub fn at_native_size(id: impl Into<String>, image: RgbaImage) -> Self {
        let (w, h) = (image.width() as f32, image.height() as f32);
        Self {
            id: id.into(),
            title: None,
            image,
            display_width: w,
            display_height: h,
        }
    }

    /// Override the measured display size
    pub fn with_display_size(mut self, width: f32, height: f32) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}
