//! Export resolution and coordinate conversion

use std::num::NonZeroU32;

/// Device pixel ratio used when the reported one is unusable
pub const DEFAULT_DPR: f32 = 1.0;

/// Sanitize a device pixel ratio (non-finite or non-positive becomes 1.0)
#[inline]
pub fn effective_dpr(dpr: f32) -> f32 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr
    } else {
        DEFAULT_DPR
    }
}

/// Non-zero pixel dimensions of the exported image
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportSize {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl ExportSize {
    /// Output size for a surface measured at `width x height` logical pixels
    ///
    /// Returns `None` when either side rounds to zero or is not finite.
    pub fn from_display(width: f32, height: f32, dpr: f32) -> Option<Self> {
        let dpr = effective_dpr(dpr);
        let scaled = |v: f32| -> Option<NonZeroU32> {
            if !v.is_finite() || v <= 0.0 {
                return None;
            }
            let px = (v * dpr).round();
            if px > u32::MAX as f32 {
                return None;
            }
            NonZeroU32::new(px as u32)
        };
        Some(Self {
            width: scaled(width)?,
            height: scaled(height)?,
        })
    }

    /// Get the width as u32
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    /// Get the height as u32
    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_is_rounded_product() {
        let size = ExportSize::from_display(100.4, 50.6, 2.0).unwrap();
        assert_eq!((size.width(), size.height()), (201, 101));

        let size = ExportSize::from_display(333.0, 200.0, 1.5).unwrap();
        assert_eq!((size.width(), size.height()), (500, 300));
    }

    #[test]
    fn test_bad_dpr_falls_back_to_one() {
        for dpr in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            let size = ExportSize::from_display(64.0, 32.0, dpr).unwrap();
            assert_eq!((size.width(), size.height()), (64, 32));
        }
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(ExportSize::from_display(0.0, 10.0, 1.0).is_none());
        assert!(ExportSize::from_display(10.0, 0.0, 1.0).is_none());
        assert!(ExportSize::from_display(0.2, 10.0, 1.0).is_none());
        assert!(ExportSize::from_display(f32::NAN, 10.0, 1.0).is_none());
    }
}
