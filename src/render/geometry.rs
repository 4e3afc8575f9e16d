//! Shared geometry calculations for annotation layers
//!
//! All lengths here are in logical pixels and get multiplied by the
//! device pixel ratio before drawing.

/// Pin marker geometry
pub mod pin {
    /// Radius of the marker head
    pub const RADIUS: f32 = 9.0;
    /// White outline around the marker body
    pub const OUTLINE: f32 = 1.5;
    /// Inner white dot radius as a fraction of the head radius
    pub const DOT_RATIO: f32 = 0.38;
    /// Status badge radius
    pub const BADGE_RADIUS: f32 = 4.5;
    /// White ring around the status badge
    pub const BADGE_RING: f32 = 1.5;

    /// Center of the marker head for a tip at (tip_x, tip_y)
    ///
    /// The head sits two radii above the tip so the tangent lines meet the
    /// circle at +-60 degrees from the vertical.
    #[inline]
    pub fn head_center(tip_x: f32, tip_y: f32, radius: f32) -> (f32, f32) {
        (tip_x, tip_y - 2.0 * radius)
    }

    /// Points where the two tangent lines from the tip touch the head
    /// Returns ((right_x, right_y), (left_x, left_y))
    pub fn tangent_points(tip_x: f32, tip_y: f32, radius: f32) -> ((f32, f32), (f32, f32)) {
        let (cx, cy) = head_center(tip_x, tip_y, radius);
        let (sin, cos) = std::f32::consts::FRAC_PI_3.sin_cos();
        let dx = radius * sin;
        let dy = radius * cos;
        ((cx + dx, cy + dy), (cx - dx, cy + dy))
    }

    /// Center of the status badge, above-right of the tip
    #[inline]
    pub fn badge_center(tip_x: f32, tip_y: f32, radius: f32) -> (f32, f32) {
        (tip_x + radius, tip_y - 3.0 * radius)
    }
}

/// Text label geometry
pub mod text {
    /// White outline stroke width beneath the glyph fill
    pub const OUTLINE: f32 = 3.0;
    /// Line advance as a multiple of the font size
    pub const LINE_HEIGHT: f32 = 1.2;
    /// Font family requested for labels
    pub const FONT_FAMILY: &str = "sans-serif";
}

/// Free-hand ink geometry
pub mod ink {
    /// Thinnest stroke drawn, in output pixels
    pub const MIN_WIDTH: f32 = 1.0;
}

/// Cubic bezier segments approximating a circular arc
///
/// Angles are in radians in screen space (y down). Returns one
/// `(c1, c2, end)` triple per segment; each segment spans at most 90 degrees.
pub fn arc_segments(
    cx: f32,
    cy: f32,
    radius: f32,
    start: f32,
    sweep: f32,
) -> Vec<((f32, f32), (f32, f32), (f32, f32))> {
    let count = (sweep.abs() / std::f32::consts::FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / count as f32;
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    let mut segments = Vec::with_capacity(count);
    let mut a0 = start;
    for _ in 0..count {
        let a1 = a0 + step;
        let (s0, c0) = a0.sin_cos();
        let (s1, c1) = a1.sin_cos();
        let ctrl1 = (cx + radius * (c0 - k * s0), cy + radius * (s0 + k * c0));
        let ctrl2 = (cx + radius * (c1 + k * s1), cy + radius * (s1 - k * c1));
        let end = (cx + radius * c1, cy + radius * s1);
        segments.push((ctrl1, ctrl2, end));
        a0 = a1;
    }
    segments
}
