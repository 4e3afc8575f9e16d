//! Annotation rendering module
//!
//! This module contains:
//! - Geometry calculations for pins, ink and text
//! - Raster layer drawing using tiny-skia (pins, ink strokes)
//! - Text layer rasterization using resvg

pub mod geometry;
pub mod image;
pub mod text;
