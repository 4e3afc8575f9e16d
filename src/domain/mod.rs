//! Pure domain types with minimal dependencies
//!
//! This module contains the records read by the export pipeline.
//! Types here should have no rendering or delivery dependencies
//! to avoid circular dependencies.

pub mod annotation;
pub mod color;
pub mod drawing;
pub mod geometry;

pub use annotation::*;
pub use color::*;
pub use drawing::*;
pub use geometry::*;
