//! Export failure taxonomy

use crate::fl;

/// Why an export did not produce an image
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Nothing is on screen to export
    #[error("no drawing is visible")]
    NoDrawing,
    /// The drawing is on screen but measures zero
    #[error("drawing has no visible size ({width}x{height})")]
    EmptyDrawing { width: f32, height: f32 },
    #[error("failed to encode image: {0}")]
    Encode(String),
    #[error("failed to deliver image: {0:#}")]
    Delivery(anyhow::Error),
}

impl ExportError {
    /// Localized message for the user
    pub fn user_message(&self) -> String {
        match self {
            ExportError::NoDrawing => fl!("export-no-drawing"),
            ExportError::EmptyDrawing { width, height } => fl!(
                "export-empty-drawing",
                width = width.to_string(),
                height = height.to_string()
            ),
            ExportError::Encode(_) => fl!("export-failed"),
            ExportError::Delivery(_) => fl!("export-delivery-failed"),
        }
    }

    /// Whether the export stopped before anything was drawn
    pub fn is_precondition(&self) -> bool {
        matches!(self, ExportError::NoDrawing | ExportError::EmptyDrawing { .. })
    }
}

/// Problems that did not stop the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportWarning {
    /// The pin store could not be read; pins were left out
    PinsUnavailable(String),
}

impl ExportWarning {
    pub fn user_message(&self) -> String {
        match self {
            ExportWarning::PinsUnavailable(_) => fl!("warning-pins-unavailable"),
        }
    }

    /// Underlying cause, for logs
    pub fn detail(&self) -> &str {
        match self {
            ExportWarning::PinsUnavailable(detail) => detail,
        }
    }
}
