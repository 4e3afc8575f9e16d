//! Hand the exported image to the user
//!
//! Two targets sit behind small traits:
//! - `ShareTarget`: the desktop's native chooser (portal.rs)
//! - `DownloadTarget`: a file in the downloads folder (download.rs)
//!
//! `Delivery` tries the share target when the runtime probe found one and
//! falls back to a download when sharing is unavailable or fails.

pub mod download;
pub mod portal;

use std::future::Future;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;

pub use download::DownloadDir;
pub use portal::PortalShare;

use crate::export::EncodedImage;
use crate::fl;

/// Why a share did not complete
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("share cancelled by the user")]
    Cancelled,
    #[error("share failed: {0:#}")]
    Failed(anyhow::Error),
}

/// What is shown alongside the shared file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub title: String,
    pub file_name: String,
}

impl ShareRequest {
    /// Fixed caption, naming the drawing when it has a title
    pub fn new(drawing_title: Option<&str>, file_name: String) -> Self {
        let title = match drawing_title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(name) => fl!("share-title-with-name", name = name),
            None => fl!("share-title"),
        };
        Self { title, file_name }
    }
}

/// Native share capability
pub trait ShareTarget {
    fn share(
        &self,
        image: &EncodedImage,
        request: &ShareRequest,
    ) -> impl Future<Output = Result<(), ShareError>>;
}

/// Same-machine file download
pub trait DownloadTarget {
    /// Save the image and return where it went
    fn save(
        &self,
        image: &EncodedImage,
        file_name: &str,
    ) -> impl Future<Output = anyhow::Result<PathBuf>>;
}

/// How the image reached the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Shared,
    /// The user dismissed the chooser; not an error
    ShareCancelled,
    Downloaded(PathBuf),
}

impl DeliveryOutcome {
    /// Localized one-line summary
    pub fn message(&self) -> String {
        match self {
            DeliveryOutcome::Shared => fl!("outcome-shared"),
            DeliveryOutcome::ShareCancelled => fl!("outcome-share-cancelled"),
            DeliveryOutcome::Downloaded(path) => {
                fl!("outcome-downloaded", path = path.display().to_string())
            }
        }
    }
}

/// Share-or-download policy over the two targets
pub struct Delivery<S, D> {
    share: Option<S>,
    download: D,
}

impl<S: ShareTarget, D: DownloadTarget> Delivery<S, D> {
    /// `share` is `None` when the capability probe found no native share
    pub fn new(share: Option<S>, download: D) -> Self {
        Self { share, download }
    }

    pub fn can_share(&self) -> bool {
        self.share.is_some()
    }

    pub async fn deliver(
        &self,
        image: &EncodedImage,
        request: &ShareRequest,
    ) -> anyhow::Result<DeliveryOutcome> {
        if let Some(share) = &self.share {
            match share.share(image, request).await {
                Ok(()) => {
                    log::info!("Shared {}", request.file_name);
                    return Ok(DeliveryOutcome::Shared);
                }
                Err(ShareError::Cancelled) => {
                    log::info!("Share of {} cancelled", request.file_name);
                    return Ok(DeliveryOutcome::ShareCancelled);
                }
                Err(ShareError::Failed(err)) => {
                    log::warn!("Native share failed, downloading instead: {:#}", err);
                }
            }
        }

        let path = self
            .download
            .save(image, &request.file_name)
            .await
            .context("Failed to save exported image")?;
        log::info!("Saved {}", path.display());
        Ok(DeliveryOutcome::Downloaded(path))
    }
}

#[cfg(test)]
impl<S, D> Delivery<S, D> {
    pub(crate) fn parts(&self) -> (Option<&S>, &D) {
        (self.share.as_ref(), &self.download)
    }
}

/// Date-stamped file name, e.g. `Drawing_2024-05-17.jpg`
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    let prefix = prefix.trim();
    let prefix = if prefix.is_empty() { "Drawing" } else { prefix };
    format!("{}_{}.jpg", prefix, date.format("%Y-%m-%d"))
}

/// File name stamped with today's local date
pub fn today_file_name(prefix: &str) -> String {
    export_file_name(prefix, chrono::Local::now().date_naive())
}
