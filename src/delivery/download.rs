//! Download fallback: write the image into the downloads folder

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::DownloadTarget;
use crate::export::EncodedImage;

/// Gives up looking for a free name after this many numbered variants
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Saves into a fixed directory, the XDG download dir by default
#[derive(Debug, Clone, Default)]
pub struct DownloadDir {
    dir: Option<PathBuf>,
}

impl DownloadDir {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Where files will be written
    pub fn resolve(&self) -> Option<PathBuf> {
        self.dir.clone().or_else(|| {
            dirs::download_dir().or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
        })
    }
}

/// `name.jpg`, `name (1).jpg`, `name (2).jpg`, ...
fn numbered_name(file_name: &str, n: u32) -> String {
    if n == 0 {
        return file_name.to_string();
    }
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    }
}

/// Fill a freshly created file; a partial file is removed so its name
/// stays free for the next export
fn write_or_remove(mut file: impl Write, path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let written = file.write_all(bytes).and_then(|()| file.flush());
    drop(file);
    if let Err(err) = written {
        if let Err(remove_err) = std::fs::remove_file(path) {
            log::warn!("Could not remove partial {}: {}", path.display(), remove_err);
        }
        return Err(err).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}

/// Write `bytes` under the first free name in `dir`
fn write_unique(dir: &Path, file_name: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    for n in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(numbered_name(file_name, n));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                write_or_remove(file, &path, bytes)?;
                return Ok(path);
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to create {}", path.display()));
            }
        }
    }
    anyhow::bail!("No free file name for {} in {}", file_name, dir.display())
}

impl DownloadTarget for DownloadDir {
    async fn save(&self, image: &EncodedImage, file_name: &str) -> anyhow::Result<PathBuf> {
        let dir = self
            .resolve()
            .context("Could not determine a downloads directory")?;
        let file_name = file_name.to_string();
        let bytes = image.bytes.clone();

        tokio::task::spawn_blocking(move || write_unique(&dir, &file_name, &bytes)).await?
    }
}
