use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageError};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::surface::Surface;

pub const DOWNLOAD_FILE_NAME: &str = "sketch.png";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] ImageError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

pub fn encode_png(surface: &Surface) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        surface.as_raw(),
        surface.width(),
        surface.height(),
        ColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Ask the user where to save the download. Returns `None` if the dialog
/// was dismissed.
pub fn choose_download_path() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Download sketch")
        .set_file_name(DOWNLOAD_FILE_NAME)
        .add_filter("PNG image", &["png"])
        .save_file()
}

/// Write already-encoded PNG bytes to disk.
pub async fn write_png(path: PathBuf, bytes: Vec<u8>) -> Result<PathBuf, ExportError> {
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|source| ExportError::Write {
            path: display(&path),
            source,
        })?;
    log::info!("Wrote {} bytes to {}", bytes.len(), display(&path));
    Ok(path)
}

/// Write on the runtime without waiting for it. Failures are logged; the
/// widget has nowhere to surface them.
pub fn spawn_download(runtime: &tokio::runtime::Handle, path: PathBuf, bytes: Vec<u8>) {
    runtime.spawn(async move {
        if let Err(err) = write_png(path, bytes).await {
            log::warn!("Download failed: {}", err);
        }
    });
}

fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
