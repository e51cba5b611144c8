use std::path::PathBuf;

use thiserror::Error;
use tokio::fs;
use tracing::info;

use bizcard_qr::{QrError, QrImage};
use bizcard_types::BusinessCard;

use crate::notice::Notice;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid file name: {0:?}")]
    InvalidFilename(String),
    #[error(transparent)]
    Qr(#[from] QrError),
    #[error("could not write file: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub fn notice(&self) -> Notice {
        Notice::error(format!("QR export failed: {self}"))
    }
}

/// Writes QR codes as PNG files into the download directory.
#[derive(Debug, Clone)]
pub struct QrExporter {
    download_dir: PathBuf,
}

impl QrExporter {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
        }
    }

    pub fn render(&self, url: &str, size: u32) -> Result<QrImage, ExportError> {
        Ok(bizcard_qr::render(url, size)?)
    }

    /// Rasterize `image` to a `size`×`size` PNG. Without an image this does
    /// nothing and returns `Ok(None)`.
    pub async fn export(&self, image: Option<&QrImage>, size: u32, filename: &str) -> Result<Option<PathBuf>, ExportError> {
        let Some(image) = image else {
            return Ok(None);
        };

        let filename = png_filename(filename)?;
        let png = image.to_png(size)?;

        fs::create_dir_all(&self.download_dir).await?;
        let path = self.download_dir.join(filename);
        fs::write(&path, png).await?;

        info!("Exported QR code to {}", path.display());
        Ok(Some(path))
    }
}

fn png_filename(name: &str) -> Result<String, ExportError> {
    let name = name.trim();
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(ExportError::InvalidFilename(name.to_string()));
    }

    if name.to_ascii_lowercase().ends_with(".png") {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}.png"))
    }
}

/// `<name>-qr.png`; runs of anything but letters and digits become one `-`.
pub fn export_filename(card: &BusinessCard) -> String {
    let mut slug = String::new();
    for c in card.fields.name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        format!("card-{}-qr.png", card.id)
    } else {
        format!("{slug}-qr.png")
    }
}
