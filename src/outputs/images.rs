//! Image retrieval for the report.
//!
//! Images are fetched one at a time and saved as `<image_slot>.<ext>`.
//! A failed image is logged and skipped; the record stays in the report.

use crate::error::{Result, ScrapeError};
use crate::models::ArticleRecord;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, error, info, instrument};
use url::Url;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImageSummary {
    pub saved: usize,
    pub skipped: usize,
    pub without_image: usize,
}

/// File extension for an image URL, `png` when the path has none we know.
pub fn image_extension(url: &Url) -> &'static str {
    let ext = url
        .path()
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "jpg",
        "gif" => "gif",
        "webp" => "webp",
        "avif" => "avif",
        "svg" => "svg",
        _ => "png",
    }
}

/// HTTP client for image downloads, with a per-request timeout.
pub fn image_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Fetch every record's image into `dir`, creating it if needed.
///
/// # Errors
///
/// Only when `dir` cannot be created. Per-image failures are counted in
/// [`ImageSummary::skipped`].
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn download_images(
    client: &Client,
    records: &[ArticleRecord],
    dir: &Path,
) -> Result<ImageSummary> {
    fs::create_dir_all(dir).await?;
    let mut summary = ImageSummary::default();

    for record in records {
        let Some(url) = record.image_url() else {
            debug!(slot = record.image_slot(), "Record has no image");
            summary.without_image += 1;
            continue;
        };
        match fetch_image(client, url, record.image_slot(), dir).await {
            Ok(path) => {
                debug!(path = %path.display(), "Saved image");
                summary.saved += 1;
            }
            Err(e) => {
                error!(slot = record.image_slot(), %url, error = %e, "Failed to save image");
                summary.skipped += 1;
            }
        }
    }

    info!(
        saved = summary.saved,
        skipped = summary.skipped,
        without_image = summary.without_image,
        "Image retrieval finished"
    );
    Ok(summary)
}

async fn fetch_image(client: &Client, url: &Url, slot: &str, dir: &Path) -> Result<PathBuf> {
    let fail = |reason: String| ScrapeError::ImageFetch {
        slot: slot.to_string(),
        reason,
    };

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| fail(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(fail(format!("HTTP {status}")));
    }
    let bytes = response.bytes().await.map_err(|e| fail(e.to_string()))?;

    let path = dir.join(format!("{slot}.{}", image_extension(url)));
    fs::write(&path, &bytes)
        .await
        .map_err(|e| fail(e.to_string()))?;
    Ok(path)
}
