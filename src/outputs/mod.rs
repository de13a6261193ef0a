//! Report assembly: images, the tabular export and its JSON mirror.
//!
//! # Submodules
//!
//! - [`images`]: Fetches each record's image into the pictures directory
//! - [`table`]: Writes the report table (CSV)
//! - [`json`]: Writes the same rows as JSON
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── news_info.csv
//! ├── news_info.json
//! └── pictures/
//!     ├── picture_0.jpg
//!     └── picture_1.png
//! ```

pub mod images;
pub mod json;
pub mod table;

use crate::error::Result;
use crate::models::{ArticleRecord, ReportRow};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const REPORT_CSV: &str = "news_info.csv";
pub const REPORT_JSON: &str = "news_info.json";
pub const PICTURES_DIR: &str = "pictures";

/// What the report stage produced.
#[derive(Debug)]
pub struct ReportSummary {
    pub rows: usize,
    pub images: images::ImageSummary,
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

/// Fetch images, then write the report files. Consumes the records; the
/// image URLs do not outlive the image phase.
#[instrument(
    level = "info",
    skip_all,
    fields(output_dir = %output_dir.display(), records = records.len())
)]
pub async fn assemble_report(
    client: &Client,
    records: Vec<ArticleRecord>,
    output_dir: &Path,
) -> Result<ReportSummary> {
    let images = images::download_images(client, &records, &output_dir.join(PICTURES_DIR)).await?;

    let rows: Vec<ReportRow> = records.iter().map(ReportRow::from).collect();
    drop(records);

    let csv_path = output_dir.join(REPORT_CSV);
    table::write_report(&rows, &csv_path)?;
    let json_path = output_dir.join(REPORT_JSON);
    json::write_report(&rows, &json_path).await?;

    info!(rows = rows.len(), saved = images.saved, skipped = images.skipped, "Report assembled");
    Ok(ReportSummary {
        rows: rows.len(),
        images,
        csv_path,
        json_path,
    })
}
