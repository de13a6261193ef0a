//! JSON mirror of the report table.

use crate::error::Result;
use crate::models::ReportRow;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `rows` as a JSON array to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(rows: &[ReportRow], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(rows = rows.len(), "Wrote JSON report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_record;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_report_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("news_info.json");
        let rows = vec![ReportRow::from(&sample_record(0, None))];

        write_report(&rows, &path).await.unwrap();

        let body = tokio::fs::read_to_string(&path).await.unwrap();
        let back: Vec<ReportRow> = serde_json::from_str(&body).unwrap();
        assert_eq!(back, rows);
    }
}
