//! Tabular export of the report rows.
//!
//! Columns follow [`ReportRow`]; an absent caption is an empty cell.

use crate::error::Result;
use crate::models::ReportRow;
use std::path::Path;
use tracing::{info, instrument};

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_report(rows: &[ReportRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(rows = rows.len(), "Wrote report table");
    Ok(())
}

/// Header used when there are no rows to derive it from.
pub const COLUMNS: [&str; 7] = [
    "title",
    "description",
    "date",
    "image_caption",
    "search_term_count",
    "contains_money_reference",
    "image_slot",
];
