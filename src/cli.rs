//! Command-line interface and run configuration.
//!
//! Every option can come from a flag or an environment variable. The
//! search term and month offset may also come from a YAML work item; flags
//! win over the work item.

use crate::error::{Result, ScrapeError};
use crate::pagination::PaginationSettings;
use chrono::NaiveDate;
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

/// Command-line arguments for News Sweep.
///
/// # Examples
///
/// ```sh
/// # Search term and months on the command line
/// news_sweep --snapshots ./snapshots --search-term dollar --months 2
///
/// # Inputs from a work item file
/// news_sweep --snapshots ./snapshots --work-item work_item.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Phrase to search for
    #[arg(short, long, env = "SEARCH_TERM")]
    pub search_term: Option<String>,

    /// How many months of results to keep (0 and 1 both mean the current month)
    #[arg(short, long, env = "MONTHS", allow_negative_numbers = true)]
    pub months: Option<i64>,

    /// Resolve the cutoff against this date (YYYY-MM-DD) instead of today
    #[arg(long, env = "AS_OF")]
    pub as_of: Option<NaiveDate>,

    /// YAML work item holding `search_term` and `months`
    #[arg(short, long, env = "WORK_ITEM")]
    pub work_item: Option<PathBuf>,

    /// Directory of rendered result-list snapshots to replay
    #[arg(long, env = "SNAPSHOT_DIR")]
    pub snapshots: PathBuf,

    /// CSS selector matching one result card
    #[arg(long, default_value = "article")]
    pub card_selector: String,

    /// Site root used to resolve relative image sources
    #[arg(long, env = "BASE_URL", default_value = "https://www.aljazeera.com/")]
    pub base_url: String,

    /// Directory for the report and pictures
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Pause before each read of the result list, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub settle_ms: u64,

    /// How long the result list may stay empty, in seconds
    #[arg(long, default_value_t = 30)]
    pub results_timeout_secs: u64,

    /// Stop loading after this many "show more" requests
    #[arg(long)]
    pub max_loads: Option<usize>,

    /// Stop after this many loads in a row that add no results (0 disables)
    #[arg(long, default_value_t = 2)]
    pub stall_limit: usize,

    /// Per-image download timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub image_timeout_secs: u64,
}

/// Inputs normally handed over by the work-item source.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct WorkItem {
    pub search_term: Option<String>,
    pub months: Option<i64>,
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_work_item(path: &Path) -> Result<WorkItem> {
    let body = fs::read_to_string(path).await?;
    let item: WorkItem = serde_yaml::from_str(&body)?;
    debug!(?item, "Loaded work item");
    Ok(item)
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub search_term: String,
    pub months_back: i64,
    pub as_of: Option<NaiveDate>,
    pub snapshots: PathBuf,
    pub card_selector: String,
    pub base_url: Url,
    pub output_dir: PathBuf,
    pub pagination: PaginationSettings,
    pub image_timeout: Duration,
}

impl Cli {
    /// Merge in the work item (if any) and validate.
    pub async fn into_config(self) -> Result<RunConfig> {
        let item = match &self.work_item {
            Some(path) => load_work_item(path).await?,
            None => WorkItem::default(),
        };
        self.merge(item)
    }

    /// # Errors
    ///
    /// [`ScrapeError::InvalidArgument`] for a missing or blank search term
    /// or a missing or negative month offset; [`ScrapeError::InvalidUrl`]
    /// for a bad base URL.
    pub fn merge(self, item: WorkItem) -> Result<RunConfig> {
        let search_term = self
            .search_term
            .or(item.search_term)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ScrapeError::InvalidArgument("search term is required".to_string()))?;

        let months_back = self
            .months
            .or(item.months)
            .ok_or_else(|| ScrapeError::InvalidArgument("months is required".to_string()))?;
        if months_back < 0 {
            return Err(ScrapeError::InvalidArgument(format!(
                "months must be >= 0, got {months_back}"
            )));
        }

        let base_url = Url::parse(&self.base_url)?;

        Ok(RunConfig {
            search_term,
            months_back,
            as_of: self.as_of,
            snapshots: self.snapshots,
            card_selector: self.card_selector,
            base_url,
            output_dir: self.output_dir,
            pagination: PaginationSettings {
                settle: Duration::from_millis(self.settle_ms),
                results_timeout: Duration::from_secs(self.results_timeout_secs),
                max_loads: self.max_loads,
                stall_limit: self.stall_limit,
                ..PaginationSettings::default()
            },
            image_timeout: Duration::from_secs(self.image_timeout_secs),
        })
    }
}
