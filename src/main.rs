//! # News Sweep
//!
//! Pages a news site's date-sorted search results back to a month boundary,
//! turns each result card into a typed article record, and writes a report
//! with one image per record.
//!
//! ## Usage
//!
//! ```sh
//! news_sweep --snapshots ./snapshots --search-term dollar --months 2
//! ```
//!
//! ## Architecture
//!
//! The run is a strictly sequential pipeline over one browsing session:
//! 1. **Search**: open the search for the configured term, newest first
//! 2. **Paginate**: request more results until the oldest card is on or before the cutoff
//! 3. **Extract**: walk the loaded cards, stop at the cutoff, build and classify records
//! 4. **Report**: fetch images, write the CSV table and its JSON mirror
//!
//! The session is closed before any stage's error reaches the caller.

use clap::Parser;
use news_sweep::cli::Cli;
use news_sweep::outputs;
use news_sweep::outputs::images::image_client;
use news_sweep::pagination::PaginationController;
use news_sweep::run::sweep;
use news_sweep::session::SnapshotSession;
use news_sweep::utils::ensure_writable_dir;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    info!("news_sweep starting up");

    let args = Cli::parse();
    debug!(?args.snapshots, ?args.output_dir, ?args.work_item, "Parsed CLI arguments");
    let config = args.into_config().await?;
    info!(search_term = %config.search_term, months_back = config.months_back, "Run configured");

    // Early check: fail before touching the session if the report can't be written
    if let Err(e) = ensure_writable_dir(&config.output_dir).await {
        error!(
            path = %config.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let mut session = SnapshotSession::open(&config.snapshots, &config.card_selector).await?;
    let mut controller = PaginationController::new(config.months_back, config.pagination.clone());
    if let Some(today) = config.as_of {
        controller = controller.with_today(today);
    }
    let records = sweep(&mut session, &config, &controller).await?;

    let client = image_client(config.image_timeout)?;
    let summary = outputs::assemble_report(&client, records, &config.output_dir).await?;
    info!(
        rows = summary.rows,
        images_saved = summary.images.saved,
        images_skipped = summary.images.skipped,
        csv = %summary.csv_path.display(),
        json = %summary.json_path.display(),
        "Report written"
    );

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

