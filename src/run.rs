//! One sweep over a browsing session: search, paginate, extract.
//!
//! The session handle is borrowed, never global, and [`sweep`] closes it
//! before returning on every path.

use crate::cli::RunConfig;
use crate::error::Result;
use crate::extract::RecordExtractor;
use crate::models::ArticleRecord;
use crate::pagination::PaginationController;
use crate::pipeline::ExtractionPipeline;
use crate::session::{BrowsingSession, wait_for_results};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Search, paginate and extract, then close `session` whatever happened.
#[instrument(level = "info", skip_all, fields(search_term = %config.search_term))]
pub async fn sweep<S: BrowsingSession>(
    session: &mut S,
    config: &RunConfig,
    controller: &PaginationController,
) -> Result<Vec<ArticleRecord>> {
    let outcome = collect_records(session, config, controller).await;
    if let Err(e) = &outcome {
        error!(error = %e, fatal = e.is_fatal(), "Sweep failed; releasing session");
    }
    if let Err(e) = session.close().await {
        warn!(error = %e, "Failed to close browsing session");
    }
    outcome
}

async fn collect_records<S: BrowsingSession>(
    session: &mut S,
    config: &RunConfig,
    controller: &PaginationController,
) -> Result<Vec<ArticleRecord>> {
    session.open_search(&config.search_term).await?;

    let pagination = controller.run(session).await?;
    info!(
        state = ?pagination.state,
        loads = pagination.loads,
        visible = pagination.visible,
        oldest = %pagination.oldest,
        "Pagination finished"
    );

    sleep(config.pagination.settle).await;
    let fragments = wait_for_results(
        session,
        config.pagination.results_timeout,
        config.pagination.poll_interval,
    )
    .await?;

    let cutoff = controller.cutoff()?;
    let extractor = RecordExtractor::new(config.base_url.clone());
    ExtractionPipeline::new(extractor, config.search_term.as_str(), cutoff).run(&fragments)
}
