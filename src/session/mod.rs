//! The browsing-session capability the sweep drives.
//!
//! Element lookup, clicking and rendering belong to whatever implements
//! [`BrowsingSession`]. The core only asks for the rendered result cards,
//! asks for more of them, and clears overlays in the way.
//!
//! # Implementations
//!
//! | Session | Module | Notes |
//! |---------|--------|-------|
//! | Snapshot replay | [`snapshot`] | Rendered result lists saved to disk, one per "show more" |
//!
//! The session is an explicit handle owned by the caller, which must call
//! [`BrowsingSession::close`] on every exit path.

pub mod snapshot;

use crate::error::{Result, ScrapeError};
use crate::models::Fragment;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument};

pub use snapshot::SnapshotSession;

#[allow(async_fn_in_trait)]
pub trait BrowsingSession {
    /// Run the search for `search_term` with results sorted newest first.
    async fn open_search(&mut self, search_term: &str) -> Result<()>;

    /// Every currently loaded result card, newest first.
    async fn current_result_fragments(&mut self) -> Result<Vec<Fragment>>;

    /// Press the "show more" affordance.
    ///
    /// Fails with [`ScrapeError::TransientUi`] when the affordance does not
    /// become usable within the session's wait budget.
    async fn request_more_results(&mut self) -> Result<()>;

    /// Close cookie banners, ads and similar overlays. Best effort.
    async fn dismiss_transient_overlays(&mut self) -> Result<()>;

    /// Release the underlying browser.
    async fn close(&mut self) -> Result<()>;
}

/// Poll until at least one result card is visible.
///
/// # Errors
///
/// [`ScrapeError::TransientUi`] when nothing shows up within `timeout`, or
/// whatever the session itself returns.
#[instrument(level = "debug", skip(session))]
pub async fn wait_for_results<S: BrowsingSession>(
    session: &mut S,
    timeout: Duration,
    poll: Duration,
) -> Result<Vec<Fragment>> {
    let t0 = Instant::now();
    loop {
        let fragments = session.current_result_fragments().await?;
        if !fragments.is_empty() {
            debug!(
                count = fragments.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Results visible"
            );
            return Ok(fragments);
        }
        if t0.elapsed() >= timeout {
            return Err(ScrapeError::TransientUi {
                action: "results list",
                waited: t0.elapsed(),
            });
        }
        sleep(poll).await;
    }
}


#[cfg(test)]
mod tests {
    use super::scripted::ScriptedSession;
    use super::*;

    #[tokio::test]
    async fn test_wait_for_results_after_blank_reads() {
        let mut session = ScriptedSession::new(vec![vec![Fragment::new("<a>", "1 Jan 2024")]]);
        session.blank_reads = 2;
        let fragments = wait_for_results(&mut session, Duration::from_secs(1), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(fragments.len(), 1);
    }

    #[tokio::test]
    async fn test_wait_for_results_times_out() {
        let mut session = ScriptedSession::new(vec![Vec::new()]);
        let err = wait_for_results(
            &mut session,
            Duration::from_millis(20),
            Duration::from_millis(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::TransientUi { action: "results list", .. }
        ));
    }
}
