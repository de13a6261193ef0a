//! Replay of rendered search-result pages saved to disk.
//!
//! A snapshot directory holds one `.html` file per state of the result
//! list, in lexical order: `page_000.html` is the list right after the
//! search, `page_001.html` the list after one "show more", and so on.
//! Running out of snapshots is the affordance never becoming available.

use super::BrowsingSession;
use crate::error::{Result, ScrapeError};
use crate::models::Fragment;
use scraper::{ElementRef, Html, Selector};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Elements that would sit on top of the results in a live browser.
const OVERLAY_SELECTOR: &str =
    "#onetrust-banner-sdk, #onetrust-accept-btn-handler, .ads__close, [aria-label=\"Close Ad\"]";

#[derive(Debug)]
pub struct SnapshotSession {
    pages: Vec<PathBuf>,
    cursor: usize,
    card_selector: Selector,
    overlay_selector: Selector,
    closed: bool,
}

impl SnapshotSession {
    /// Index the `.html` snapshots in `dir`.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::InvalidArgument`] for an unparsable selector or a
    /// directory without snapshots; I/O errors from reading the directory.
    #[instrument(level = "info", skip_all, fields(dir = %dir.as_ref().display()))]
    pub async fn open(dir: impl AsRef<Path>, card_selector: &str) -> Result<Self> {
        let card_selector = parse_selector(card_selector)?;
        let overlay_selector = parse_selector(OVERLAY_SELECTOR)?;

        let mut pages = Vec::new();
        let mut entries = fs::read_dir(dir.as_ref()).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "html") {
                pages.push(path);
            }
        }
        pages.sort();

        if pages.is_empty() {
            return Err(ScrapeError::InvalidArgument(format!(
                "no .html snapshots in {}",
                dir.as_ref().display()
            )));
        }
        info!(count = pages.len(), "Indexed result snapshots");

        Ok(Self {
            pages,
            cursor: 0,
            card_selector,
            overlay_selector,
            closed: false,
        })
    }

    pub fn loads_remaining(&self) -> usize {
        self.pages.len() - self.cursor - 1
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(ScrapeError::InvalidArgument("session is closed".to_string()));
        }
        Ok(())
    }

    async fn current_document(&self) -> Result<Html> {
        let body = fs::read_to_string(&self.pages[self.cursor]).await?;
        Ok(Html::parse_document(&body))
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::InvalidArgument(format!("bad selector {selector:?}: {e}")))
}

/// Visible text of a card, one trimmed line per non-blank text node.
fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

impl BrowsingSession for SnapshotSession {
    async fn open_search(&mut self, search_term: &str) -> Result<()> {
        self.ensure_open()?;
        info!(%search_term, snapshot = %self.pages[0].display(), "Replaying search results");
        self.cursor = 0;
        Ok(())
    }

    async fn current_result_fragments(&mut self) -> Result<Vec<Fragment>> {
        self.ensure_open()?;
        let document = self.current_document().await?;
        let fragments: Vec<Fragment> = document
            .select(&self.card_selector)
            .map(|card| Fragment::new(card.html(), visible_text(card)))
            .collect();
        debug!(count = fragments.len(), page = self.cursor, "Read result cards");
        Ok(fragments)
    }

    async fn request_more_results(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.loads_remaining() == 0 {
            warn!(page = self.cursor, "No further snapshot; show-more is unavailable");
            return Err(ScrapeError::TransientUi {
                action: "show more",
                waited: Duration::ZERO,
            });
        }
        self.cursor += 1;
        debug!(page = self.cursor, "Advanced to next snapshot");
        Ok(())
    }

    async fn dismiss_transient_overlays(&mut self) -> Result<()> {
        self.ensure_open()?;
        let document = self.current_document().await?;
        let overlays = document.select(&self.overlay_selector).count();
        if overlays > 0 {
            debug!(overlays, "Overlays present in snapshot; nothing to click");
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            info!("Snapshot session closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn card(title: &str, date: &str) -> String {
        format!(
            r#"<article class="gc"><a class="u-clickable-card__link"><span>{title}</span></a><p>About {title}</p><div class="gc__date"><span class="screen-reader-text">Last update</span><span>{date}</span></div></article>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!(
            r#"<html><body><div id="onetrust-banner-sdk">Cookies</div><main>{}</main><button class="show-more-button">Show more</button></body></html>"#,
            cards.concat()
        )
    }

    async fn write_snapshots(dir: &Path) {
        let a = card("First", "10 Mar 2024");
        let b = card("Second", "1 Mar 2024");
        let c = card("Third", "15 Feb 2024");
        fs::write(dir.join("page_000.html"), page(&[a.clone(), b.clone()])).await.unwrap();
        fs::write(dir.join("page_001.html"), page(&[a, b, c])).await.unwrap();
        fs::write(dir.join("notes.txt"), "ignored").await.unwrap();
    }

    #[tokio::test]
    async fn test_replays_pages_in_order() {
        let dir = tempdir().unwrap();
        write_snapshots(dir.path()).await;

        let mut session = SnapshotSession::open(dir.path(), "article").await.unwrap();
        session.open_search("dollar").await.unwrap();
        assert_eq!(session.loads_remaining(), 1);

        let first = session.current_result_fragments().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].text, "First\nAbout First\nLast update\n10 Mar 2024");
        assert!(first[0].html.starts_with("<article"));

        session.dismiss_transient_overlays().await.unwrap();
        session.request_more_results().await.unwrap();
        assert_eq!(session.current_result_fragments().await.unwrap().len(), 3);

        let err = session.request_more_results().await.unwrap_err();
        assert!(matches!(err, ScrapeError::TransientUi { action: "show more", .. }));
    }

    #[tokio::test]
    async fn test_closed_session_refuses_work() {
        let dir = tempdir().unwrap();
        write_snapshots(dir.path()).await;

        let mut session = SnapshotSession::open(dir.path(), "article").await.unwrap();
        session.close().await.unwrap();
        assert!(session.current_result_fragments().await.is_err());
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_directory_rejected() {
        let dir = tempdir().unwrap();
        let err = SnapshotSession::open(dir.path(), "article").await.unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_bad_selector_rejected() {
        let dir = tempdir().unwrap();
        write_snapshots(dir.path()).await;
        let err = SnapshotSession::open(dir.path(), "article[").await.unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidArgument(_)));
    }
}
