//! Loads search results until the list reaches back past the cutoff.
//!
//! Each round waits for the list to settle, reads the date of the oldest
//! visible card and compares it to a freshly resolved cutoff. While that
//! date is strictly after the cutoff the controller asks the session for
//! more results.
//!
//! # Termination
//!
//! - [`PaginationState::Satisfied`]: the oldest card is on or before the cutoff
//! - [`PaginationState::Exhausted`]: the list stopped growing for
//!   `stall_limit` consecutive loads, or `max_loads` loads were spent
//! - an error from the session (e.g. "show more" never became clickable)
//!
//! Set `stall_limit` to 0 and leave `max_loads` unset to poll until the
//! session itself gives up.

use crate::dates::{DATE_PREFIX, cutoff_date, cutoff_from_today, parse_card_date};
use crate::error::{Result, ScrapeError};
use crate::session::{BrowsingSession, wait_for_results};
use chrono::NaiveDate;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Polling,
    Satisfied,
    Exhausted,
}

/// Wait budgets and stop conditions.
#[derive(Debug, Clone)]
pub struct PaginationSettings {
    /// Pause before each read of the result list.
    pub settle: Duration,
    /// How long the list may stay empty before giving up.
    pub results_timeout: Duration,
    pub poll_interval: Duration,
    pub max_loads: Option<usize>,
    /// Unchanged loads in a row that count as "no more results". 0 disables.
    pub stall_limit: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(2),
            results_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
            max_loads: None,
            stall_limit: 2,
        }
    }
}

/// Outcome of a pagination run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationReport {
    pub state: PaginationState,
    pub loads: usize,
    pub visible: usize,
    pub oldest: NaiveDate,
    pub cutoff: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct PaginationController {
    months_back: i64,
    /// Fixed "today" for the cutoff; `None` reads the clock every round.
    today: Option<NaiveDate>,
    settings: PaginationSettings,
}

impl PaginationController {
    pub fn new(months_back: i64, settings: PaginationSettings) -> Self {
        Self {
            months_back,
            today: None,
            settings,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn cutoff(&self) -> Result<NaiveDate> {
        match self.today {
            Some(today) => cutoff_date(self.months_back, today),
            None => cutoff_from_today(self.months_back),
        }
    }

    /// Drive `session` until the loaded results are deep enough.
    #[instrument(level = "info", skip_all, fields(months_back = self.months_back))]
    pub async fn run<S: BrowsingSession>(&self, session: &mut S) -> Result<PaginationReport> {
        let mut state = PaginationState::Polling;
        let mut loads = 0usize;
        let mut last_count: Option<usize> = None;
        let mut unchanged = 0usize;

        loop {
            sleep(self.settings.settle).await;
            let fragments = wait_for_results(
                session,
                self.settings.results_timeout,
                self.settings.poll_interval,
            )
            .await?;
            let visible = fragments.len();
            let oldest_card = fragments.last().ok_or(ScrapeError::TransientUi {
                action: "results list",
                waited: self.settings.results_timeout,
            })?;
            let oldest = parse_card_date(&oldest_card.text, DATE_PREFIX)?;
            let cutoff = self.cutoff()?;
            debug!(?state, visible, %oldest, %cutoff, loads, "Polled result list");

            let report = |state| PaginationReport {
                state,
                loads,
                visible,
                oldest,
                cutoff,
            };

            if oldest <= cutoff {
                state = PaginationState::Satisfied;
                info!(?state, visible, %oldest, %cutoff, loads, "Results reach the cutoff");
                return Ok(report(state));
            }

            if last_count == Some(visible) {
                unchanged += 1;
            } else {
                unchanged = 0;
            }
            last_count = Some(visible);

            if self.settings.stall_limit > 0 && unchanged >= self.settings.stall_limit {
                state = PaginationState::Exhausted;
                warn!(
                    visible,
                    unchanged,
                    %oldest,
                    %cutoff,
                    "Result list stopped growing before the cutoff"
                );
                return Ok(report(state));
            }
            if self.settings.max_loads.is_some_and(|max| loads >= max) {
                state = PaginationState::Exhausted;
                warn!(loads, %oldest, %cutoff, "Load budget spent before the cutoff");
                return Ok(report(state));
            }

            if let Err(e) = session.dismiss_transient_overlays().await {
                warn!(error = %e, "Could not dismiss overlays; trying to load anyway");
            }
            session.request_more_results().await?;
            loads += 1;
        }
    }
}
