//! Turns the loaded result cards into article records.
//!
//! Cards arrive newest first and pagination over-fetches, so the walk stops
//! at the first card dated before the cutoff and drops everything after it.
//! A malformed date or a missing required field aborts the whole batch.

use crate::classify::Classification;
use crate::error::Result;
use crate::extract::RecordExtractor;
use crate::models::{ArticleRecord, Fragment};
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    extractor: RecordExtractor,
    search_term: String,
    cutoff: NaiveDate,
}

impl ExtractionPipeline {
    pub fn new(
        extractor: RecordExtractor,
        search_term: impl Into<String>,
        cutoff: NaiveDate,
    ) -> Self {
        Self {
            extractor,
            search_term: search_term.into(),
            cutoff,
        }
    }

    #[instrument(level = "info", skip_all, fields(cutoff = %self.cutoff, cards = fragments.len()))]
    pub fn run(&self, fragments: &[Fragment]) -> Result<Vec<ArticleRecord>> {
        let mut records = Vec::new();

        for (index, fragment) in fragments.iter().enumerate() {
            let date = self.extractor.published_date(fragment)?;
            if date < self.cutoff {
                debug!(index, %date, dropped = fragments.len() - index, "Reached cutoff");
                break;
            }

            let card = self.extractor.extract_fields(fragment, date)?;
            let classification =
                Classification::of(&card.title, &card.description, &self.search_term);
            records.push(ArticleRecord::new(card, classification, index));
        }

        info!(count = records.len(), "Extracted article records");
        Ok(records)
    }
}
