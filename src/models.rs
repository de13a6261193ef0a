//! Data models for result cards and the records built from them.
//!
//! - [`Fragment`]: one rendered search-result card as handed over by the session
//! - [`ArticleRecord`]: a validated, classified article, immutable once built
//! - [`ReportRow`]: the persisted shape of a record (no image URL)

use crate::classify::Classification;
use crate::dates::format_report_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

/// One rendered search-result card.
///
/// # Fields
///
/// * `html` - The card's outer markup
/// * `text` - The card's visible text, one line per rendered text run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub html: String,
    pub text: String,
}

impl Fragment {
    pub fn new(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            text: text.into(),
        }
    }
}

/// Fields pulled out of a card's markup before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCard {
    pub title: String,
    pub description: String,
    pub published_date: NaiveDate,
    pub image_caption: Option<String>,
    pub image_url: Option<Url>,
}

/// A single news item, ready for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    title: String,
    description: String,
    published_date: NaiveDate,
    image_caption: Option<String>,
    image_url: Option<Url>,
    search_term_count: usize,
    contains_money_reference: bool,
    image_slot: String,
}

impl ArticleRecord {
    /// Build a record from its extracted fields. `index` is the card's
    /// position in the loaded result list and names the image slot.
    pub fn new(card: ExtractedCard, classification: Classification, index: usize) -> Self {
        Self {
            title: card.title,
            description: card.description,
            published_date: card.published_date,
            image_caption: card.image_caption,
            image_url: card.image_url,
            search_term_count: classification.search_term_count,
            contains_money_reference: classification.contains_money_reference,
            image_slot: image_slot(index),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn published_date(&self) -> NaiveDate {
        self.published_date
    }

    pub fn image_caption(&self) -> Option<&str> {
        self.image_caption.as_deref()
    }

    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    pub fn search_term_count(&self) -> usize {
        self.search_term_count
    }

    pub fn contains_money_reference(&self) -> bool {
        self.contains_money_reference
    }

    pub fn image_slot(&self) -> &str {
        &self.image_slot
    }
}

pub fn image_slot(index: usize) -> String {
    format!("picture_{index}")
}

/// One line of the exported table.
///
/// Carries no image URL; that is only used while images are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub title: String,
    pub description: String,
    /// `DD/MM/YYYY`
    pub date: String,
    pub image_caption: Option<String>,
    pub search_term_count: usize,
    pub contains_money_reference: bool,
    pub image_slot: String,
}

impl From<&ArticleRecord> for ReportRow {
    fn from(record: &ArticleRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            date: format_report_date(record.published_date),
            image_caption: record.image_caption.clone(),
            search_term_count: record.search_term_count,
            contains_money_reference: record.contains_money_reference,
            image_slot: record.image_slot.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record(index: usize, image_url: Option<&str>) -> ArticleRecord {
    let card = ExtractedCard {
        title: "Dollar rises".to_string(),
        description: "Markets see $5 gain".to_string(),
        published_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        image_caption: Some("Traders at work".to_string()),
        image_url: image_url.map(|u| Url::parse(u).unwrap()),
    };
    let classification = Classification::of(&card.title, &card.description, "dollar");
    ArticleRecord::new(card, classification, index)
}
