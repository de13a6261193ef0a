//! Field extraction from a single result card.
//!
//! Fields are pulled out with narrow anchored patterns instead of a full
//! tree walk. Each pattern lives in a [`FieldRule`] that also says whether
//! its absence is fatal, so the rules can be tested and swapped on their own.

use crate::dates::{DATE_PREFIX, parse_card_date};
use crate::error::{Result, ScrapeError};
use crate::models::{ExtractedCard, Fragment};
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// A field a [`FieldRule`] can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Description,
    ImageCaption,
    ImageUrl,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::ImageCaption => "image_caption",
            Field::ImageUrl => "image_url",
        }
    }
}

/// Pattern → field mapping. The first capture group is the value.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: Field,
    pub pattern: Regex,
    pub required: bool,
}

impl FieldRule {
    pub fn new(field: Field, pattern: &str, required: bool) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            ScrapeError::InvalidArgument(format!("bad pattern for {}: {e}", field.name()))
        })?;
        Ok(Self {
            field,
            pattern,
            required,
        })
    }

    /// First capture of the rule's pattern in `html`, if any.
    pub fn capture<'h>(&self, html: &'h str) -> Option<&'h str> {
        self.pattern
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Rules for the search-result cards of the target news site.
pub fn default_rules() -> Vec<FieldRule> {
    [
        // Serialised cards list attributes in sorted order, so `class` may
        // come first.
        (
            Field::Title,
            r#"class="u-clickable-card__link"[^>]*><span>(.*?)</"#,
            true,
        ),
        (Field::Description, r"<p>(.*?)</p>", true),
        (Field::ImageCaption, r#"alt="(.*?)""#, false),
        (Field::ImageUrl, r#"src="(.*?)""#, false),
    ]
    .into_iter()
    .map(|(field, pattern, required)| FieldRule {
        field,
        pattern: Regex::new(pattern).expect("built-in field pattern"),
        required,
    })
    .collect()
}

#[derive(Debug, Clone)]
pub struct RecordExtractor {
    rules: Vec<FieldRule>,
    date_prefix: String,
    base_url: Url,
}

impl RecordExtractor {
    /// Extractor with the built-in rules. Relative image sources are
    /// resolved against `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self::with_rules(default_rules(), base_url)
    }

    pub fn with_rules(rules: Vec<FieldRule>, base_url: Url) -> Self {
        Self {
            rules,
            date_prefix: DATE_PREFIX.to_string(),
            base_url,
        }
    }

    pub fn published_date(&self, fragment: &Fragment) -> Result<NaiveDate> {
        parse_card_date(&fragment.text, &self.date_prefix)
    }

    /// Extract every field of a card, date included.
    pub fn extract(&self, fragment: &Fragment) -> Result<ExtractedCard> {
        let date = self.published_date(fragment)?;
        self.extract_fields(fragment, date)
    }

    /// Apply the field rules to a card whose date is already known.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::MissingRequiredField`] when a required rule finds
    /// nothing. Optional fields fall back to `None` with a warning.
    #[instrument(level = "debug", skip_all, fields(%published_date))]
    pub fn extract_fields(
        &self,
        fragment: &Fragment,
        published_date: NaiveDate,
    ) -> Result<ExtractedCard> {
        let mut found: HashMap<Field, String> = HashMap::new();

        for rule in &self.rules {
            match rule.capture(&fragment.html) {
                Some(value) => {
                    found.insert(rule.field, value.to_string());
                }
                None if rule.required => {
                    error!(
                        field = rule.field.name(),
                        card = %truncate_for_log(&fragment.html, 300),
                        "Required field not found in card"
                    );
                    return Err(ScrapeError::MissingRequiredField {
                        field: rule.field.name(),
                    });
                }
                None => warn!(field = rule.field.name(), "Optional field not found in card"),
            }
        }

        let image_url = found
            .remove(&Field::ImageUrl)
            .and_then(|src| match self.base_url.join(&src) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(%src, error = %e, "Unusable image source; treating as absent");
                    None
                }
            });

        let card = ExtractedCard {
            title: required(&mut found, Field::Title)?,
            description: required(&mut found, Field::Description)?,
            published_date,
            image_caption: found.remove(&Field::ImageCaption),
            image_url,
        };
        debug!(title = %card.title, "Extracted card");
        Ok(card)
    }
}

fn required(found: &mut HashMap<Field, String>, field: Field) -> Result<String> {
    found
        .remove(&field)
        .ok_or(ScrapeError::MissingRequiredField {
            field: field.name(),
        })
}

#[cfg(test)]
pub(crate) fn card_html(title: Option<&str>, image: bool) -> String {
    let mut html = String::from(r#"<article class="gc u-clickable-card">"#);
    if image {
        html.push_str(
            r#"<div class="gc__image-wrap"><img src="/wp-content/uploads/2024/03/a.jpg" alt="Traders on the floor"></div>"#,
        );
    }
    if let Some(title) = title {
        html.push_str(&format!(
            r#"<h3 class="gc__title"><a href="/news/x" class="u-clickable-card__link"><span>{title}</span></a></h3>"#
        ));
    }
    html.push_str(r#"<div class="gc__excerpt"><p>Markets see the dollar gain $5.</p></div>"#);
    html.push_str("</article>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{BrowsingSession, SnapshotSession};
    use tempfile::tempdir;

    fn extractor() -> RecordExtractor {
        RecordExtractor::new(Url::parse("https://www.aljazeera.com/").unwrap())
    }

    fn fragment(html: String) -> Fragment {
        Fragment::new(html, "Dollar rises\nLast update 10 Mar 2024")
    }

    #[test]
    fn test_extract_full_card() {
        let card = extractor()
            .extract(&fragment(card_html(Some("Dollar rises"), true)))
            .unwrap();
        assert_eq!(card.title, "Dollar rises");
        assert_eq!(card.description, "Markets see the dollar gain $5.");
        assert_eq!(card.published_date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(card.image_caption.as_deref(), Some("Traders on the floor"));
        assert_eq!(
            card.image_url.unwrap().as_str(),
            "https://www.aljazeera.com/wp-content/uploads/2024/03/a.jpg"
        );
    }

    #[test]
    fn test_missing_image_is_not_fatal() {
        let card = extractor()
            .extract(&fragment(card_html(Some("Dollar rises"), false)))
            .unwrap();
        assert_eq!(card.image_url, None);
        assert_eq!(card.image_caption, None);
    }

    #[test]
    fn test_missing_title_is_fatal() {
        let err = extractor()
            .extract(&fragment(card_html(None, true)))
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingRequiredField { field: "title" }
        ));
    }

    #[test]
    fn test_missing_description_is_fatal() {
        let html = card_html(Some("Dollar rises"), false).replace("<p>", "<div>");
        let err = extractor().extract(&fragment(html)).unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::MissingRequiredField { field: "description" }
        ));
    }

    #[test]
    fn test_malformed_date_is_fatal() {
        let frag = Fragment::new(card_html(Some("T"), false), "T\nLast update sometime");
        assert!(matches!(
            extractor().extract(&frag),
            Err(ScrapeError::MalformedDate { .. })
        ));
    }

    #[test]
    fn test_absolute_image_url_kept() {
        let html = card_html(Some("T"), false)
            .replace("<p>", r#"<img src="https://cdn.example.com/b.png"><p>"#);
        let card = extractor().extract(&fragment(html)).unwrap();
        assert_eq!(
            card.image_url.unwrap().as_str(),
            "https://cdn.example.com/b.png"
        );
    }

    #[test]
    fn test_custom_rules() {
        let rules = vec![
            FieldRule::new(Field::Title, r"<h2>(.*?)</h2>", true).unwrap(),
            FieldRule::new(Field::Description, r"<em>(.*?)</em>", true).unwrap(),
        ];
        let ex = RecordExtractor::with_rules(rules, Url::parse("https://example.com/").unwrap());
        let frag = Fragment::new("<h2>Head</h2><em>Body</em>", "Head\n1 Jan 2024");
        let card = ex.extract(&frag).unwrap();
        assert_eq!(card.title, "Head");
        assert_eq!(card.description, "Body");
        assert_eq!(card.image_url, None);
    }

    #[test]
    fn test_bad_rule_pattern() {
        assert!(matches!(
            FieldRule::new(Field::Title, r"(unclosed", true),
            Err(ScrapeError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_cards_rendered_by_snapshot_session() {
        let dir = tempdir().unwrap();
        let cards: String = (0..20)
            .map(|i| {
                format!(
                    r#"<article class="gc"><h3 class="gc__title"><a href="/news/{i}" class="u-clickable-card__link"><span>T{i}</span></a></h3><div class="gc__excerpt"><p>Body {i}</p></div><img src="/img/{i}.jpg" alt="Caption {i}"><span>Last update</span><span>10 Mar 2024</span></article>"#
                )
            })
            .collect();
        tokio::fs::write(
            dir.path().join("page_000.html"),
            format!("<html><body><main>{cards}</main></body></html>"),
        )
        .await
        .unwrap();

        let mut session = SnapshotSession::open(dir.path(), "article").await.unwrap();
        session.open_search("t").await.unwrap();
        let fragments = session.current_result_fragments().await.unwrap();
        assert_eq!(fragments.len(), 20);
        assert!(fragments[0].html.contains(r#"<a class="u-clickable-card__link" href="/news/0">"#));

        for (i, fragment) in fragments.iter().enumerate() {
            let card = extractor().extract(fragment).unwrap();
            assert_eq!(card.title, format!("T{i}"));
            assert_eq!(card.description, format!("Body {i}"));
            assert_eq!(card.image_caption, Some(format!("Caption {i}")));
            assert_eq!(
                card.image_url.unwrap().as_str(),
                format!("https://www.aljazeera.com/img/{i}.jpg")
            );
        }
    }
}
