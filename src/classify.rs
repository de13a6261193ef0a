//! Text heuristics derived from a record's title and description.
//!
//! Both functions case-fold and concatenate `title + description` before
//! looking at them, and neither has side effects.

use once_cell::sync::Lazy;
use regex::Regex;

/// `$5`, `$5.50`, `$1,000.50`, `5 dollars`, `10 usd`. Applied to lowercased text.
static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(\d+\.\d+|\d+(,\d+)*(\.\d+)?)|\d+\s*dollars|\d+\s*usd")
        .expect("valid money regex")
});

/// Derived fields for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub search_term_count: usize,
    pub contains_money_reference: bool,
}

impl Classification {
    pub fn of(title: &str, description: &str, term: &str) -> Self {
        Self {
            search_term_count: search_term_count(title, description, term),
            contains_money_reference: contains_money_reference(title, description),
        }
    }
}

fn folded(title: &str, description: &str) -> String {
    let mut text = String::with_capacity(title.len() + description.len());
    text.push_str(title);
    text.push_str(description);
    text.to_lowercase()
}

/// Count non-overlapping, case-insensitive occurrences of `term`.
///
/// An empty term counts as zero.
pub fn search_term_count(title: &str, description: &str, term: &str) -> usize {
    let term = term.to_lowercase();
    if term.is_empty() {
        return 0;
    }
    folded(title, description).matches(term.as_str()).count()
}

pub fn contains_money_reference(title: &str, description: &str) -> bool {
    MONEY_RE.is_match(&folded(title, description))
}
