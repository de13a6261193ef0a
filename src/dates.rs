//! Date handling: the month cutoff boundary and the date line printed on
//! each result card.
//!
//! The cutoff follows a "month 1 is the current month" convention, so
//! `months_back` of `0` and `1` resolve to the same boundary.

use crate::error::{Result, ScrapeError};
use chrono::{Datelike, Days, Local, Months, NaiveDate};
use tracing::{debug, instrument};

/// Label the site prints in front of a card's date.
pub const DATE_PREFIX: &str = "Last update";

/// Format of the card date once the prefix is gone, e.g. `10 Mar 2024`.
pub const CARD_DATE_FORMAT: &str = "%d %b %Y";

/// Format used for the `date` column of the exported report.
pub const REPORT_DATE_FORMAT: &str = "%d/%m/%Y";

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Compute the cutoff boundary relative to `today`.
///
/// * `months_back <= 1` gives the first day of `today`'s month.
/// * `months_back = k > 1` gives the first day of the month `k - 1`
///   months before `today`'s month.
///
/// # Errors
///
/// [`ScrapeError::InvalidArgument`] for a negative offset, or one so large
/// the date leaves chrono's range.
pub fn cutoff_date(months_back: i64, today: NaiveDate) -> Result<NaiveDate> {
    if months_back < 0 {
        return Err(ScrapeError::InvalidArgument(format!(
            "months must be >= 0, got {months_back}"
        )));
    }

    let first = first_of_month(today);
    if months_back <= 1 {
        return Ok(first);
    }

    let back = u32::try_from(months_back - 1).map_err(|_| {
        ScrapeError::InvalidArgument(format!("months offset {months_back} is out of range"))
    })?;
    first.checked_sub_months(Months::new(back)).ok_or_else(|| {
        ScrapeError::InvalidArgument(format!("months offset {months_back} is out of range"))
    })
}

/// [`cutoff_date`] against the local calendar date at call time.
#[instrument(level = "debug")]
pub fn cutoff_from_today(months_back: i64) -> Result<NaiveDate> {
    let today = Local::now().date_naive();
    let cutoff = cutoff_date(months_back, today)?;
    debug!(%today, %cutoff, "Resolved cutoff boundary");
    Ok(cutoff)
}

/// Parse the publication date from a card's visible text.
///
/// The date sits on the last non-blank line, optionally behind `prefix`.
pub fn parse_card_date(visible_text: &str, prefix: &str) -> Result<NaiveDate> {
    let last_line = visible_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or_default();
    let raw = last_line.strip_prefix(prefix).unwrap_or(last_line).trim();

    NaiveDate::parse_from_str(raw, CARD_DATE_FORMAT).map_err(|_| ScrapeError::MalformedDate {
        text: raw.to_string(),
    })
}

pub fn format_report_date(date: NaiveDate) -> String {
    date.format(REPORT_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cutoff_current_month_for_zero_and_one() {
        let today = ymd(2024, 3, 17);
        assert_eq!(cutoff_date(0, today).unwrap(), ymd(2024, 3, 1));
        assert_eq!(cutoff_date(1, today).unwrap(), ymd(2024, 3, 1));
    }

    #[test]
    fn test_cutoff_goes_back_k_minus_one_months() {
        let today = ymd(2024, 3, 17);
        assert_eq!(cutoff_date(2, today).unwrap(), ymd(2024, 2, 1));
        assert_eq!(cutoff_date(3, today).unwrap(), ymd(2024, 1, 1));
    }

    #[test]
    fn test_cutoff_crosses_year_boundary() {
        let today = ymd(2024, 1, 31);
        assert_eq!(cutoff_date(3, today).unwrap(), ymd(2023, 11, 1));
        assert_eq!(cutoff_date(13, today).unwrap(), ymd(2023, 1, 1));
    }

    #[test]
    fn test_cutoff_on_first_of_month() {
        let today = ymd(2024, 3, 1);
        assert_eq!(cutoff_date(1, today).unwrap(), today);
    }

    #[test]
    fn test_cutoff_rejects_negative() {
        let err = cutoff_date(-1, ymd(2024, 3, 17)).unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidArgument(_)));
    }

    #[test]
    fn test_cutoff_from_today_is_first_of_month() {
        let cutoff = cutoff_from_today(0).unwrap();
        assert_eq!(cutoff.day(), 1);
        assert_eq!(cutoff, first_of_month(Local::now().date_naive()));
    }

    #[test]
    fn test_parse_card_date_with_prefix() {
        let text = "Dollar rises\nMarkets rally on the news\nLast update 10 Mar 2024";
        assert_eq!(parse_card_date(text, DATE_PREFIX).unwrap(), ymd(2024, 3, 10));
    }

    #[test]
    fn test_parse_card_date_prefix_on_its_own_line() {
        let text = "Dollar rises\nLast update\n5 Feb 2024\n";
        assert_eq!(parse_card_date(text, DATE_PREFIX).unwrap(), ymd(2024, 2, 5));
    }

    #[test]
    fn test_parse_card_date_without_prefix() {
        assert_eq!(
            parse_card_date("Title\n01 Jan 2023", DATE_PREFIX).unwrap(),
            ymd(2023, 1, 1)
        );
    }

    #[test]
    fn test_parse_card_date_malformed() {
        let err = parse_card_date("Title\n3 hours ago", DATE_PREFIX).unwrap_err();
        match err {
            ScrapeError::MalformedDate { text } => assert_eq!(text, "3 hours ago"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            parse_card_date("", DATE_PREFIX),
            Err(ScrapeError::MalformedDate { .. })
        ));
    }

    #[test]
    fn test_format_report_date() {
        assert_eq!(format_report_date(ymd(2024, 3, 5)), "05/03/2024");
    }
}
