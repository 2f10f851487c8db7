//! Date format catalogue used by type inference and casting.
//!
//! The catalogue is generated once from a handful of base date patterns, combined with
//! four separators and optional time-of-day suffixes. Formats are `chrono` strftime
//! strings, so the format carried by [`crate::types::CellType::Date`] can be fed straight
//! back into [`parse_date`].

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Rough shape of a date: a 1-4 digit lead, then two more separated components.
static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,4}[-/.\s]\S+[-/.\s]\S+").expect("date shape regex"));

static DATE_FORMATS: Lazy<Vec<String>> = Lazy::new(create_date_formats);

// `%Y` accepts 1-4 digits, so two-digit year variants must be tried before their
// four-digit twins and the year-first layout after both.
const BASE_DATE_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d/%m/%Y",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d/%b/%Y",
    "%d/%B/%Y",
];

const DATE_SEPARATORS: &[&str] = &["-", ".", "/", " "];

const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%H:%M:%S%z"];

const TIME_JOINERS: &[&str] = &["T", " "];

fn create_date_formats() -> Vec<String> {
    let mut out = Vec::new();
    for sep in DATE_SEPARATORS {
        for base in BASE_DATE_FORMATS {
            let date = base.replace('/', sep);
            for joiner in TIME_JOINERS {
                for time in TIME_FORMATS {
                    out.push(format!("{date}{joiner}{time}"));
                }
            }
            out.push(date);
        }
    }
    out
}

/// All generated formats, in matching priority order.
pub fn date_formats() -> &'static [String] {
    DATE_FORMATS.as_slice()
}

/// Cheap pre-check before trying the full catalogue.
pub fn is_date(value: &str) -> bool {
    DATE_SHAPE.is_match(value.trim())
}

/// Parse `value` with a single catalogue (or caller supplied) format.
///
/// Formats without a time component yield midnight.
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if format.contains("%H") {
        NaiveDateTime::parse_from_str(value, format).ok()
    } else {
        NaiveDate::parse_from_str(value, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

/// First catalogue format that parses `value`, if any.
pub fn guess_date_format(value: &str) -> Option<&'static str> {
    if !is_date(value) {
        return None;
    }
    date_formats()
        .iter()
        .find(|f| parse_date(value, f).is_some())
        .map(String::as_str)
}

/// Parse `value` with whichever catalogue format matches first.
pub fn parse_any_date(value: &str) -> Option<NaiveDateTime> {
    guess_date_format(value).and_then(|f| parse_date(value, f))
}
