//! Reusable answer predicates.
//!
//! Building blocks for custom rules, each paired with a standard message in
//! `validate::messages`. All predicates treat their input as a raw answer
//! string; emptiness handling is the caller's concern.

use chrono::{NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://.+").expect("url pattern is valid"));

static UNSAFE_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<script|javascript:|on\w+\s*=").expect("unsafe text pattern is valid")
});

// Reference codes avoid the ambiguous characters O/0 and I/1.
static REFERENCE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-HJ-NP-Z2-9]{4}-[A-HJ-NP-Z2-9]{4}-[A-HJ-NP-Z2-9]{4}$")
        .expect("reference code pattern is valid")
});

/// Whether the text is non-empty after trimming.
///
pub fn required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Whether the text has at least `min` characters.
///
pub fn min_length(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

/// Whether the text has at most `max` characters.
///
pub fn max_length(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

pub fn email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn url(value: &str) -> bool {
    URL.is_match(value)
}

/// Whether the text parses as a `YYYY-MM-DD` calendar date.
///
pub fn date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Whether the text parses as a `HH:MM` time of day.
///
pub fn time(value: &str) -> bool {
    NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}

/// Whether the text is a valid date strictly before today (UTC).
///
pub fn past_date(value: &str) -> bool {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(parsed) => parsed < Utc::now().date_naive(),
        Err(_) => false,
    }
}

/// Whether the text is free of script-injection markers.
///
pub fn safe_text(value: &str) -> bool {
    !UNSAFE_TEXT.is_match(value)
}

/// Whether the text matches the `XXXX-XXXX-XXXX` reference code format.
///
pub fn reference_code(value: &str) -> bool {
    REFERENCE_CODE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert!(required("report"));
        assert!(!required(""));
        assert!(!required("   "));
    }

    #[test]
    fn test_length_bounds_count_characters() {
        assert!(min_length("hello", 5));
        assert!(!min_length("hell", 5));
        assert!(max_length("hello", 5));
        assert!(!max_length("hello!", 5));
        // Multi-byte characters count once.
        assert!(min_length("héllo", 5));
        assert!(max_length("héllo", 5));
    }

    #[test]
    fn test_email() {
        assert!(email("someone@example.org"));
        assert!(!email("someone@"));
        assert!(!email("not an email"));
    }

    #[test]
    fn test_url() {
        assert!(url("https://example.org/report"));
        assert!(url("http://example.org"));
        assert!(!url("ftp://example.org"));
        assert!(!url("example.org"));
    }

    #[test]
    fn test_date() {
        assert!(date("2024-01-31"));
        assert!(date("2024-02-29"));
        assert!(!date("2023-02-29"));
        assert!(!date("31-01-2024"));
        assert!(!date("2024-13-01"));
    }

    #[test]
    fn test_time() {
        assert!(time("00:00"));
        assert!(time("23:59"));
        assert!(!time("24:00"));
        assert!(!time("9 pm"));
    }

    #[test]
    fn test_past_date() {
        assert!(past_date("2000-01-01"));
        assert!(!past_date("9999-12-31"));
        assert!(!past_date("not a date"));
    }

    #[test]
    fn test_safe_text() {
        assert!(safe_text("An ordinary description."));
        assert!(!safe_text("<script>alert(1)</script>"));
        assert!(!safe_text("javascript:void(0)"));
        assert!(!safe_text("<img onerror=alert(1)>"));
    }

    #[test]
    fn test_reference_code() {
        assert!(reference_code("AB2C-3DEF-GH4J"));
        assert!(!reference_code("AB2C-3DEF"));
        assert!(!reference_code("ab2c-3def-gh4j"));
        assert!(!reference_code("ABOC-3DEF-GH4J")); // contains O
        assert!(!reference_code("AB1C-3DEF-GH4J")); // contains 1
    }
}
