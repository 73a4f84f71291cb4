//! Loose deadline parsing.
//!
//! Anything that isn't a recognised date form means "no deadline"; callers
//! never see a parse error.

use std::sync::OnceLock;

use chrono::{Duration, Local, NaiveDate};
use regex::Regex;

const NONE_TOKENS: &[&str] = &["", "-", "—"];
const TODAY_TOKENS: &[&str] = &["сегодня", "today"];
const TOMORROW_TOKENS: &[&str] = &["завтра", "tomorrow"];

fn iso_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid regex"))
}

fn dotted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{2})\.(\d{2})\.(\d{4})$").expect("valid regex"))
}

/// Parse free-form deadline text relative to `today`.
///
/// Accepts `YYYY-MM-DD`, `DD.MM.YYYY`, `today`/`tomorrow` (and their Russian
/// forms). Impossible calendar dates yield `None`.
pub fn parse_deadline_on(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = text.trim().to_lowercase();

    if NONE_TOKENS.contains(&s.as_str()) {
        return None;
    }
    if TODAY_TOKENS.contains(&s.as_str()) {
        return Some(today);
    }
    if TOMORROW_TOKENS.contains(&s.as_str()) {
        return today.checked_add_signed(Duration::days(1));
    }

    if let Some(caps) = iso_re().captures(&s) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = dotted_re().captures(&s) {
        return ymd(&caps[3], &caps[2], &caps[1]);
    }

    None
}

/// Parse deadline text against the local calendar date.
pub fn parse_deadline(text: &str) -> Option<NaiveDate> {
    parse_deadline_on(text, Local::now().date_naive())
}

/// Render a deadline in canonical `YYYY-MM-DD` form.
pub fn format_deadline(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn parse(s: &str) -> Option<String> {
        parse_deadline_on(s, today()).map(format_deadline)
    }

    #[test]
    fn test_iso_passthrough() {
        assert_eq!(parse("2025-06-01").as_deref(), Some("2025-06-01"));
        assert_eq!(parse("  2024-02-29 ").as_deref(), Some("2024-02-29"));
    }

    #[test]
    fn test_dotted_converted_to_iso() {
        assert_eq!(parse("01.06.2025").as_deref(), Some("2025-06-01"));
        assert_eq!(parse("31.12.2030").as_deref(), Some("2030-12-31"));
    }

    #[test]
    fn test_both_forms_agree() {
        for (iso, dotted) in [("2025-01-09", "09.01.2025"), ("2026-11-30", "30.11.2026")] {
            assert_eq!(parse(iso), parse(dotted));
            assert_eq!(parse(iso).as_deref(), Some(iso));
        }
    }

    #[test]
    fn test_invalid_calendar_dates() {
        assert_eq!(parse("2025-13-40"), None);
        assert_eq!(parse("2025-02-30"), None);
        assert_eq!(parse("30.02.2025"), None);
        assert_eq!(parse("2023-02-29"), None);
    }

    #[test]
    fn test_none_tokens() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("-"), None);
        assert_eq!(parse("—"), None);
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn test_relative_tokens() {
        assert_eq!(parse("today").as_deref(), Some("2025-03-14"));
        assert_eq!(parse("Сегодня").as_deref(), Some("2025-03-14"));
        assert_eq!(parse("TOMORROW").as_deref(), Some("2025-03-15"));
        assert_eq!(parse("завтра").as_deref(), Some("2025-03-15"));
    }

    #[test]
    fn test_tomorrow_crosses_month() {
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(
            parse_deadline_on("tomorrow", end),
            NaiveDate::from_ymd_opt(2025, 2, 1)
        );
    }

    #[test]
    fn test_garbage_is_no_deadline() {
        assert_eq!(parse("next week"), None);
        assert_eq!(parse("2025/06/01"), None);
        assert_eq!(parse("1.6.2025"), None);
        assert_eq!(parse("20250601"), None);
    }
}
