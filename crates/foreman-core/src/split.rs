//! Splitting a raw task title into an identifier code and a display name.
//!
//! Task codes look like `INTEL-034` or `АР-12-3`: letters (Latin or Cyrillic),
//! a dash, digits, and an optional second `-digits` group.

use std::sync::OnceLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;

const CODE: &str = r"[A-Za-zА-Яа-яЁё]+-\d+(?:-\d+)?";

/// Prefix of placeholder identifiers minted when the title carries no code.
pub const PLACEHOLDER_PREFIX: &str = "TMP-";

/// Result of splitting a raw title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTitle {
    pub identifier: String,
    pub name: String,
    /// `false` when `identifier` is a generated placeholder.
    pub explicit: bool,
}

fn separated_re() -> &'static Regex {
    // A hyphen only counts as a separator when spaced, so `A-1-2 x` keeps
    // its second digit group.
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^({CODE})(?:\s+[-–—]|\s*[–—])\s*(.*)$")).expect("valid regex")
    })
}

fn leading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"^({CODE})\s+(.+)$")).expect("valid regex"))
}

fn whole_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"^{CODE}$")).expect("valid regex"))
}

/// Split `raw` into code and name, minting a placeholder stamped with `now`
/// when no code is present.
pub fn split_title_at(raw: &str, now: NaiveDateTime) -> SplitTitle {
    let text = raw.trim();

    let matched = separated_re()
        .captures(text)
        .or_else(|| leading_re().captures(text));
    if let Some(caps) = matched {
        return SplitTitle {
            identifier: caps[1].to_string(),
            name: caps[2].trim().to_string(),
            explicit: true,
        };
    }

    if whole_re().is_match(text) {
        return SplitTitle {
            identifier: text.to_string(),
            name: String::new(),
            explicit: true,
        };
    }

    SplitTitle {
        identifier: placeholder_identifier(now),
        name: text.to_string(),
        explicit: false,
    }
}

/// Split `raw` using the local clock for placeholders.
pub fn split_title(raw: &str) -> SplitTitle {
    split_title_at(raw, Local::now().naive_local())
}

/// Placeholder identifier of the form `TMP-YYYYMMDD-HHMMSS`.
pub fn placeholder_identifier(now: NaiveDateTime) -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, now.format("%Y%m%d-%H%M%S"))
}
