use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses ticket-creation timestamps from the variety of layouts help-desk
/// exports use.
pub struct TimestampProcessor;

/// Date-time layouts tried in order after RFC 3339 / RFC 2822. Month-first
/// slashed dates are tried before day-first ones.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y年%m月%d日 %H:%M:%S",
    "%Y年%m月%d日 %H:%M",
];

/// Offset-carrying layouts RFC 3339 rejects, such as `+0800` without a colon.
const ZONED_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y%m%d",
    "%Y年%m月%d日",
];

impl TimestampProcessor {
    /// Parse a cell into a naive local timestamp.
    ///
    /// Zone-aware inputs are converted to their wall-clock time in the
    /// original offset, so a ticket created at 23:30 local time stays in the
    /// local calendar month. Returns `None` for empty or unrecognised input.
    pub fn parse_str(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let normalised = match s.strip_suffix('Z') {
            Some(stripped) => format!("{}+00:00", stripped),
            None => s.to_string(),
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.naive_local());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.naive_local());
        }
        for fmt in ZONED_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Some(dt.naive_local());
            }
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        debug!("could not parse timestamp \"{}\"", s);
        None
    }
}

// ── NumericCleaner ────────────────────────────────────────────────────────────

fn dash_sentinel() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // ASCII hyphen plus the Unicode dash family and the minus sign.
    RE.get_or_init(|| Regex::new(r"^[-\x{2010}-\x{2015}\x{2212}\x{FE58}\x{FE63}\x{FF0D}]+$").expect("regex is valid"))
}

fn null_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(null|none|nan|n/a)$").expect("regex is valid"))
}

/// Cleans numeric export cells into `Option<f64>`.
///
/// Sentinels, blanks and garbage become `None`; nothing becomes zero.
pub struct NumericCleaner;

impl NumericCleaner {
    /// `true` when `s` (already trimmed) is a placeholder for "no value".
    pub fn is_missing_token(s: &str) -> bool {
        s.is_empty() || dash_sentinel().is_match(s) || null_token().is_match(s)
    }

    /// Clean a single cell.
    ///
    /// * `"1,234"` → `Some(1234.0)`
    /// * `"-"`, `"—"`, `"null"`, `"NaN"`, `""` → `None`
    /// * `"abc"` → `None`
    pub fn clean(raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if Self::is_missing_token(trimmed) {
            return None;
        }
        let without_separators: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ',' | '，' | '\u{00A0}' | '\u{202F}'))
            .collect();
        match without_separators.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                debug!("dropping malformed numeric cell \"{}\"", trimmed);
                None
            }
        }
    }

    /// Clean an integer-valued cell such as the legacy `rn` rank. Accepts
    /// float spellings of whole numbers (`"1.0"`).
    pub fn clean_integer(raw: &str) -> Option<i64> {
        let v = Self::clean(raw)?;
        if v.fract() == 0.0 {
            Some(v as i64)
        } else {
            None
        }
    }
}

/// Trim a categorical cell; blanks and missing-value tokens become `None`.
pub fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || null_token().is_match(trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
