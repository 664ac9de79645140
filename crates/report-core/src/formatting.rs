/// Placeholder rendered for a true-missing value.
pub const MISSING_PLACEHOLDER: &str = "-";

/// Render `value` with `decimals` fixed decimals and comma-grouped thousands.
///
/// ```
/// use report_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// assert_eq!(format_number(7.0, 0), "7");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let factor = 10_f64.powi(decimals as i32);
    // Exact decimal midpoints such as 1.005 round away from zero.
    let scaled = (value.abs() * factor * (1.0 + f64::EPSILON)).round();
    let fixed = format!("{:.*}", decimals as usize, scaled / factor);

    let (digits, fraction) = match fixed.split_once('.') {
        Some((d, f)) => (d, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value < 0.0 && scaled != 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(digits));
    if let Some(f) = fraction {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Render an optional statistic with two decimals, or the placeholder.
///
/// ```
/// use report_core::formatting::format_stat;
///
/// assert_eq!(format_stat(Some(1234.5)), "1,234.50");
/// assert_eq!(format_stat(None), "-");
/// ```
pub fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format_number(v, 2),
        None => MISSING_PLACEHOLDER.to_string(),
    }
}

/// Render a fractional period-over-period change as a percentage with one
/// decimal, or the placeholder when there is no defined change.
///
/// ```
/// use report_core::formatting::format_change;
///
/// assert_eq!(format_change(Some(0.5)), "50.0%");
/// assert_eq!(format_change(Some(-0.125)), "-12.5%");
/// assert_eq!(format_change(None), "-");
/// ```
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(c) => format!("{}%", format_number(c * 100.0, 1)),
        None => MISSING_PLACEHOLDER.to_string(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
