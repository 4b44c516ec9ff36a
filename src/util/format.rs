//! Number formatting utilities.

/// Format a percentage with no decimals.
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value:.0}%")
}

/// Format a count with comma thousands separators, e.g. `1,234,567`.
#[must_use]
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Like [`format_count`], with `-` for a missing value.
#[must_use]
pub fn format_optional_count(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), format_count)
}
