//! Title normalization.

/// Normalize a title for identity comparison.
///
/// Lowercases, drops punctuation and collapses runs of whitespace, so
/// "Alien: Resurrection" and "alien  resurrection" compare equal.
pub fn normalize_title(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the year out of a TMDB style `YYYY-MM-DD` date.
pub fn year_from_date(date: Option<&str>) -> Option<u16> {
    date.and_then(|d| d.get(0..4)).and_then(|y| y.parse().ok())
}
