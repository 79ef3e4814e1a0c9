/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Parse a cleaned string as a finite float. Anything else is treated as absent,
/// the same way a coercing numeric conversion would turn it into a missing value.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_strips_quotes_and_space() {
        assert_eq!(clean_str("  \"2008M01\" "), "2008M01");
        assert_eq!(clean_str("\""), "\"");
        assert_eq!(clean_str(" x "), "x");
    }

    #[test]
    fn parse_number_coerces_or_gives_none() {
        assert_eq!(parse_number("3.25"), Some(3.25));
        assert_eq!(parse_number(" -1e2 "), Some(-100.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number(".."), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }
}
