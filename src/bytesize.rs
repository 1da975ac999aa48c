//! Human-readable byte-size strings: `"5mb"` to a byte count and back.

const UNITS: [(&str, u64); 6] = [
    ("b", 1),
    ("kb", 1 << 10),
    ("mb", 1 << 20),
    ("gb", 1 << 30),
    ("tb", 1 << 40),
    ("pb", 1 << 50),
];

/// Parses a size string such as `"5mb"`, `"1.5GB"`, or `"1024"` into bytes.
///
/// Units are case-insensitive and binary (1kb = 1024 bytes); a bare number is
/// a byte count. Returns `None` for anything else.
pub fn parse_size(value: &str) -> Option<u64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    if number.is_empty() {
        return None;
    }
    let number: f64 = number.parse().ok()?;
    if !number.is_finite() {
        return None;
    }

    let unit = unit.trim();
    let factor = if unit.is_empty() {
        1
    } else {
        UNITS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(unit))?
            .1
    };
    Some((number * factor as f64).floor() as u64)
}

/// Formats a byte count with its largest fitting unit, e.g. `5242880` as
/// `"5MB"` and `1536` as `"1.5KB"`. Fractions are kept to two decimals.
pub fn format_size(bytes: u64) -> String {
    let (unit, factor) = UNITS
        .iter()
        .rev()
        .find(|(_, factor)| bytes >= *factor)
        .copied()
        .unwrap_or(UNITS[0]);
    let value = (bytes as f64 / factor as f64 * 100.0).round() / 100.0;
    if value == value.trunc() {
        format!("{}{}", value as u64, unit.to_ascii_uppercase())
    } else {
        format!("{}{}", value, unit.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_byte_counts() {
        assert_eq!(parse_size("1024"), Some(1024));
        assert_eq!(parse_size("0"), Some(0));
    }

    #[test]
    fn parses_units_case_insensitively() {
        assert_eq!(parse_size("5mb"), Some(5 * 1024 * 1024));
        assert_eq!(parse_size("5MB"), Some(5 * 1024 * 1024));
        assert_eq!(parse_size("1kb"), Some(1024));
        assert_eq!(parse_size("2GB"), Some(2 * 1024 * 1024 * 1024));
    }

    #[test]
    fn parses_fractional_values() {
        assert_eq!(parse_size("1.5kb"), Some(1536));
        assert_eq!(parse_size("0.5mb"), Some(512 * 1024));
    }

    #[test]
    fn tolerates_whitespace_between_number_and_unit() {
        assert_eq!(parse_size(" 5 mb "), Some(5 * 1024 * 1024));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_size(""), None);
        assert_eq!(parse_size("mb"), None);
        assert_eq!(parse_size("five megabytes"), None);
        assert_eq!(parse_size("-5mb"), None);
        assert_eq!(parse_size("5lightyears"), None);
        assert_eq!(parse_size("1.2.3kb"), None);
    }

    #[test]
    fn formats_with_largest_fitting_unit() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(1024), "1KB");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5MB");
    }
}
