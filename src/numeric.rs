// 🔢 Numeric Coercion - lenient parsing of scraped text
//
// Two families:
// - `parse_*` return Option: the caller decides whether absence matters.
// - `coerce_*` never fail: unparseable or empty text counts as zero.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?\d*\.?\d+").expect("invalid regex: number"));

/// Drop thousands separators and surrounding whitespace
fn clean(text: &str) -> String {
    text.trim().replace(',', "")
}

/// First numeric token in free text ("Proj 111.65" → 111.65)
pub fn first_number(text: &str) -> Option<f64> {
    let cleaned = clean(text);
    NUMBER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Whole-field decimal parse ("1,234.50" → 1234.5, "12 pts" → None)
pub fn parse_decimal(text: &str) -> Option<f64> {
    let cleaned = clean(text);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Counting stat: integer or zero
pub fn coerce_int(text: &str) -> i64 {
    clean(text).parse::<i64>().unwrap_or(0)
}

/// Points stat: decimal or zero
pub fn coerce_float(text: &str) -> f64 {
    parse_decimal(text).unwrap_or(0.0)
}

/// Keep only the digits ("1st" → 1, "3" → 3, "" → 0)
pub fn digits_only(text: &str) -> u32 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<u32>().unwrap_or(0)
}

/// Strict rank parse used for sorting; None sorts last
pub fn parse_rank(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok()
}

/// "10-3-1" → (10, 3, 1); missing parts are zero
pub fn parse_record(text: &str) -> (i64, i64, i64) {
    let mut parts = text.trim().split('-').map(coerce_int);
    let wins = parts.next().unwrap_or(0);
    let losses = parts.next().unwrap_or(0);
    let ties = parts.next().unwrap_or(0);
    (wins, losses, ties)
}

/// Canonical two-decimal output
pub fn format_points(value: f64) -> String {
    // -0.00 would break byte-identical reruns against a positive zero
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.2}", value)
}

/// Largest magnitude, in hundredths, that survives the round trip through f64
const MAX_CENTS: f64 = 1e15;

/// Hundredths as an integer, so comparisons agree with the two-decimal output.
/// None for values no score could take.
pub fn to_cents(value: f64) -> Option<i64> {
    let cents = (value * 100.0).round();
    if !cents.is_finite() || cents.abs() > MAX_CENTS {
        return None;
    }
    Some(cents as i64)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_number_free_text() {
        assert_eq!(first_number("Proj 111.65"), Some(111.65));
        assert_eq!(first_number("98.40"), Some(98.4));
        assert_eq!(first_number("-3"), Some(-3.0));
        assert_eq!(first_number("1,204.10 pts"), Some(1204.10));
        assert_eq!(first_number("-"), None);
        assert_eq!(first_number(""), None);
    }

    #[test]
    fn test_coerce_int_is_lenient() {
        assert_eq!(coerce_int("12"), 12);
        assert_eq!(coerce_int(" 1,024 "), 1024);
        assert_eq!(coerce_int(""), 0);
        assert_eq!(coerce_int("n/a"), 0);
        assert_eq!(coerce_int("3rd"), 0);
    }

    #[test]
    fn test_coerce_float_is_lenient() {
        assert_eq!(coerce_float("1,432.56"), 1432.56);
        assert_eq!(coerce_float(""), 0.0);
        assert_eq!(coerce_float("--"), 0.0);
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("1st"), 1);
        assert_eq!(digits_only("3"), 3);
        assert_eq!(digits_only("10th Place"), 10);
        assert_eq!(digits_only(""), 0);
        assert_eq!(digits_only("Place"), 0);
    }

    #[test]
    fn test_parse_record() {
        assert_eq!(parse_record("10-3-0"), (10, 3, 0));
        assert_eq!(parse_record("7-6"), (7, 6, 0));
        assert_eq!(parse_record(""), (0, 0, 0));
    }

    #[test]
    fn test_to_cents_rejects_absurd_values() {
        assert_eq!(to_cents(98.2), Some(9820));
        assert_eq!(to_cents(-0.004), Some(0));
        assert_eq!(to_cents(99999999999999999.0), None);
        assert_eq!(to_cents(f64::INFINITY), None);
        assert_eq!(to_cents(f64::NAN), None);
    }

    #[test]
    fn test_format_points_two_decimals() {
        assert_eq!(format_points(1432.5), "1432.50");
        assert_eq!(format_points(-0.0), "0.00");
        assert_eq!(format_points(0.004), "0.00");
    }
}
