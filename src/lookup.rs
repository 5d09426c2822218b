//! Loose id matching.
//!
//! Path parameters always arrive as strings while seeded ids are often JSON
//! numbers, so `/services/3` has to find `{"id": 3}` as well as `{"id": "3"}`.
//! The comparison follows JavaScript's `==` between a string and the stored
//! value: strings compare exactly, numbers and booleans compare numerically
//! after converting the string the way `Number(str)` would.

use serde_json::Value;

/// `true` when `stored == wanted` under JavaScript loose equality.
#[must_use]
pub fn loose_eq(stored: &Value, wanted: &str) -> bool {
    match stored {
        Value::String(s) => s == wanted,
        Value::Number(n) => match (n.as_f64(), to_number(wanted)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        Value::Bool(b) => to_number(wanted) == Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// String-to-number conversion with `Number(str)` rules. `None` stands in for
/// `NaN`, which equals nothing.
fn to_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = t.strip_prefix(prefix) {
            if digits.is_empty() {
                return None;
            }
            let mut value = 0.0;
            for c in digits.chars() {
                value = value * f64::from(radix) + f64::from(c.to_digit(radix)?);
            }
            return Some(value);
        }
    }

    match t {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    // Rust's float parser also takes "inf", "nan" and friends; JS does not.
    let decimal = t
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !decimal {
        return None;
    }
    t.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_id_matches_its_string_form() {
        assert!(loose_eq(&json!(3), "3"));
        assert!(loose_eq(&json!(3), " 3 "));
        assert!(loose_eq(&json!(3), "3.0"));
        assert!(loose_eq(&json!(3), "0x3"));
        assert!(loose_eq(&json!(300), "3e2"));
        assert!(!loose_eq(&json!(3), "4"));
        assert!(!loose_eq(&json!(3), "3abc"));
    }

    #[test]
    fn prefixed_literals_beyond_u64_still_match() {
        assert!(loose_eq(&json!(18446744073709551616.0), "0x10000000000000000"));
        assert!(loose_eq(&json!(8), "0o10"));
        assert!(loose_eq(&json!(5), "0b101"));
        assert!(!loose_eq(&json!(0), "0x"));
        assert!(!loose_eq(&json!(3), "0x+3"));
        assert!(!loose_eq(&json!(2), "0b2"));
    }

    #[test]
    fn string_id_matches_exactly() {
        assert!(loose_eq(&json!("abc"), "abc"));
        assert!(!loose_eq(&json!("abc"), "ABC"));
        assert!(!loose_eq(&json!("3"), " 3"));
    }

    #[test]
    fn empty_string_is_zero() {
        assert!(loose_eq(&json!(0), ""));
        assert!(!loose_eq(&json!(1), ""));
    }

    #[test]
    fn nan_never_matches() {
        assert!(!loose_eq(&json!(0), "nan"));
        assert!(!loose_eq(&json!(0), "NaN"));
        assert!(!loose_eq(&json!(0), "inf"));
    }

    #[test]
    fn booleans_compare_as_numbers() {
        assert!(loose_eq(&json!(true), "1"));
        assert!(loose_eq(&json!(false), "0"));
        assert!(!loose_eq(&json!(true), "true"));
    }

    #[test]
    fn null_and_containers_never_match() {
        assert!(!loose_eq(&Value::Null, "null"));
        assert!(!loose_eq(&json!([1]), "1"));
        assert!(!loose_eq(&json!({"a": 1}), "1"));
    }
}
