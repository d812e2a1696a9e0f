//! Scalar extraction from free-form model text.
//!
//! Models asked for "ONLY the integer" still answer in prose often enough
//! that callers need a tolerant extractor. The pattern is compiled once.

use regex_lite::Regex;
use std::sync::OnceLock;

fn int_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+").expect("integer pattern is valid"))
}

/// First integer token within `[min, max]`, scanning left to right.
/// Out-of-range tokens are skipped, not an error.
pub fn first_int_in_range(text: &str, min: i64, max: i64) -> Option<i64> {
    int_pattern()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<i64>().ok())
        .find(|n| (min..=max).contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_bare_integer() {
        assert_eq!(first_int_in_range("7", 1, 10), Some(7));
    }

    #[test]
    fn finds_integer_in_prose() {
        assert_eq!(first_int_in_range("I'd say 8 out of 10.", 1, 10), Some(8));
    }

    #[test]
    fn skips_out_of_range_tokens() {
        assert_eq!(first_int_in_range("As of 2024, a solid 3.", 1, 10), Some(3));
    }

    #[test]
    fn none_when_no_token_is_in_range() {
        assert_eq!(first_int_in_range("no digits here", 1, 10), None);
        assert_eq!(first_int_in_range("0 and 11", 1, 10), None);
    }

    #[test]
    fn negative_bounds_are_honored() {
        assert_eq!(first_int_in_range("down -3 degrees", -10, 0), Some(-3));
    }
}
