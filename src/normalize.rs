//! # Normalization Helpers
//!
//! Shared text rules for ingredient search terms, pantry names and saved-recipe
//! queries. Everything that compares names goes through here so the ranker,
//! the pantry policy and saved-recipe search agree on what "the same name" means.
//!
//! - Search terms are trimmed and lower-cased; empty terms are dropped
//! - Free text is split on commas
//! - Duplicates are kept (callers decide what a repeated term means)

use deunicode::deunicode;
use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use std::cmp::Ordering;

lazy_static! {
    static ref TERM_SEPARATOR: Regex =
        Regex::new(r"\s*,\s*").expect("Term separator pattern should be valid");
}

/// Normalize a single name: trim surrounding whitespace and lower-case it
///
/// # Examples
///
/// ```rust
/// use cookify::normalize::normalize_name;
///
/// assert_eq!(normalize_name("  Chicken Breast "), "chicken breast");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize one search ingredient, returning `None` when nothing is left
pub fn normalize_ingredient(raw: &str) -> Option<String> {
    let normalized = normalize_name(raw);
    if normalized.is_empty() {
        trace!("Discarding empty ingredient entry: '{}'", raw);
        None
    } else {
        Some(normalized)
    }
}

/// Normalize a list of user-supplied ingredients, preserving order and duplicates
///
/// # Examples
///
/// ```rust
/// use cookify::normalize::normalize_ingredients;
///
/// let searched = normalize_ingredients(&[" Rice", "", "CHICKEN", "rice "]);
/// assert_eq!(searched, vec!["rice", "chicken", "rice"]);
/// ```
pub fn normalize_ingredients<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let normalized: Vec<String> = raw
        .iter()
        .filter_map(|entry| normalize_ingredient(entry.as_ref()))
        .collect();

    debug!(
        "Normalized {} ingredient entries into {} search terms",
        raw.len(),
        normalized.len()
    );
    normalized
}

/// Split free text such as `"chicken, rice ,garlic"` into normalized search terms
///
/// # Examples
///
/// ```rust
/// use cookify::normalize::parse_ingredient_query;
///
/// assert_eq!(
///     parse_ingredient_query("Chicken, rice ,, Garlic"),
///     vec!["chicken", "rice", "garlic"]
/// );
/// ```
pub fn parse_ingredient_query(text: &str) -> Vec<String> {
    let pieces: Vec<&str> = TERM_SEPARATOR.split(text).collect();
    normalize_ingredients(&pieces)
}

/// Case-insensitive containment where `needle` is already normalized
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Case-insensitive prefix test where `prefix` is already normalized
pub fn starts_with_normalized(name: &str, prefix: &str) -> bool {
    normalize_name(name).starts_with(prefix)
}

/// Whether two display names refer to the same item
pub fn same_name(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

/// Primary sort key for a name: transliterated to ASCII, then lower-cased
///
/// # Examples
///
/// ```rust
/// use cookify::normalize::sort_key;
///
/// assert_eq!(sort_key(" Épinards"), "epinards");
/// assert_eq!(sort_key("Crème Fraîche"), "creme fraiche");
/// ```
pub fn sort_key(name: &str) -> String {
    deunicode(name.trim()).to_lowercase()
}

/// Alphabetical comparison ignoring case and accents
///
/// "Épinards" sorts between "Eggs" and "Fraises". Names with the same folded
/// key fall back to the lower-cased original, then the raw string, so the
/// resulting order never depends on input order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    sort_key(a)
        .cmp(&sort_key(b))
        .then_with(|| normalize_name(a).cmp(&normalize_name(b)))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ingredient() {
        assert_eq!(normalize_ingredient("  Garlic "), Some("garlic".to_string()));
        assert_eq!(normalize_ingredient("   "), None);
        assert_eq!(normalize_ingredient(""), None);
    }

    #[test]
    fn test_normalize_ingredients_keeps_duplicates() {
        let normalized = normalize_ingredients(&["Rice", "rice", " RICE "]);
        assert_eq!(normalized, vec!["rice", "rice", "rice"]);
    }

    #[test]
    fn test_parse_ingredient_query() {
        assert_eq!(
            parse_ingredient_query("chicken,rice"),
            vec!["chicken", "rice"]
        );
        assert_eq!(
            parse_ingredient_query("  Olive Oil , , tomato  "),
            vec!["olive oil", "tomato"]
        );
        assert!(parse_ingredient_query(" , ,").is_empty());
        assert!(parse_ingredient_query("").is_empty());
    }

    #[test]
    fn test_contains_and_prefix() {
        assert!(contains_normalized("Chicken Breast", "chicken"));
        assert!(contains_normalized("White Rice", "rice"));
        assert!(!contains_normalized("Rice Noodles", "chicken"));

        assert!(starts_with_normalized("Chicken", "ch"));
        assert!(!starts_with_normalized("Zucchini", "ch"));
    }

    #[test]
    fn test_same_name() {
        assert!(same_name("Milk", " milk"));
        assert!(!same_name("Milk", "Oat milk"));
    }

    #[test]
    fn test_compare_names_is_case_insensitive_and_total() {
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("Banana", "apple"), Ordering::Greater);
        // Case-only differences still produce a fixed order
        assert_ne!(compare_names("Milk", "milk"), Ordering::Equal);
        assert_eq!(compare_names("Milk", "Milk"), Ordering::Equal);
    }

    #[test]
    fn test_compare_names_folds_accents() {
        assert_eq!(compare_names("Épinards", "Fraises"), Ordering::Less);
        assert_eq!(compare_names("Eggs", "épinards"), Ordering::Less);
        assert_eq!(compare_names("Zucchini", "Épinards"), Ordering::Greater);
        // Same folded key: accented and plain spellings still get a fixed order
        assert_ne!(compare_names("Pâte", "Pate"), Ordering::Equal);
        assert_eq!(compare_names("Pâte", "Pate"), compare_names("Pâte", "Pate"));
    }
}
