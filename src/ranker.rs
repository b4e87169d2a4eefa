//! # Ingredient Match Ranker
//!
//! Scores recipe candidates against the ingredients a user searched for and
//! orders them by relevance.
//!
//! A searched ingredient matches a candidate when at least one of the
//! candidate's ingredient names contains it, ignoring case. Each searched
//! ingredient counts once per candidate no matter how many lines it hits.
//! Candidates are ordered by descending match count; ties keep input order.
//!
//! The full/partial distinction only exists for multi-ingredient searches.
//! With a single searched ingredient no advisory is ever produced.

use log::{debug, info};
use std::collections::HashSet;

use crate::errors::CoreError;
use crate::recipe_model::{RankedCandidate, RecipeCandidate};

/// Result of ranking one search request
#[derive(Debug, Clone, PartialEq)]
pub struct RankOutcome {
    /// Candidates in relevance order
    pub ranked: Vec<RankedCandidate>,

    /// True when at least two ingredients were searched and some candidate covers all of them
    pub full_match_exists: bool,

    /// Number of searched ingredients, duplicates included
    pub total_searched: usize,
}

impl RankOutcome {
    /// Whether the caller should tell the user that no recipe contains every ingredient
    pub fn needs_advisory(&self) -> bool {
        !self.full_match_exists && self.total_searched >= 2 && !self.ranked.is_empty()
    }
}

/// Count how many distinct searched ingredients appear in the candidate
///
/// `searched` must already be normalized (see [`crate::normalize`]).
///
/// # Examples
///
/// ```rust
/// use cookify::ranker::match_count;
/// use cookify::recipe_model::{RecipeCandidate, RecipeIngredient};
///
/// let recipe = RecipeCandidate::new("1", "Fried Rice")
///     .with_ingredient(RecipeIngredient::new("White Rice", "2 cups"))
///     .with_ingredient(RecipeIngredient::new("Egg", "2"));
///
/// let searched = vec!["rice".to_string(), "chicken".to_string()];
/// assert_eq!(match_count(&searched, &recipe), 1);
/// ```
pub fn match_count(searched: &[String], candidate: &RecipeCandidate) -> usize {
    let names: Vec<String> = candidate
        .ingredient_names()
        .map(|name| name.to_lowercase())
        .collect();

    let distinct: HashSet<&str> = searched.iter().map(String::as_str).collect();

    distinct
        .into_iter()
        .filter(|term| names.iter().any(|name| name.contains(term)))
        .count()
}

/// Rank candidates by how many searched ingredients they contain
///
/// # Arguments
///
/// * `searched` - Normalized ingredient names (trimmed, lower-cased, no empty entries)
/// * `candidates` - Recipes to score, in provider order
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` when `searched` is empty.
///
/// # Examples
///
/// ```rust
/// use cookify::ranker::rank;
/// use cookify::recipe_model::{RecipeCandidate, RecipeIngredient};
///
/// let a = RecipeCandidate::new("a", "Grilled Chicken")
///     .with_ingredient(RecipeIngredient::new("chicken breast", "2"));
/// let b = RecipeCandidate::new("b", "Chicken Rice")
///     .with_ingredient(RecipeIngredient::new("chicken", "1"))
///     .with_ingredient(RecipeIngredient::new("white rice", "1 cup"));
///
/// let searched = vec!["chicken".to_string(), "rice".to_string()];
/// let outcome = rank(&searched, vec![a, b])?;
///
/// assert_eq!(outcome.ranked[0].candidate.id, "b");
/// assert!(outcome.full_match_exists);
/// # Ok::<(), cookify::errors::CoreError>(())
/// ```
pub fn rank(
    searched: &[String],
    candidates: Vec<RecipeCandidate>,
) -> Result<RankOutcome, CoreError> {
    if searched.is_empty() {
        return Err(CoreError::InvalidInput(
            "at least one ingredient is required".to_string(),
        ));
    }

    let total_searched = searched.len();

    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let match_count = match_count(searched, &candidate);
            debug!(
                "Candidate '{}' matches {}/{} searched ingredients",
                candidate.id, match_count, total_searched
            );
            RankedCandidate {
                candidate,
                match_count,
                total_searched,
            }
        })
        .collect();

    // sort_by is stable, so equal scores keep provider order
    ranked.sort_by(|a, b| b.match_count.cmp(&a.match_count));

    let full_match_exists =
        total_searched >= 2 && ranked.iter().any(RankedCandidate::is_full_match);

    info!(
        "Ranked {} candidates for {} searched ingredients (full match: {})",
        ranked.len(),
        total_searched,
        full_match_exists
    );

    Ok(RankOutcome {
        ranked,
        full_match_exists,
        total_searched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe_model::RecipeIngredient;

    fn recipe(id: &str, ingredients: &[&str]) -> RecipeCandidate {
        ingredients
            .iter()
            .fold(RecipeCandidate::new(id, id), |r, name| {
                r.with_ingredient(RecipeIngredient::new(name, ""))
            })
    }

    fn terms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_search_is_invalid() {
        let result = rank(&[], vec![recipe("a", &["rice"])]);
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_candidates() {
        let outcome = rank(&terms(&["rice", "beans"]), Vec::new()).unwrap();
        assert!(outcome.ranked.is_empty());
        assert!(!outcome.full_match_exists);
        assert!(!outcome.needs_advisory());
    }

    #[test]
    fn test_match_is_case_insensitive_substring() {
        let candidate = recipe("a", &["Chicken Breast", "Jasmine RICE"]);
        assert_eq!(match_count(&terms(&["chicken", "rice"]), &candidate), 2);
        assert_eq!(match_count(&terms(&["garlic"]), &candidate), 0);
    }

    #[test]
    fn test_term_counts_once_per_candidate() {
        let candidate = recipe("a", &["chicken breast", "chicken stock", "chicken thighs"]);
        assert_eq!(match_count(&terms(&["chicken"]), &candidate), 1);
    }

    #[test]
    fn test_chicken_rice_example() {
        let a = recipe("A", &["chicken breast"]);
        let b = recipe("B", &["chicken", "white rice"]);

        let outcome = rank(&terms(&["chicken", "rice"]), vec![a, b]).unwrap();
        let ids: Vec<&str> = outcome.ranked.iter().map(|r| r.candidate.id.as_str()).collect();

        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(outcome.ranked[0].match_count, 2);
        assert_eq!(outcome.ranked[1].match_count, 1);
        assert!(outcome.full_match_exists);
        assert!(!outcome.needs_advisory());
    }

    #[test]
    fn test_partial_match_triggers_advisory() {
        let candidates = vec![
            recipe("A", &["chicken", "rice"]),
            recipe("B", &["garlic", "butter"]),
            recipe("C", &["rice", "garlic"]),
        ];

        let outcome = rank(&terms(&["chicken", "rice", "garlic"]), candidates).unwrap();
        assert!(!outcome.full_match_exists);
        assert!(outcome.needs_advisory());
        assert!(outcome.ranked.iter().all(|r| r.total_searched == 3));
    }

    #[test]
    fn test_single_ingredient_never_full_match() {
        let outcome = rank(&terms(&["rice"]), vec![recipe("A", &["rice"])]).unwrap();
        assert_eq!(outcome.ranked[0].match_count, 1);
        assert!(!outcome.full_match_exists);
        assert!(!outcome.needs_advisory());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates = vec![
            recipe("first", &["rice"]),
            recipe("none", &["bread"]),
            recipe("second", &["rice"]),
            recipe("both", &["rice", "beans"]),
            recipe("third", &["beans"]),
        ];

        let outcome = rank(&terms(&["rice", "beans"]), candidates).unwrap();
        let ids: Vec<&str> = outcome.ranked.iter().map(|r| r.candidate.id.as_str()).collect();

        assert_eq!(ids, vec!["both", "first", "second", "third", "none"]);
    }

    #[test]
    fn test_duplicate_terms_inflate_total_only() {
        let outcome = rank(&terms(&["rice", "rice"]), vec![recipe("A", &["rice"])]).unwrap();

        assert_eq!(outcome.ranked[0].match_count, 1);
        assert_eq!(outcome.ranked[0].total_searched, 2);
        assert!(!outcome.full_match_exists);
    }

    #[test]
    fn test_match_count_bounded_by_total() {
        let candidates = vec![
            recipe("A", &["olive oil", "oil", "garlic oil"]),
            recipe("B", &[]),
            recipe("C", &["oil", "salt", "pepper", "garlic"]),
        ];
        let searched = terms(&["oil", "garlic"]);

        let outcome = rank(&searched, candidates).unwrap();
        assert_eq!(outcome.ranked.len(), 3);
        for ranked in &outcome.ranked {
            assert!(ranked.match_count <= ranked.total_searched);
        }
        assert!(outcome
            .ranked
            .windows(2)
            .all(|w| w[0].match_count >= w[1].match_count));
    }
}
