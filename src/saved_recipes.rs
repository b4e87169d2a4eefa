//! # Saved Recipe Search
//!
//! Newest-first listing and free-text search over a user's favorites.
//! Search uses substring semantics over title, source, cuisine, meal type and
//! tags, unlike the pantry filter which only matches name prefixes.

use log::debug;

use crate::normalize::normalize_name;
use crate::recipe_model::SavedRecipe;

/// Text that a saved-recipe query is matched against, lower-cased
fn searchable_text(recipe: &SavedRecipe) -> String {
    let mut parts: Vec<&str> = vec![recipe.title.as_str(), recipe.source.as_str()];
    parts.extend(recipe.cuisine.as_deref());
    parts.extend(recipe.meal_type.as_deref());
    parts.extend(recipe.tags.iter().map(String::as_str));

    parts.join(" ").to_lowercase()
}

/// Whether a single saved recipe matches an already normalized query
pub fn matches_query(recipe: &SavedRecipe, normalized_query: &str) -> bool {
    normalized_query.is_empty() || searchable_text(recipe).contains(normalized_query)
}

/// Filter saved recipes by a free-text query, keeping their order
///
/// A blank query returns every recipe.
pub fn search<'a>(saved: &'a [SavedRecipe], query: &str) -> Vec<&'a SavedRecipe> {
    let query = normalize_name(query);

    let results: Vec<&SavedRecipe> = saved
        .iter()
        .filter(|recipe| matches_query(recipe, &query))
        .collect();

    debug!(
        "Saved recipe search '{}' matched {} of {} recipes",
        query,
        results.len(),
        saved.len()
    );
    results
}

/// Order saved recipes with the most recently saved first
pub fn newest_first(saved: &mut [SavedRecipe]) {
    saved.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
