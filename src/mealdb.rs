//! # TheMealDB Recipe Provider
//!
//! Fetches recipe candidates from TheMealDB. The free API only filters by a
//! single ingredient, so a multi-ingredient search runs one filter request per
//! ingredient, unions the meal ids in first-seen order, then looks up the
//! details of every unique meal.
//!
//! TheMealDB stores ingredients in flat `strIngredient1..20` / `strMeasure1..20`
//! slots; [`map_meal`] turns that layout into a [`RecipeCandidate`].

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::{AppConfig, RecoveryConfig};
use crate::errors::{CoreError, ProviderError};
use crate::recipe_model::{RecipeCandidate, RecipeIngredient, MEALDB_SOURCE};
use crate::retry::call_with_recovery;

/// Number of ingredient slots in a TheMealDB meal record
pub const MEALDB_INGREDIENT_SLOTS: usize = 20;

/// Prefix added to TheMealDB meal ids
pub const MEALDB_ID_PREFIX: &str = "mealdb_";

/// A raw meal record as returned by TheMealDB
pub type Meal = Map<String, Value>;

#[derive(Debug, Deserialize)]
struct MealList {
    /// TheMealDB answers `{"meals": null}` when nothing matches
    meals: Option<Vec<Meal>>,
}

/// Read a non-blank string field, trimmed
fn text_field<'a>(meal: &'a Meal, key: &str) -> Option<&'a str> {
    meal.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Read `idMeal`, which TheMealDB sends as a string but some mirrors send as a number
fn meal_id(meal: &Meal) -> Option<String> {
    match meal.get("idMeal")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Split `text` on `separator`, trimming pieces and dropping empty ones
fn split_non_blank(text: &str, separator: char) -> Vec<String> {
    text.split(separator)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convert one TheMealDB meal record into a recipe candidate
///
/// # Examples
///
/// ```rust
/// use cookify::mealdb::map_meal;
/// use serde_json::json;
///
/// let meal = json!({
///     "idMeal": "52772",
///     "strMeal": "Teriyaki Chicken Casserole",
///     "strIngredient1": "soy sauce",
///     "strMeasure1": "3/4 cup",
///     "strIngredient2": "",
///     "strTags": "Meat,Casserole",
///     "strInstructions": "Preheat oven. Combine sauce."
/// });
///
/// let recipe = map_meal(meal.as_object().unwrap())?;
/// assert_eq!(recipe.id, "mealdb_52772");
/// assert_eq!(recipe.ingredients.len(), 1);
/// assert_eq!(recipe.tags, vec!["Meat", "Casserole"]);
/// assert_eq!(recipe.instructions, vec!["Preheat oven", "Combine sauce"]);
/// # Ok::<(), cookify::errors::ProviderError>(())
/// ```
pub fn map_meal(meal: &Meal) -> Result<RecipeCandidate, ProviderError> {
    let id = meal_id(meal)
        .ok_or_else(|| ProviderError::InvalidResponse("meal without idMeal".to_string()))?;

    let ingredients = (1..=MEALDB_INGREDIENT_SLOTS)
        .filter_map(|slot| {
            let name = text_field(meal, &format!("strIngredient{slot}"))?;
            let measure = text_field(meal, &format!("strMeasure{slot}")).unwrap_or("");
            Some(RecipeIngredient::new(name, measure))
        })
        .collect();

    let instructions = text_field(meal, "strInstructions")
        .map(|text| split_non_blank(text, '.'))
        .unwrap_or_default();

    let tags = text_field(meal, "strTags")
        .map(|text| split_non_blank(text, ','))
        .unwrap_or_default();

    let mut candidate = RecipeCandidate::new(
        &format!("{MEALDB_ID_PREFIX}{id}"),
        text_field(meal, "strMeal").unwrap_or("Unknown Recipe"),
    );
    candidate.image = text_field(meal, "strMealThumb").unwrap_or("").to_string();
    candidate.cuisine = text_field(meal, "strArea").unwrap_or("Unknown").to_string();
    candidate.meal_type = text_field(meal, "strCategory").unwrap_or("Unknown").to_string();
    candidate.tags = tags;
    candidate.ingredients = ingredients;
    candidate.instructions = instructions;
    candidate.source = MEALDB_SOURCE.to_string();

    Ok(candidate)
}

/// Union per-ingredient id lists, keeping the order in which ids were first seen
pub fn union_ids<I>(batches: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for id in batches.into_iter().flatten() {
        if seen.insert(id.clone()) {
            merged.push(id);
        }
    }
    merged
}

/// HTTP client for TheMealDB
pub struct MealDbClient {
    http: Client,
    base_url: String,
    recovery: RecoveryConfig,
    breaker: CircuitBreaker,
}

impl MealDbClient {
    /// Build a client from the application configuration
    pub fn new(config: &AppConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.recovery.operation_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.mealdb_base_url.clone(),
            recovery: config.recovery.clone(),
            breaker: CircuitBreaker::new("mealdb", &config.recovery),
        })
    }

    async fn fetch_meals(&self, endpoint: &str, id_or_ingredient: &str) -> Result<Vec<Meal>, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        call_with_recovery(&self.breaker, &self.recovery, || async {
            let response = self
                .http
                .get(&url)
                .query(&[("i", id_or_ingredient)])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(ProviderError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            let list: MealList = response.json().await?;
            Ok(list.meals.unwrap_or_default())
        })
        .await
    }

    /// Ids of the meals that use an ingredient
    pub async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Vec<String>, ProviderError> {
        let meals = self.fetch_meals("filter.php", ingredient).await?;
        let ids: Vec<String> = meals.iter().filter_map(meal_id).collect();

        debug!(ingredient, count = ids.len(), "TheMealDB filter results");
        Ok(ids)
    }

    /// Full details of one meal, `None` when TheMealDB does not know the id
    pub async fn lookup(&self, meal_id: &str) -> Result<Option<RecipeCandidate>, ProviderError> {
        let meals = self.fetch_meals("lookup.php", meal_id).await?;
        meals.first().map(map_meal).transpose()
    }

    /// Candidates for a normalized ingredient search, unioned by meal id
    ///
    /// Any failing request fails the whole search; partial results are not returned.
    pub async fn search_by_ingredients(
        &self,
        searched: &[String],
    ) -> Result<Vec<RecipeCandidate>, ProviderError> {
        if searched.is_empty() {
            return Err(CoreError::InvalidInput("at least one ingredient is required".to_string()).into());
        }

        let mut batches = Vec::with_capacity(searched.len());
        for ingredient in searched {
            batches.push(self.filter_by_ingredient(ingredient).await?);
        }
        let ids = union_ids(batches);

        let mut candidates = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(candidate) = self.lookup(id).await? {
                candidates.push(candidate);
            }
        }

        info!(
            ingredients = searched.len(),
            unique_meals = ids.len(),
            candidates = candidates.len(),
            "TheMealDB search completed"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_meal(value: Value) -> Meal {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_map_full_meal() {
        let meal = as_meal(json!({
            "idMeal": "52795",
            "strMeal": "Chicken Handi",
            "strCategory": "Chicken",
            "strArea": "Indian",
            "strInstructions": "Take a large pot. Add the oil.  . Cook until golden.",
            "strMealThumb": "https://www.themealdb.com/images/media/meals/wyxwsp1486979827.jpg",
            "strTags": " Curry , ,Spicy",
            "strIngredient1": "Chicken",
            "strMeasure1": "1.2 kg",
            "strIngredient2": " Onion ",
            "strMeasure2": null,
            "strIngredient3": "",
            "strMeasure3": "2 tbsp",
            "strIngredient4": null,
            "strIngredient20": "Garlic",
            "strMeasure20": " 4 cloves "
        }));

        let recipe = map_meal(&meal).unwrap();

        assert_eq!(recipe.id, "mealdb_52795");
        assert_eq!(recipe.title, "Chicken Handi");
        assert_eq!(recipe.cuisine, "Indian");
        assert_eq!(recipe.meal_type, "Chicken");
        assert_eq!(recipe.tags, vec!["Curry", "Spicy"]);
        assert_eq!(
            recipe.instructions,
            vec!["Take a large pot", "Add the oil", "Cook until golden"]
        );
        assert_eq!(
            recipe.ingredients,
            vec![
                RecipeIngredient::new("Chicken", "1.2 kg"),
                RecipeIngredient::new("Onion", ""),
                RecipeIngredient::new("Garlic", "4 cloves"),
            ]
        );
        assert_eq!(recipe.source, MEALDB_SOURCE);
    }

    #[test]
    fn test_map_sparse_meal_uses_defaults() {
        let meal = as_meal(json!({ "idMeal": 123, "strMeal": null }));
        let recipe = map_meal(&meal).unwrap();

        assert_eq!(recipe.id, "mealdb_123");
        assert_eq!(recipe.title, "Unknown Recipe");
        assert_eq!(recipe.cuisine, "Unknown");
        assert_eq!(recipe.meal_type, "Unknown");
        assert_eq!(recipe.image, "");
        assert!(recipe.tags.is_empty());
        assert!(recipe.instructions.is_empty());
        assert!(recipe.ingredients.is_empty());
    }

    #[test]
    fn test_map_meal_without_id_fails() {
        let meal = as_meal(json!({ "strMeal": "Mystery" }));
        assert!(matches!(map_meal(&meal), Err(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn test_union_ids_keeps_first_seen_order() {
        let merged = union_ids(vec![
            vec!["3".to_string(), "1".to_string()],
            vec!["1".to_string(), "2".to_string(), "3".to_string()],
            vec![],
            vec!["4".to_string()],
        ]);
        assert_eq!(merged, vec!["3", "1", "2", "4"]);
    }

    #[test]
    fn test_null_meal_list_is_empty() {
        let list: MealList = serde_json::from_str(r#"{"meals": null}"#).unwrap();
        assert!(list.meals.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_search_requires_ingredients() {
        let client = MealDbClient::new(&AppConfig::default()).unwrap();
        let result = client.search_by_ingredients(&[]).await;
        assert!(matches!(result, Err(ProviderError::InvalidInput(_))));
    }
}
