//! # Application Layer
//!
//! Request and response structs exchanged with the presentation layer, and
//! the dispatcher that wires them to the ranking core, the pantry policy and
//! the providers. Requests are JSON objects tagged by `"action"`.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::ai_recipes::GeminiClient;
use crate::config::AppConfig;
use crate::errors::CoreError;
use crate::localization::LocalizationManager;
use crate::mealdb::MealDbClient;
use crate::normalize::{normalize_ingredients, parse_ingredient_query};
use crate::pantry::{annotate, ExpiryPolicy, ExpiryStatus, PantryItem};
use crate::ranker::rank;
use crate::recipe_model::{RankedCandidate, RecipeCandidate, SavedRecipe};
use crate::saved_recipes::{newest_first, search};

/// Ingredient search; candidates are fetched from TheMealDB when not supplied
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Free-text, comma-separated alternative to `ingredients`
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub candidates: Option<Vec<RecipeCandidate>>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PantryRequest {
    #[serde(default)]
    pub items: Vec<PantryItem>,
    #[serde(default)]
    pub query: Option<String>,
    /// Reference date for expiry status; defaults to the local date
    #[serde(default)]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SavedRequest {
    #[serde(default)]
    pub items: Vec<SavedRecipe>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Request {
    Search(SearchRequest),
    Generate(GenerateRequest),
    Pantry(PantryRequest),
    Saved(SavedRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub items: Vec<RankedCandidate>,
    pub full_match_exists: bool,
    pub advisory: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateResponse {
    pub items: Vec<RecipeCandidate>,
}

/// A pantry row as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PantryEntry {
    #[serde(flatten)]
    pub item: PantryItem,
    pub status: ExpiryStatus,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PantryResponse {
    pub items: Vec<PantryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedResponse {
    pub items: Vec<SavedRecipe>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Search(SearchResponse),
    Generate(GenerateResponse),
    Pantry(PantryResponse),
    Saved(SavedResponse),
}

/// Parse a JSON request
pub fn parse_request(json: &str) -> Result<Request> {
    serde_json::from_str(json).context("Failed to parse request JSON")
}

/// Read and parse a JSON request file
pub fn load_request(path: &Path) -> Result<Request> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    parse_request(&json)
}

impl SearchRequest {
    /// Normalized search terms from `ingredients` followed by `query`
    pub fn searched(&self) -> Vec<String> {
        let mut searched = normalize_ingredients(&self.ingredients);
        if let Some(query) = &self.query {
            searched.extend(parse_ingredient_query(query));
        }
        searched
    }
}

/// Rank already fetched candidates and attach the localized advisory when due
pub fn rank_search(
    searched: &[String],
    candidates: Vec<RecipeCandidate>,
    localizer: &LocalizationManager,
    language: Option<&str>,
) -> Result<SearchResponse, CoreError> {
    let outcome = rank(searched, candidates)?;

    let advisory = outcome
        .needs_advisory()
        .then(|| localizer.no_full_match_advisory(outcome.total_searched, language));

    Ok(SearchResponse {
        full_match_exists: outcome.full_match_exists,
        items: outcome.ranked,
        advisory,
    })
}

/// Order a pantry snapshot and label each row
pub fn pantry_view(
    request: &PantryRequest,
    today: NaiveDate,
    policy: &ExpiryPolicy,
    localizer: &LocalizationManager,
) -> PantryResponse {
    let language = request.language.as_deref();
    let items = annotate(&request.items, request.query.as_deref(), today, policy)
        .into_iter()
        .map(|view| PantryEntry {
            label: localizer.expiry_label(view.status, language),
            item: view.item,
            status: view.status,
        })
        .collect();

    PantryResponse { items }
}

/// Newest-first saved recipes matching the request query
pub fn saved_view(request: &SavedRequest) -> SavedResponse {
    let mut items: Vec<SavedRecipe> = search(&request.items, request.query.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    newest_first(&mut items);

    SavedResponse { items }
}

/// Wires requests to the core and the providers
pub struct App {
    config: AppConfig,
    mealdb: MealDbClient,
    gemini: GeminiClient,
    localizer: LocalizationManager,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let mealdb = MealDbClient::new(&config).context("Failed to build TheMealDB client")?;
        let gemini = GeminiClient::new(&config).context("Failed to build Gemini client")?;
        let localizer = LocalizationManager::new().context("Failed to load translations")?;

        Ok(Self {
            config,
            mealdb,
            gemini,
            localizer,
        })
    }

    pub async fn handle(&self, request: Request) -> Result<Response> {
        match request {
            Request::Search(request) => {
                let searched = request.searched();
                if searched.is_empty() {
                    return Err(CoreError::InvalidInput(
                        "at least one ingredient is required".to_string(),
                    )
                    .into());
                }

                let candidates = match request.candidates {
                    Some(candidates) => {
                        debug!(count = candidates.len(), "Using supplied candidates");
                        candidates
                    }
                    None => self
                        .mealdb
                        .search_by_ingredients(&searched)
                        .await
                        .context("Recipe service temporarily unavailable")?,
                };

                let response =
                    rank_search(&searched, candidates, &self.localizer, request.language.as_deref())?;
                info!(
                    searched = searched.len(),
                    results = response.items.len(),
                    full_match = response.full_match_exists,
                    "Search handled"
                );
                Ok(Response::Search(response))
            }
            Request::Generate(request) => {
                let items = self
                    .gemini
                    .generate(&request.ingredients)
                    .await
                    .context("Failed to generate AI recipes")?;
                Ok(Response::Generate(GenerateResponse { items }))
            }
            Request::Pantry(request) => {
                let today = request.today.unwrap_or_else(|| Local::now().date_naive());
                Ok(Response::Pantry(pantry_view(
                    &request,
                    today,
                    &self.config.expiry,
                    &self.localizer,
                )))
            }
            Request::Saved(request) => Ok(Response::Saved(saved_view(&request))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searched_combines_list_and_query() {
        let request = SearchRequest {
            ingredients: vec![" Chicken ".to_string(), "".to_string()],
            query: Some("rice, GARLIC".to_string()),
            ..Default::default()
        };
        assert_eq!(request.searched(), vec!["chicken", "rice", "garlic"]);
    }

    #[test]
    fn test_parse_request_variants() {
        let request = parse_request(r#"{"action": "search", "query": "rice"}"#).unwrap();
        assert!(matches!(request, Request::Search(_)));

        let request = parse_request(r#"{"action": "pantry", "items": [], "today": "2025-01-02"}"#).unwrap();
        match request {
            Request::Pantry(pantry) => {
                assert_eq!(pantry.today, NaiveDate::from_ymd_opt(2025, 1, 2));
            }
            other => panic!("unexpected request: {:?}", other),
        }

        assert!(parse_request(r#"{"action": "unknown"}"#).is_err());
        assert!(parse_request("not json").is_err());
    }

    #[test]
    fn test_rank_search_without_advisory_for_single_term() {
        let localizer = LocalizationManager::new().unwrap();
        let response = rank_search(
            &["rice".to_string()],
            vec![RecipeCandidate::new("a", "Plain Bread")],
            &localizer,
            None,
        )
        .unwrap();

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].match_count, 0);
        assert_eq!(response.advisory, None);
    }

    #[tokio::test]
    async fn test_handle_rejects_empty_search() {
        let app = App::new(AppConfig::default()).unwrap();
        let result = app
            .handle(Request::Search(SearchRequest {
                ingredients: vec!["  ".to_string()],
                candidates: Some(Vec::new()),
                ..Default::default()
            }))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::InvalidInput(_))
        ));
    }
}
