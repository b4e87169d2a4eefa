//! # AI Recipe Generator
//!
//! Asks Gemini for recipes built around the searched ingredients and turns
//! the model's reply into [`RecipeCandidate`]s.
//!
//! Models do not always answer with bare JSON. The reply is accepted either
//! as a JSON array on its own or wrapped in a ```json fenced block.

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::circuit_breaker::CircuitBreaker;
use crate::config::{AppConfig, RecoveryConfig};
use crate::errors::{CoreError, ProviderError};
use crate::normalize::normalize_ingredients;
use crate::recipe_model::{RecipeCandidate, RecipeIngredient};
use crate::retry::call_with_recovery;

/// Number of recipes requested per generation
pub const AI_RECIPE_COUNT: usize = 3;

/// Prefix added to generated recipe ids
pub const AI_ID_PREFIX: &str = "ai_";

lazy_static! {
    static ref JSON_FENCE: Regex =
        Regex::new(r"(?s)```json\s*(.*?)```").expect("JSON fence pattern should be valid");
}

/// One ingredient line as written by the model
#[derive(Debug, Default, Deserialize)]
struct DraftIngredient {
    #[serde(default)]
    name: String,
    #[serde(default)]
    measure: String,
}

/// One recipe as written by the model, every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DraftRecipe {
    title: Option<String>,
    cuisine: Option<String>,
    meal_type: Option<String>,
    tags: Vec<String>,
    ingredients: Vec<DraftIngredient>,
    instructions: Vec<String>,
    time_minutes: Option<u32>,
    servings: Option<u32>,
    difficulty: Option<String>,
    nutrition_summary: Option<String>,
}

impl DraftRecipe {
    fn into_candidate(self, id: String) -> RecipeCandidate {
        let mut candidate = RecipeCandidate::new(
            &id,
            self.title.as_deref().unwrap_or("AI Generated Recipe"),
        )
        .with_cuisine(self.cuisine.as_deref().unwrap_or("International"))
        .with_meal_type(self.meal_type.as_deref().unwrap_or("Main Course"))
        .ai_generated();

        candidate.tags = self.tags;
        candidate.ingredients = self
            .ingredients
            .into_iter()
            .map(|i| RecipeIngredient::new(&i.name, &i.measure))
            .collect();
        candidate.instructions = self.instructions;
        candidate.time_minutes = self.time_minutes;
        candidate.servings = self.servings;
        candidate.difficulty = self.difficulty;
        candidate.nutrition_summary = self.nutrition_summary;
        candidate
    }
}

/// A fresh id for a generated recipe: `ai_` followed by 8 lowercase hex digits
pub fn generate_ai_id() -> String {
    let value: u32 = rand::thread_rng().gen();
    format!("{AI_ID_PREFIX}{value:08x}")
}

/// Build the generation prompt for a list of normalized ingredients
pub fn build_prompt(ingredients: &[String]) -> String {
    format!(
        r#"Generate {count} creative and delicious recipes using these ingredients: {list}

Return the response as a JSON array with this exact structure:
[
    {{
        "title": "Recipe Name",
        "cuisine": "Cuisine Type",
        "meal_type": "Meal Category",
        "tags": ["tag1", "tag2"],
        "ingredients": [
            {{"name": "ingredient name", "measure": "quantity and unit"}}
        ],
        "instructions": ["Step 1 instruction", "Step 2 instruction"],
        "time_minutes": 30,
        "servings": 4,
        "difficulty": "Easy/Medium/Hard",
        "nutrition_summary": "Brief nutrition info"
    }}
]

Make sure to:
- Use the provided ingredients as the main components
- Add common pantry ingredients as needed
- Include realistic cooking times and serving sizes
- Provide clear, step-by-step instructions
- Return ONLY the JSON array, no other text"#,
        count = AI_RECIPE_COUNT,
        list = ingredients.join(", ")
    )
}

/// Locate the JSON payload in a model reply
fn extract_json(reply: &str) -> Result<&str, ProviderError> {
    let trimmed = reply.trim();
    if trimmed.starts_with('[') {
        return Ok(trimmed);
    }

    JSON_FENCE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim())
        .filter(|body| !body.is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse("no JSON array found in AI reply".to_string()))
}

/// Parse a model reply into candidates with fresh `ai_` ids
///
/// # Examples
///
/// ```rust
/// use cookify::ai_recipes::parse_ai_reply;
///
/// let reply = "Here you go:\n```json\n[{\"title\": \"Garlic Rice\"}]\n```";
/// let recipes = parse_ai_reply(reply)?;
///
/// assert_eq!(recipes[0].title, "Garlic Rice");
/// assert!(recipes[0].id.starts_with("ai_"));
/// assert!(recipes[0].is_ai_generated);
/// # Ok::<(), cookify::errors::ProviderError>(())
/// ```
pub fn parse_ai_reply(reply: &str) -> Result<Vec<RecipeCandidate>, ProviderError> {
    let payload = match serde_json::from_str::<Vec<DraftRecipe>>(reply.trim()) {
        Ok(drafts) => drafts,
        Err(_) => serde_json::from_str::<Vec<DraftRecipe>>(extract_json(reply)?)?,
    };

    debug!(count = payload.len(), "Parsed AI recipe drafts");
    Ok(payload
        .into_iter()
        .map(|draft| draft.into_candidate(generate_ai_id()))
        .collect())
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GenerateCandidate>,
}

#[derive(Debug, Deserialize)]
struct GenerateCandidate {
    content: Option<GenerateContent>,
}

#[derive(Debug, Deserialize)]
struct GenerateContent {
    #[serde(default)]
    parts: Vec<GeneratePart>,
}

#[derive(Debug, Deserialize)]
struct GeneratePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// HTTP client for Gemini recipe generation
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    recovery: RecoveryConfig,
    breaker: CircuitBreaker,
}

impl GeminiClient {
    /// Build a client from the application configuration
    pub fn new(config: &AppConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.recovery.operation_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
            recovery: config.recovery.clone(),
            breaker: CircuitBreaker::new("gemini", &config.recovery),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate recipes for raw user-supplied ingredients
    pub async fn generate<S: AsRef<str>>(
        &self,
        raw_ingredients: &[S],
    ) -> Result<Vec<RecipeCandidate>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("GEMINI_API_KEY is not set".to_string()))?;

        let ingredients = normalize_ingredients(raw_ingredients);
        if ingredients.is_empty() {
            return Err(CoreError::InvalidInput("at least one ingredient is required".to_string()).into());
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(&ingredients) }] }]
        });

        let reply = call_with_recovery(&self.breaker, &self.recovery, || async {
            let response = self
                .http
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&body)
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

            let parsed: GenerateResponse = response.json().await?;
            parsed
                .text()
                .ok_or_else(|| ProviderError::InvalidResponse("empty AI reply".to_string()))
        })
        .await?;

        let recipes = parse_ai_reply(&reply)?;
        info!(
            model = %self.model,
            ingredients = ingredients.len(),
            recipes = recipes.len(),
            "Generated AI recipes"
        );
        Ok(recipes)
    }
}
