//! # Recipe Data Model
//!
//! This module defines the recipe records that flow between the providers,
//! the ranking core and the presentation layer.
//!
//! ## Core Concepts
//!
//! - **RecipeCandidate**: one recipe returned by TheMealDB or generated by the AI service
//! - **RecipeIngredient**: an ingredient name paired with a free-text measure
//! - **RankedCandidate**: a candidate annotated with how many searched ingredients it covers
//! - **SavedRecipe**: a favorite stored by a user, with its full details
//!
//! ## Usage
//!
//! ```rust
//! use cookify::recipe_model::{RecipeCandidate, RecipeIngredient};
//!
//! let curry = RecipeCandidate::new("mealdb_52772", "Chicken Curry")
//!     .with_ingredient(RecipeIngredient::new("Chicken Breast", "2"))
//!     .with_ingredient(RecipeIngredient::new("Basmati Rice", "1 cup"))
//!     .with_cuisine("Indian");
//!
//! assert_eq!(curry.ingredient_names().count(), 2);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source label attached to AI-generated recipes
pub const AI_SOURCE: &str = "AI";

/// Source label attached to TheMealDB recipes
pub const MEALDB_SOURCE: &str = "TheMealDB";

/// An ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Ingredient name as written by the provider (e.g., "Chicken Breast")
    pub name: String,

    /// Free-text quantity description (e.g., "1 cup", "to taste"); may be empty
    #[serde(default)]
    pub measure: String,
}

/// A recipe returned by the recipe-data provider or the AI generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCandidate {
    /// Opaque id, unique within one result set (e.g., "mealdb_52772", "ai_1a2b3c4d")
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub cuisine: String,

    #[serde(default)]
    pub meal_type: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,

    #[serde(default)]
    pub instructions: Vec<String>,

    /// Preparation time, AI recipes only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_minutes: Option<u32>,

    /// Number of servings, AI recipes only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,

    /// Difficulty label, AI recipes only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,

    /// Short nutrition note, AI recipes only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_summary: Option<String>,

    /// Where the recipe came from ("TheMealDB" or "AI")
    #[serde(default = "default_source")]
    pub source: String,

    #[serde(default)]
    pub is_ai_generated: bool,
}

fn default_source() -> String {
    MEALDB_SOURCE.to_string()
}

/// A candidate annotated with its relevance to the current search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: RecipeCandidate,

    /// Number of distinct searched ingredients found in this recipe
    pub match_count: usize,

    /// Number of searched ingredients, duplicates included
    pub total_searched: usize,
}

/// A recipe saved to a user's favorites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecipe {
    pub recipe_id: String,

    pub title: String,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default = "default_source")]
    pub source: String,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub cuisine: Option<String>,

    #[serde(default)]
    pub meal_type: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,

    #[serde(default)]
    pub instructions: Vec<String>,

    #[serde(default)]
    pub time_minutes: Option<u32>,

    #[serde(default)]
    pub servings: Option<u32>,

    #[serde(default)]
    pub difficulty: Option<String>,

    #[serde(default)]
    pub nutrition_summary: Option<String>,

    #[serde(default)]
    pub is_ai_generated: bool,
}

impl RecipeIngredient {
    /// Create an ingredient line
    pub fn new(name: &str, measure: &str) -> Self {
        Self {
            name: name.to_string(),
            measure: measure.to_string(),
        }
    }
}

impl RecipeCandidate {
    /// Create a candidate with just an id and a title
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            image: String::new(),
            cuisine: String::new(),
            meal_type: String::new(),
            tags: Vec::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            time_minutes: None,
            servings: None,
            difficulty: None,
            nutrition_summary: None,
            source: default_source(),
            is_ai_generated: false,
        }
    }

    /// Add an ingredient line
    pub fn with_ingredient(mut self, ingredient: RecipeIngredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    pub fn with_cuisine(mut self, cuisine: &str) -> Self {
        self.cuisine = cuisine.to_string();
        self
    }

    pub fn with_meal_type(mut self, meal_type: &str) -> Self {
        self.meal_type = meal_type.to_string();
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Mark this candidate as produced by the AI generator
    pub fn ai_generated(mut self) -> Self {
        self.source = AI_SOURCE.to_string();
        self.is_ai_generated = true;
        self
    }

    /// Iterate over the ingredient names of this recipe
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(|i| i.name.as_str())
    }

    /// Convert into a favorite record stamped with `created_at`
    pub fn to_saved(&self, created_at: DateTime<Utc>) -> SavedRecipe {
        let non_empty = |s: &str| {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };

        SavedRecipe {
            recipe_id: self.id.clone(),
            title: self.title.clone(),
            image: non_empty(&self.image),
            source: self.source.clone(),
            created_at,
            cuisine: non_empty(&self.cuisine),
            meal_type: non_empty(&self.meal_type),
            tags: self.tags.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            time_minutes: self.time_minutes,
            servings: self.servings,
            difficulty: self.difficulty.clone(),
            nutrition_summary: self.nutrition_summary.clone(),
            is_ai_generated: self.is_ai_generated,
        }
    }
}

impl RankedCandidate {
    /// Whether this candidate covers every searched ingredient
    pub fn is_full_match(&self) -> bool {
        self.match_count == self.total_searched
    }
}

impl fmt::Display for RecipeIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.measure.trim().is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.measure, self.name)
        }
    }
}

impl fmt::Display for RecipeCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if !self.cuisine.is_empty() {
            write!(f, " ({})", self.cuisine)?;
        }
        Ok(())
    }
}

impl fmt::Display for RankedCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}/{}]",
            self.candidate, self.match_count, self.total_searched
        )
    }
}
