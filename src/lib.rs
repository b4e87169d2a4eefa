//! # Cookify
//!
//! Ingredient-driven recipe search. Recipes fetched from TheMealDB (or
//! generated by Gemini) are ranked by how many of the searched ingredients
//! they use, and a pantry snapshot can be ordered by expiry with per-item
//! status.

pub mod ai_recipes;
pub mod app;
pub mod circuit_breaker;
pub mod config;
pub mod errors;
pub mod localization;
pub mod mealdb;
pub mod normalize;
pub mod pantry;
pub mod ranker;
pub mod recipe_model;
pub mod retry;
pub mod saved_recipes;
