//! # Recommender Configuration Module
//!
//! Thresholds for the fitness prefilter and the location of the recipe
//! dataset, with defaults overridable from the environment.

use log::{info, warn};
use std::env;

// Constants for recommender configuration
pub const DEFAULT_DATA_SOURCE: &str =
    "https://huggingface.co/datasets/datahiveai/recipes-with-nutrition/resolve/main/recipes-with-nutrition.csv";
pub const HIGH_PROTEIN_MIN: f64 = 25.0; // grams per serving
pub const MAX_CALORIES_PER_SERVING: f64 = 800.0;

/// Configuration for loading and prefiltering the recipe corpus
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    /// Local CSV path or http(s) URL of the recipe dataset
    pub data_source: String,
    /// Minimum protein per serving for a recipe to enter the corpus
    pub high_protein_min: f64,
    /// Maximum calories per serving for a recipe to enter the corpus
    pub max_calories_per_serving: f64,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            high_protein_min: HIGH_PROTEIN_MIN,
            max_calories_per_serving: MAX_CALORIES_PER_SERVING,
        }
    }
}

impl RecommenderConfig {
    /// Build a configuration from `.env` and process environment
    ///
    /// Recognised variables: `RECIPE_DATA_SOURCE`, `HIGH_PROTEIN_MIN`,
    /// `MAX_CALORIES_PER_SERVING`. Unparsable numbers keep the default.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let mut config = Self::default();

        if let Ok(source) = env::var("RECIPE_DATA_SOURCE") {
            if !source.trim().is_empty() {
                config.data_source = source.trim().to_string();
            }
        }
        if let Some(value) = read_f64("HIGH_PROTEIN_MIN") {
            config.high_protein_min = value;
        }
        if let Some(value) = read_f64("MAX_CALORIES_PER_SERVING") {
            config.max_calories_per_serving = value;
        }

        info!(
            "Recommender config: source={}, protein_min={}, max_calories={}",
            config.data_source, config.high_protein_min, config.max_calories_per_serving
        );
        config
    }
}

fn read_f64(name: &str) -> Option<f64> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            warn!("Ignoring {name}={raw}: not a number");
            None
        }
    }
}
