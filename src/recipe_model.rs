//! # Recipe and Profile Data Model
//!
//! This module defines the prepared recipe records the recommendation engine
//! works on, the immutable corpus that holds them, and the user profile the
//! surrounding application supplies.
//!
//! ## Core Concepts
//!
//! - **RecipeRecord**: one cleaned corpus row with per-serving nutrition
//! - **RecipeCorpus**: the read-only working set for a session
//! - **UserProfile**: diet, allergies, training goal and calorie budget
//! - **MealSlot**: breakfast, lunch or dinner in a daily plan
//!
//! ## Usage
//!
//! ```rust
//! use nutrition_advisor::recipe_model::{TrainingGoal, UserProfile};
//!
//! let profile = UserProfile::default();
//! assert_eq!(profile.daily_calories, 2000.0);
//! assert_eq!(profile.training_goal, TrainingGoal::Strength);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;

/// One recipe of the prepared corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// Zero-based row index in the source table, unique within one corpus
    pub row_id: usize,

    /// Display name (not unique across the dataset)
    pub name: String,

    /// Number of servings, always at least 1
    pub servings: f64,

    /// Whole-batch nutrition
    pub calories_total: f64,
    pub protein_total_g: f64,
    pub fat_total_g: f64,
    pub carbs_total_g: f64,

    /// Per-serving nutrition
    pub calories_per_serving: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,

    /// Lowercase ingredient tokens used for allergy and ingredient matching
    pub ingredients_normalized: Vec<String>,

    /// Ingredient lines as written in the source
    pub ingredient_lines_raw: Vec<String>,

    /// Ingredient lines scaled to a single serving
    pub ingredient_lines_per_serving: Vec<String>,

    /// Free-text diet tags (e.g. "High-Protein, Low-Carb")
    pub diet_labels: String,

    /// Free-text meal type tags (e.g. "lunch/dinner")
    pub meal_type: String,

    pub image_url: Option<String>,
    pub url: Option<String>,
}

impl RecipeRecord {
    /// Case-insensitive check against the meal type tags
    pub fn matches_meal_type(&self, meal_type: &str) -> bool {
        self.meal_type
            .to_lowercase()
            .contains(&meal_type.to_lowercase())
    }

    /// Case-insensitive check against the diet tags
    pub fn has_diet_label(&self, label: &str) -> bool {
        self.diet_labels
            .to_lowercase()
            .contains(&label.to_lowercase())
    }

    /// True if any ingredient token contains `term` as a substring
    pub fn has_ingredient_containing(&self, term: &str) -> bool {
        self.ingredients_normalized
            .iter()
            .any(|token| token.contains(term))
    }
}

impl fmt::Display for RecipeRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({:.0} kcal, {:.1} g protein, {:.1} g carbs, {:.1} g fat)",
            self.name, self.calories_per_serving, self.protein_g, self.carbs_g, self.fat_g
        )
    }
}

/// Read-only set of prepared recipes loaded from one source
#[derive(Debug, Clone, Default)]
pub struct RecipeCorpus {
    source: String,
    recipes: Vec<Arc<RecipeRecord>>,
}

impl RecipeCorpus {
    pub fn new(source: impl Into<String>, recipes: Vec<RecipeRecord>) -> Self {
        Self {
            source: source.into(),
            recipes: recipes.into_iter().map(Arc::new).collect(),
        }
    }

    /// Identity of the source this corpus was built from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn recipes(&self) -> &[Arc<RecipeRecord>] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Look up a recipe by its source row index
    pub fn get(&self, row_id: usize) -> Option<&Arc<RecipeRecord>> {
        self.recipes.iter().find(|recipe| recipe.row_id == row_id)
    }
}

/// Training focus used to break ties between near-target meals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingGoal {
    /// Prefer high protein
    Strength,
    /// Prefer high carbohydrates
    Endurance,
    /// Closest to the calorie target only
    #[default]
    Balanced,
}

impl TrainingGoal {
    /// Parse a goal name; unknown names fall back to `Balanced`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "strength" => TrainingGoal::Strength,
            "endurance" => TrainingGoal::Endurance,
            _ => TrainingGoal::Balanced,
        }
    }
}

impl<'de> Deserialize<'de> for TrainingGoal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(TrainingGoal::parse(&name))
    }
}

/// Dietary restriction applied before any other filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DietPreference {
    Vegan,
    Vegetarian,
    #[default]
    Omnivore,
}

impl DietPreference {
    /// Parse a preference name; unknown or empty names mean no restriction
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "vegan" => DietPreference::Vegan,
            "vegetarian" => DietPreference::Vegetarian,
            _ => DietPreference::Omnivore,
        }
    }
}

/// Meal slot of a daily plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    /// Share of the daily calorie budget assigned to this slot
    pub fn calorie_share(self) -> f64 {
        match self {
            MealSlot::Breakfast => 0.25,
            MealSlot::Lunch => 0.40,
            MealSlot::Dinner => 0.35,
        }
    }

    /// Tag searched for in a recipe's meal type
    pub fn meal_type(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
        };
        write!(f, "{name}")
    }
}

/// Profile data supplied by the profile store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub diet_preference: String,
    pub allergies: Vec<String>,
    pub training_goal: TrainingGoal,
    pub daily_calories: f64,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            diet_preference: "omnivore".to_string(),
            allergies: Vec::new(),
            training_goal: TrainingGoal::Strength,
            daily_calories: 2000.0,
        }
    }
}
