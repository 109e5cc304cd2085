//! # Recipe Filter and Search
//!
//! Predicates over the prepared corpus: diet restriction, allergy exclusion,
//! meal type, calorie ceiling, and required or excluded ingredients, with an
//! optional ranking by the session's preference model.
//!
//! All ingredient matching is substring containment with the query term as
//! the needle and the ingredient token as the haystack, so an allergy to
//! "peanut" also blocks "peanut butter" and "peanut oil".

use crate::preference_model::UserPreferenceModel;
use crate::recipe_model::{DietPreference, RecipeRecord};
use log::debug;
use std::sync::Arc;

/// Meal type value that disables meal type filtering
pub const ALL_MEAL_TYPES: &str = "all";

/// Parameters of a recipe search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Every term must appear in at least one ingredient token
    pub include: Vec<String>,
    /// No term may appear in any ingredient token
    pub exclude: Vec<String>,
    /// "all", or a tag matched against the recipe meal type
    pub meal_type: String,
    /// Upper bound on calories per serving
    pub max_calories: Option<f64>,
    pub diet_preference: String,
    pub allergies: Vec<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            meal_type: ALL_MEAL_TYPES.to_string(),
            max_calories: None,
            diet_preference: String::new(),
            allergies: Vec::new(),
        }
    }
}

/// Lowercase, trim and drop empty terms
fn normalize_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

fn fits_diet(recipe: &RecipeRecord, diet: DietPreference) -> bool {
    match diet {
        DietPreference::Vegan => recipe.has_diet_label("vegan"),
        DietPreference::Vegetarian => {
            recipe.has_diet_label("vegetarian") || recipe.has_diet_label("vegan")
        }
        DietPreference::Omnivore => true,
    }
}

/// Keep recipes compatible with the diet preference and free of allergens
///
/// # Examples
///
/// ```rust
/// use nutrition_advisor::recipe_filter::filter_by_diet_and_allergy;
///
/// let filtered = filter_by_diet_and_allergy(&[], "vegan", &["peanut".to_string()]);
/// assert!(filtered.is_empty());
/// ```
pub fn filter_by_diet_and_allergy(
    recipes: &[Arc<RecipeRecord>],
    diet_preference: &str,
    allergies: &[String],
) -> Vec<Arc<RecipeRecord>> {
    let diet = DietPreference::parse(diet_preference);
    let allergies = normalize_terms(allergies);

    let filtered: Vec<Arc<RecipeRecord>> = recipes
        .iter()
        .filter(|recipe| fits_diet(recipe, diet))
        .filter(|recipe| {
            !allergies
                .iter()
                .any(|allergy| recipe.has_ingredient_containing(allergy))
        })
        .cloned()
        .collect();

    debug!(
        "Diet/allergy filter ({:?}, {} allergies): {} of {} recipes",
        diet,
        allergies.len(),
        filtered.len(),
        recipes.len()
    );
    filtered
}

/// Search the corpus, ranking by preference score when a model is given
///
/// Without a model the result keeps corpus order. With a model, recipes are
/// ordered by descending score and equal scores keep corpus order.
pub fn search(
    recipes: &[Arc<RecipeRecord>],
    query: &SearchQuery,
    preferences: Option<&UserPreferenceModel>,
) -> Vec<Arc<RecipeRecord>> {
    let include = normalize_terms(&query.include);
    let exclude = normalize_terms(&query.exclude);
    let meal_type = query.meal_type.trim().to_lowercase();

    let mut results: Vec<Arc<RecipeRecord>> =
        filter_by_diet_and_allergy(recipes, &query.diet_preference, &query.allergies)
            .into_iter()
            .filter(|recipe| meal_type == ALL_MEAL_TYPES || recipe.matches_meal_type(&meal_type))
            .filter(|recipe| {
                query
                    .max_calories
                    .map_or(true, |max| recipe.calories_per_serving <= max)
            })
            .filter(|recipe| {
                include
                    .iter()
                    .all(|term| recipe.has_ingredient_containing(term))
            })
            .filter(|recipe| {
                !exclude
                    .iter()
                    .any(|term| recipe.has_ingredient_containing(term))
            })
            .collect();

    if let Some(model) = preferences {
        if !results.is_empty() {
            let mut scored: Vec<(f64, Arc<RecipeRecord>)> = results
                .into_iter()
                .map(|recipe| (model.score(&recipe), recipe))
                .collect();
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));
            results = scored.into_iter().map(|(_, recipe)| recipe).collect();
        }
    }

    debug!(
        "Search (include={:?}, exclude={:?}, meal_type={}, max_calories={:?}): {} results",
        include,
        exclude,
        meal_type,
        query.max_calories,
        results.len()
    );
    results
}
