//! Session-scoped recommendation state.
//!
//! One `AdvisorySession` exists per signed-in user. It owns the preference
//! model, the current daily plan, the meal log and favourites, and drives the
//! per-recipe rating flow:
//!
//! ```text
//! None ──like──▶ Liked ──save──▶ LikedSaved
//!   │                 └─don't save─▶ LikedNoSave
//!   └──dislike──▶ Disliked
//! ```

use chrono::{Local, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::meal_planner::{recommend_daily_plan, DailyPlan};
use crate::preference_model::UserPreferenceModel;
use crate::recipe_model::{MealSlot, RecipeCorpus, RecipeRecord, UserProfile};

/// Where a recipe stands in the rating flow
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingStage {
    #[default]
    None,
    Liked,
    Disliked,
    LikedSaved,
    LikedNoSave,
}

/// A recipe the user ate, as logged
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealLogEntry {
    pub date: NaiveDate,
    pub meal: String,
    pub calories: f64,
    pub protein: f64,
}

/// A meal entered by hand rather than picked from the corpus
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManualMeal {
    pub meal: String,
    pub calories: f64,
    pub protein: f64,
}

/// Calories and protein eaten so far today
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
}

/// Rejected session transitions
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Ratings are only accepted for eaten recipes
    NotEaten(String),
    /// The recipe already left the `None` stage
    AlreadyRated(String),
    /// Favourites can only be decided after a like
    NotLiked(String),
    /// A planned meal that was already eaten cannot be skipped
    AlreadyEaten(String),
    /// No plan has been generated yet
    NoPlan,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NotEaten(name) => write!(f, "Recipe '{name}' has not been eaten yet"),
            SessionError::AlreadyRated(name) => write!(f, "Recipe '{name}' was already rated"),
            SessionError::NotLiked(name) => write!(f, "Recipe '{name}' was not liked"),
            SessionError::AlreadyEaten(name) => write!(f, "Recipe '{name}' was already eaten"),
            SessionError::NoPlan => write!(f, "No daily plan has been generated"),
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Debug, Default)]
pub struct AdvisorySession {
    preferences: UserPreferenceModel,
    daily_plan: Option<DailyPlan>,
    meal_log: Vec<MealLogEntry>,
    manual_meals: Vec<ManualMeal>,
    eaten_today: HashSet<usize>,
    favourites: BTreeSet<usize>,
    rating_stages: HashMap<usize, RatingStage>,
}

impl AdvisorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preferences(&self) -> &UserPreferenceModel {
        &self.preferences
    }

    pub fn daily_plan(&self) -> Option<&DailyPlan> {
        self.daily_plan.as_ref()
    }

    pub fn meal_log(&self) -> &[MealLogEntry] {
        &self.meal_log
    }

    pub fn manual_meals(&self) -> &[ManualMeal] {
        &self.manual_meals
    }

    pub fn is_eaten(&self, recipe: &RecipeRecord) -> bool {
        self.eaten_today.contains(&recipe.row_id)
    }

    pub fn rating_stage(&self, recipe: &RecipeRecord) -> RatingStage {
        self.rating_stages
            .get(&recipe.row_id)
            .copied()
            .unwrap_or_default()
    }

    /// Replace the current plan with a fresh one for `profile`
    pub fn generate_plan<R: Rng + ?Sized>(
        &mut self,
        corpus: &RecipeCorpus,
        profile: &UserProfile,
        rng: &mut R,
    ) -> &DailyPlan {
        let plan = recommend_daily_plan(
            corpus.recipes(),
            profile.daily_calories,
            profile.training_goal,
            &profile.diet_preference,
            &profile.allergies,
            Some(&self.preferences),
            rng,
        );
        info!(daily_calories = profile.daily_calories, "Daily plan generated");
        self.daily_plan.insert(plan)
    }

    /// "I don't like this": re-pick one slot of the current plan
    ///
    /// Returns whether the slot changed; it stays as is when no other
    /// candidate exists. Meals already eaten can no longer be skipped.
    pub fn skip_slot<R: Rng + ?Sized>(
        &mut self,
        slot: MealSlot,
        rng: &mut R,
    ) -> Result<bool, SessionError> {
        let plan = self.daily_plan.as_mut().ok_or(SessionError::NoPlan)?;
        if let Some(recipe) = plan.get(slot).and_then(|meal| meal.recipe.as_ref()) {
            if self.eaten_today.contains(&recipe.row_id) {
                return Err(SessionError::AlreadyEaten(recipe.name.clone()));
            }
        }
        let replaced = plan.replace_slot(slot, Some(&self.preferences), rng);
        debug!(%slot, replaced, "Skipped planned meal");
        Ok(replaced)
    }

    /// Log `recipe` as eaten today; resets its rating flow
    pub fn mark_eaten(&mut self, recipe: &RecipeRecord) {
        self.meal_log.push(MealLogEntry {
            date: Local::now().date_naive(),
            meal: recipe.name.clone(),
            calories: recipe.calories_per_serving,
            protein: recipe.protein_g,
        });
        self.eaten_today.insert(recipe.row_id);
        self.rating_stages.insert(recipe.row_id, RatingStage::None);
        info!(recipe = %recipe.name, "Meal logged");
    }

    /// Rate an eaten recipe, teaching the preference model
    pub fn rate(&mut self, recipe: &RecipeRecord, liked: bool) -> Result<RatingStage, SessionError> {
        if !self.is_eaten(recipe) {
            return Err(SessionError::NotEaten(recipe.name.clone()));
        }
        if self.rating_stage(recipe) != RatingStage::None {
            return Err(SessionError::AlreadyRated(recipe.name.clone()));
        }

        let (rating, stage) = if liked {
            (1, RatingStage::Liked)
        } else {
            (-1, RatingStage::Disliked)
        };
        self.preferences.update_with_rating(recipe, rating);
        self.rating_stages.insert(recipe.row_id, stage);
        info!(recipe = %recipe.name, liked, "Meal rated");
        Ok(stage)
    }

    /// After a like, either save the recipe as a favourite or decline
    pub fn decide_favourite(
        &mut self,
        recipe: &RecipeRecord,
        save: bool,
    ) -> Result<RatingStage, SessionError> {
        if self.rating_stage(recipe) != RatingStage::Liked {
            return Err(SessionError::NotLiked(recipe.name.clone()));
        }

        let stage = if save {
            self.favourites.insert(recipe.row_id);
            RatingStage::LikedSaved
        } else {
            RatingStage::LikedNoSave
        };
        self.rating_stages.insert(recipe.row_id, stage);
        debug!(recipe = %recipe.name, save, "Favourite decided");
        Ok(stage)
    }

    pub fn remove_favourite(&mut self, row_id: usize) -> bool {
        self.favourites.remove(&row_id)
    }

    pub fn is_favourite(&self, recipe: &RecipeRecord) -> bool {
        self.favourites.contains(&recipe.row_id)
    }

    /// Favourite recipes present in `corpus`, in row order
    pub fn favourites(&self, corpus: &RecipeCorpus) -> Vec<Arc<RecipeRecord>> {
        self.favourites
            .iter()
            .filter_map(|row_id| corpus.get(*row_id).cloned())
            .collect()
    }

    pub fn add_manual_meal(&mut self, meal: &str, calories: f64, protein: f64) {
        self.manual_meals.push(ManualMeal {
            meal: meal.trim().to_string(),
            calories,
            protein,
        });
    }

    pub fn daily_totals(&self) -> DailyTotals {
        let logged = self.meal_log.iter().map(|m| (m.calories, m.protein));
        let manual = self.manual_meals.iter().map(|m| (m.calories, m.protein));
        logged
            .chain(manual)
            .fold(DailyTotals::default(), |totals, (calories, protein)| DailyTotals {
                calories: totals.calories + calories,
                protein: totals.protein + protein,
            })
    }

    /// Clear today's meals and ratings; preferences and favourites survive
    pub fn reset_day(&mut self) {
        self.meal_log.clear();
        self.manual_meals.clear();
        self.eaten_today.clear();
        self.rating_stages.clear();
        info!("Day reset");
    }

    /// Start over, forgetting everything including learned preferences
    pub fn reset(&mut self) {
        *self = Self::default();
        info!("Session reset");
    }
}
