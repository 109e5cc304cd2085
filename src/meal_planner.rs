//! # Meal Planner
//!
//! Picks one recipe per meal slot close to the slot's calorie target and
//! assembles breakfast, lunch and dinner into a daily plan.
//!
//! ## Ranking
//!
//! Candidates are ordered by distance to the calorie target, with the
//! training goal taking precedence:
//!
//! - **Strength**: protein descending, then calorie distance
//! - **Endurance**: carbohydrates descending, then calorie distance
//! - **Balanced**: calorie distance only
//!
//! Once a preference model is supplied, preference score (descending) then
//! calorie distance replaces the goal ordering. The final pick is drawn
//! uniformly from the best [`CANDIDATE_POOL_SIZE`] candidates so the same
//! recipe is not served every day.

use crate::preference_model::UserPreferenceModel;
use crate::recipe_filter::filter_by_diet_and_allergy;
use crate::recipe_model::{MealSlot, RecipeRecord, TrainingGoal};
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Number of top-ranked candidates the final pick is drawn from
pub const CANDIDATE_POOL_SIZE: usize = 20;

struct Candidate {
    recipe: Arc<RecipeRecord>,
    cal_diff: f64,
}

/// Order recipes of `meal_type` from best to worst for `target_calories`
pub fn rank_candidates(
    recipes: &[Arc<RecipeRecord>],
    meal_type: &str,
    target_calories: f64,
    training_goal: TrainingGoal,
    preferences: Option<&UserPreferenceModel>,
) -> Vec<Arc<RecipeRecord>> {
    let mut candidates: Vec<Candidate> = recipes
        .iter()
        .filter(|recipe| recipe.matches_meal_type(meal_type))
        .map(|recipe| Candidate {
            cal_diff: (recipe.calories_per_serving - target_calories).abs(),
            recipe: Arc::clone(recipe),
        })
        .collect();

    let by_distance = |a: &Candidate, b: &Candidate| a.cal_diff.total_cmp(&b.cal_diff);
    match training_goal {
        TrainingGoal::Strength => candidates.sort_by(|a, b| {
            b.recipe
                .protein_g
                .total_cmp(&a.recipe.protein_g)
                .then_with(|| by_distance(a, b))
        }),
        TrainingGoal::Endurance => candidates.sort_by(|a, b| {
            b.recipe
                .carbs_g
                .total_cmp(&a.recipe.carbs_g)
                .then_with(|| by_distance(a, b))
        }),
        TrainingGoal::Balanced => candidates.sort_by(by_distance),
    }

    if let Some(model) = preferences {
        let mut scored: Vec<(f64, Candidate)> = candidates
            .into_iter()
            .map(|candidate| (model.score(&candidate.recipe), candidate))
            .collect();
        scored.sort_by(|(score_a, a), (score_b, b)| {
            match score_b.total_cmp(score_a) {
                Ordering::Equal => by_distance(a, b),
                ordering => ordering,
            }
        });
        candidates = scored.into_iter().map(|(_, candidate)| candidate).collect();
    }

    candidates.into_iter().map(|candidate| candidate.recipe).collect()
}

/// Pick one recipe for a meal, or `None` if no recipe has that meal type
pub fn pick_meal<R: Rng + ?Sized>(
    recipes: &[Arc<RecipeRecord>],
    meal_type: &str,
    target_calories: f64,
    training_goal: TrainingGoal,
    preferences: Option<&UserPreferenceModel>,
    rng: &mut R,
) -> Option<Arc<RecipeRecord>> {
    let ranked = rank_candidates(recipes, meal_type, target_calories, training_goal, preferences);
    let pool = &ranked[..ranked.len().min(CANDIDATE_POOL_SIZE)];
    let picked = pool.choose(rng).cloned();

    debug!(
        "Picked {:?} for {} ({:.0} kcal target, {:?}) from {} candidates",
        picked.as_ref().map(|recipe| recipe.name.as_str()),
        meal_type,
        target_calories,
        training_goal,
        ranked.len()
    );
    picked
}

/// One slot of a daily plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedMeal {
    /// Selected recipe, absent when nothing matched the slot
    pub recipe: Option<Arc<RecipeRecord>>,
    pub target_calories: f64,
}

/// Breakfast, lunch and dinner selections for one day
#[derive(Debug, Clone)]
pub struct DailyPlan {
    meals: BTreeMap<MealSlot, PlannedMeal>,
    training_goal: TrainingGoal,
    personalized: Vec<Arc<RecipeRecord>>,
}

impl DailyPlan {
    pub fn get(&self, slot: MealSlot) -> Option<&PlannedMeal> {
        self.meals.get(&slot)
    }

    /// Slots in breakfast, lunch, dinner order
    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, &PlannedMeal)> {
        self.meals.iter().map(|(slot, meal)| (*slot, meal))
    }

    pub fn training_goal(&self) -> TrainingGoal {
        self.training_goal
    }

    /// Diet- and allergy-filtered recipes the plan was drawn from
    pub fn personalized_recipes(&self) -> &[Arc<RecipeRecord>] {
        &self.personalized
    }

    /// Re-pick a single slot from the same recipes with the same target
    ///
    /// Other slots are untouched. When no replacement exists the current
    /// entry is kept and `false` is returned.
    pub fn replace_slot<R: Rng + ?Sized>(
        &mut self,
        slot: MealSlot,
        preferences: Option<&UserPreferenceModel>,
        rng: &mut R,
    ) -> bool {
        let Some(target_calories) = self.meals.get(&slot).map(|meal| meal.target_calories) else {
            return false;
        };

        let Some(recipe) = pick_meal(
            &self.personalized,
            slot.meal_type(),
            target_calories,
            self.training_goal,
            preferences,
            rng,
        ) else {
            return false;
        };

        info!("Replaced {} with '{}'", slot, recipe.name);
        self.meals.insert(
            slot,
            PlannedMeal {
                recipe: Some(recipe),
                target_calories,
            },
        );
        true
    }
}

/// Build a daily plan splitting `daily_calories` 25/40/35 across the slots
pub fn recommend_daily_plan<R: Rng + ?Sized>(
    recipes: &[Arc<RecipeRecord>],
    daily_calories: f64,
    training_goal: TrainingGoal,
    diet_preference: &str,
    allergies: &[String],
    preferences: Option<&UserPreferenceModel>,
    rng: &mut R,
) -> DailyPlan {
    let personalized = filter_by_diet_and_allergy(recipes, diet_preference, allergies);

    let meals = MealSlot::ALL
        .into_iter()
        .map(|slot| {
            let target_calories = daily_calories * slot.calorie_share();
            let recipe = pick_meal(
                &personalized,
                slot.meal_type(),
                target_calories,
                training_goal,
                preferences,
                rng,
            );
            (
                slot,
                PlannedMeal {
                    recipe,
                    target_calories,
                },
            )
        })
        .collect();

    info!(
        "Generated daily plan for {:.0} kcal ({:?}) from {} personalized recipes",
        daily_calories,
        training_goal,
        personalized.len()
    );

    DailyPlan {
        meals,
        training_goal,
        personalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn recipe(row_id: usize, calories: f64, protein: f64, carbs: f64, meal_type: &str) -> Arc<RecipeRecord> {
        Arc::new(RecipeRecord {
            row_id,
            name: format!("Recipe {row_id}"),
            servings: 1.0,
            calories_total: calories,
            protein_total_g: protein,
            fat_total_g: 10.0,
            carbs_total_g: carbs,
            calories_per_serving: calories,
            protein_g: protein,
            fat_g: 10.0,
            carbs_g: carbs,
            ingredients_normalized: vec![format!("ingredient {row_id}")],
            ingredient_lines_raw: Vec::new(),
            ingredient_lines_per_serving: Vec::new(),
            diet_labels: String::new(),
            meal_type: meal_type.to_string(),
            image_url: None,
            url: None,
        })
    }

    fn ids(recipes: &[Arc<RecipeRecord>]) -> Vec<usize> {
        recipes.iter().map(|r| r.row_id).collect()
    }

    #[test]
    fn test_balanced_ranks_by_calorie_distance() {
        let recipes = vec![
            recipe(0, 700.0, 30.0, 50.0, "breakfast"),
            recipe(1, 480.0, 30.0, 50.0, "breakfast"),
            recipe(2, 550.0, 30.0, 50.0, "breakfast"),
            recipe(3, 500.0, 30.0, 50.0, "lunch"),
        ];
        let ranked = rank_candidates(&recipes, "breakfast", 500.0, TrainingGoal::Balanced, None);
        assert_eq!(ids(&ranked), vec![1, 2, 0]);
    }

    #[test]
    fn test_goal_orderings() {
        let recipes = vec![
            recipe(0, 500.0, 30.0, 80.0, "dinner"),
            recipe(1, 700.0, 60.0, 20.0, "dinner"),
            recipe(2, 450.0, 60.0, 40.0, "dinner"),
        ];
        let strength = rank_candidates(&recipes, "dinner", 500.0, TrainingGoal::Strength, None);
        assert_eq!(ids(&strength), vec![2, 1, 0]);

        let endurance = rank_candidates(&recipes, "dinner", 500.0, TrainingGoal::Endurance, None);
        assert_eq!(ids(&endurance), vec![0, 2, 1]);
    }

    #[test]
    fn test_preferences_override_goal() {
        let recipes = vec![
            recipe(0, 500.0, 60.0, 50.0, "lunch"),
            recipe(1, 900.0, 30.0, 50.0, "lunch"),
        ];
        let mut model = UserPreferenceModel::new();
        model.update_with_rating(&recipes[1], 1);

        let ranked = rank_candidates(&recipes, "lunch", 500.0, TrainingGoal::Strength, Some(&model));
        assert_eq!(ids(&ranked), vec![1, 0]);
    }

    #[test]
    fn test_pick_meal_without_candidates() {
        let recipes = vec![recipe(0, 500.0, 30.0, 50.0, "dinner")];
        let mut rng = StdRng::seed_from_u64(7);
        assert!(pick_meal(&recipes, "breakfast", 500.0, TrainingGoal::Balanced, None, &mut rng).is_none());
    }

    #[test]
    fn test_pick_meal_stays_in_top_pool() {
        let recipes: Vec<_> = (0..50)
            .map(|i| recipe(i, 300.0 + 10.0 * i as f64, 30.0, 50.0, "lunch"))
            .collect();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let picked = pick_meal(&recipes, "lunch", 300.0, TrainingGoal::Balanced, None, &mut rng)
                .expect("lunch recipes exist");
            assert!(picked.row_id < CANDIDATE_POOL_SIZE);
        }
    }

    #[test]
    fn test_replace_slot_keeps_other_slots() {
        let recipes: Vec<_> = (0..10)
            .map(|i| {
                let meal_type = ["breakfast", "lunch", "dinner"][i % 3];
                recipe(i, 400.0 + 20.0 * i as f64, 30.0, 50.0, meal_type)
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let mut plan = recommend_daily_plan(
            &recipes,
            2000.0,
            TrainingGoal::Balanced,
            "omnivore",
            &[],
            None,
            &mut rng,
        );
        let lunch_before = plan.get(MealSlot::Lunch).cloned();
        let dinner_before = plan.get(MealSlot::Dinner).cloned();

        assert!(plan.replace_slot(MealSlot::Breakfast, None, &mut rng));
        assert_eq!(plan.get(MealSlot::Lunch).cloned(), lunch_before);
        assert_eq!(plan.get(MealSlot::Dinner).cloned(), dinner_before);
        assert_eq!(plan.get(MealSlot::Breakfast).map(|m| m.target_calories), Some(500.0));
    }
}
