//! # User Preference Model
//!
//! Online like/dislike counts per ingredient token, learned from meal
//! ratings within one session and used to rank recipes.

use crate::recipe_model::RecipeRecord;
use log::debug;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPreferenceModel {
    liked_counts: HashMap<String, u32>,
    disliked_counts: HashMap<String, u32>,
}

impl UserPreferenceModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every ingredient token of `recipe` as liked (`rating > 0`) or
    /// disliked (`rating < 0`); a zero rating changes nothing
    pub fn update_with_rating(&mut self, recipe: &RecipeRecord, rating: i32) {
        let counts = match rating.signum() {
            1 => &mut self.liked_counts,
            -1 => &mut self.disliked_counts,
            _ => return,
        };
        for token in &recipe.ingredients_normalized {
            *counts.entry(token.clone()).or_insert(0) += 1;
        }
        debug!(
            "Preference update from '{}' (rating {}): {} tokens",
            recipe.name,
            rating,
            recipe.ingredients_normalized.len()
        );
    }

    /// Sum of liked minus disliked counts over the recipe's tokens
    pub fn score(&self, recipe: &RecipeRecord) -> f64 {
        recipe
            .ingredients_normalized
            .iter()
            .map(|token| {
                let liked = self.liked_counts.get(token).copied().unwrap_or(0);
                let disliked = self.disliked_counts.get(token).copied().unwrap_or(0);
                f64::from(liked) - f64::from(disliked)
            })
            .sum()
    }

    pub fn liked_count(&self, token: &str) -> u32 {
        self.liked_counts.get(token).copied().unwrap_or(0)
    }

    pub fn disliked_count(&self, token: &str) -> u32 {
        self.disliked_counts.get(token).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.liked_counts.is_empty() && self.disliked_counts.is_empty()
    }
}
