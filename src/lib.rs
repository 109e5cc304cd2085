//! # Nutrition Advisor
//!
//! Recipe recommendation engine for a fitness and nutrition application:
//! loads a recipe dataset, narrows it to high-protein meals, filters by diet
//! and allergies, ranks by learned ingredient preferences, and assembles a
//! daily breakfast, lunch and dinner plan.

pub mod corpus_cache;
pub mod ingredient_cells;
pub mod loader_errors;
pub mod meal_planner;
pub mod preference_model;
pub mod quantity_parser;
pub mod recipe_filter;
pub mod recipe_loader;
pub mod recipe_model;
pub mod recommender_config;
pub mod session;
