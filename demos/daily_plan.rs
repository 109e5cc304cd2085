//! Generate a daily meal plan from the configured recipe dataset.
//!
//! ```sh
//! RECIPE_DATA_SOURCE=recipes.csv RUST_LOG=info cargo run --example daily_plan
//! ```

use anyhow::Result;
use log::info;
use nutrition_advisor::corpus_cache::CorpusCache;
use nutrition_advisor::recipe_filter::{search, SearchQuery};
use nutrition_advisor::recipe_model::UserProfile;
use nutrition_advisor::recommender_config::RecommenderConfig;
use nutrition_advisor::session::AdvisorySession;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = RecommenderConfig::from_env();
    let cache = CorpusCache::new(config);
    let corpus = cache.get_default().await?;
    info!("Working corpus has {} recipes", corpus.len());

    let profile = UserProfile::default();
    let mut session = AdvisorySession::new();
    let mut rng = rand::thread_rng();

    let plan = session.generate_plan(&corpus, &profile, &mut rng);
    for (slot, meal) in plan.iter() {
        println!("{slot} (target {:.0} kcal)", meal.target_calories);
        match &meal.recipe {
            Some(recipe) => {
                println!("  {recipe}");
                for line in &recipe.ingredient_lines_per_serving {
                    println!("  - {line}");
                }
            }
            None => println!("  No suitable recipe found."),
        }
    }

    let query = SearchQuery {
        include: vec!["chicken".to_string()],
        max_calories: Some(600.0),
        ..Default::default()
    };
    let results = search(corpus.recipes(), &query, Some(session.preferences()));
    println!("\nFound {} chicken recipes under 600 kcal", results.len());
    for recipe in results.iter().take(5) {
        println!("  {recipe}");
    }

    Ok(())
}
