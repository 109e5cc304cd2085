//! # Recipe Corpus Loader
//!
//! This module reads the tabular recipe dataset and turns every usable row
//! into a [`RecipeRecord`] with per-serving nutrition.
//!
//! ## Preparation steps
//!
//! 1. Extract protein, fat and carbohydrates from the nested nutrient JSON
//! 2. Drop rows missing any nutrition value, calories or servings
//! 3. Coerce servings to a number of at least 1
//! 4. Divide totals by servings
//! 5. Keep only high-protein, calorie-capped recipes
//! 6. Normalize ingredient tokens and display lines
//! 7. Scale display lines to a single serving
//!
//! Rows failing steps 1-4 are dropped silently. Only an unreadable source or a
//! table without the required columns is an error.

use crate::ingredient_cells::{parse_ingredient_lines, parse_ingredient_tokens};
use crate::loader_errors::DataSourceError;
use crate::quantity_parser::scale_lines;
use crate::recipe_model::{RecipeCorpus, RecipeRecord};
use crate::recommender_config::RecommenderConfig;
use log::{debug, info, trace};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Nutrient codes inside the `total_nutrients` column
pub const PROTEIN_KEY: &str = "PROCNT";
pub const FAT_KEY: &str = "FAT";
pub const CARBS_KEY: &str = "CHOCDF";

/// Columns without which the table is not a recipe dataset
pub const REQUIRED_COLUMNS: [&str; 3] = ["total_nutrients", "calories", "servings"];

/// Where a recipe dataset comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecipeSource {
    File(PathBuf),
    Url(String),
}

impl RecipeSource {
    /// Interpret `location` as a URL when it has an http(s) scheme, else as a path
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            RecipeSource::Url(location.to_string())
        } else {
            RecipeSource::File(PathBuf::from(location))
        }
    }

    /// Key identifying this source in caches
    pub fn identity(&self) -> String {
        match self {
            RecipeSource::File(path) => format!("file:{}", path.display()),
            RecipeSource::Url(url) => format!("url:{url}"),
        }
    }
}

impl fmt::Display for RecipeSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecipeSource::File(path) => write!(f, "{}", path.display()),
            RecipeSource::Url(url) => write!(f, "{url}"),
        }
    }
}

/// One row of the dataset as read from CSV
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRecipeRow {
    pub recipe_name: Option<String>,
    pub total_nutrients: Option<String>,
    pub calories: Option<String>,
    pub servings: Option<String>,
    pub ingredients: Option<String>,
    pub ingredient_lines: Option<String>,
    pub diet_labels: Option<String>,
    pub meal_type: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
}

/// Row counts collected while preparing a corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub total_rows: usize,
    pub missing_nutrition: usize,
    pub outside_prefilter: usize,
    pub kept: usize,
}

fn non_empty(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().map(str::trim).filter(|cell| !cell.is_empty())
}

/// Read `key.quantity` from a nutrient JSON document
///
/// Any parse failure, missing key or non-finite quantity yields `None`.
pub fn get_nutrient(nutrient_json: Option<&str>, key: &str) -> Option<f64> {
    let data: Value = serde_json::from_str(nutrient_json?).ok()?;
    let quantity = match data.get(key)?.get("quantity")? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    quantity.filter(|value| value.is_finite())
}

/// Servings coerced to a finite number of at least 1
fn coerce_servings(raw: &str) -> f64 {
    match raw.parse::<f64>() {
        Ok(servings) if servings.is_finite() && servings >= 1.0 => servings,
        _ => 1.0,
    }
}

enum RowOutcome {
    Kept(RecipeRecord),
    MissingNutrition,
    OutsidePrefilter,
}

fn prepare_row(row_id: usize, row: RawRecipeRow, config: &RecommenderConfig) -> RowOutcome {
    let nutrients = non_empty(&row.total_nutrients);
    let protein = get_nutrient(nutrients, PROTEIN_KEY);
    let fat = get_nutrient(nutrients, FAT_KEY);
    let carbs = get_nutrient(nutrients, CARBS_KEY);
    let calories = non_empty(&row.calories).and_then(|raw| raw.parse::<f64>().ok());
    let servings = non_empty(&row.servings);

    let (Some(protein), Some(fat), Some(carbs), Some(calories), Some(servings)) =
        (protein, fat, carbs, calories, servings)
    else {
        trace!("Dropping row {}: incomplete nutrition", row_id);
        return RowOutcome::MissingNutrition;
    };
    if !calories.is_finite() {
        trace!("Dropping row {}: calories not finite", row_id);
        return RowOutcome::MissingNutrition;
    }

    let servings = coerce_servings(servings);
    let calories_per_serving = calories / servings;
    let protein_g = protein / servings;

    if protein_g < config.high_protein_min || calories_per_serving > config.max_calories_per_serving
    {
        trace!(
            "Dropping row {}: {:.1} g protein, {:.0} kcal per serving",
            row_id,
            protein_g,
            calories_per_serving
        );
        return RowOutcome::OutsidePrefilter;
    }

    let ingredient_lines_raw = parse_ingredient_lines(row.ingredient_lines.as_deref());
    let ingredient_lines_per_serving = scale_lines(&ingredient_lines_raw, 1.0 / servings);

    RowOutcome::Kept(RecipeRecord {
        row_id,
        name: row.recipe_name.unwrap_or_default().trim().to_string(),
        servings,
        calories_total: calories,
        protein_total_g: protein,
        fat_total_g: fat,
        carbs_total_g: carbs,
        calories_per_serving,
        protein_g,
        fat_g: fat / servings,
        carbs_g: carbs / servings,
        ingredients_normalized: parse_ingredient_tokens(row.ingredients.as_deref()),
        ingredient_lines_raw,
        ingredient_lines_per_serving,
        diet_labels: row.diet_labels.unwrap_or_default(),
        meal_type: row.meal_type.unwrap_or_default(),
        image_url: non_empty(&row.image_url).map(str::to_string),
        url: non_empty(&row.url).map(str::to_string),
    })
}

/// Prepare raw rows into recipe records, keeping source order
pub fn prepare_rows<I>(rows: I, config: &RecommenderConfig) -> (Vec<RecipeRecord>, LoadStats)
where
    I: IntoIterator<Item = RawRecipeRow>,
{
    let mut stats = LoadStats::default();
    let mut recipes = Vec::new();

    for (row_id, row) in rows.into_iter().enumerate() {
        stats.total_rows += 1;
        match prepare_row(row_id, row, config) {
            RowOutcome::Kept(recipe) => recipes.push(recipe),
            RowOutcome::MissingNutrition => stats.missing_nutrition += 1,
            RowOutcome::OutsidePrefilter => stats.outside_prefilter += 1,
        }
    }

    stats.kept = recipes.len();
    (recipes, stats)
}

/// Parse CSV content into a prepared corpus
pub fn read_corpus<R: Read>(
    reader: R,
    source: &str,
    config: &RecommenderConfig,
) -> Result<RecipeCorpus, DataSourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(DataSourceError::MissingColumn(column.to_string()));
        }
    }

    let rows = csv_reader
        .deserialize::<RawRecipeRow>()
        .collect::<Result<Vec<_>, _>>()?;

    let (recipes, stats) = prepare_rows(rows, config);
    info!(
        "Prepared {} of {} recipes from {} ({} missing nutrition, {} outside prefilter)",
        stats.kept, stats.total_rows, source, stats.missing_nutrition, stats.outside_prefilter
    );

    Ok(RecipeCorpus::new(source, recipes))
}

/// Load a corpus from a local CSV file
pub fn load_from_path(
    path: &Path,
    config: &RecommenderConfig,
) -> Result<RecipeCorpus, DataSourceError> {
    info!("Loading recipes from file {}", path.display());
    let file = File::open(path)
        .map_err(|e| DataSourceError::Io(format!("{}: {e}", path.display())))?;
    read_corpus(file, &RecipeSource::File(path.to_path_buf()).identity(), config)
}

/// Load a corpus from any source, fetching remote sources over HTTP
pub async fn fetch_corpus(
    source: &RecipeSource,
    config: &RecommenderConfig,
) -> Result<RecipeCorpus, DataSourceError> {
    let content = match source {
        RecipeSource::File(path) => {
            info!("Loading recipes from file {}", path.display());
            tokio::fs::read(path)
                .await
                .map_err(|e| DataSourceError::Io(format!("{}: {e}", path.display())))?
        }
        RecipeSource::Url(url) => {
            info!("Fetching recipes from {}", url);
            let response = reqwest::get(url).await?.error_for_status()?;
            response.bytes().await?.to_vec()
        }
    };
    debug!("Read {} bytes from {}", content.len(), source);

    read_corpus(content.as_slice(), &source.identity(), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUTRIENTS: &str = r#"{"PROCNT": {"label": "Protein", "quantity": 120.0, "unit": "g"}, "FAT": {"quantity": 40}, "CHOCDF": {"quantity": "80.5"}}"#;

    fn row(calories: &str, servings: &str) -> RawRecipeRow {
        RawRecipeRow {
            recipe_name: Some("Chicken Rice Bowl".to_string()),
            total_nutrients: Some(NUTRIENTS.to_string()),
            calories: Some(calories.to_string()),
            servings: Some(servings.to_string()),
            ingredients: Some("['Chicken breast', 'Rice']".to_string()),
            ingredient_lines: Some("['2 cups rice', '1 lb chicken breast', 'salt']".to_string()),
            meal_type: Some("lunch/dinner".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_get_nutrient() {
        assert_eq!(get_nutrient(Some(NUTRIENTS), PROTEIN_KEY), Some(120.0));
        assert_eq!(get_nutrient(Some(NUTRIENTS), CARBS_KEY), Some(80.5));
        assert_eq!(get_nutrient(Some(NUTRIENTS), "SUGAR"), None);
        assert_eq!(get_nutrient(Some("not json"), PROTEIN_KEY), None);
        assert_eq!(get_nutrient(None, PROTEIN_KEY), None);
    }

    #[test]
    fn test_get_nutrient_rejects_non_finite() {
        let nutrients = r#"{"PROCNT": {"quantity": "NaN"}, "FAT": {"quantity": "inf"}, "CHOCDF": {"quantity": "-Infinity"}}"#;
        assert_eq!(get_nutrient(Some(nutrients), PROTEIN_KEY), None);
        assert_eq!(get_nutrient(Some(nutrients), FAT_KEY), None);
        assert_eq!(get_nutrient(Some(nutrients), CARBS_KEY), None);
    }

    #[test]
    fn test_prepare_rows_drops_non_finite_nutrients() {
        let config = RecommenderConfig::default();
        let mut bad = row("500", "1");
        bad.total_nutrients = Some(
            r#"{"PROCNT": {"quantity": "NaN"}, "FAT": {"quantity": "nan"}, "CHOCDF": {"quantity": 10}}"#
                .to_string(),
        );
        let (recipes, stats) = prepare_rows(vec![bad], &config);

        assert!(recipes.is_empty());
        assert_eq!(stats.missing_nutrition, 1);
        assert_eq!(stats.kept, 0);
    }

    #[test]
    fn test_coerce_servings() {
        assert_eq!(coerce_servings("4"), 4.0);
        assert_eq!(coerce_servings("abc"), 1.0);
        assert_eq!(coerce_servings("0"), 1.0);
        assert_eq!(coerce_servings("-2"), 1.0);
        assert_eq!(coerce_servings("NaN"), 1.0);
    }

    #[test]
    fn test_prepare_row_per_serving_values() {
        let config = RecommenderConfig::default();
        let (recipes, stats) = prepare_rows(vec![row("2000", "4")], &config);

        assert_eq!(stats.kept, 1);
        let recipe = &recipes[0];
        assert_eq!(recipe.calories_per_serving, 500.0);
        assert_eq!(recipe.protein_g, 30.0);
        assert_eq!(recipe.fat_g, 10.0);
        assert_eq!(recipe.ingredients_normalized, vec!["chicken breast", "rice"]);
        assert_eq!(
            recipe.ingredient_lines_per_serving,
            vec!["1/2 cups rice", "1/4 lb chicken breast", "salt"]
        );
    }

    #[test]
    fn test_prepare_rows_drops_incomplete_and_prefiltered() {
        let config = RecommenderConfig::default();
        let mut missing = row("2000", "4");
        missing.total_nutrients = Some(r#"{"PROCNT": {"quantity": 100}}"#.to_string());
        let mut no_servings = row("2000", "4");
        no_servings.servings = None;

        let rows = vec![
            row("2000", "4"),
            missing,
            no_servings,
            row("4000", "4"), // 1000 kcal per serving
            row("2000", "10"), // 12 g protein per serving
        ];
        let (recipes, stats) = prepare_rows(rows, &config);

        assert_eq!(
            stats,
            LoadStats {
                total_rows: 5,
                missing_nutrition: 2,
                outside_prefilter: 2,
                kept: 1
            }
        );
        assert_eq!(recipes[0].row_id, 0);
    }

    #[test]
    fn test_read_corpus_requires_columns() {
        let csv = "recipe_name,calories\nSoup,300\n";
        let result = read_corpus(csv.as_bytes(), "memory", &RecommenderConfig::default());
        assert!(matches!(result, Err(DataSourceError::MissingColumn(column)) if column == "total_nutrients"));
    }

    #[test]
    fn test_recipe_source_parsing() {
        assert_eq!(
            RecipeSource::parse("https://example.com/recipes.csv"),
            RecipeSource::Url("https://example.com/recipes.csv".to_string())
        );
        assert_eq!(
            RecipeSource::parse("data/recipes.csv"),
            RecipeSource::File(PathBuf::from("data/recipes.csv"))
        );
        assert_ne!(
            RecipeSource::parse("a.csv").identity(),
            RecipeSource::parse("b.csv").identity()
        );
    }
}
