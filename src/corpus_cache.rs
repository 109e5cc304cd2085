//! # Corpus Cache Module
//!
//! Memoizes prepared corpora so repeated loads of the same source within a
//! process are cheap.

use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::loader_errors::DataSourceError;
use crate::recipe_loader::{fetch_corpus, RecipeSource};
use crate::recipe_model::RecipeCorpus;
use crate::recommender_config::RecommenderConfig;

/// Thread-safe cache of prepared corpora keyed by source identity
///
/// # Instance Lifecycle
///
/// - A corpus is loaded on the first request for its source
/// - Later requests for the same source share the cached `Arc`
/// - Different sources never share an entry
/// - Failed loads are not cached, so the next request tries again
///
/// # Concurrency
///
/// The lock is not held while loading. Two concurrent first requests for one
/// source may both load it; the result is identical and the later insert wins.
pub struct CorpusCache {
    config: RecommenderConfig,
    corpora: Mutex<HashMap<String, Arc<RecipeCorpus>>>,
}

impl CorpusCache {
    /// Create an empty cache preparing corpora with `config`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nutrition_advisor::corpus_cache::CorpusCache;
    /// use nutrition_advisor::recommender_config::RecommenderConfig;
    ///
    /// let cache = CorpusCache::new(RecommenderConfig::default());
    /// assert_eq!(cache.len(), 0);
    /// ```
    pub fn new(config: RecommenderConfig) -> Self {
        Self {
            config,
            corpora: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Get the cached corpus for `source`, loading it on first use
    ///
    /// # Errors
    ///
    /// Returns the loader's `DataSourceError` if the source cannot be fetched
    /// or is not a recipe table.
    pub async fn get_or_load(
        &self,
        source: &RecipeSource,
    ) -> Result<Arc<RecipeCorpus>, DataSourceError> {
        let key = source.identity();

        if let Some(corpus) = self.cached(&key) {
            debug!("Corpus cache hit for {key}");
            return Ok(corpus);
        }

        info!("Corpus cache miss for {key}, loading");
        let corpus = Arc::new(fetch_corpus(source, &self.config).await?);

        {
            let mut corpora = self.corpora.lock().unwrap_or_else(PoisonError::into_inner);
            corpora.insert(key, Arc::clone(&corpus));
        }

        Ok(corpus)
    }

    /// Load the configured default source
    pub async fn get_default(&self) -> Result<Arc<RecipeCorpus>, DataSourceError> {
        let source = RecipeSource::parse(&self.config.data_source);
        self.get_or_load(&source).await
    }

    fn cached(&self, key: &str) -> Option<Arc<RecipeCorpus>> {
        let corpora = self.corpora.lock().unwrap_or_else(PoisonError::into_inner);
        corpora.get(key).map(Arc::clone)
    }

    /// Drop the entry for a source whose backing data changed
    pub fn invalidate(&self, source: &RecipeSource) {
        let mut corpora = self.corpora.lock().unwrap_or_else(PoisonError::into_inner);
        if corpora.remove(&source.identity()).is_some() {
            info!("Invalidated cached corpus for {source}");
        }
    }

    /// Number of cached corpora
    pub fn len(&self) -> usize {
        self.corpora
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CorpusCache {
    fn default() -> Self {
        Self::new(RecommenderConfig::default())
    }
}
