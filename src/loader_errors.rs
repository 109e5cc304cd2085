//! # Loader Error Types Module
//!
//! Errors raised when the recipe source cannot be fetched or is not a recipe
//! table at all. Problems with individual rows are not errors: such rows are
//! dropped during preparation.

/// Fatal failure to load a recipe corpus
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Local file could not be read
    Io(String),
    /// Remote source could not be fetched
    Http(String),
    /// Content is not parseable as CSV
    Csv(String),
    /// A required column is absent from the header
    MissingColumn(String),
}

impl std::fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSourceError::Io(msg) => write!(f, "Recipe source read error: {msg}"),
            DataSourceError::Http(msg) => write!(f, "Recipe source fetch error: {msg}"),
            DataSourceError::Csv(msg) => write!(f, "Recipe source parse error: {msg}"),
            DataSourceError::MissingColumn(column) => {
                write!(f, "Recipe source is missing required column '{column}'")
            }
        }
    }
}

impl std::error::Error for DataSourceError {}

impl From<std::io::Error> for DataSourceError {
    fn from(err: std::io::Error) -> Self {
        DataSourceError::Io(err.to_string())
    }
}

impl From<csv::Error> for DataSourceError {
    fn from(err: csv::Error) -> Self {
        DataSourceError::Csv(err.to_string())
    }
}

impl From<reqwest::Error> for DataSourceError {
    fn from(err: reqwest::Error) -> Self {
        DataSourceError::Http(err.to_string())
    }
}
