//! Categorizer types
//!
//! The default category list, parse results and the errors the
//! categorization pipeline can produce before the outer boundary swallows them.

use crate::backend::BackendError;

/// Categories returned when the pipeline fails as a whole
pub const DEFAULT_CATEGORIES: [&str; 2] = ["general", "personal"];

/// Owned copy of [`DEFAULT_CATEGORIES`]
pub fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

/// Which parser produced a category list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSource {
    /// Response was a well-formed `{"categories": [...]}` object
    Structured,
    /// Response was scraped line by line
    Fallback,
}

impl ParseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseSource::Structured => "structured",
            ParseSource::Fallback => "fallback",
        }
    }
}

/// Normalized categories plus the parser that found them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCategories {
    pub categories: Vec<String>,
    pub source: ParseSource,
}

/// Errors from the categorization pipeline
#[derive(Debug, thiserror::Error)]
pub enum CategorizeError {
    #[error("Backend failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: BackendError,
    },
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
