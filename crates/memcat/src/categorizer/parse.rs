//! Response parsing for the categorizer
//!
//! Model output is first read as a `{"categories": [...]}` object. When that
//! fails the text is scraped line by line instead. Both paths end in the same
//! normalization: trim, lowercase, drop empties, keep order.

use serde::Deserialize;
use tracing::warn;

use crate::categorizer::types::{ParseSource, ParsedCategories};

/// Characters stripped from both ends of a scraped line
const SCRAPE_TRIM_CHARS: &[char] = &['"', '-', '.', ','];

/// JSON shape the model is asked to produce
#[derive(Debug, Deserialize)]
struct MemoryCategories {
    categories: Vec<String>,
}

/// Parse raw model output into normalized categories. Never fails.
pub fn parse_categories(raw: &str) -> ParsedCategories {
    let text = raw.trim();

    let (candidates, source) = match parse_structured(text) {
        Ok(categories) => (categories, ParseSource::Structured),
        Err(e) => {
            warn!("Failed to parse JSON ({e}), using fallback parsing for: {text}");
            (scrape_lines(text), ParseSource::Fallback)
        }
    };

    ParsedCategories {
        categories: normalize(candidates),
        source,
    }
}

/// Strict parse: an object whose `categories` field is an array of strings
pub fn parse_structured(text: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str::<MemoryCategories>(text).map(|parsed| parsed.categories)
}

/// Best-effort scrape of category-like lines from freeform text.
///
/// Lines starting with `#` are comments. Surrounding whitespace and
/// `"`, `-`, `.`, `,` are stripped from every other line.
pub fn scrape_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| line.trim().trim_matches(SCRAPE_TRIM_CHARS).to_string())
        .collect()
}

/// Trim and lowercase each candidate, dropping the ones left empty
pub fn normalize<I, S>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .filter_map(|c| {
            let trimmed = c.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
        })
        .collect()
}
