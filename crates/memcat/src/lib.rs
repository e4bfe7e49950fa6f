//! memcat - category tagging for stored memories
//!
//! This crate asks a locally hosted LLM (Ollama) to label free-text memories
//! with short topic categories, retrying flaky backend calls and degrading to
//! a fixed default list instead of failing the caller.

pub mod backend;
pub mod categorizer;
pub mod config;
pub mod error;
pub mod testing;

pub use categorizer::{Categorizer, DEFAULT_CATEGORIES};
pub use error::MemcatError;
