pub mod commands;
pub mod error;
pub mod output;

pub use commands::{CategorizeCommand, ConfigCommand, HealthCommand};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, format_categories, truncate_string};
