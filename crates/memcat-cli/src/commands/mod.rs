pub mod categorize;
pub mod config;
pub mod health;

pub use categorize::CategorizeCommand;
pub use config::ConfigCommand;
pub use health::HealthCommand;
