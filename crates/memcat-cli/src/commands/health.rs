use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use memcat::Categorizer;
use memcat::config::Config;

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct HealthCommand {}

impl HealthCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> CliResult<()> {
        let categorizer = Categorizer::from_config(config)?;
        let available = categorizer.is_available().await;

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "backend": categorizer.backend_name(),
                    "host": config.backend.host,
                    "model": categorizer.model(),
                    "available": available,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Backend", "Host", "Model", "Status"]);

                table.add_row([
                    categorizer.backend_name(),
                    config.backend.host.as_str(),
                    categorizer.model(),
                    if available { "reachable" } else { "unreachable" },
                ]);

                println!("{table}");
            }
        }

        if available {
            Ok(())
        } else {
            Err(CliError::Unavailable {
                backend: categorizer.backend_name().to_string(),
                host: config.backend.host.clone(),
            })
        }
    }
}
