use std::fmt::Display;
use std::path::Path;

use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use memcat::categorizer::RetryPolicy;
use memcat::config::Config;

use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct ConfigCommand {
    #[clap(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Parser)]
pub enum ConfigSubcommand {
    #[clap(about = "Show the resolved configuration (file, defaults and environment)")]
    Show,
}

impl ConfigCommand {
    pub async fn execute(
        &self,
        config: &Config,
        config_path: Option<&Path>,
        format: OutputFormat,
    ) -> CliResult<()> {
        match &self.command {
            ConfigSubcommand::Show => Self::show(config, config_path, format),
        }
    }

    fn show(config: &Config, config_path: Option<&Path>, format: OutputFormat) -> CliResult<()> {
        let worst_case_wait = RetryPolicy::from_config(&config.retry).total_delay();

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "backend": {
                        "host": config.backend.host,
                        "model": config.backend.model,
                        "timeout_secs": config.backend.timeout_secs,
                    },
                    "retry": {
                        "max_attempts": config.retry.max_attempts,
                        "base_delay_secs": config.retry.base_delay_secs,
                        "max_delay_secs": config.retry.max_delay_secs,
                        "multiplier": config.retry.multiplier,
                        "worst_case_wait_secs": worst_case_wait.as_secs(),
                    }
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                match config_path {
                    Some(path) => println!("Configuration from: {}", path.display()),
                    None => println!("Configuration: (defaults or discovered file)"),
                }
                println!("==============================\n");

                println!("[Backend]");
                let mut backend_table = settings_table();
                add_setting(&mut backend_table, "host", &config.backend.host);
                add_setting(&mut backend_table, "model", &config.backend.model);
                add_setting(&mut backend_table, "timeout_secs", config.backend.timeout_secs);
                println!("{backend_table}\n");

                println!("[Retry]");
                let mut retry_table = settings_table();
                add_setting(&mut retry_table, "max_attempts", config.retry.max_attempts);
                add_setting(&mut retry_table, "base_delay_secs", config.retry.base_delay_secs);
                add_setting(&mut retry_table, "max_delay_secs", config.retry.max_delay_secs);
                add_setting(&mut retry_table, "multiplier", config.retry.multiplier);
                add_setting(&mut retry_table, "worst_case_wait", format!("{worst_case_wait:?}"));
                println!("{retry_table}");
            }
        }

        Ok(())
    }
}

fn settings_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Setting", "Value"]);
    table
}

fn add_setting(table: &mut Table, key: &str, value: impl Display) {
    table.add_row([key.to_string(), value.to_string()]);
}
