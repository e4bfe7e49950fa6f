use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use futures::stream::{self, StreamExt};
use memcat::Categorizer;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, format_categories, truncate_string};

#[derive(Parser)]
pub struct CategorizeCommand {
    #[clap(help = "Memory text to categorize (one result per argument)")]
    pub texts: Vec<String>,

    #[clap(
        long,
        help = "Read memories from stdin, one per line",
        conflicts_with = "texts"
    )]
    pub stdin: bool,

    #[clap(
        long,
        default_value = "4",
        help = "Maximum number of memories categorized at once"
    )]
    pub concurrency: usize,
}

impl CategorizeCommand {
    pub async fn execute(&self, categorizer: &Categorizer, format: OutputFormat) -> CliResult<()> {
        let inputs = if self.stdin {
            read_memories(tokio::io::stdin()).await?
        } else {
            self.texts.clone()
        };

        if inputs.is_empty() {
            return Err(CliError::NoInput);
        }

        let results = categorize_all(categorizer, &inputs, self.concurrency).await;

        match format {
            OutputFormat::Json => {
                let output: Vec<_> = inputs
                    .iter()
                    .zip(&results)
                    .map(|(text, categories)| {
                        serde_json::json!({
                            "text": text,
                            "categories": categories,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Memory", "Categories"]);

                for (text, categories) in inputs.iter().zip(&results) {
                    table.add_row([truncate_string(text, 60), format_categories(categories)]);
                }

                println!("{table}");
            }
        }

        Ok(())
    }
}

/// Categorize every input with at most `concurrency` calls in flight.
///
/// Results come back in input order.
pub async fn categorize_all(
    categorizer: &Categorizer,
    inputs: &[String],
    concurrency: usize,
) -> Vec<Vec<String>> {
    stream::iter(inputs)
        .map(|text| categorizer.categorize(text))
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Read one memory per non-blank line
pub async fn read_memories<R>(reader: R) -> CliResult<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut memories = Vec::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() {
            memories.push(line.to_string());
        }
    }

    Ok(memories)
}
