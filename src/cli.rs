use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::boards::items_from_table;
use crate::completion::OpenAiClient;
use crate::config::AppConfig;
use crate::export::{export_board_as_csv, export_board_as_xlsx};
use crate::extract::parse_items_from_csv_with_ai;
use crate::normalize::normalize_flexible_input;

/// CLI for checkin-board: preview and convert attendee import files.
#[derive(Parser)]
#[clap(
    name = "checkin-board",
    version,
    about = "Normalize pasted/CSV attendee lists and export check-in tables"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize an input file and print the resulting table and guesses
    Preview {
        /// Path to the raw text/CSV file
        #[clap(long)]
        input: PathBuf,
        /// Use the AI extraction path instead of the heuristics
        /// (requires OPENAI_API_KEY)
        #[clap(long)]
        ai: bool,
    },
    /// Normalize an input file and write it as a check-in table
    Export {
        /// Path to the raw text/CSV file
        #[clap(long)]
        input: PathBuf,
        /// Output format
        #[clap(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output path (defaults to <input stem>-export.<ext>)
        #[clap(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Preview { input, ai } => {
            let text = read_input(&input)?;
            if ai {
                let config = AppConfig::from_env()?;
                config.trace_loaded();
                let client = OpenAiClient::new(config);
                let items = parse_items_from_csv_with_ai(&client, &text).await?;
                println!("AI extraction produced {} item(s):", items.len());
                for item in &items {
                    let fields: Vec<String> = item
                        .fields
                        .iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect();
                    println!(
                        "  [{}] {}",
                        if item.checked_in { "x" } else { " " },
                        fields.join(", ")
                    );
                }
            } else {
                let result = normalize_flexible_input(&text);
                println!("Columns: {}", result.columns.join(", "));
                for row in &result.rows {
                    let cells: Vec<&str> = result
                        .columns
                        .iter()
                        .map(|col| row.get(col).map(String::as_str).unwrap_or(""))
                        .collect();
                    println!("  {}", cells.join(" | "));
                }
                if !result.column_guesses.is_empty() {
                    println!("Column guesses:");
                    for guess in &result.column_guesses {
                        println!("  {} ({}%)", guess.name, guess.confidence);
                    }
                }
            }
            Ok(())
        }
        Commands::Export {
            input,
            format,
            output,
        } => {
            let text = read_input(&input)?;
            let result = normalize_flexible_input(&text);
            let items = items_from_table(&crate::normalize::NormalizedTable {
                columns: result.columns.clone(),
                rows: result.rows,
            });

            let (bytes, ext) = match format {
                ExportFormat::Csv => (export_board_as_csv(&items, &[]), "csv"),
                ExportFormat::Xlsx => (export_board_as_xlsx(&items, &[])?, "xlsx"),
            };
            let output = output.unwrap_or_else(|| default_output(&input, ext));
            std::fs::write(&output, bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Wrote {} item(s) to {}", items.len(), output.display());
            Ok(())
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn default_output(input: &Path, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("board");
    input.with_file_name(format!("{stem}-export.{ext}"))
}
