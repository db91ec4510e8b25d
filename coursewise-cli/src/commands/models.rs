//! Model server commands.
//!
//! Lists what the configured Ollama server has installed and which of those
//! coursewise is set up to use.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use coursewise_models::OllamaProvider;

use crate::config::{ConfigLoader, EmbedderKind, ModelsConfig};

/// Models arguments.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommands,
}

/// Models subcommands.
#[derive(Subcommand, Debug)]
pub enum ModelsCommands {
    /// List models installed on the Ollama server
    List,
}

/// Run models command.
pub async fn run(args: ModelsArgs) -> Result<()> {
    match args.command {
        ModelsCommands::List => list_models().await,
    }
}

async fn list_models() -> Result<()> {
    let config = ConfigLoader::load()?;
    let ollama = OllamaProvider::with_base_url(&config.models.ollama_host);

    let models = ollama
        .list_models()
        .await
        .with_context(|| format!("Ollama not reachable at {}", config.models.ollama_host))?;

    if models.is_empty() {
        println!("No models installed.");
        println!();
        println!("Pull one with: ollama pull {}", config.models.generation_model);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Model").fg(Color::Cyan),
        Cell::new("Size").fg(Color::Cyan),
        Cell::new("Modified").fg(Color::Cyan),
        Cell::new("Used for").fg(Color::Cyan),
    ]);

    for model in &models {
        table.add_row(vec![
            Cell::new(&model.name),
            Cell::new(format_size(model.size)),
            Cell::new(format_modified(&model.modified_at)),
            Cell::new(usage(&model.name, &config.models)),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Roles a model plays under the current config
fn usage(name: &str, models: &ModelsConfig) -> String {
    let mut roles = Vec::new();
    if same_model(name, &models.generation_model) {
        roles.push("generation");
    }
    if models.embedder == EmbedderKind::Ollama && same_model(name, &models.embedding_model) {
        roles.push("embeddings");
    }
    roles.join(", ")
}

/// Ollama reports `name:tag`; an untagged name means `latest`
fn same_model(installed: &str, configured: &str) -> bool {
    let normalize = |name: &str| {
        if name.contains(':') {
            name.to_string()
        } else {
            format!("{}:latest", name)
        }
    };
    normalize(installed) == normalize(configured)
}

fn format_size(bytes: u64) -> String {
    const GB: u64 = 1_000_000_000;
    const MB: u64 = 1_000_000;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else {
        format!("{} MB", bytes / MB)
    }
}

/// Date part of an RFC 3339 timestamp, or the raw value
fn format_modified(modified_at: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(modified_at)
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| modified_at.to_string())
}
