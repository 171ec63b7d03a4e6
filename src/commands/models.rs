//! Model commands for MyIQ
//!
//! Lists models installed on the configured Ollama server and shows which
//! model chat requests are sent to.

use crate::config::Config;
use crate::error::{MyIqError, Result};
use crate::providers::{self, ollama::format_size, ModelInfo};
use prettytable::{row, Table};

/// List available models from the Ollama server
///
/// # Examples
///
/// ```no_run
/// use myiq::config::Config;
/// use myiq::commands::models::list_models;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load("config/config.yaml", &Default::default())?;
/// list_models(&config, false).await?;
/// # Ok(())
/// # }
/// ```
pub async fn list_models(config: &Config, json: bool) -> Result<()> {
    tracing::info!("Listing models from {}", config.llm.host);

    let client = providers::create_client(&config.llm)?;
    let models = client.list_models().await?;

    if json {
        output_models_json(&models)?;
        return Ok(());
    }

    if models.is_empty() {
        println!("No models available from {}", config.llm.host);
        return Ok(());
    }

    output_models_table(&models, &client.model());
    Ok(())
}

/// Show the configured model and host
pub fn show_current_model(config: &Config) -> Result<()> {
    println!("\nCurrent Model Information\n");
    println!("Host:           {}", config.llm.host);
    println!("Active Model:   {}", config.llm.model);
    match config.llm.request_timeout_seconds {
        Some(secs) => println!("Timeout:        {}s", secs),
        None => println!("Timeout:        none"),
    }
    println!();
    Ok(())
}

fn output_models_json(models: &[ModelInfo]) -> Result<()> {
    let json = serde_json::to_string_pretty(models).map_err(MyIqError::Serialization)?;
    println!("{}", json);
    Ok(())
}

fn output_models_table(models: &[ModelInfo], active: &str) {
    let mut table = Table::new();
    table.add_row(row!["Model Name", "Size", "Modified", "Active"]);

    for model in models {
        let modified = model.modified_at.get(..10).unwrap_or(&model.modified_at);
        let active = if model.name == active { "*" } else { "" };
        table.add_row(row![model.name, format_size(model.size), modified, active]);
    }

    println!("\nAvailable models:\n");
    table.printstd();
    println!();
}
