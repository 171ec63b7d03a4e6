//! MyIQ - local LLM chat, notebooks and calendar
//!
#![doc = "Main entry point for the MyIQ command-line application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use myiq::cli::{Cli, Commands, ModelCommand};
use myiq::commands;
use myiq::config::{Config, LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Initialize tracing once the log settings are known
    init_tracing(&config.logging);

    // Validate configuration
    config.validate()?;
    tracing::debug!(config = %config_path, "Configuration loaded");

    // Execute command
    match cli.command {
        Commands::Chat {
            resume,
            title,
            attach,
            prompt,
        } => {
            if let Some(r) = &resume {
                tracing::debug!("Resuming chat session: {}", r);
            }
            commands::chat::run_chat(config, resume, title, attach, prompt).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
        Commands::Notebook { command } => {
            tracing::info!("Starting notebook command");
            commands::notebook::handle_notebook(&config, command)?;
            Ok(())
        }
        Commands::Calendar { command } => {
            tracing::info!("Starting calendar command");
            commands::calendar::handle_calendar(&config, command)?;
            Ok(())
        }
        Commands::Models { command } => match command {
            ModelCommand::List { json } => {
                commands::models::list_models(&config, json).await?;
                Ok(())
            }
            ModelCommand::Current => {
                commands::models::show_current_model(&config)?;
                Ok(())
            }
        },
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so command
/// output on stdout stays clean.
fn init_tracing(logging: &LoggingConfig) {
    let default_level = logging.level.as_deref().unwrap_or("myiq=info");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
