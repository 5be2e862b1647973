// ABOUTME: Entry point for deskchat: a terminal support chat with a Slack contact mode.
// ABOUTME: Parses CLI args, loads config, and launches the app.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use deskchat::app::App;
use deskchat::config::{Config, Overrides};
use deskchat::error::ChatError;

#[derive(Parser, Debug)]
#[command(name = "deskchat", version, about = "Terminal support chat with a Slack contact mode")]
struct Cli {
    /// Path to a config file (defaults to ~/.deskchat/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// LLM provider: openai, openrouter, or ollama
    #[arg(long)]
    provider: Option<String>,

    /// Model name sent to the provider
    #[arg(long)]
    model: Option<String>,

    /// Start with contact mode on, routing messages to the support channel
    #[arg(long)]
    contact: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load config: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    config.apply(&Overrides {
        provider: cli.provider,
        model: cli.model,
        contact: cli.contact,
        verbose: cli.verbose,
    });

    match App::new(config).run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // ChatErrors were already shown to the user.
            if e.downcast_ref::<ChatError>().is_none() {
                eprintln!("deskchat: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
