//! Loom CLI
//!
//! Describe a web project in plain language and let the model write it.

mod commands;
mod config;
mod project_files;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use loom_types::PublishMetadata;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "loom")]
#[command(author, version, about = "Loom - AI-directed web project synthesis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session
    Chat {
        /// Seed the project from a directory
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Run a single instruction
    Generate {
        /// What to build or change
        instruction: String,

        /// Read the project from and write it back to this directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Write the bundled preview document to this file
        #[arg(short, long)]
        preview: Option<PathBuf>,

        /// Ask the planner to explain before acting
        #[arg(long)]
        plan: bool,
    },

    /// Bundle a project directory into one HTML document
    Preview {
        /// Project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Publish a project directory
    Publish {
        /// Project directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        #[arg(long)]
        slug: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        description: Option<String>,

        /// Favicon URL
        #[arg(long)]
        favicon: Option<String>,

        /// Social preview image URL
        #[arg(long)]
        image: Option<String>,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Select the built-in model tier (fast, pro, max)
    SetTier { tier: String },
    /// Select the provider (builtin, grok, openai, claude)
    SetProvider { provider: String },
    /// Override the model; omit to clear
    SetModel {
        model: Option<String>,

        /// Set the preferred planning model for the built-in providers
        #[arg(long)]
        planner: bool,
    },
    /// Store an API key for the selected provider
    SetKey,
    /// Set the publish endpoint
    SetPublishUrl { url: String },
    /// Toggle plan mode and extended thinking
    SetMode {
        #[arg(long)]
        plan: Option<bool>,

        #[arg(long)]
        thinking: Option<bool>,
    },
    /// Reset to default configuration
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            "loom_cli=debug,loom_core=debug,loom_adapters=debug"
        } else {
            "loom_cli=info"
        })
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    info!("Starting Loom CLI");

    let result = match cli.command {
        Commands::Chat { dir } => commands::chat::run(dir.as_deref()).await,
        Commands::Generate {
            instruction,
            out_dir,
            preview,
            plan,
        } => {
            commands::generate::run(commands::generate::GenerateOptions {
                instruction,
                out_dir,
                preview,
                plan,
            })
            .await
        }
        Commands::Preview { dir, out } => commands::preview::run(&dir, out.as_deref()).await,
        Commands::Publish {
            dir,
            slug,
            title,
            description,
            favicon,
            image,
        } => {
            commands::publish::run(
                &dir,
                PublishMetadata {
                    slug,
                    title,
                    description,
                    favicon,
                    image,
                },
            )
            .await
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show().await,
            ConfigAction::SetTier { tier } => commands::config::set_tier(&tier).await,
            ConfigAction::SetProvider { provider } => {
                commands::config::set_provider(&provider).await
            }
            ConfigAction::SetModel { model, planner } => {
                commands::config::set_model(model.as_deref(), planner).await
            }
            ConfigAction::SetKey => commands::config::set_key().await,
            ConfigAction::SetPublishUrl { url } => commands::config::set_publish_url(&url).await,
            ConfigAction::SetMode { plan, thinking } => {
                commands::config::set_mode(plan, thinking).await
            }
            ConfigAction::Reset => commands::config::reset().await,
        },
    };

    if let Err(ref e) = result {
        error!("Command failed: {}", e);
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    result
}
