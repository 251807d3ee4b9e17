//! Chat command - interactive multi-round session

use super::{open_session, publish, run_round};
use crate::config::SettingsManager;
use crate::project_files::{read_project_dir, write_document, write_project};
use crate::ui;
use anyhow::{Context, Result};
use colored::Colorize;
use loom_core::{Orchestrator, ProjectStore};
use loom_types::PublishMetadata;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Session commands typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Files,
    Open(String),
    Close(String),
    Show(Option<String>),
    Preview(PathBuf),
    Export(PathBuf),
    Publish { slug: String, title: String },
    Metrics,
    Reset,
    Quit,
}

impl SlashCommand {
    /// Parse a `/command`; `None` means the line is an instruction
    pub fn parse(line: &str) -> Option<std::result::Result<Self, String>> {
        let line = line.trim();
        let rest = line.strip_prefix('/')?;
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        let required = |what: &str| -> std::result::Result<String, String> {
            if args.is_empty() {
                Err(format!("/{} needs {}", name, what))
            } else {
                Ok(args.to_string())
            }
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "help" | "?" => Ok(SlashCommand::Help),
            "files" | "ls" => Ok(SlashCommand::Files),
            "open" => required("a path").map(SlashCommand::Open),
            "close" => required("a path").map(SlashCommand::Close),
            "show" => Ok(SlashCommand::Show((!args.is_empty()).then(|| args.to_string()))),
            "preview" => required("an output file").map(|p| SlashCommand::Preview(p.into())),
            "export" => required("a directory").map(|p| SlashCommand::Export(p.into())),
            "publish" => match args.split_once(char::is_whitespace) {
                Some((slug, title)) if !title.trim().is_empty() => Ok(SlashCommand::Publish {
                    slug: slug.to_string(),
                    title: title.trim().to_string(),
                }),
                _ => Err("/publish needs a slug and a title".to_string()),
            },
            "metrics" => Ok(SlashCommand::Metrics),
            "reset" => Ok(SlashCommand::Reset),
            "quit" | "exit" | "q" => Ok(SlashCommand::Quit),
            other => Err(format!("Unknown command: /{}", other)),
        };
        Some(command)
    }
}

fn print_help() {
    println!("{}", "Commands:".cyan().bold());
    println!("  /files                 List project files");
    println!("  /open <path>           Open a file in a tab");
    println!("  /close <path>          Close a tab");
    println!("  /show [path]           Print a file (default: active file)");
    println!("  /preview <file>        Write the bundled preview document");
    println!("  /export <dir>          Write the project to a directory");
    println!("  /publish <slug> <title>");
    println!("  /metrics               Show generation metrics");
    println!("  /reset                 Start over with an empty project");
    println!("  /quit                  Leave the session");
    println!();
    println!("{}", "Anything else is sent as an instruction. Ctrl-C cancels a running round.".dimmed());
}

pub async fn run(dir: Option<&Path>) -> Result<()> {
    let settings = SettingsManager::load().context("Failed to load settings")?;

    let store = match dir {
        Some(dir) => ProjectStore::from_files(read_project_dir(dir)?),
        None => ProjectStore::new(),
    };
    let (orchestrator, options) = open_session(&settings, store)?;

    println!("{}", "Loom chat".bold().underline());
    println!(
        "{}",
        format!(
            "Provider {} ({}). Type /help for commands.",
            options.provider.provider, options.provider.planning_model
        )
        .dimmed()
    );
    let project = orchestrator.snapshot().await;
    if !project.is_empty() {
        println!("{}", format!("Loaded {} file(s).", project.files.len()).dimmed());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match SlashCommand::parse(&line) {
            Some(Ok(SlashCommand::Quit)) => break,
            Some(Ok(command)) => {
                if let Err(e) = handle(&orchestrator, &settings, command).await {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                }
            }
            Some(Err(message)) => eprintln!("{}", message.yellow()),
            None => match run_round(&orchestrator, &line, &options).await {
                Ok(report) => ui::print_report(&report),
                Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
            },
        }
        println!();
    }

    debug!("Chat session ended");
    Ok(())
}

async fn handle(
    orchestrator: &Orchestrator,
    settings: &crate::config::Settings,
    command: SlashCommand,
) -> Result<()> {
    match command {
        SlashCommand::Help => print_help(),
        SlashCommand::Files => ui::print_files(&orchestrator.snapshot().await),
        SlashCommand::Open(path) => {
            let store = orchestrator.store();
            let mut store = store.write().await;
            if store.file(&path).is_none() {
                anyhow::bail!("No such file: {}", path);
            }
            store.open_file(&path);
        }
        SlashCommand::Close(path) => {
            orchestrator.store().write().await.close_tab(&path);
        }
        SlashCommand::Show(path) => {
            let project = orchestrator.snapshot().await;
            let file = match &path {
                Some(path) => project.file(path),
                None => project.active(),
            };
            match file {
                Some(file) => {
                    println!("{}", file.path.cyan().bold());
                    println!("{}", file.content);
                }
                None => anyhow::bail!("Nothing to show"),
            }
        }
        SlashCommand::Preview(out) => {
            write_document(&out, &orchestrator.preview().await)?;
            println!("{} Preview written to {}", "✓".green(), out.display());
        }
        SlashCommand::Export(dir) => {
            let written = write_project(&dir, &orchestrator.snapshot().await)?;
            println!("{} Wrote {} file(s) to {}", "✓".green(), written, dir.display());
        }
        SlashCommand::Publish { slug, title } => {
            let metadata = PublishMetadata {
                slug,
                title,
                ..PublishMetadata::default()
            };
            let project = orchestrator.snapshot().await;
            let receipt = publish::publish(settings, &project, &metadata).await?;
            publish::print_receipt(&receipt);
        }
        SlashCommand::Metrics => ui::print_metrics(&orchestrator.metrics().await),
        SlashCommand::Reset => {
            let confirm = dialoguer::Confirm::new()
                .with_prompt("Discard the project and conversation?")
                .default(false)
                .interact()?;
            if confirm {
                orchestrator.reset().await?;
                println!("{} Session reset.", "✓".green());
            }
        }
        SlashCommand::Quit => {}
    }
    Ok(())
}
