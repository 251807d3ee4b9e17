//! Terminal rendering of round progress and results

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use loom_core::{RoundEvent, RoundPhase, RoundReport, RoundStatus};
use loom_types::{GenerationMetrics, OperationKind, Project};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

pub fn phase_label(phase: RoundPhase) -> String {
    match phase {
        RoundPhase::Idle => "Idle".to_string(),
        RoundPhase::Planning => "Planning changes...".to_string(),
        RoundPhase::ParsingDirectives => "Reading the plan...".to_string(),
        RoundPhase::GeneratingFiles { completed, total } => {
            format!("Generating files ({}/{})", completed, total)
        }
        RoundPhase::Applying => "Applying changes...".to_string(),
    }
}

/// Show a spinner until the next round finishes
pub fn spawn_progress(mut events: broadcast::Receiver<RoundEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        loop {
            match events.recv().await {
                Ok(RoundEvent::Phase(phase)) => bar.set_message(phase_label(phase)),
                Ok(RoundEvent::FileGenerated {
                    path,
                    completed,
                    total,
                }) => bar.set_message(format!("Generated {} ({}/{})", path, completed, total)),
                Ok(RoundEvent::Finished(_)) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(_)) => continue,
            }
        }
        bar.finish_and_clear();
    })
}

fn kind_marker(kind: OperationKind) -> colored::ColoredString {
    match kind {
        OperationKind::Create => "+".green().bold(),
        OperationKind::Modify => "~".yellow().bold(),
        OperationKind::Delete => "-".red().bold(),
    }
}

pub fn print_report(report: &RoundReport) {
    match &report.status {
        RoundStatus::Succeeded => {
            if !report.narrative.is_empty() {
                println!("{}", report.narrative);
                println!();
            }
            for op in &report.operations {
                println!("  {} {}", kind_marker(op.kind), op.path);
            }
            println!(
                "{} {} {}",
                "✓".green(),
                report.message,
                format!("({:.1}s)", report.duration.as_secs_f64()).dimmed()
            );
        }
        RoundStatus::Failed(message) => {
            println!("{} {}", "✗".red(), message.red());
        }
        RoundStatus::Cancelled => {
            println!("{}", "Generation cancelled.".yellow());
        }
    }
}

pub fn print_files(project: &Project) {
    if project.files.is_empty() {
        println!("  {}", "No files yet".dimmed());
        return;
    }
    for file in &project.files {
        let open = project.open_tabs.iter().any(|t| *t == file.path);
        let active = project.active_file.as_deref() == Some(file.path.as_str());
        let marker = if active {
            "*".green().bold()
        } else if open {
            "o".cyan()
        } else {
            " ".normal()
        };
        println!(
            "  {} {} {}",
            marker,
            file.path,
            format!("({}, {} bytes)", file.language, file.content.len()).dimmed()
        );
    }
}

pub fn print_metrics(metrics: &GenerationMetrics) {
    println!("{}", "Generation metrics".bold().underline());
    println!("  Rounds:       {}", metrics.generation_count);
    println!("  Succeeded:    {}", metrics.success_count.to_string().green());
    println!("  Failed:       {}", metrics.failed_count.to_string().red());
    println!("  Cancelled:    {}", metrics.cancelled_count);
    println!("  Operations:   {}", metrics.total_operations);
    println!("  Average:      {:.0} ms", metrics.avg_generation_ms);
    println!("  Last round:   {:.0} ms", metrics.last_generation_ms);
    if let Some(at) = metrics.last_generated_at {
        println!("  Last run at:  {}", at.to_rfc3339());
    }
}
