//! Run command implementation.

use super::Workspace;
use crate::core::report::{RunReport, RunStatus};
use crate::core::{Pipeline, PipelineConfig, RunInput};
use crate::models::config::save_config;
use crate::services::notify::{ConsoleNotifier, LogNotifier, NotificationSink};
use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

/// Run the gap search over every configured server.
pub async fn run(workspace: &mut Workspace, quiet: bool) -> Result<()> {
    println!("{}", "[RUN] Searching for collection gaps".bold().cyan());
    println!("  Config: {}", workspace.config_path.display());
    println!("  Data:   {}", workspace.config.data_dir.display());
    println!();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Running pipeline...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let notifier: Arc<dyn NotificationSink> = if quiet {
        Arc::new(LogNotifier)
    } else {
        Arc::new(ConsoleNotifier::with_progress(pb.clone()))
    };

    let pipeline = Pipeline::with_config(
        Arc::new(workspace.tmdb_client()?),
        Arc::new(workspace.plex_client()?),
        Arc::new(workspace.store()),
        notifier,
        PipelineConfig {
            concurrency: workspace.config.concurrency(),
        },
    );

    let input = RunInput {
        registry: workspace.config.registry(),
        tmdb_api_key: workspace.config.tmdb_api_key(),
    };

    let config_path = workspace.config_path.clone();
    let config = &mut workspace.config;
    let result = pipeline
        .run_then(input, |report| {
            if report.status != RunStatus::Completed {
                return Ok(());
            }
            config.update_servers(&report.registry);
            save_config(config, &config_path)
        })
        .await;
    pb.finish_and_clear();
    let report = result?;

    if report.status == RunStatus::NoServers {
        println!(
            "{}",
            "[WARN] No Plex servers configured. Add one with `collection-gaps servers add`.".yellow()
        );
        return Ok(());
    }

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!();
    println!("{}", "[RUN] Complete!".bold().green());
    println!("  Run id: {}", report.run_id);
    for stage in &report.stages {
        let failed = stage.failed();
        let line = format!("  {:<20} {} ok, {} failed", stage.stage.to_string(), stage.succeeded(), failed);
        if failed > 0 {
            println!("{}", line.yellow());
        } else {
            println!("{}", line);
        }
    }
    println!();
    println!(
        "  Missing movies: {} across {} libraries",
        report.total_missing().to_string().bold(),
        report.missing.len()
    );
    println!("  Use `collection-gaps missing` to list them.");
}
