//! Scene Repair CLI
//!
//! Thin terminal surface over the repair engine: `scan` lists findings,
//! `fix` runs the backup/repair/verify pipeline for one defect class.

mod cli;
mod error;

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;
use scene_doc::{SceneStore, YamlStore};
use scene_repair::{
    DefectClass, RepairOutcome, RepairPipeline, duplicate_id_report, empty_attribute_report,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Scan { path, json } => cmd_scan(&path, json).await,
        Commands::Fix { path, defect } => cmd_fix(&path, defect.into()).await,
    }
}

async fn cmd_scan(path: &Path, json: bool) -> Result<()> {
    let doc = YamlStore::new().load(path).await?;
    let findings = scene_repair::scan(&doc);

    if json {
        let payload = serde_json::json!({
            "duplicate_ids": duplicate_id_report(&findings),
            "empty_attributes": empty_attribute_report(&findings),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if findings.is_empty() {
        println!("{} no defects found", "ok".green().bold());
        return Ok(());
    }

    for finding in &findings {
        println!("{}", scene_repair::describe(finding));
    }
    Ok(())
}

async fn cmd_fix(path: &Path, class: DefectClass) -> Result<()> {
    let pipeline = RepairPipeline::new();
    match pipeline.repair(path, class).await? {
        RepairOutcome::Clean => {
            println!("{} nothing to repair", "ok".green().bold());
        }
        RepairOutcome::Committed { repaired, backup } => {
            println!(
                "{} repaired {} finding(s); backup at {}",
                "done".green().bold(),
                repaired,
                backup.backup_path.display()
            );
        }
    }
    Ok(())
}
