//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Control CLI for running harmonic risk analyses."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hh_common::config::{AppConfig, LoadedAppConfig};
use hh_common::logging;

mod analyze;
mod scenarios;

const DEFAULT_CONFIG: &str = "configs/harmonic-hunter.toml";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Harmonic risk analysis for facility power-quality exports",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyse one normalized measurement file.
    Analyze(analyze::AnalyzeArgs),
    /// Parse and validate a configuration file without running an analysis.
    CheckConfig {
        /// TOML configuration to validate.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Analyse every scenario fixture in a directory.
    Scenarios(scenarios::ScenarioArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => {
            let loaded = load_config(args.config.as_deref())?;
            init_logging(&loaded.config)?;
            analyze::run(args, loaded)
        }
        Commands::CheckConfig { path } => {
            logging::init();
            check_config(&path)
        }
        Commands::Scenarios(args) => {
            let loaded = load_config(args.config.as_deref())?;
            init_logging(&loaded.config)?;
            scenarios::run(args, loaded)
        }
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    logging::init_tracing("hh-ctl", &config.logging)
}

/// An explicit `--config` must exist; otherwise the default file is optional.
fn load_config(explicit: Option<&Path>) -> Result<LoadedAppConfig> {
    match explicit {
        Some(path) => AppConfig::load_with_source(&[path])
            .with_context(|| format!("loading configuration {}", path.display())),
        None => AppConfig::load_or_default(&[Path::new(DEFAULT_CONFIG)]),
    }
}

fn check_config(path: &Path) -> Result<()> {
    let config = AppConfig::from_path(path)?;
    let analysis = &config.analysis;
    println!("Configuration OK: {}", path.display());
    println!(
        "THD boundaries: monitor {:.1}% / warning {:.1}% / critical {:.1}%",
        analysis.thd_tier_boundaries.monitor,
        analysis.thd_tier_boundaries.warning,
        analysis.thd_tier_boundaries.critical
    );
    println!(
        "Imbalance threshold: {:.1} pp, crest alert {:.2}, crest floor {:.2}",
        analysis.imbalance_threshold_pct,
        analysis.crest_factor_alert_threshold,
        analysis.low_crest_factor_floor
    );
    if config.export.enabled {
        println!("Export directory: {}", config.export.directory.display());
    }
    Ok(())
}
