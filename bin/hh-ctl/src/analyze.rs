//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Control CLI for running harmonic risk analyses."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use hh_common::config::LoadedAppConfig;
use hh_engine::{analyze_snapshot_with_options, io::load_snapshot, AnalysisSummary, FailureMode};
use tracing::info;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Normalized measurements (JSON or YAML snapshot, or JSONL records).
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,
    /// Earlier snapshot to compare the current risk against.
    #[arg(long, value_name = "FILE")]
    pub baseline: Option<PathBuf>,
    /// Configuration file; defaults to configs/harmonic-hunter.toml when present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Directory to write analysis.json / analysis.yaml into.
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// Skip invalid phases instead of aborting the run.
    #[arg(long)]
    pub partial: bool,
    /// Print the full summary as JSON instead of the text rendering.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: AnalyzeArgs, loaded: LoadedAppConfig) -> Result<()> {
    let LoadedAppConfig { config, source } = loaded;
    info!(config = ?source, input = %args.input.display(), "starting analysis");

    let snapshot = load_snapshot(&args.input)
        .with_context(|| format!("loading measurements from {}", args.input.display()))?;
    let baseline = args
        .baseline
        .as_ref()
        .map(|path| {
            load_snapshot(path)
                .with_context(|| format!("loading baseline from {}", path.display()))
        })
        .transpose()?;

    let mut analysis = config.analysis.clone();
    if args.partial {
        analysis = analysis.with_failure_mode(FailureMode::SkipPhase);
    }
    let output_dir = args
        .output
        .clone()
        .or_else(|| config.export.enabled.then(|| config.export.directory.clone()));

    let summary =
        analyze_snapshot_with_options(&snapshot, baseline.as_ref(), analysis, output_dir.as_deref())
            .with_context(|| format!("analysing {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        render_summary(&summary);
    }
    Ok(())
}

fn render_summary(summary: &AnalysisSummary) {
    let report = &summary.report;
    if let Some(facility) = &summary.facility {
        println!("Facility: {facility}");
    }
    println!("Risk tier: {} (score {:.1})", report.tier(), report.score());
    println!("{}", report.verdict);
    for profile in &report.profiles {
        let crest = profile
            .crest_factor
            .map(|crest| format!("{crest:.2}"))
            .unwrap_or_else(|| "n/a".to_owned());
        let variability = profile
            .current_variability_percent
            .map(|variability| format!("  variability {variability:.1}%"))
            .unwrap_or_default();
        println!(
            "  phase {}: THD {:.2}%  crest {}  triplen {:.1}%  h5 {:.1}%{}",
            profile.phase_id,
            profile.thd_percent,
            crest,
            profile.triplen_index_percent,
            profile.fifth_harmonic_percent,
            variability
        );
    }
    println!(
        "Phase THD spread: {:.2} pp (imbalance: {})",
        report.imbalance.thd_spread_percent,
        if report.imbalance.imbalance_flag { "yes" } else { "no" }
    );
    if !report.assessment.contributing_factors.is_empty() {
        let factors: Vec<String> = report
            .assessment
            .contributing_factors
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("Contributing factors: {}", factors.join(", "));
    }
    for skipped in &report.skipped_phases {
        println!("  skipped phase {}: {}", skipped.phase_id, skipped.reason);
    }
    if let Some(delta) = &summary.delta {
        println!(
            "Baseline: {} -> {} (score {:+.1}{})",
            delta.baseline_tier,
            delta.current_tier,
            delta.score_delta,
            if delta.escalated { ", escalated" } else { "" }
        );
    }
    println!("Recommendations:");
    for recommendation in &report.recommendations {
        println!("  - {recommendation}");
    }
    for path in &summary.written {
        println!("Wrote {}", path.display());
    }
    println!("{}", report.disclaimer);
}
