//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Control CLI for running harmonic risk analyses."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;
use hh_common::config::LoadedAppConfig;
use hh_engine::{analyze_snapshot_with_options, io::load_snapshot};
use tracing::warn;

const SNAPSHOT_EXTENSIONS: [&str; 4] = ["json", "jsonl", "yaml", "yml"];

#[derive(Debug, Args)]
pub struct ScenarioArgs {
    /// Directory holding one snapshot file per scenario.
    #[arg(long, value_name = "DIR", default_value = "fixtures/scenarios")]
    pub dir: PathBuf,
    /// Baseline snapshot compared against every scenario.
    #[arg(long, value_name = "FILE")]
    pub baseline: Option<PathBuf>,
    /// Configuration file; defaults to configs/harmonic-hunter.toml when present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn run(args: ScenarioArgs, loaded: LoadedAppConfig) -> Result<()> {
    let files = scenario_files(&args.dir)?;
    if files.is_empty() {
        return Err(anyhow!("no scenario files found in {}", args.dir.display()));
    }
    let baseline = args
        .baseline
        .as_ref()
        .map(|path| {
            load_snapshot(path).with_context(|| format!("loading baseline {}", path.display()))
        })
        .transpose()?;

    let mut failures = 0usize;
    for path in &files {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outcome = load_snapshot(path).map_err(anyhow::Error::from).and_then(|snapshot| {
            analyze_snapshot_with_options(
                &snapshot,
                baseline.as_ref(),
                loaded.config.analysis.clone(),
                None,
            )
            .map_err(anyhow::Error::from)
        });
        match outcome {
            Ok(summary) => {
                let report = &summary.report;
                let factors: Vec<String> = report
                    .assessment
                    .contributing_factors
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                let delta = summary
                    .delta
                    .as_ref()
                    .map(|delta| format!("  delta {:+.1}", delta.score_delta))
                    .unwrap_or_default();
                println!(
                    "{:<12} {:<8} score {:>5.1}  max THD {:>5.2}%  [{}]{}",
                    name,
                    report.tier().to_string(),
                    report.score(),
                    report.imbalance.max_thd_percent,
                    factors.join(", "),
                    delta
                );
            }
            Err(err) => {
                failures += 1;
                warn!(scenario = %name, error = %err, "scenario failed");
                println!("{name:<12} ERROR    {err:#}");
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{failures} of {} scenarios failed", files.len()));
    }
    Ok(())
}

/// Snapshot files directly inside `dir`, sorted by name.
fn scenario_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("reading scenario directory {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_snapshot = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SNAPSHOT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if is_snapshot {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_files_skip_directories_and_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.yaml"), "records: []").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore").unwrap();
        fs::create_dir(dir.path().join("baseline")).unwrap();

        let files = scenario_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.json"]);
    }
}
