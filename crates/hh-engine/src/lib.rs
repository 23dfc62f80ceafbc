//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Harmonic risk analysis for facility PDU/UPS power-quality exports.
//!
//! Per-phase measurements are reduced to harmonic profiles (THD, crest factor,
//! dominant harmonics), aggregated across phases and classified into a
//! SAFE / MONITOR / WARNING / CRITICAL tier with the factors that drove it.
//! The engine is a pure batch computation and is advisory only.

pub mod aggregate;
pub mod baseline;
pub mod config;
pub mod engine;
pub mod errors;
pub mod export;
pub mod harmonics;
pub mod io;
pub mod measurement;
pub mod recommend;
pub mod report;
pub mod risk;
pub mod spectrum;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::{baseline::compare_to_baseline, export::ReportExporter, io::FacilitySnapshot};

pub use aggregate::PhaseImbalanceSummary;
pub use baseline::RiskDelta;
pub use config::{AnalysisConfig, FailureMode, SpectralWindow, ThdTierBoundaries};
pub use engine::AnalysisRun;
pub use errors::{HarmonicError, Result};
pub use harmonics::{DominantHarmonic, HarmonicProfile};
pub use measurement::{MeasurementRecord, Waveform};
pub use report::{AnalysisReport, PhaseFailure};
pub use risk::{RiskAssessment, RiskFactor, RiskTier};

/// Everything produced for one facility by [`analyze_snapshot_with_options`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisSummary {
    pub facility: Option<String>,
    pub report: AnalysisReport,
    pub delta: Option<RiskDelta>,
    #[serde(skip)]
    pub written: Vec<PathBuf>,
}

/// Analyse one set of phase records with the given configuration.
pub fn analyze(records: &[MeasurementRecord], config: AnalysisConfig) -> Result<AnalysisReport> {
    AnalysisRun::new(config)?.analyze(records)
}

/// Analyse a snapshot, optionally against a baseline snapshot, and export the
/// reports when `output_dir` is given.
pub fn analyze_snapshot_with_options(
    snapshot: &FacilitySnapshot,
    baseline: Option<&FacilitySnapshot>,
    config: AnalysisConfig,
    output_dir: Option<&Path>,
) -> Result<AnalysisSummary> {
    let run = AnalysisRun::new(config)?;

    info!(facility = ?snapshot.facility, "Analysing current snapshot...");
    let report = run.analyze(&snapshot.records)?;

    let delta = match baseline {
        Some(baseline) => {
            info!("Analysing baseline snapshot...");
            let baseline_report = run.analyze(&baseline.records)?;
            Some(compare_to_baseline(&baseline_report, &report))
        }
        None => None,
    };

    let written = match output_dir {
        Some(dir) => ReportExporter::new(&report)
            .with_facility(snapshot.facility.as_deref())
            .with_delta(delta.as_ref())
            .export_all(dir)?,
        None => Vec::new(),
    };

    Ok(AnalysisSummary {
        facility: snapshot.facility.clone(),
        report,
        delta,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(fifth: f64) -> FacilitySnapshot {
        FacilitySnapshot {
            facility: Some("Test Hall".into()),
            records: vec![
                MeasurementRecord::from_spectrum(1, 60.0, [(1, 100.0), (5, fifth)]),
                MeasurementRecord::from_spectrum(2, 60.0, [(1, 100.0), (5, 1.0)]),
            ],
        }
    }

    #[test]
    fn analyze_snapshot_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let summary = analyze_snapshot_with_options(
            &snapshot(13.0),
            Some(&snapshot(1.0)),
            AnalysisConfig::default(),
            Some(dir.path()),
        )
        .unwrap();

        assert_eq!(summary.report.tier(), RiskTier::Critical);
        assert!(summary
            .report
            .assessment
            .has_factor(RiskFactor::PhaseImbalance));
        let delta = summary.delta.as_ref().unwrap();
        assert!(delta.escalated);
        assert_eq!(summary.written.len(), 3);
        assert!(dir.path().join(export::ANALYSIS_JSON).exists());
        assert!(dir.path().join(export::RISK_DELTA_JSON).exists());
    }

    #[test]
    fn analyze_without_export_writes_nothing() {
        let summary =
            analyze_snapshot_with_options(&snapshot(2.0), None, AnalysisConfig::default(), None)
                .unwrap();
        assert!(summary.written.is_empty());
        assert!(summary.delta.is_none());
        assert_eq!(summary.facility.as_deref(), Some("Test Hall"));
    }
}
