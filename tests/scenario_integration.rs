//! ---
//! ems_section: "15-testing-qa-runbook"
//! ems_subsection: "integration-tests"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Integration and validation tests for the harmonic analysis stack."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use hh_common::config::AppConfig;
use hh_engine::{
    analyze_snapshot_with_options, io::load_snapshot, AnalysisRun, FailureMode,
    MeasurementRecord, RiskFactor, RiskTier,
};

fn workspace_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join(relative)
}

fn scenario(name: &str) -> hh_engine::io::FacilitySnapshot {
    load_snapshot(workspace_path(&format!("fixtures/scenarios/{name}.json")))
        .expect("scenario fixture loads")
}

fn shipped_config() -> AppConfig {
    AppConfig::from_path(&workspace_path("configs/harmonic-hunter.toml"))
        .expect("shipped config is valid")
}

#[test]
fn shipped_config_matches_defaults() {
    assert_eq!(shipped_config(), AppConfig::default());
}

#[test]
fn demo_scenarios_land_in_expected_tiers() {
    let config = shipped_config();
    let expected = [
        ("safe", RiskTier::Safe),
        ("monitor", RiskTier::Monitor),
        ("multiphase", RiskTier::Warning),
        ("critical", RiskTier::Critical),
    ];
    for (name, tier) in expected {
        let summary =
            analyze_snapshot_with_options(&scenario(name), None, config.analysis.clone(), None)
                .unwrap();
        assert_eq!(summary.report.tier(), tier, "scenario {name}");
        assert_eq!(summary.report.profiles.len(), 3, "scenario {name}");
        assert!(!summary.report.recommendations.is_empty(), "scenario {name}");
    }
}

#[test]
fn multiphase_scenario_flags_imbalance() {
    let summary = analyze_snapshot_with_options(
        &scenario("multiphase"),
        None,
        shipped_config().analysis,
        None,
    )
    .unwrap();
    let report = &summary.report;
    assert!(report.imbalance.imbalance_flag);
    assert_eq!(report.imbalance.worst_phase, 2);
    assert!((report.imbalance.thd_spread_percent - 7.0).abs() < 1e-9);
    assert!(report.assessment.has_factor(RiskFactor::PhaseImbalance));
    assert!(report.assessment.has_factor(RiskFactor::HighThd));
}

#[test]
fn baseline_comparison_tracks_escalation() {
    let config = shipped_config();
    let baseline = scenario("baseline/safe");
    let escalated = analyze_snapshot_with_options(
        &scenario("critical"),
        Some(&baseline),
        config.analysis.clone(),
        None,
    )
    .unwrap();
    let delta = escalated.delta.unwrap();
    assert!(delta.escalated);
    assert!(delta.score_delta > 0.0);
    assert_eq!(delta.baseline_tier, RiskTier::Safe);
    assert!(delta.new_factors.contains(&RiskFactor::CriticalThd));

    let unchanged =
        analyze_snapshot_with_options(&scenario("safe"), Some(&baseline), config.analysis, None)
            .unwrap();
    let delta = unchanged.delta.unwrap();
    assert!(!delta.escalated);
    assert!(delta.new_factors.is_empty());
}

#[test]
fn partial_mode_reports_skipped_phase() {
    let mut records = scenario("monitor").records;
    records[1] = MeasurementRecord::from_spectrum(2, 60.0, [(1, 0.0), (5, 3.0)]);

    let strict = AnalysisRun::new(shipped_config().analysis).unwrap();
    assert!(strict.analyze(&records).is_err());

    let partial = AnalysisRun::new(
        shipped_config()
            .analysis
            .with_failure_mode(FailureMode::SkipPhase),
    )
    .unwrap();
    let report = partial.analyze(&records).unwrap();
    assert!(report.is_partial());
    assert_eq!(report.skipped_phases[0].phase_id, 2);
    assert_eq!(report.profiles.len(), 2);
    assert!(report.profile(2).is_none());
}

#[test]
fn exported_analysis_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let summary = analyze_snapshot_with_options(
        &scenario("critical"),
        None,
        shipped_config().analysis,
        Some(dir.path()),
    )
    .unwrap();
    let raw = std::fs::read_to_string(dir.path().join("analysis.json")).unwrap();
    let envelope: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let data: hh_engine::AnalysisReport =
        serde_json::from_value(envelope["data"].clone()).unwrap();
    assert_eq!(data, summary.report);
}
