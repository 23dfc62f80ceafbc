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
use std::path::PathBuf;

use assert_cmd::Command;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/scenarios")
        .join(name)
}

fn hh_ctl(workdir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("hh-ctl").unwrap();
    cmd.current_dir(workdir)
        .env_remove("HH_CONFIG")
        .env("HH_LOG", "warn");
    cmd
}

#[test]
fn analyze_critical_fixture_with_export() {
    let workdir = tempfile::tempdir().unwrap();
    let out = workdir.path().join("out");
    let output = hh_ctl(workdir.path())
        .arg("analyze")
        .arg("--input")
        .arg(fixture("critical.json"))
        .arg("--baseline")
        .arg(fixture("baseline/safe.json"))
        .arg("--output")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Risk tier: CRITICAL"), "{stdout}");
    assert!(stdout.contains("critical-thd"), "{stdout}");
    assert!(stdout.contains("escalated"), "{stdout}");
    assert!(out.join("analysis.json").exists());
    assert!(out.join("analysis.yaml").exists());
    assert!(out.join("risk_delta.json").exists());
}

#[test]
fn analyze_accepts_yaml_snapshot() {
    let workdir = tempfile::tempdir().unwrap();
    let input = workdir.path().join("hall.yaml");
    fs::write(
        &input,
        "facility: YAML Hall\nrecords:\n  - phase_id: 1\n    fundamental_frequency: 50.0\n    waveform:\n      spectrum:\n        magnitudes:\n          1: 100.0\n          5: 6.5\n",
    )
    .unwrap();
    let output = hh_ctl(workdir.path())
        .arg("analyze")
        .arg("--input")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Facility: YAML Hall"), "{stdout}");
    assert!(stdout.contains("Risk tier: MONITOR"), "{stdout}");
}

#[test]
fn check_config_rejects_non_monotonic_boundaries() {
    let workdir = tempfile::tempdir().unwrap();
    let path = workdir.path().join("bad.toml");
    fs::write(
        &path,
        "[analysis.thd_tier_boundaries]\nmonitor = 9.0\nwarning = 8.0\ncritical = 12.0\n",
    )
    .unwrap();
    let output = hh_ctl(workdir.path())
        .arg("check-config")
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn scenarios_lists_every_fixture() {
    let workdir = tempfile::tempdir().unwrap();
    let output = hh_ctl(workdir.path())
        .arg("scenarios")
        .arg("--dir")
        .arg(fixture(""))
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "{stdout}");
    assert!(lines[0].starts_with("critical") && lines[0].contains("CRITICAL"));
    assert!(lines[1].starts_with("monitor") && lines[1].contains("MONITOR"));
    assert!(lines[2].starts_with("multiphase") && lines[2].contains("WARNING"));
    assert!(lines[3].starts_with("safe") && lines[3].contains("SAFE"));
}
