//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::{fs, io::BufRead, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{HarmonicError, Result},
    measurement::MeasurementRecord,
};

/// Normalized facility export as produced by the ingestion tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacilitySnapshot {
    #[serde(default)]
    pub facility: Option<String>,
    pub records: Vec<MeasurementRecord>,
}

/// Load a snapshot from JSON or YAML, picked by the first non-blank character.
pub fn load_snapshot_from_file(path: impl AsRef<Path>) -> Result<FacilitySnapshot> {
    let data = fs::read_to_string(path)?;
    let snapshot = if data.trim_start().starts_with('{') {
        serde_json::from_str(&data)?
    } else {
        serde_yaml::from_str(&data).map_err(HarmonicError::YamlSerializationFailed)?
    };
    Ok(snapshot)
}

/// One [`MeasurementRecord`] per line; blank lines are skipped.
pub fn load_records_from_jsonl(path: impl AsRef<Path>) -> Result<Vec<MeasurementRecord>> {
    let file = fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

/// Dispatch on extension: `.jsonl` is line-delimited, anything else a snapshot.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<FacilitySnapshot> {
    let path = path.as_ref();
    let is_jsonl = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));
    if is_jsonl {
        Ok(FacilitySnapshot {
            facility: None,
            records: load_records_from_jsonl(path)?,
        })
    } else {
        load_snapshot_from_file(path)
    }
}
