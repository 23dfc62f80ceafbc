//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{baseline::RiskDelta, errors::Result, report::AnalysisReport};

pub const ANALYSIS_JSON: &str = "analysis.json";
pub const ANALYSIS_YAML: &str = "analysis.yaml";
pub const RISK_DELTA_JSON: &str = "risk_delta.json";

#[derive(Debug)]
pub struct ReportExporter<'a> {
    report: &'a AnalysisReport,
    facility: Option<&'a str>,
    delta: Option<&'a RiskDelta>,
}

impl<'a> ReportExporter<'a> {
    pub fn new(report: &'a AnalysisReport) -> Self {
        Self {
            report,
            facility: None,
            delta: None,
        }
    }

    pub fn with_facility(mut self, facility: Option<&'a str>) -> Self {
        self.facility = facility;
        self
    }

    pub fn with_delta(mut self, delta: Option<&'a RiskDelta>) -> Self {
        self.delta = delta;
        self
    }

    /// Write every report file into `output_dir` and return the written paths.
    pub fn export_all(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let timestamp = Utc::now().to_rfc3339();
        let envelope = ReportEnvelope::new(&timestamp, self.facility, analysis_schema(), self.report);

        let mut written = Vec::new();
        let json_path = output_dir.join(ANALYSIS_JSON);
        write_json(&json_path, &envelope)?;
        written.push(json_path);

        let yaml_path = output_dir.join(ANALYSIS_YAML);
        fs::write(&yaml_path, serde_yaml::to_string(&envelope)?)?;
        written.push(yaml_path);

        if let Some(delta) = self.delta {
            let delta_path = output_dir.join(RISK_DELTA_JSON);
            let delta_envelope =
                ReportEnvelope::new(&timestamp, self.facility, risk_delta_schema(), delta);
            write_json(&delta_path, &delta_envelope)?;
            written.push(delta_path);
        }

        info!("Reports exported to {}", output_dir.display());
        Ok(written)
    }
}

#[derive(Debug, Serialize)]
struct ReportEnvelope<'a, T: Serialize> {
    timestamp: &'a str,
    engine_version: &'static str,
    facility: Option<&'a str>,
    schema: serde_json::Value,
    data: &'a T,
}

impl<'a, T: Serialize> ReportEnvelope<'a, T> {
    fn new(
        timestamp: &'a str,
        facility: Option<&'a str>,
        schema: serde_json::Value,
        data: &'a T,
    ) -> Self {
        Self {
            timestamp,
            engine_version: env!("CARGO_PKG_VERSION"),
            facility,
            schema,
            data,
        }
    }
}

fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn analysis_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "AnalysisReport",
        "type": "object",
        "properties": {
            "assessment": {
                "type": "object",
                "properties": {
                    "tier": {"enum": ["SAFE", "MONITOR", "WARNING", "CRITICAL"]},
                    "contributing_factors": {"type": "array", "items": {"type": "string"}},
                    "score": {"type": "number", "minimum": 0, "maximum": 100}
                },
                "required": ["tier", "contributing_factors", "score"]
            },
            "imbalance": {
                "type": "object",
                "properties": {
                    "phase_count": {"type": "integer", "minimum": 1, "maximum": 3},
                    "max_thd_percent": {"type": "number"},
                    "min_thd_percent": {"type": "number"},
                    "thd_spread_percent": {"type": "number"},
                    "imbalance_flag": {"type": "boolean"},
                    "worst_phase": {"type": "integer"}
                },
                "required": ["phase_count", "max_thd_percent", "thd_spread_percent", "imbalance_flag"]
            },
            "profiles": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "phase_id": {"type": "integer"},
                        "thd_percent": {"type": "number"},
                        "crest_factor": {"type": ["number", "null"]},
                        "dominant_harmonics": {
                            "type": "array",
                            "maxItems": 5,
                            "items": {
                                "type": "object",
                                "properties": {
                                    "order": {"type": "integer"},
                                    "percent_of_fundamental": {"type": "number"}
                                },
                                "required": ["order", "percent_of_fundamental"]
                            }
                        },
                        "triplen_index_percent": {"type": "number"},
                        "fifth_harmonic_percent": {"type": "number"},
                        "current_variability_percent": {"type": ["number", "null"]},
                        "fundamental_magnitude": {"type": "number"},
                        "source": {"enum": ["samples", "spectrum"]}
                    },
                    "required": ["phase_id", "thd_percent", "crest_factor", "dominant_harmonics"]
                }
            },
            "skipped_phases": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "phase_id": {"type": "integer"},
                        "reason": {"type": "string"}
                    },
                    "required": ["phase_id", "reason"]
                }
            },
            "recommendations": {"type": "array", "items": {"type": "string"}},
            "verdict": {"type": "string"},
            "disclaimer": {"type": "string"}
        },
        "required": ["assessment", "imbalance", "profiles", "verdict"]
    })
}

fn risk_delta_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "RiskDelta",
        "type": "object",
        "properties": {
            "baseline_score": {"type": "number"},
            "current_score": {"type": "number"},
            "score_delta": {"type": "number"},
            "baseline_tier": {"type": "string"},
            "current_tier": {"type": "string"},
            "escalated": {"type": "boolean"},
            "new_factors": {"type": "array", "items": {"type": "string"}},
            "resolved_factors": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["baseline_score", "current_score", "score_delta", "escalated"]
    })
}
