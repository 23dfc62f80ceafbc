//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::{
    aggregate::summarize_phases,
    config::{AnalysisConfig, FailureMode},
    errors::{HarmonicError, Result},
    harmonics::{compute_profile, HarmonicProfile},
    measurement::{MeasurementRecord, MAX_PHASE_ID, MIN_PHASE_ID},
    recommend::{recommendations, verdict},
    report::{AnalysisReport, PhaseFailure},
    risk::classify,
};

/// One configured analysis pipeline. Holds no mutable state, so a single value
/// can serve any number of facilities from any number of threads.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    config: AnalysisConfig,
}

impl AnalysisRun {
    /// Validate the configuration up front; no measurement is touched on failure.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse one facility snapshot of 1–3 phase records.
    pub fn analyze(&self, records: &[MeasurementRecord]) -> Result<AnalysisReport> {
        let ordered = ordered_phase_set(records)?;
        info!(
            phases = ordered.len(),
            failure_mode = ?self.config.failure_mode,
            "running harmonic analysis"
        );

        let outcomes: Vec<Result<HarmonicProfile>> = ordered
            .par_iter()
            .map(|record| compute_profile(record, &self.config))
            .collect();

        let mut profiles = Vec::with_capacity(outcomes.len());
        let mut skipped_phases = Vec::new();
        for (record, outcome) in ordered.iter().zip(outcomes) {
            match outcome {
                Ok(profile) => profiles.push(profile),
                Err(err) if self.config.failure_mode == FailureMode::SkipPhase => {
                    warn!(phase = record.phase_id(), error = %err, "skipping phase");
                    skipped_phases.push(PhaseFailure {
                        phase_id: record.phase_id(),
                        reason: failure_reason(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        if profiles.is_empty() {
            return Err(HarmonicError::InvalidPhaseSet(format!(
                "all {} phase(s) were rejected",
                skipped_phases.len()
            )));
        }

        let imbalance = summarize_phases(&profiles, self.config.imbalance_threshold_pct)?;
        let assessment = classify(&imbalance, &profiles, &self.config);
        let advice = recommendations(&assessment, &profiles);
        let summary = verdict(assessment.tier);

        info!(
            tier = %assessment.tier,
            score = assessment.score,
            skipped = skipped_phases.len(),
            "harmonic analysis completed"
        );

        Ok(AnalysisReport::new(
            assessment,
            imbalance,
            profiles,
            skipped_phases,
            advice,
            summary,
        ))
    }
}

/// Check the input phase set and return it ordered by phase id.
fn ordered_phase_set(records: &[MeasurementRecord]) -> Result<Vec<&MeasurementRecord>> {
    if records.is_empty() {
        return Err(HarmonicError::InvalidPhaseSet(
            "no phase records supplied".into(),
        ));
    }
    if records.len() > usize::from(MAX_PHASE_ID) {
        return Err(HarmonicError::InvalidPhaseSet(format!(
            "{} phase records supplied, at most {MAX_PHASE_ID} supported",
            records.len()
        )));
    }

    let mut seen = BTreeSet::new();
    for record in records {
        let phase_id = record.phase_id();
        if !(MIN_PHASE_ID..=MAX_PHASE_ID).contains(&phase_id) {
            return Err(HarmonicError::InvalidPhaseSet(format!(
                "phase id {phase_id} outside {MIN_PHASE_ID}..={MAX_PHASE_ID}"
            )));
        }
        if !seen.insert(phase_id) {
            return Err(HarmonicError::InvalidPhaseSet(format!(
                "duplicate phase id {phase_id}"
            )));
        }
    }

    let mut ordered: Vec<&MeasurementRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.phase_id());
    Ok(ordered)
}

fn failure_reason(err: HarmonicError) -> String {
    match err {
        HarmonicError::InvalidMeasurement { reason, .. } => reason,
        other => other.to_string(),
    }
}
