//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Handoff contract for report renderers. Renderers read these fields and never
//! recompute metrics.

use serde::{Deserialize, Serialize};

use crate::{
    aggregate::PhaseImbalanceSummary,
    harmonics::HarmonicProfile,
    recommend::ADVISORY_DISCLAIMER,
    risk::{RiskAssessment, RiskTier},
};

/// A phase dropped from the run in partial-result mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseFailure {
    pub phase_id: u8,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub assessment: RiskAssessment,
    pub imbalance: PhaseImbalanceSummary,
    /// Ordered by phase id.
    pub profiles: Vec<HarmonicProfile>,
    #[serde(default)]
    pub skipped_phases: Vec<PhaseFailure>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub verdict: String,
    pub disclaimer: String,
}

impl AnalysisReport {
    pub(crate) fn new(
        assessment: RiskAssessment,
        imbalance: PhaseImbalanceSummary,
        profiles: Vec<HarmonicProfile>,
        skipped_phases: Vec<PhaseFailure>,
        recommendations: Vec<String>,
        verdict: &str,
    ) -> Self {
        Self {
            assessment,
            imbalance,
            profiles,
            skipped_phases,
            recommendations,
            verdict: verdict.to_owned(),
            disclaimer: ADVISORY_DISCLAIMER.to_owned(),
        }
    }

    pub fn tier(&self) -> RiskTier {
        self.assessment.tier
    }

    pub fn score(&self) -> f64 {
        self.assessment.score
    }

    pub fn profile(&self, phase_id: u8) -> Option<&HarmonicProfile> {
        self.profiles.iter().find(|p| p.phase_id == phase_id)
    }

    pub fn is_partial(&self) -> bool {
        !self.skipped_phases.is_empty()
    }
}
