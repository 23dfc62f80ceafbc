//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    errors::{HarmonicError, Result},
    harmonics::HarmonicProfile,
    measurement::MAX_PHASE_ID,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseImbalanceSummary {
    pub phase_count: usize,
    pub max_thd_percent: f64,
    pub min_thd_percent: f64,
    pub thd_spread_percent: f64,
    pub imbalance_flag: bool,
    /// Phase carrying the highest THD; the lowest id wins ties.
    pub worst_phase: u8,
}

impl PhaseImbalanceSummary {
    pub fn is_single_phase(&self) -> bool {
        self.phase_count == 1
    }
}

/// Combine per-phase profiles (phase-id order) into a facility-level summary.
pub fn summarize_phases(
    profiles: &[HarmonicProfile],
    imbalance_threshold_pct: f64,
) -> Result<PhaseImbalanceSummary> {
    if profiles.is_empty() {
        return Err(HarmonicError::InvalidPhaseSet(
            "at least one phase profile is required".into(),
        ));
    }
    if profiles.len() > usize::from(MAX_PHASE_ID) {
        return Err(HarmonicError::InvalidPhaseSet(format!(
            "{} phase profiles supplied, at most {MAX_PHASE_ID} supported",
            profiles.len()
        )));
    }

    let mut worst = &profiles[0];
    let mut min_thd = profiles[0].thd_percent;
    for profile in &profiles[1..] {
        if profile.thd_percent > worst.thd_percent {
            worst = profile;
        }
        min_thd = min_thd.min(profile.thd_percent);
    }
    let max_thd = worst.thd_percent;

    let spread = if profiles.len() == 1 {
        0.0
    } else {
        max_thd - min_thd
    };
    let imbalance_flag = profiles.len() >= 2 && spread > imbalance_threshold_pct;

    info!(
        phases = profiles.len(),
        max_thd, spread, imbalance_flag, "phase aggregation completed"
    );

    Ok(PhaseImbalanceSummary {
        phase_count: profiles.len(),
        max_thd_percent: max_thd,
        min_thd_percent: min_thd,
        thd_spread_percent: spread,
        imbalance_flag,
        worst_phase: worst.phase_id,
    })
}
