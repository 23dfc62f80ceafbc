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

use crate::{
    report::AnalysisReport,
    risk::{RiskFactor, RiskTier},
};

/// Change in risk between a baseline snapshot and the current one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskDelta {
    pub baseline_score: f64,
    pub current_score: f64,
    /// Positive when risk grew.
    pub score_delta: f64,
    pub baseline_tier: RiskTier,
    pub current_tier: RiskTier,
    pub escalated: bool,
    pub new_factors: Vec<RiskFactor>,
    pub resolved_factors: Vec<RiskFactor>,
}

pub fn compare_to_baseline(baseline: &AnalysisReport, current: &AnalysisReport) -> RiskDelta {
    let before = &baseline.assessment;
    let after = &current.assessment;

    let new_factors = after
        .contributing_factors
        .iter()
        .filter(|factor| !before.contributing_factors.contains(factor))
        .copied()
        .collect();
    let resolved_factors = before
        .contributing_factors
        .iter()
        .filter(|factor| !after.contributing_factors.contains(factor))
        .copied()
        .collect();

    RiskDelta {
        baseline_score: before.score,
        current_score: after.score,
        score_delta: after.score - before.score,
        baseline_tier: before.tier,
        current_tier: after.tier,
        escalated: after.tier > before.tier,
        new_factors,
        resolved_factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AnalysisConfig, engine::AnalysisRun, measurement::MeasurementRecord};

    fn report(third: f64, fifth: f64) -> AnalysisReport {
        let run = AnalysisRun::new(AnalysisConfig::default()).unwrap();
        run.analyze(&[MeasurementRecord::from_spectrum(
            1,
            60.0,
            [(1, 100.0), (3, third), (5, fifth)],
        )])
        .unwrap()
    }

    #[test]
    fn escalation_is_reported() {
        let baseline = report(1.0, 1.0);
        let current = report(6.0, 8.0);
        let delta = compare_to_baseline(&baseline, &current);
        assert!(delta.escalated);
        assert!(delta.score_delta > 0.0);
        assert_eq!(delta.baseline_tier, RiskTier::Safe);
        assert_eq!(delta.current_tier, RiskTier::Warning);
        assert_eq!(delta.new_factors, vec![RiskFactor::HighThd]);
        assert!(delta.resolved_factors.is_empty());
    }

    #[test]
    fn improvement_resolves_factors() {
        let baseline = report(6.0, 8.0);
        let current = report(1.0, 1.0);
        let delta = compare_to_baseline(&baseline, &current);
        assert!(!delta.escalated);
        assert!(delta.score_delta < 0.0);
        assert_eq!(delta.resolved_factors, vec![RiskFactor::HighThd]);
    }
}
