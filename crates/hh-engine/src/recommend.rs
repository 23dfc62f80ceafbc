//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use crate::{
    harmonics::HarmonicProfile,
    risk::{RiskAssessment, RiskFactor, RiskTier},
};

pub const ADVISORY_DISCLAIMER: &str = "Advisory analysis only. Findings are derived from exported \
    measurements and do not replace an assessment by a licensed electrical engineer.";

const TRIPLEN_WARN_PCT: f64 = 20.0;
const TRIPLEN_CRITICAL_PCT: f64 = 30.0;
const FIFTH_WARN_PCT: f64 = 12.0;
const FIFTH_CRITICAL_PCT: f64 = 15.0;
const CREST_WARN: f64 = 2.5;
const CREST_CRITICAL: f64 = 3.0;
const VARIABILITY_WARN_PCT: f64 = 25.0;
const VARIABILITY_CRITICAL_PCT: f64 = 40.0;

const NONLINEAR_INVESTIGATION: &str = "Priority: Investigate non-linear load contributions \
    (UPS rectifiers/SMPS/LED drivers). Consider a harmonic filtering feasibility study.";

const NO_ACTION: &str =
    "No urgent mitigation required based on thresholds; continue periodic monitoring.";

/// Mitigation advice derived from the assessment and per-phase harmonic shares.
pub fn recommendations(assessment: &RiskAssessment, profiles: &[HarmonicProfile]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut push = |line: &str| {
        if !lines.iter().any(|existing| existing == line) {
            lines.push(line.to_owned());
        }
    };

    for factor in &assessment.contributing_factors {
        match factor {
            RiskFactor::CriticalThd => push(
                "Priority: Perform a power quality audit; implement mitigation to reduce THD \
                 and associated transformer heating.",
            ),
            RiskFactor::HighThd => push(
                "Monitor THD and thermal loading; consider mitigation if persistent during peak periods.",
            ),
            RiskFactor::ElevatedThd => push(
                "Trend THD over time and re-assess after load changes or capacity expansion.",
            ),
            RiskFactor::PhaseImbalance => push(
                "Review load distribution across phases; rebalance single-phase non-linear loads \
                 where distortion concentrates on one phase.",
            ),
            RiskFactor::NonlinearLoadSignature => push(NONLINEAR_INVESTIGATION),
            RiskFactor::LowCrestFactor => push(
                "Flat-topped waveform observed; check source impedance and voltage distortion at the \
                 supply transformer.",
            ),
        }
    }

    for profile in profiles {
        if profile.triplen_index_percent >= TRIPLEN_CRITICAL_PCT {
            push(
                "Priority: Evaluate active harmonic filtering focused on triplen mitigation; verify \
                 neutral conductor sizing and thermal margins.",
            );
        } else if profile.triplen_index_percent >= TRIPLEN_WARN_PCT {
            push(
                "Trend triplen harmonics; review neutral loading during peak IT load windows and plan \
                 mitigation if persistent.",
            );
        }

        if profile.fifth_harmonic_percent >= FIFTH_CRITICAL_PCT {
            push(
                "Priority: Evaluate detuned capacitor banks / filtering tuned for 5th harmonic to reduce \
                 capacitor and UPS stress.",
            );
        } else if profile.fifth_harmonic_percent >= FIFTH_WARN_PCT {
            push(
                "Inspect capacitor bank health and reactive compensation settings; elevated 5th \
                 harmonic can accelerate wear.",
            );
        }

        match profile.crest_factor {
            Some(crest) if crest >= CREST_CRITICAL => push(NONLINEAR_INVESTIGATION),
            Some(crest) if crest >= CREST_WARN => push(
                "Crest factor elevated; review load mix and UPS operating mode. Consider targeted \
                 power quality measurements.",
            ),
            _ => {}
        }

        match profile.current_variability_percent {
            Some(variability) if variability >= VARIABILITY_CRITICAL_PCT => push(
                "Priority: Current variability indicates pulsed load behavior; schedule a power \
                 quality capture (true waveform) during peak load.",
            ),
            Some(variability) if variability >= VARIABILITY_WARN_PCT => push(
                "Trend current variability over time; investigate spikes and correlate with load \
                 changes and breaker events.",
            ),
            _ => {}
        }
    }

    if lines.is_empty() {
        lines.push(NO_ACTION.to_owned());
    }
    lines
}

/// One-paragraph executive summary for the tier.
pub fn verdict(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Safe => {
            "No immediate power-quality risk detected. Observed load behavior is consistent with \
             stable operation."
        }
        RiskTier::Monitor => {
            "Early warning indicators detected. Continued monitoring recommended to prevent \
             escalation during peak demand or future expansion."
        }
        RiskTier::Warning => {
            "Elevated power-quality risk detected. Observed conditions may contribute to equipment \
             stress if left unaddressed."
        }
        RiskTier::Critical => {
            "Critical power-quality risk detected. Observed conditions are consistent with \
             equipment stress; mitigation should be planned without delay."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmonics::ProfileSource;

    fn profile(triplen: f64, fifth: f64) -> HarmonicProfile {
        HarmonicProfile {
            phase_id: 1,
            thd_percent: 3.0,
            crest_factor: Some(1.5),
            dominant_harmonics: Vec::new(),
            triplen_index_percent: triplen,
            fifth_harmonic_percent: fifth,
            current_variability_percent: None,
            fundamental_magnitude: 100.0,
            source: ProfileSource::Spectrum,
        }
    }

    fn assessment(tier: RiskTier, factors: Vec<RiskFactor>) -> RiskAssessment {
        RiskAssessment {
            tier,
            contributing_factors: factors,
            score: 0.0,
        }
    }

    #[test]
    fn safe_snapshot_gets_monitoring_line() {
        let lines = recommendations(&assessment(RiskTier::Safe, vec![]), &[profile(1.0, 1.0)]);
        assert_eq!(lines, vec![NO_ACTION.to_owned()]);
    }

    #[test]
    fn repeated_phase_findings_are_deduplicated() {
        let profiles = [profile(32.0, 13.0), profile(35.0, 12.5)];
        let lines = recommendations(
            &assessment(RiskTier::Critical, vec![RiskFactor::CriticalThd]),
            &profiles,
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Priority: Perform a power quality audit"));
        assert!(lines[1].contains("triplen mitigation"));
        assert!(lines[2].contains("capacitor bank health"));
    }

    #[test]
    fn crest_factor_advice_follows_thresholds() {
        let mut elevated = profile(1.0, 1.0);
        elevated.crest_factor = Some(2.7);
        let lines = recommendations(&assessment(RiskTier::Safe, vec![]), &[elevated]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Crest factor elevated"));

        let mut impulsive = profile(1.0, 1.0);
        impulsive.crest_factor = Some(3.4);
        let lines = recommendations(
            &assessment(RiskTier::Critical, vec![RiskFactor::NonlinearLoadSignature]),
            &[impulsive],
        );
        assert_eq!(lines, vec![NONLINEAR_INVESTIGATION.to_owned()]);
    }

    #[test]
    fn variability_advice_follows_thresholds() {
        let mut trending = profile(1.0, 1.0);
        trending.current_variability_percent = Some(30.0);
        let mut pulsed = profile(1.0, 1.0);
        pulsed.current_variability_percent = Some(45.0);
        let lines = recommendations(&assessment(RiskTier::Safe, vec![]), &[trending, pulsed]);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Trend current variability"));
        assert!(lines[1].starts_with("Priority: Current variability"));

        let mut quiet = profile(1.0, 1.0);
        quiet.current_variability_percent = Some(0.0);
        let lines = recommendations(&assessment(RiskTier::Safe, vec![]), &[quiet]);
        assert_eq!(lines, vec![NO_ACTION.to_owned()]);
    }

    #[test]
    fn every_tier_has_a_verdict() {
        for tier in [
            RiskTier::Safe,
            RiskTier::Monitor,
            RiskTier::Warning,
            RiskTier::Critical,
        ] {
            assert!(!verdict(tier).is_empty());
        }
    }
}
