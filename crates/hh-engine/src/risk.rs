//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Threshold table mapping aggregated metrics to a risk tier.
//!
//! | Condition                                        | Tier floor | Factor                     |
//! |--------------------------------------------------|------------|----------------------------|
//! | max THD below monitor boundary, no imbalance     | SAFE       | –                          |
//! | monitor ≤ max THD < warning                      | MONITOR    | `elevated-thd`             |
//! | warning ≤ max THD < critical, or imbalance       | WARNING    | `high-thd`/`phase-imbalance` |
//! | max THD ≥ critical, or crest ≥ alert with THD ≥ warning | CRITICAL | `critical-thd`/`nonlinear-load-signature` |
//!
//! The tier is the most severe floor triggered. A crest factor below the
//! configured floor adds `low-crest-factor` and a score penalty but no floor.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::info;

use crate::{aggregate::PhaseImbalanceSummary, config::AnalysisConfig, harmonics::HarmonicProfile};

const THD_SCORE_WEIGHT: f64 = 6.0;
const IMBALANCE_PENALTY: f64 = 15.0;
const LOW_CREST_PENALTY: f64 = 10.0;
const MAX_SCORE: f64 = 100.0;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Safe,
    Monitor,
    Warning,
    Critical,
}

/// Contributing factor identifiers, declared in reporting order.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RiskFactor {
    ElevatedThd,
    HighThd,
    PhaseImbalance,
    CriticalThd,
    NonlinearLoadSignature,
    LowCrestFactor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub contributing_factors: Vec<RiskFactor>,
    /// 0–100, grows with severity.
    pub score: f64,
}

impl RiskAssessment {
    pub fn has_factor(&self, factor: RiskFactor) -> bool {
        self.contributing_factors.contains(&factor)
    }
}

/// Classify a facility snapshot. Pure and total over validated inputs.
pub fn classify(
    summary: &PhaseImbalanceSummary,
    profiles: &[HarmonicProfile],
    config: &AnalysisConfig,
) -> RiskAssessment {
    let boundaries = &config.thd_tier_boundaries;
    let max_thd = summary.max_thd_percent;

    let mut tier = RiskTier::Safe;
    let mut factors = Vec::new();
    let mut trigger = |floor: RiskTier, factor: RiskFactor| {
        tier = tier.max(floor);
        if !factors.contains(&factor) {
            factors.push(factor);
        }
    };

    if max_thd >= boundaries.monitor && max_thd < boundaries.warning {
        trigger(RiskTier::Monitor, RiskFactor::ElevatedThd);
    }
    if max_thd >= boundaries.warning && max_thd < boundaries.critical {
        trigger(RiskTier::Warning, RiskFactor::HighThd);
    }
    if summary.imbalance_flag {
        trigger(RiskTier::Warning, RiskFactor::PhaseImbalance);
    }
    if max_thd >= boundaries.critical {
        trigger(RiskTier::Critical, RiskFactor::CriticalThd);
    }
    let nonlinear = profiles.iter().any(|profile| {
        profile
            .crest_factor
            .is_some_and(|crest| crest >= config.crest_factor_alert_threshold)
            && profile.thd_percent >= boundaries.warning
    });
    if nonlinear {
        trigger(RiskTier::Critical, RiskFactor::NonlinearLoadSignature);
    }

    let low_crest = min_crest_factor(profiles)
        .is_some_and(|crest| crest < config.low_crest_factor_floor);
    if low_crest {
        factors.push(RiskFactor::LowCrestFactor);
    }

    let score = risk_score(max_thd, summary.imbalance_flag, low_crest);

    info!(
        tier = %tier,
        score,
        factors = ?factors,
        "risk classification completed"
    );

    RiskAssessment {
        tier,
        contributing_factors: factors,
        score,
    }
}

/// `min(100, 6 · max THD + 15 · imbalance + 10 · low crest)`, floored at zero.
pub fn risk_score(max_thd_percent: f64, imbalance: bool, low_crest: bool) -> f64 {
    let mut score = max_thd_percent * THD_SCORE_WEIGHT;
    if imbalance {
        score += IMBALANCE_PENALTY;
    }
    if low_crest {
        score += LOW_CREST_PENALTY;
    }
    score.clamp(0.0, MAX_SCORE)
}

/// Smallest evaluable crest factor; phases reporting `None` are ignored.
fn min_crest_factor(profiles: &[HarmonicProfile]) -> Option<f64> {
    profiles
        .iter()
        .filter_map(|profile| profile.crest_factor)
        .reduce(f64::min)
}
