//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Immutable per-run analysis configuration.
//!
//! A value of [`AnalysisConfig`] is handed to [`crate::AnalysisRun::new`] and
//! never mutated afterwards. Validation happens there, before any measurement
//! is processed.

use serde::{Deserialize, Serialize};

use crate::errors::{HarmonicError, Result};

fn default_imbalance_threshold() -> f64 {
    5.0
}

fn default_crest_alert() -> f64 {
    2.5
}

fn default_low_crest_floor() -> f64 {
    1.4
}

fn default_max_harmonic_order() -> u32 {
    50
}

fn default_spectrum_crest_factor() -> bool {
    true
}

/// THD percentages at which the MONITOR, WARNING and CRITICAL tiers begin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ThdTierBoundaries {
    pub monitor: f64,
    pub warning: f64,
    pub critical: f64,
}

impl Default for ThdTierBoundaries {
    fn default() -> Self {
        Self {
            monitor: 5.0,
            warning: 8.0,
            critical: 12.0,
        }
    }
}

/// Window applied to a sample series before the FFT.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SpectralWindow {
    #[default]
    Rectangular,
    Hann,
}

/// What a run does when a single phase carries unusable data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailureMode {
    /// The first invalid phase aborts the whole run.
    #[default]
    AbortRun,
    /// Invalid phases are recorded on the report and the remaining phases are analysed.
    SkipPhase,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    #[serde(default = "default_imbalance_threshold")]
    pub imbalance_threshold_pct: f64,
    #[serde(default)]
    pub thd_tier_boundaries: ThdTierBoundaries,
    #[serde(default = "default_crest_alert")]
    pub crest_factor_alert_threshold: f64,
    #[serde(default = "default_low_crest_floor")]
    pub low_crest_factor_floor: f64,
    /// Highest harmonic order extracted from sample series.
    #[serde(default = "default_max_harmonic_order")]
    pub max_harmonic_order: u32,
    #[serde(default)]
    pub window: SpectralWindow,
    /// Reconstruct a crest factor from spectrum-only records.
    #[serde(default = "default_spectrum_crest_factor")]
    pub spectrum_crest_factor: bool,
    #[serde(default)]
    pub failure_mode: FailureMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            imbalance_threshold_pct: default_imbalance_threshold(),
            thd_tier_boundaries: ThdTierBoundaries::default(),
            crest_factor_alert_threshold: default_crest_alert(),
            low_crest_factor_floor: default_low_crest_floor(),
            max_harmonic_order: default_max_harmonic_order(),
            window: SpectralWindow::default(),
            spectrum_crest_factor: default_spectrum_crest_factor(),
            failure_mode: FailureMode::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.failure_mode = failure_mode;
        self
    }

    /// Reject negative, non-finite and non-monotonic thresholds.
    pub fn validate(&self) -> Result<()> {
        non_negative("imbalance_threshold_pct", self.imbalance_threshold_pct)?;
        non_negative("thd_tier_boundaries.monitor", self.thd_tier_boundaries.monitor)?;
        non_negative("thd_tier_boundaries.warning", self.thd_tier_boundaries.warning)?;
        non_negative("thd_tier_boundaries.critical", self.thd_tier_boundaries.critical)?;
        non_negative(
            "crest_factor_alert_threshold",
            self.crest_factor_alert_threshold,
        )?;
        non_negative("low_crest_factor_floor", self.low_crest_factor_floor)?;

        let tiers = &self.thd_tier_boundaries;
        if tiers.warning <= tiers.monitor {
            return Err(HarmonicError::Configuration {
                field: "thd_tier_boundaries.warning",
                value: tiers.warning,
                reason: "must be greater than the monitor boundary",
            });
        }
        if tiers.critical <= tiers.warning {
            return Err(HarmonicError::Configuration {
                field: "thd_tier_boundaries.critical",
                value: tiers.critical,
                reason: "must be greater than the warning boundary",
            });
        }
        if self.low_crest_factor_floor >= self.crest_factor_alert_threshold {
            return Err(HarmonicError::Configuration {
                field: "low_crest_factor_floor",
                value: self.low_crest_factor_floor,
                reason: "must be below the crest factor alert threshold",
            });
        }
        if self.max_harmonic_order < 2 {
            return Err(HarmonicError::Configuration {
                field: "max_harmonic_order",
                value: f64::from(self.max_harmonic_order),
                reason: "must be at least 2",
            });
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(HarmonicError::Configuration {
            field,
            value,
            reason: "must be a finite number",
        });
    }
    if value < 0.0 {
        return Err(HarmonicError::Configuration {
            field,
            value,
            reason: "must not be negative",
        });
    }
    Ok(())
}
