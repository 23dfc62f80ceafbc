//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{HarmonicError, Result};

pub const MIN_PHASE_ID: u8 = 1;
pub const MAX_PHASE_ID: u8 = 3;

/// Observation data for one phase: either raw samples or a pre-computed spectrum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// Uniformly spaced instantaneous voltage or current samples.
    Samples { sample_rate_hz: f64, values: Vec<f64> },
    /// Harmonic order to magnitude. Order 1 is the fundamental.
    Spectrum { magnitudes: BTreeMap<u32, f64> },
}

/// Normalized measurement for one phase over one observation window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementRecord {
    phase_id: u8,
    fundamental_frequency: f64,
    #[serde(with = "serde_yaml::with::singleton_map")]
    waveform: Waveform,
}

impl MeasurementRecord {
    pub fn from_samples(
        phase_id: u8,
        fundamental_frequency: f64,
        sample_rate_hz: f64,
        values: Vec<f64>,
    ) -> Self {
        Self {
            phase_id,
            fundamental_frequency,
            waveform: Waveform::Samples {
                sample_rate_hz,
                values,
            },
        }
    }

    pub fn from_spectrum(
        phase_id: u8,
        fundamental_frequency: f64,
        magnitudes: impl IntoIterator<Item = (u32, f64)>,
    ) -> Self {
        Self {
            phase_id,
            fundamental_frequency,
            waveform: Waveform::Spectrum {
                magnitudes: magnitudes.into_iter().collect(),
            },
        }
    }

    pub fn phase_id(&self) -> u8 {
        self.phase_id
    }

    pub fn fundamental_frequency(&self) -> f64 {
        self.fundamental_frequency
    }

    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    /// Check structural invariants. Sample series must resolve every order up to
    /// `max_harmonic_order` (Nyquist) and span at least one fundamental cycle.
    pub fn validate(&self, max_harmonic_order: u32) -> Result<()> {
        let phase = self.phase_id;
        if !(MIN_PHASE_ID..=MAX_PHASE_ID).contains(&phase) {
            return Err(HarmonicError::measurement(
                phase,
                format!("phase id must be within {MIN_PHASE_ID}..={MAX_PHASE_ID}"),
            ));
        }
        let f0 = self.fundamental_frequency;
        if !f0.is_finite() || f0 <= 0.0 {
            return Err(HarmonicError::measurement(
                phase,
                format!("fundamental frequency must be positive, got {f0}"),
            ));
        }

        match &self.waveform {
            Waveform::Samples {
                sample_rate_hz,
                values,
            } => {
                if values.len() < 2 {
                    return Err(HarmonicError::measurement(
                        phase,
                        format!("sample series has {} point(s), at least 2 required", values.len()),
                    ));
                }
                if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
                    return Err(HarmonicError::measurement(
                        phase,
                        format!("sample {idx} is not a finite number"),
                    ));
                }
                let fs = *sample_rate_hz;
                if !fs.is_finite() || fs <= 0.0 {
                    return Err(HarmonicError::measurement(
                        phase,
                        format!("sample rate must be positive, got {fs}"),
                    ));
                }
                let required = 2.0 * f64::from(max_harmonic_order) * f0;
                if fs <= required {
                    return Err(HarmonicError::measurement(
                        phase,
                        format!(
                            "sample rate {fs:.1} Hz cannot resolve harmonic order {max_harmonic_order} \
                             of {f0} Hz (needs more than {required:.1} Hz)"
                        ),
                    ));
                }
                let samples_per_cycle = fs / f0;
                if (values.len() as f64) < samples_per_cycle.floor() {
                    return Err(HarmonicError::measurement(
                        phase,
                        format!(
                            "sample series of {} points is shorter than one fundamental cycle ({:.0} points)",
                            values.len(),
                            samples_per_cycle
                        ),
                    ));
                }
            }
            Waveform::Spectrum { magnitudes } => {
                if magnitudes.is_empty() {
                    return Err(HarmonicError::measurement(phase, "harmonic spectrum is empty"));
                }
                for (&order, &magnitude) in magnitudes {
                    if order == 0 {
                        return Err(HarmonicError::measurement(
                            phase,
                            "harmonic order 0 is not allowed (orders start at 1)",
                        ));
                    }
                    if !magnitude.is_finite() || magnitude < 0.0 {
                        return Err(HarmonicError::measurement(
                            phase,
                            format!("harmonic {order} has invalid magnitude {magnitude}"),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
