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
use tracing::debug;

use crate::{
    config::AnalysisConfig,
    errors::{HarmonicError, Result},
    measurement::{MeasurementRecord, Waveform},
    spectrum::decompose,
};

/// Number of entries kept in [`HarmonicProfile::dominant_harmonics`].
pub const DOMINANT_HARMONIC_LIMIT: usize = 5;

const MAGNITUDE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    Samples,
    Spectrum,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DominantHarmonic {
    pub order: u32,
    pub percent_of_fundamental: f64,
}

/// Power-quality metrics derived from a single phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarmonicProfile {
    pub phase_id: u8,
    pub thd_percent: f64,
    /// `None` when the crest factor cannot be evaluated from the record.
    pub crest_factor: Option<f64>,
    pub dominant_harmonics: Vec<DominantHarmonic>,
    pub triplen_index_percent: f64,
    pub fifth_harmonic_percent: f64,
    /// Coefficient of variation of the sample series; `None` for spectrum records.
    pub current_variability_percent: Option<f64>,
    pub fundamental_magnitude: f64,
    pub source: ProfileSource,
}

/// Derive the [`HarmonicProfile`] of one phase.
pub fn compute_profile(
    record: &MeasurementRecord,
    config: &AnalysisConfig,
) -> Result<HarmonicProfile> {
    record.validate(config.max_harmonic_order)?;
    let phase_id = record.phase_id();

    let (spectrum, crest, variability, source) = match record.waveform() {
        Waveform::Samples {
            sample_rate_hz,
            values,
        } => {
            let spectrum = decompose(
                values,
                *sample_rate_hz,
                record.fundamental_frequency(),
                config.max_harmonic_order,
                config.window,
            );
            (
                spectrum,
                crest_factor(values),
                current_variability_percent(values),
                ProfileSource::Samples,
            )
        }
        Waveform::Spectrum { magnitudes } => {
            let crest = if config.spectrum_crest_factor {
                reconstructed_crest_factor(magnitudes)
            } else {
                None
            };
            (magnitudes.clone(), crest, None, ProfileSource::Spectrum)
        }
    };

    let fundamental = spectrum.get(&1).copied().unwrap_or(0.0);
    let thd = thd_percent(&spectrum).ok_or_else(|| {
        HarmonicError::measurement(
            phase_id,
            format!("fundamental magnitude is zero ({fundamental})"),
        )
    })?;

    let profile = HarmonicProfile {
        phase_id,
        thd_percent: thd,
        crest_factor: crest,
        dominant_harmonics: dominant_harmonics(&spectrum, DOMINANT_HARMONIC_LIMIT),
        triplen_index_percent: triplen_index_percent(&spectrum).unwrap_or(0.0),
        fifth_harmonic_percent: percent_of_fundamental(&spectrum, 5).unwrap_or(0.0),
        current_variability_percent: variability,
        fundamental_magnitude: fundamental,
        source,
    };
    debug!(
        phase = phase_id,
        thd = profile.thd_percent,
        crest = ?profile.crest_factor,
        variability = ?profile.current_variability_percent,
        source = ?profile.source,
        "harmonic profile computed"
    );
    Ok(profile)
}

/// `100 · sqrt(Σ_{k≥2} mag(k)²) / mag(1)`, or `None` without a usable fundamental.
pub fn thd_percent(spectrum: &BTreeMap<u32, f64>) -> Option<f64> {
    ratio_percent(spectrum, |order| order >= 2)
}

/// Same construction as THD restricted to orders divisible by three.
pub fn triplen_index_percent(spectrum: &BTreeMap<u32, f64>) -> Option<f64> {
    ratio_percent(spectrum, |order| order % 3 == 0)
}

pub fn percent_of_fundamental(spectrum: &BTreeMap<u32, f64>, order: u32) -> Option<f64> {
    let fundamental = fundamental(spectrum)?;
    Some(spectrum.get(&order).copied().unwrap_or(0.0) / fundamental * 100.0)
}

/// Peak absolute value over RMS of a sample series.
pub fn crest_factor(values: &[f64]) -> Option<f64> {
    let peak = peak_magnitude(values.iter().copied())?;
    // Scaled by the peak so squaring stays finite for any finite input.
    let mean_square = values
        .iter()
        .map(|v| (v / peak) * (v / peak))
        .sum::<f64>()
        / values.len() as f64;
    let relative_rms = mean_square.sqrt();
    if peak * relative_rms <= MAGNITUDE_EPSILON {
        return None;
    }
    Some(1.0 / relative_rms)
}

/// Crest factor of the waveform rebuilt from harmonic magnitudes.
///
/// Phases are unknown, so every harmonic is assumed to peak together; the
/// result is the upper bound `Σ mag / sqrt(Σ mag² / 2)`.
pub fn reconstructed_crest_factor(spectrum: &BTreeMap<u32, f64>) -> Option<f64> {
    let scale = peak_magnitude(spectrum.values().copied())?;
    let peak: f64 = spectrum.values().map(|m| m / scale).sum();
    let rms = (spectrum
        .values()
        .map(|m| (m / scale) * (m / scale))
        .sum::<f64>()
        / 2.0)
        .sqrt();
    if scale * rms <= MAGNITUDE_EPSILON {
        return None;
    }
    Some(peak / rms)
}

/// Standard deviation over absolute mean of a sample series, in percent.
///
/// A series averaging zero (a symmetric AC waveform) reports 0.
pub fn current_variability_percent(values: &[f64]) -> Option<f64> {
    let scale = peak_magnitude(values.iter().copied())?;
    let n = values.len() as f64;
    let mean = values.iter().map(|v| v / scale).sum::<f64>() / n;
    if (mean * scale).abs() <= MAGNITUDE_EPSILON {
        return Some(0.0);
    }
    let variance = values
        .iter()
        .map(|v| {
            let deviation = v / scale - mean;
            deviation * deviation
        })
        .sum::<f64>()
        / n;
    Some(variance.sqrt() / mean.abs() * 100.0)
}

/// Harmonics of order ≥2 ranked by share of the fundamental, ties by lower order.
pub fn dominant_harmonics(spectrum: &BTreeMap<u32, f64>, limit: usize) -> Vec<DominantHarmonic> {
    let Some(fundamental) = fundamental(spectrum) else {
        return Vec::new();
    };
    let mut ranked: Vec<DominantHarmonic> = spectrum
        .iter()
        .filter(|(&order, &magnitude)| order >= 2 && magnitude > MAGNITUDE_EPSILON)
        .map(|(&order, &magnitude)| DominantHarmonic {
            order,
            percent_of_fundamental: magnitude / fundamental * 100.0,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.percent_of_fundamental
            .total_cmp(&a.percent_of_fundamental)
            .then(a.order.cmp(&b.order))
    });
    ranked.truncate(limit);
    ranked
}

fn fundamental(spectrum: &BTreeMap<u32, f64>) -> Option<f64> {
    spectrum
        .get(&1)
        .copied()
        .filter(|magnitude| *magnitude > MAGNITUDE_EPSILON)
}

/// Largest absolute value, or `None` for an empty or all-zero input.
fn peak_magnitude(values: impl Iterator<Item = f64>) -> Option<f64> {
    let peak = values.fold(0.0f64, |acc, v| acc.max(v.abs()));
    (peak > 0.0).then_some(peak)
}

fn ratio_percent(spectrum: &BTreeMap<u32, f64>, include: impl Fn(u32) -> bool) -> Option<f64> {
    let fundamental = fundamental(spectrum)?;
    let root_sum_squares = spectrum
        .iter()
        .filter(|(&order, _)| order != 1 && include(order))
        .fold(0.0f64, |acc, (_, magnitude)| acc.hypot(magnitude / fundamental));
    Some(root_sum_squares * 100.0)
}
