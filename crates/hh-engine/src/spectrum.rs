//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Frequency-domain decomposition of a uniformly sampled series.
//!
//! The series is DC-corrected, optionally windowed and transformed with a
//! forward FFT. Only the bins closest to integer multiples of the fundamental
//! are read back; every other bin is ignored.
//!
//! ```text
//!  |X|
//!   │ █                      bin(k) = round(k · f0 / (fs / N))
//!   │ █                      amplitude(k) = 2 · |X[bin(k)]| / Σw
//!   │ █     █
//!   │ █     █   █   █
//!   └─┴──┴──┴──┴──┴──┴──── f
//!     f0 2f0 3f0 4f0 5f0
//! ```

use std::collections::BTreeMap;
use std::f64::consts::PI;

use rustfft::{num_complex::Complex64, FftPlanner};

use crate::config::SpectralWindow;

/// Harmonic amplitudes (peak units of the input) keyed by harmonic order.
///
/// Orders whose frequency sits at or above Nyquist are left out. The map is empty
/// when the input cannot be decomposed (fewer than two samples or non-positive
/// frequencies); callers are expected to have validated the record first.
pub fn decompose(
    values: &[f64],
    sample_rate_hz: f64,
    fundamental_hz: f64,
    max_order: u32,
    window: SpectralWindow,
) -> BTreeMap<u32, f64> {
    let n = values.len();
    let mut harmonics = BTreeMap::new();
    if n < 2 || sample_rate_hz <= 0.0 || fundamental_hz <= 0.0 {
        return harmonics;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let weights = window_weights(window, n);
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= f64::EPSILON {
        return harmonics;
    }

    let mut buffer: Vec<Complex64> = values
        .iter()
        .zip(&weights)
        .map(|(value, weight)| Complex64::new((value - mean) * weight, 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let bin_width = sample_rate_hz / n as f64;
    let nyquist = sample_rate_hz / 2.0;
    for order in 1..=max_order {
        let frequency = f64::from(order) * fundamental_hz;
        if frequency >= nyquist {
            break;
        }
        let bin = (frequency / bin_width).round() as usize;
        // DC and the Nyquist bin do not carry a two-sided amplitude.
        if bin == 0 || 2 * bin >= n {
            continue;
        }
        let amplitude = 2.0 * buffer[bin].norm() / weight_sum;
        harmonics.insert(order, amplitude);
    }
    harmonics
}

fn window_weights(window: SpectralWindow, n: usize) -> Vec<f64> {
    match window {
        SpectralWindow::Rectangular => vec![1.0; n],
        // Periodic Hann keeps coherent harmonics exactly on their bins.
        SpectralWindow::Hann => (0..n)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
            .collect(),
    }
}
