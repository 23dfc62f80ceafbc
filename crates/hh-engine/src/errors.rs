//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Harmonic risk analysis engine for facility power-quality exports."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarmonicError>;

#[derive(Debug, Error)]
pub enum HarmonicError {
    #[error("invalid measurement for phase {phase_id}: {reason}")]
    InvalidMeasurement { phase_id: u8, reason: String },
    #[error("invalid phase set: {0}")]
    InvalidPhaseSet(String),
    #[error("invalid configuration value {field} = {value}: {reason}")]
    Configuration {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    SerializationFailed(#[from] serde_json::Error),
    #[error("yaml serialization error: {0}")]
    YamlSerializationFailed(#[from] serde_yaml::Error),
}

impl HarmonicError {
    pub(crate) fn measurement(phase_id: u8, reason: impl Into<String>) -> Self {
        HarmonicError::InvalidMeasurement {
            phase_id,
            reason: reason.into(),
        }
    }

    /// Phase the error is attributed to, when it concerns a single phase.
    pub fn phase_id(&self) -> Option<u8> {
        match self {
            HarmonicError::InvalidMeasurement { phase_id, .. } => Some(*phase_id),
            _ => None,
        }
    }
}
