//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared configuration and logging for harmonic analysis tooling."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use hh_engine::AnalysisConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LoggingConfig;

fn default_export_directory() -> PathBuf {
    PathBuf::from("reports")
}

/// Primary configuration object for the harmonic analysis tooling.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    /// `None` when no file was found and defaults were used.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "HH_CONFIG";

    /// Load configuration from disk, respecting the `HH_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Some(path) = Self::env_override() {
            let config = Self::from_path(&path)?;
            return Ok(LoadedAppConfig {
                config,
                source: Some(path),
            });
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    /// Like [`AppConfig::load_with_source`], but falls back to defaults when no
    /// candidate exists. A file that exists and fails to parse is still an error.
    pub fn load_or_default<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        let any_present = Self::env_override().is_some()
            || candidates.iter().any(|candidate| candidate.as_ref().exists());
        if any_present {
            return Self::load_with_source(candidates);
        }
        debug!("no configuration file found; using defaults");
        Ok(LoadedAppConfig {
            config: AppConfig::default(),
            source: None,
        })
    }

    fn env_override() -> Option<PathBuf> {
        std::env::var(Self::ENV_CONFIG_PATH)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        if self.export.enabled && self.export.directory.as_os_str().is_empty() {
            return Err(anyhow!("export.directory must not be empty when export is enabled"));
        }
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_export_directory")]
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: default_export_directory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hh_engine::{FailureMode, HarmonicError, SpectralWindow};

    #[test]
    fn parses_full_configuration() {
        let config: AppConfig = r#"
            [analysis]
            imbalance_threshold_pct = 4.0
            crest_factor_alert_threshold = 2.8
            low_crest_factor_floor = 1.3
            window = "hann"
            failure_mode = "skip-phase"

            [analysis.thd_tier_boundaries]
            monitor = 4.0
            warning = 7.0
            critical = 10.0

            [logging]
            format = "structured-json"

            [export]
            enabled = true
            directory = "out/reports"
        "#
        .parse()
        .unwrap();

        assert_eq!(config.analysis.imbalance_threshold_pct, 4.0);
        assert_eq!(config.analysis.thd_tier_boundaries.critical, 10.0);
        assert_eq!(config.analysis.window, SpectralWindow::Hann);
        assert_eq!(config.analysis.failure_mode, FailureMode::SkipPhase);
        assert!(config.export.enabled);
        assert_eq!(config.export.directory, PathBuf::from("out/reports"));
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config: AppConfig = "".parse().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn non_monotonic_boundaries_are_rejected() {
        let err = r#"
            [analysis.thd_tier_boundaries]
            monitor = 8.0
            warning = 5.0
            critical = 12.0
        "#
        .parse::<AppConfig>()
        .unwrap_err();
        let engine_err = err.downcast_ref::<HarmonicError>().unwrap();
        assert!(matches!(
            engine_err,
            HarmonicError::Configuration {
                field: "thd_tier_boundaries.warning",
                ..
            }
        ));
    }

    #[test]
    fn missing_candidates_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_or_default(&[dir.path().join("absent.toml")]).unwrap();
        assert!(loaded.source.is_none());
        assert!(AppConfig::load(&[dir.path().join("absent.toml")]).is_err());
    }

    #[test]
    fn loads_first_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harmonic-hunter.toml");
        fs::write(&path, "[analysis]\nimbalance_threshold_pct = 6.5\n").unwrap();
        let loaded =
            AppConfig::load_with_source(&[dir.path().join("missing.toml"), path.clone()]).unwrap();
        assert_eq!(loaded.source, Some(path));
        assert_eq!(loaded.config.analysis.imbalance_threshold_pct, 6.5);
    }
}
