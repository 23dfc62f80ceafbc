//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared configuration and logging for harmonic analysis tooling."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the harmonic analysis tooling.
//! This crate exposes configuration loading and logging setup consumed by
//! the command-line front end and the integration tests.

pub mod config;
pub mod logging;

pub use config::{AppConfig, ExportConfig, LoadedAppConfig};
pub use logging::{init, init_tracing, LogFormat, LoggingConfig};
