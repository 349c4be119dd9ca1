//! Phasekit Settings Crate
//!
//! Handles the run configuration, parsing of the parameter text file and
//! validation of the parsed parameters before a schedule is built.

pub mod config;
pub mod error;
pub mod parameters;
pub mod validation;

pub use config::{LogFormat, RunConfig};
pub use error::{ConfigError, ParameterError, SettingsError, SettingsResult};
pub use parameters::{load_parameters, parse_parameters, ParameterSection, RawParameters};
pub use validation::{validate, Diagnostic, Severity, ValidationReport};
