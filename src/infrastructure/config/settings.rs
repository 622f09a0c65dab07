//! Fleet settings loading and validation.
//!
//! Settings describe how instances are run (compose file, service names,
//! key scheme), not which devices exist. Per-device values live in the
//! key/value source.
//!
//! # Example
//!
//! ```no_run
//! use gpufleet::infrastructure::config::settings::Settings;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load("gpufleet.toml", false)?;
//!     settings.init_logging(0);
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::service::{KeyScheme, ServicesConfig, SetupConfig};
use crate::domain::{is_valid_prefix, DEFAULT_PREFIX};
use crate::error::{ConfigError, Result};

/// Main fleet configuration. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Container CLI invoked as `<program> compose ...`.
    pub runtime_program: String,

    /// Compose file describing the compute and worker services.
    pub compose_file: PathBuf,

    /// Prefix of every derived namespace.
    pub project_prefix: String,

    /// Upper bound on one non-streaming runtime call.
    pub action_timeout_secs: u64,

    pub services: ServicesConfig,
    pub keys: KeyScheme,
    pub setup: SetupConfig,
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runtime_program: "docker".into(),
            compose_file: PathBuf::from("docker-compose.yml"),
            project_prefix: DEFAULT_PREFIX.into(),
            action_timeout_secs: 300,
            services: ServicesConfig::default(),
            keys: KeyScheme::default(),
            setup: SetupConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text and validate them.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_labeled(content, "settings")
    }

    /// Load settings from `path`.
    ///
    /// When `required` is false a missing file yields the defaults; any
    /// other read error is still reported.
    pub fn load<P: AsRef<Path>>(path: P, required: bool) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse_labeled(&content, &path.display().to_string()),
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::ReadFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    fn parse_labeled(content: &str, label: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: label.to_string(),
            reason: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.runtime_program.trim().is_empty() {
            return Err(ConfigError::missing("runtime_program").into());
        }
        if self.compose_file.as_os_str().is_empty() {
            return Err(ConfigError::missing("compose_file").into());
        }
        if !is_valid_prefix(&self.project_prefix) {
            return Err(ConfigError::invalid(
                "project_prefix",
                "must start with a lowercase letter or digit and contain only [a-z0-9_-]",
            )
            .into());
        }
        if self.action_timeout_secs == 0 {
            return Err(
                ConfigError::invalid("action_timeout_secs", "must be greater than 0").into(),
            );
        }
        if self.services.compute.trim().is_empty() {
            return Err(ConfigError::missing("services.compute").into());
        }
        if self.services.worker.trim().is_empty() {
            return Err(ConfigError::missing("services.worker").into());
        }
        if self.services.compute == self.services.worker {
            return Err(ConfigError::invalid(
                "services.worker",
                "must differ from services.compute",
            )
            .into());
        }
        for (field, base) in [
            ("keys.device", &self.keys.device),
            ("keys.port", &self.keys.port),
            ("keys.address", &self.keys.address),
            ("keys.workloads", &self.keys.workloads),
        ] {
            if base.trim().is_empty() {
                return Err(ConfigError::missing(field).into());
            }
        }
        if self.setup.command.is_empty() {
            return Err(ConfigError::missing("setup.command").into());
        }
        Ok(())
    }

    /// Non-streaming runtime call timeout.
    #[must_use]
    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.action_timeout_secs)
    }

    /// Initialize tracing according to `[logging]` and the `-v` count.
    pub fn init_logging(&self, verbose: u8) {
        self.logging.init(verbose);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_document_yields_defaults() {
        let settings = Settings::parse_toml("").expect("defaults");
        assert_eq!(settings.project_prefix, "instance");
        assert_eq!(settings.runtime_program, "docker");
        assert_eq!(settings.compose_file, PathBuf::from("docker-compose.yml"));
        assert_eq!(settings.action_timeout(), Duration::from_secs(300));
        assert_eq!(settings.keys, KeyScheme::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let settings = Settings::parse_toml(
            r#"
project_prefix = "gpu"

[services]
worker = "agent"

[keys]
port = "PORT"
"#,
        )
        .expect("parse");

        assert_eq!(settings.project_prefix, "gpu");
        assert_eq!(settings.services.compute, "comfyui");
        assert_eq!(settings.services.worker, "agent");
        assert_eq!(settings.keys.port, "PORT");
        assert_eq!(settings.keys.device, "CUDA_DEVICE");
    }

    #[test]
    fn rejects_invalid_prefix() {
        let result = Settings::parse_toml("project_prefix = \"My Fleet\"");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { ref key, .. })) if key == "project_prefix"
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let result = Settings::parse_toml("action_timeout_secs = 0");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { ref key, .. })) if key == "action_timeout_secs"
        ));
    }

    #[test]
    fn rejects_same_service_for_both_roles() {
        let result = Settings::parse_toml("[services]\ncompute = \"app\"\nworker = \"app\"");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_setup_command() {
        let result = Settings::parse_toml("[setup]\ncommand = []");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingField { ref key })) if key == "setup.command"
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        let result = Settings::parse_toml("project_prefix = ");
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse { .. }))));
    }

    #[test]
    fn missing_optional_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::load(dir.path().join("absent.toml"), false).expect("defaults");
        assert_eq!(settings.project_prefix, "instance");
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = Settings::load(dir.path().join("absent.toml"), true);
        assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile { .. }))));
    }
}
