//! Composition root: wires settings and sources into the dispatcher.

use std::path::Path;

use tracing::debug;

use crate::adapter::outbound::{
    ComposeRuntime, EnvFileSource, LayeredSource, ProcessEnvSource, SetupRunner,
};
use crate::application::{CommandDispatcher, ConfigStore};
use crate::error::ConfigError;
use crate::infrastructure::config::settings::Settings;

/// Dispatcher as assembled for the command line.
pub type FleetDispatcher = CommandDispatcher<LayeredSource, ComposeRuntime>;

/// Process environment first, then the env file.
pub fn build_source(env_file: &Path, required: bool) -> Result<LayeredSource, ConfigError> {
    let file = EnvFileSource::load(env_file, required)?;
    debug!(path = %env_file.display(), keys = file.len(), "key/value source ready");
    Ok(LayeredSource::new()
        .with_layer(ProcessEnvSource)
        .with_layer(file))
}

#[must_use]
pub fn build_runtime(settings: &Settings) -> ComposeRuntime {
    ComposeRuntime::new(&settings.compose_file, settings.services.clone())
        .with_program(&settings.runtime_program)
}

#[must_use]
pub fn build_dispatcher(settings: &Settings, source: LayeredSource) -> FleetDispatcher {
    CommandDispatcher::new(
        ConfigStore::new(source, settings.keys.clone()),
        build_runtime(settings),
        settings.project_prefix.clone(),
        settings.action_timeout(),
    )
}

#[must_use]
pub fn build_setup(settings: &Settings) -> SetupRunner {
    SetupRunner::new(settings.setup.command.clone())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::domain::DeviceIndex;

    #[test]
    fn dispatcher_uses_configured_prefix_and_env_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let env = dir.path().join("fleet.env");
        fs::write(
            &env,
            "GPUFLEET_BOOT_DEV_0=1\nGPUFLEET_BOOT_PORT_0=8190\n\
             GPUFLEET_BOOT_ADDR_0=0x52908400098527886E0F7030069857D2E4169EE7\n",
        )
        .expect("write env");

        let settings = Settings::parse_toml(
            r#"
project_prefix = "rig"

[keys]
device = "GPUFLEET_BOOT_DEV"
port = "GPUFLEET_BOOT_PORT"
address = "GPUFLEET_BOOT_ADDR"
"#,
        )
        .expect("settings");

        let source = build_source(&env, true).expect("source");
        let dispatcher = build_dispatcher(&settings, source);
        let index = DeviceIndex::new("0").expect("index");

        assert_eq!(dispatcher.namespace(&index).as_str(), "rig-0");
        let config = dispatcher.store().resolve(&index).expect("resolve");
        assert_eq!(config.device_binding, "1");
        assert_eq!(config.service_port, 8190);
    }

    #[test]
    fn missing_explicit_env_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(build_source(&dir.path().join("nope.env"), true).is_err());
    }
}
