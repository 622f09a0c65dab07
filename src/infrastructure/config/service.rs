//! Service naming, key scheme, and setup command configuration.

use serde::Deserialize;

use crate::domain::ServiceRole;

/// Compose service names backing each role.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub compute: String,
    pub worker: String,
}

impl ServicesConfig {
    /// Compose service name for `role`.
    #[must_use]
    pub fn name(&self, role: ServiceRole) -> &str {
        match role {
            ServiceRole::Compute => &self.compute,
            ServiceRole::Worker => &self.worker,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            compute: "comfyui".into(),
            worker: "miner".into(),
        }
    }
}

/// Base key names in the key/value source.
///
/// Per-index keys are `<base>_<index>`; the workloads key is shared.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyScheme {
    pub device: String,
    pub port: String,
    pub address: String,
    pub workloads: String,
}

impl KeyScheme {
    #[must_use]
    pub fn device_key(&self, index: &str) -> String {
        format!("{}_{index}", self.device)
    }

    #[must_use]
    pub fn port_key(&self, index: &str) -> String {
        format!("{}_{index}", self.port)
    }

    #[must_use]
    pub fn address_key(&self, index: &str) -> String {
        format!("{}_{index}", self.address)
    }
}

impl Default for KeyScheme {
    fn default() -> Self {
        Self {
            device: "CUDA_DEVICE".into(),
            port: "COMFYUI_PORT".into(),
            address: "ERC20_ADDRESS".into(),
            workloads: "WORKFLOW_NAMES".into(),
        }
    }
}

/// One-time installation command run by `setup`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Program and arguments, executed without a shell.
    pub command: Vec<String>,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "docker".into(),
                "compose".into(),
                "run".into(),
                "--rm".into(),
                "setup".into(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_suffixed_with_index() {
        let keys = KeyScheme::default();
        assert_eq!(keys.device_key("0"), "CUDA_DEVICE_0");
        assert_eq!(keys.port_key("01"), "COMFYUI_PORT_01");
        assert_eq!(keys.address_key("3"), "ERC20_ADDRESS_3");
    }

    #[test]
    fn roles_map_to_service_names() {
        let services = ServicesConfig::default();
        assert_eq!(services.name(ServiceRole::Compute), "comfyui");
        assert_eq!(services.name(ServiceRole::Worker), "miner");
    }
}
