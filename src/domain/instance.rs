//! Resolved per-device instance configuration.

use serde::Serialize;

/// Bindings for one instance, resolved from the key/value source.
///
/// All required fields are non-empty by construction: the config store
/// never builds a partial `InstanceConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceConfig {
    /// Accelerator binding handed to the runtime (e.g. `"0"` or a GPU UUID).
    pub device_binding: String,
    /// Port the compute backend listens on.
    pub service_port: u16,
    /// Account address the worker reports results for.
    pub account_address: String,
    /// Workload names shared by every instance.
    pub workload_names: Vec<String>,
}

impl InstanceConfig {
    /// Environment bindings exported to the instance's runtime group.
    ///
    /// Only the spawned runtime process sees these; the orchestrator's own
    /// environment is never modified.
    #[must_use]
    pub fn env_bindings(&self) -> Vec<(&'static str, String)> {
        vec![
            ("DEVICE_BINDING", self.device_binding.clone()),
            ("COMFYUI_PORT", self.service_port.to_string()),
            ("ERC20_ADDRESS", self.account_address.clone()),
            ("WORKFLOW_NAMES", self.workload_names.join(",")),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_bindings_carry_every_field() {
        let config = InstanceConfig {
            device_binding: "2".into(),
            service_port: 8190,
            account_address: "0xabc".into(),
            workload_names: vec!["txt2img".into(), "img2vid".into()],
        };

        let env = config.env_bindings();
        assert!(env.contains(&("DEVICE_BINDING", "2".to_string())));
        assert!(env.contains(&("COMFYUI_PORT", "8190".to_string())));
        assert!(env.contains(&("ERC20_ADDRESS", "0xabc".to_string())));
        assert!(env.contains(&("WORKFLOW_NAMES", "txt2img,img2vid".to_string())));
    }
}
