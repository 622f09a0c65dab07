//! Per-index configuration resolution.

use crate::domain::{DeviceIndex, InstanceConfig};
use crate::error::ConfigError;
use crate::infrastructure::config::service::KeyScheme;
use crate::port::KeyValueSource;

/// Resolves [`InstanceConfig`] values from a flat key/value source.
///
/// Every call reads the source afresh; nothing is cached between indices.
pub struct ConfigStore<S> {
    source: S,
    keys: KeyScheme,
}

impl<S: KeyValueSource> ConfigStore<S> {
    pub fn new(source: S, keys: KeyScheme) -> Self {
        Self { source, keys }
    }

    /// Key names consulted for `index`, in resolution order.
    #[must_use]
    pub fn required_keys(&self, index: &DeviceIndex) -> [String; 3] {
        let raw = index.as_str();
        [
            self.keys.device_key(raw),
            self.keys.port_key(raw),
            self.keys.address_key(raw),
        ]
    }

    /// Resolve and validate the config for `index`.
    ///
    /// All three required keys must be present and non-empty; the first
    /// missing one is reported. Values are validated only once every key
    /// is present, so a config is never partially applied.
    pub fn resolve(&self, index: &DeviceIndex) -> Result<InstanceConfig, ConfigError> {
        let [device_key, port_key, address_key] = self.required_keys(index);

        let device_binding = self.required(&device_key)?;
        let port = self.required(&port_key)?;
        let account_address = self.required(&address_key)?;

        let service_port = parse_port(&port_key, &port)?;
        validate_address(&address_key, &account_address)?;

        Ok(InstanceConfig {
            device_binding,
            service_port,
            account_address,
            workload_names: self.workload_names(),
        })
    }

    /// Shared workload names; empty when the key is absent.
    #[must_use]
    pub fn workload_names(&self) -> Vec<String> {
        self.source
            .get(&self.keys.workloads)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        match self.source.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ConfigError::missing(key)),
        }
    }
}

fn parse_port(key: &str, raw: &str) -> Result<u16, ConfigError> {
    match raw.parse::<u16>() {
        Ok(0) => Err(ConfigError::invalid(key, "port must be between 1 and 65535")),
        Ok(port) => Ok(port),
        Err(_) => Err(ConfigError::invalid(
            key,
            format!("'{raw}' is not a port number"),
        )),
    }
}

fn validate_address(key: &str, raw: &str) -> Result<(), ConfigError> {
    let hex = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| ConfigError::invalid(key, "address must start with 0x"))?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::invalid(
            key,
            "address must be 0x followed by 40 hex digits",
        ));
    }
    Ok(())
}
