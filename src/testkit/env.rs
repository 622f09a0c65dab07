//! Key/value fixtures.

use std::collections::HashMap;

/// A syntactically valid account address.
pub const ADDRESS: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

/// First port handed out by [`TestEnv::device`].
pub const BASE_PORT: u16 = 8188;

/// Builds a flat source using the default key names.
#[derive(Debug, Clone, Default)]
pub struct TestEnv {
    values: HashMap<String, String>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete entry for `index`: device `index`, port `BASE_PORT + n` for
    /// numeric indices, and [`ADDRESS`].
    #[must_use]
    pub fn device(self, index: &str) -> Self {
        let port = index
            .parse::<u16>()
            .ok()
            .and_then(|n| BASE_PORT.checked_add(n))
            .unwrap_or(BASE_PORT);
        self.set(format!("CUDA_DEVICE_{index}"), index)
            .set(format!("COMFYUI_PORT_{index}"), port.to_string())
            .set(format!("ERC20_ADDRESS_{index}"), ADDRESS)
    }

    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn remove(mut self, key: &str) -> Self {
        self.values.remove(key);
        self
    }

    pub fn build(self) -> HashMap<String, String> {
        self.values
    }

    /// Render as dotenv lines, sorted by key. Values are double-quoted so
    /// that spaces and commas survive parsing.
    pub fn to_dotenv(&self) -> String {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| format!("{key}=\"{}\"\n", quote(&self.values[key])))
            .collect()
    }
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
