//! Key/value sources backed by env files and the process environment.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;
use crate::port::KeyValueSource;

/// Values parsed once from a dotenv-format file.
///
/// The file is read with `dotenvy` and never exported into the process
/// environment.
#[derive(Debug, Clone, Default)]
pub struct EnvFileSource {
    values: HashMap<String, String>,
}

impl EnvFileSource {
    /// Parse `path`.
    ///
    /// When `required` is false a missing file yields an empty source.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(dotenvy::Error::Io(e))
                if !required && e.kind() == std::io::ErrorKind::NotFound =>
            {
                debug!(path = %path.display(), "env file absent, using process environment only");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::ReadFile {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let mut values = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            values.insert(key, value);
        }
        debug!(path = %path.display(), keys = values.len(), "loaded env file");
        Ok(Self { values })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueSource for EnvFileSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Reads the orchestrator's own process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvSource;

impl KeyValueSource for ProcessEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Consults sources in order; the first one holding a key wins.
#[derive(Default)]
pub struct LayeredSource {
    layers: Vec<Box<dyn KeyValueSource>>,
}

impl LayeredSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_layer(mut self, layer: impl KeyValueSource + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }
}

impl KeyValueSource for LayeredSource {
    fn get(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn loads_dotenv_file_without_exporting() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "# fleet\nCUDA_DEVICE_0=0\nCOMFYUI_PORT_0=8188\nGPUFLEET_TEST_ONLY_KEY=\"quoted value\"\n",
        )
        .expect("write env");

        let source = EnvFileSource::load(&path, true).expect("load");
        assert_eq!(source.len(), 3);
        assert_eq!(source.get("CUDA_DEVICE_0").as_deref(), Some("0"));
        assert_eq!(
            source.get("GPUFLEET_TEST_ONLY_KEY").as_deref(),
            Some("quoted value")
        );
        assert!(std::env::var("GPUFLEET_TEST_ONLY_KEY").is_err());
    }

    #[test]
    fn missing_optional_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = EnvFileSource::load(&dir.path().join("absent.env"), false).expect("load");
        assert!(source.is_empty());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = EnvFileSource::load(&dir.path().join("absent.env"), true);
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn first_layer_wins() {
        let source = LayeredSource::new()
            .with_layer(EnvFileSource::from_pairs([("PORT_0", "9000")]))
            .with_layer(EnvFileSource::from_pairs([("PORT_0", "8188"), ("PORT_1", "8189")]));

        assert_eq!(source.get("PORT_0").as_deref(), Some("9000"));
        assert_eq!(source.get("PORT_1").as_deref(), Some("8189"));
        assert_eq!(source.get("PORT_2"), None);
    }
}
