//! Key/value configuration source port.

use std::collections::HashMap;

/// Read-only lookup into a flat key/value store.
///
/// Implementations must be side-effect free; the config store calls
/// [`KeyValueSource::get`] once per key per index.
pub trait KeyValueSource: Send + Sync {
    /// Raw value for `key`, or `None` when absent.
    fn get(&self, key: &str) -> Option<String>;
}

impl KeyValueSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl<S: KeyValueSource + ?Sized> KeyValueSource for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<S: KeyValueSource + ?Sized> KeyValueSource for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}
