use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default quiet window before a changed snapshot is written.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default key namespace.
pub const DEFAULT_NAMESPACE: &str = "thicket";

/// Configuration for the persistence layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    /// Prefix for both storage keys, so several boards can share a medium.
    pub namespace: String,
    /// Quiet window in milliseconds; every change restarts it.
    pub debounce_ms: u64,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl PersistConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn keys(&self) -> StorageKeys {
        StorageKeys::new(&self.namespace)
    }
}

/// The two fixed slots this system owns on the storage medium.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    /// Serialized comment tree.
    pub comments: String,
    /// Serialized vote ledger.
    pub user_votes: String,
}

impl StorageKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            comments: format!("{namespace}:comments"),
            user_votes: format!("{namespace}:userVotes"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = PersistConfig::default();
        assert_eq!(c.namespace, "thicket");
        assert_eq!(c.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn keys_are_namespaced() {
        let keys = StorageKeys::new("demo");
        assert_eq!(keys.comments, "demo:comments");
        assert_eq!(keys.user_votes, "demo:userVotes");
        assert_eq!(PersistConfig::default().keys(), StorageKeys::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let c: PersistConfig = serde_json::from_str(r#"{"debounce_ms": 50}"#).unwrap();
        assert_eq!(c.debounce_ms, 50);
        assert_eq!(c.namespace, "thicket");
    }
}
