use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest queue the relay will allocate between producers and the UI.
pub const MAX_QUEUE_CAPACITY: usize = 65_536;

/// Longest a toast may stay on screen (ten minutes).
pub const MAX_TOAST_DURATION_MS: u64 = 600_000;

/// Tuning for a single `MessageRelay`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Messages buffered between producers and the UI context before new ones are dropped
    pub queue_capacity: usize,
    /// Trace every enqueued message
    pub verbose_logging: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            verbose_logging: false,
        }
    }
}

impl RelayConfig {
    /// Set queue capacity
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Enable or disable per-message tracing
    pub fn with_verbose_logging(mut self, enabled: bool) -> Self {
        self.verbose_logging = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(RelayError::InvalidConfig(
                "Queue capacity must be greater than 0".to_string(),
            ));
        }

        if self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(RelayError::InvalidConfig(format!(
                "Queue capacity {} exceeds maximum of {}",
                self.queue_capacity, MAX_QUEUE_CAPACITY
            )));
        }

        Ok(())
    }
}

/// Application-level settings read by the front-ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_name: String,
    pub data_dir: PathBuf,
    /// How long a toast stays on screen
    pub toast_duration_ms: u64,
    pub relay: RelayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "hwrelay".to_string(),
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("hwrelay"),
            toast_duration_ms: 3000,
            relay: RelayConfig::default(),
        }
    }
}

impl Config {
    /// `<config dir>/hwrelay/config.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hwrelay")
            .join("config.json")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.toast_duration_ms == 0 {
            return Err(RelayError::InvalidConfig(
                "Toast duration must be greater than 0".to_string(),
            ));
        }

        if self.toast_duration_ms > MAX_TOAST_DURATION_MS {
            return Err(RelayError::InvalidConfig(format!(
                "Toast duration {}ms exceeds maximum of {}ms",
                self.toast_duration_ms, MAX_TOAST_DURATION_MS
            )));
        }
        self.relay.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("hwrelay-test-{}-{}", std::process::id(), name))
            .join("config.json")
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
        assert_eq!(RelayConfig::default().queue_capacity, 64);
    }

    #[test]
    fn test_relay_config_validation() {
        let zero = RelayConfig::default().with_queue_capacity(0);
        assert!(matches!(zero.validate(), Err(RelayError::InvalidConfig(_))));

        let huge = RelayConfig::default().with_queue_capacity(MAX_QUEUE_CAPACITY + 1);
        assert!(huge.validate().is_err());

        let ok = RelayConfig::default()
            .with_queue_capacity(MAX_QUEUE_CAPACITY)
            .with_verbose_logging(true);
        assert!(ok.validate().is_ok());
        assert!(ok.verbose_logging);
    }

    #[test]
    fn test_toast_duration_bounds() {
        let mut config = Config::default();
        config.toast_duration_ms = 0;
        assert!(config.validate().is_err());

        config.toast_duration_ms = MAX_TOAST_DURATION_MS;
        assert!(config.validate().is_ok());

        config.toast_duration_ms = u64::MAX;
        assert!(matches!(config.validate(), Err(RelayError::InvalidConfig(_))));
    }

    #[test]
    fn test_save_and_load() {
        let path = scratch_path("save-load");
        let mut config = Config::default();
        config.toast_duration_ms = 1500;
        config.relay = config.relay.with_queue_capacity(8);

        config.save_to_file(&path).unwrap();
        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = scratch_path("partial");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "relay": { "queue_capacity": 4 } }"#).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.relay.queue_capacity, 4);
        assert!(!loaded.relay.verbose_logging);
        assert_eq!(loaded.toast_duration_ms, 3000);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_errors() {
        let missing = scratch_path("missing");
        assert!(matches!(Config::load_from_file(&missing), Err(RelayError::Io(_))));
        assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default());

        let path = scratch_path("garbage");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load_from_file(&path), Err(RelayError::Json(_))));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
