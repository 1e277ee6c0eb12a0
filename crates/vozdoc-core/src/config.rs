use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VozdocError};

/// Top-level configuration for the VozDoc application.
///
/// Loaded from `~/.vozdoc/config.toml` by default. Each section corresponds
/// to a bounded context or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VozdocConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub dictation: DictationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl VozdocConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VozdocConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VozdocError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// BCP-47 language tag for recognition and synthesis.
    pub lang: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            lang: "es-ES".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Recognition lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Restart the recognizer under the same mode after an unsolicited end
    /// event (the engine times out on silence). This is the sole retry
    /// mechanism in the system.
    pub auto_restart: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self { auto_restart: true }
    }
}

/// Dictation buffer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    /// Maximum number of undo snapshots retained per dictation surface.
    pub undo_depth: usize,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self { undo_depth: 20 }
    }
}

/// Draft and document persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON record files.
    pub data_dir: String,
    /// Maximum number of mail drafts kept (oldest discarded past the cap).
    pub draft_limit: usize,
    /// Maximum number of saved documents kept.
    pub document_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.vozdoc/data".to_string(),
            draft_limit: 10,
            document_limit: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VozdocConfig::default();
        assert_eq!(config.general.lang, "es-ES");
        assert!(config.recognition.auto_restart);
        assert_eq!(config.dictation.undo_depth, 20);
        assert_eq!(config.storage.draft_limit, 10);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = VozdocConfig::default();
        config.general.lang = "es-MX".to_string();
        config.recognition.auto_restart = false;
        config.save(&path).unwrap();

        let loaded = VozdocConfig::load(&path).unwrap();
        assert_eq!(loaded.general.lang, "es-MX");
        assert!(!loaded.recognition.auto_restart);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = VozdocConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.lang, "es-ES");
    }

    #[test]
    fn test_partial_config_parses() {
        let config: VozdocConfig = toml::from_str("[general]\nlang = \"es-AR\"\n").unwrap();
        assert_eq!(config.general.lang, "es-AR");
        assert!(config.recognition.auto_restart);
    }
}
