use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::gemini::DEFAULT_BASE_URL;
use crate::session::FailedTurnPolicy;
use crate::types::Language;

/// Model used for each gateway operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub scenario: String,
    pub dialogue: String,
    pub evaluation: String,
    pub transcription: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            scenario: "gemini-2.5-flash".into(),
            dialogue: "gemini-2.5-flash".into(),
            evaluation: "gemini-2.5-pro".into(),
            transcription: "gemini-2.5-flash".into(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini_api_key: String,
    /// Language at startup; toggling at runtime is not written back.
    pub language: Language,
    pub models: ModelConfig,
    pub base_url: String,
    /// Captures of at most this many WAV bytes are treated as silence.
    pub min_audio_bytes: usize,
    pub failed_turn_policy: FailedTurnPolicy,
    /// Fixed seed for scenario diversity picks; random when absent.
    pub diversity_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            language: Language::default(),
            models: ModelConfig::default(),
            base_url: DEFAULT_BASE_URL.into(),
            min_audio_bytes: 1000,
            failed_turn_policy: FailedTurnPolicy::default(),
            diversity_seed: None,
        }
    }
}

impl Config {
    /// Directory: ~/.config/counsel-practice/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("counsel-practice");
        p
    }

    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::path());
        config.apply_env(|name| std::env::var(name).ok());
        config
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// `GEMINI_API_KEY` (or `API_KEY`) replaces the stored key;
    /// `COUNSEL_LANGUAGE` sets the starting language.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = var("GEMINI_API_KEY")
            .or_else(|| var("API_KEY"))
            .filter(|k| !k.trim().is_empty())
        {
            self.gemini_api_key = key.trim().to_string();
        }
        if let Some(language) = var("COUNSEL_LANGUAGE").and_then(|l| Language::parse(&l)) {
            self.language = language;
        }
    }

    /// Persist to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Write a default config file when none exists yet, so there is
    /// something to edit.
    pub fn ensure_file() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = Self::path();
        if !path.exists() {
            Self::default().save_to(&path)?;
            log::info!("Wrote default config to {}", path.display());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json"));
        assert_eq!(config, Config::default());
        assert_eq!(config.min_audio_bytes, 1000);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            gemini_api_key: "abc".into(),
            language: Language::Zh,
            failed_turn_policy: FailedTurnPolicy::RollBack,
            diversity_seed: Some(9),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn partial_and_invalid_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"language": "zh", "models": {"evaluation": "custom"}}"#).unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.language, Language::Zh);
        assert_eq!(config.models.evaluation, "custom");
        assert_eq!(config.models.scenario, ModelConfig::default().scenario);

        fs::write(&path, "not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn environment_overrides_key_and_language() {
        let env: HashMap<&str, &str> =
            HashMap::from([("API_KEY", " from-env "), ("COUNSEL_LANGUAGE", "zh")]);
        let mut config = Config::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.gemini_api_key, "from-env");
        assert_eq!(config.language, Language::Zh);

        let mut config = Config {
            gemini_api_key: "stored".into(),
            ..Config::default()
        };
        config.apply_env(|_| None);
        assert_eq!(config.gemini_api_key, "stored");
    }
}
