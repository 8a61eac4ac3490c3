use crate::defaults;
use crate::error::{OffscribeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub log: LogConfig,
}

/// Speech engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub backend: Backend,
    pub model_path: Option<PathBuf>,
    /// Whisper only
    pub language: String,
    /// Whisper only
    pub threads: Option<usize>,
    /// Vosk only: include word timings
    pub words: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. "info" or "offscribe=debug"
    pub level: String,
}

/// Engine backend enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Vosk,
    Whisper,
    /// Test backend: reads audio bytes as UTF-8 text. Not a recognizer.
    Mock,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Vosk => "vosk",
            Backend::Whisper => "whisper",
            Backend::Mock => "mock",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Backend {
    type Err = OffscribeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vosk" => Ok(Backend::Vosk),
            "whisper" => Ok(Backend::Whisper),
            "mock" => Ok(Backend::Mock),
            other => Err(OffscribeError::ConfigInvalidValue {
                key: "engine.backend".to_string(),
                message: format!("unknown backend '{other}' (expected vosk or whisper)"),
            }),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Vosk,
            model_path: None,
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            threads: None,
            words: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: defaults::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is unreadable or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(OffscribeError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - OFFSCRIBE_MODEL → engine.model_path
    /// - OFFSCRIBE_BACKEND → engine.backend
    /// - OFFSCRIBE_LANGUAGE → engine.language
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(model) = std::env::var("OFFSCRIBE_MODEL")
            && !model.is_empty()
        {
            self.engine.model_path = Some(PathBuf::from(model));
        }

        if let Ok(backend) = std::env::var("OFFSCRIBE_BACKEND")
            && !backend.is_empty()
        {
            self.engine.backend = backend.parse()?;
        }

        if let Ok(language) = std::env::var("OFFSCRIBE_LANGUAGE")
            && !language.is_empty()
        {
            self.engine.language = language;
        }

        Ok(self)
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if self.engine.threads == Some(0) {
            return Err(OffscribeError::ConfigInvalidValue {
                key: "engine.threads".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.engine.language.trim().is_empty() {
            return Err(OffscribeError::ConfigInvalidValue {
                key: "engine.language".to_string(),
                message: "must not be empty (use \"auto\" to detect)".to_string(),
            });
        }
        if self.log.level.trim().is_empty() {
            return Err(OffscribeError::ConfigInvalidValue {
                key: "log.level".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Serialize the effective configuration.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| OffscribeError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/offscribe/config.toml on Linux, or `None` if the
    /// platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("offscribe").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_offscribe_env() {
        remove_env("OFFSCRIBE_MODEL");
        remove_env("OFFSCRIBE_BACKEND");
        remove_env("OFFSCRIBE_LANGUAGE");
    }

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.engine.backend, Backend::Vosk);
        assert_eq!(config.engine.model_path, None);
        assert_eq!(config.engine.language, "auto");
        assert_eq!(config.engine.threads, None);
        assert!(!config.engine.words);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_file = write_config(
            r#"
            [engine]
            backend = "whisper"
            model_path = "/models/ggml-base.en.bin"
            language = "en"
            threads = 4
            words = true

            [log]
            level = "debug"
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.engine.backend, Backend::Whisper);
        assert_eq!(
            config.engine.model_path,
            Some(PathBuf::from("/models/ggml-base.en.bin"))
        );
        assert_eq!(config.engine.language, "en");
        assert_eq!(config.engine.threads, Some(4));
        assert!(config.engine.words);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let temp_file = write_config(
            r#"
            [engine]
            model_path = "/models/en-small"
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(
            config.engine.model_path,
            Some(PathBuf::from("/models/en-small"))
        );
        assert_eq!(config.engine.backend, Backend::Vosk);
        assert_eq!(config.engine.language, "auto");
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let temp_file = write_config(
            r#"
            [engine]
            backend = "deepspeech"
        "#,
        );
        assert!(matches!(
            Config::load(temp_file.path()),
            Err(OffscribeError::Config(_))
        ));
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("vosk".parse::<Backend>().unwrap(), Backend::Vosk);
        assert_eq!(" Whisper ".parse::<Backend>().unwrap(), Backend::Whisper);
        assert_eq!("mock".parse::<Backend>().unwrap(), Backend::Mock);
        assert!(matches!(
            "kaldi".parse::<Backend>(),
            Err(OffscribeError::ConfigInvalidValue { .. })
        ));
        assert_eq!(Backend::Whisper.to_string(), "whisper");
    }

    #[test]
    fn test_env_override_model_and_backend() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_offscribe_env();

        set_env("OFFSCRIBE_MODEL", "/models/en-small");
        set_env("OFFSCRIBE_BACKEND", "mock");
        let config = Config::default().with_env_overrides().unwrap();

        assert_eq!(
            config.engine.model_path,
            Some(PathBuf::from("/models/en-small"))
        );
        assert_eq!(config.engine.backend, Backend::Mock);
        assert_eq!(config.engine.language, "auto"); // Not overridden

        clear_offscribe_env();
    }

    #[test]
    fn test_env_override_language() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_offscribe_env();

        set_env("OFFSCRIBE_LANGUAGE", "de");
        let config = Config::default().with_env_overrides().unwrap();
        assert_eq!(config.engine.language, "de");

        clear_offscribe_env();
    }

    #[test]
    fn test_env_override_invalid_backend() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_offscribe_env();

        set_env("OFFSCRIBE_BACKEND", "nope");
        let result = Config::default().with_env_overrides();
        assert!(result.is_err());

        clear_offscribe_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_offscribe_env();

        set_env("OFFSCRIBE_MODEL", "");
        let config = Config::default().with_env_overrides().unwrap();

        // Empty string should not override default
        assert_eq!(config.engine.model_path, None);

        clear_offscribe_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let temp_file = write_config(
            r#"
            [engine
            backend = "broken
        "#,
        );

        let result = Config::load(temp_file.path());
        assert!(matches!(result, Err(OffscribeError::Config(_))));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_offscribe_config_12345.toml");
        let config = Config::load_or_default(missing_path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_errors_on_invalid_toml() {
        let temp_file = write_config("[engine\n");
        assert!(Config::load_or_default(temp_file.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_threads() {
        let mut config = Config::default();
        config.engine.threads = Some(0);
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("engine.threads"));
    }

    #[test]
    fn test_validate_rejects_empty_language() {
        let mut config = Config::default();
        config.engine.language = "  ".to_string();
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip_of_effective_config() {
        let mut config = Config::default();
        config.engine.model_path = Some(PathBuf::from("/models/en-small"));
        config.engine.threads = Some(2);

        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("backend = \"vosk\""));
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_default_path_is_xdg_compliant() {
        if let Some(path) = Config::default_path() {
            let path_str = path.to_string_lossy();
            assert!(path_str.contains("offscribe"));
            assert!(path_str.ends_with("config.toml"));
        }
    }
}
