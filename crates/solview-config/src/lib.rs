//! Configuration management for solview.
//!
//! Parses `solview.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `diagrams.kroki_url` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! ## Example
//!
//! ```toml
//! [code]
//! fallback_language = "python"
//!
//! [diagrams]
//! mode = "rich"
//! kroki_url = "${KROKI_URL:-https://kroki.io}"
//! theme = "default"
//! security_level = "loose"
//! timeout_secs = 30
//! ```

mod expand;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "solview.toml";

/// Language tag assumed for code without a fence tag.
pub const DEFAULT_FALLBACK_LANGUAGE: &str = "python";

/// Default diagram engine theme.
pub const DEFAULT_THEME: &str = "default";

/// Default diagram engine font family.
pub const DEFAULT_FONT_FAMILY: &str = "Arial, sans-serif";

/// Default HTTP timeout for the Kroki engine, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override diagram display mode.
    pub mode: Option<DiagramMode>,
    /// Override Kroki URL for rich diagram rendering.
    pub kroki_url: Option<String>,
    /// Override fallback code language.
    pub fallback_language: Option<String>,
}

/// How flowcharts are turned into a diagram view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramMode {
    /// Parse node declarations into a step list (no engine needed).
    #[default]
    Structural,
    /// Render through an external diagram engine, with raw-source fallback.
    Rich,
}

/// Input-safety mode requested from the diagram engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    /// Escape labels and disable click handlers.
    Strict,
    /// Allow HTML labels; for trusted same-origin content.
    #[default]
    Loose,
    /// Allow HTML labels but strip scripts.
    Antiscript,
    /// Render inside a sandboxed frame.
    Sandbox,
}

impl SecurityLevel {
    /// Return level as the engine's configuration value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Loose => "loose",
            Self::Antiscript => "antiscript",
            Self::Sandbox => "sandbox",
        }
    }
}

impl DiagramMode {
    /// Return mode as string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Rich => "rich",
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Code block configuration.
    pub code: CodeConfig,
    /// Diagram configuration as parsed from TOML.
    diagrams: DiagramsConfigRaw,

    /// Resolved diagrams configuration (set after loading).
    #[serde(skip)]
    pub diagrams_resolved: DiagramsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Code block configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    /// Language tag used when a snippet carries none.
    pub fallback_language: String,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            fallback_language: DEFAULT_FALLBACK_LANGUAGE.to_owned(),
        }
    }
}

/// Raw diagrams configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiagramsConfigRaw {
    mode: Option<DiagramMode>,
    kroki_url: Option<String>,
    theme: Option<String>,
    font_family: Option<String>,
    security_level: Option<SecurityLevel>,
    timeout_secs: Option<u64>,
}

/// Resolved diagram configuration.
#[derive(Debug, Clone)]
pub struct DiagramsConfig {
    /// Display mode for flowcharts.
    pub mode: DiagramMode,
    /// Kroki server URL. `None` leaves the rich path without an engine.
    pub kroki_url: Option<String>,
    /// Engine theme name.
    pub theme: String,
    /// Engine font family.
    pub font_family: String,
    /// Engine input-safety mode.
    pub security_level: SecurityLevel,
    /// HTTP timeout for engine requests.
    pub timeout: Duration,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            mode: DiagramMode::default(),
            kroki_url: None,
            theme: DEFAULT_THEME.to_owned(),
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            security_level: SecurityLevel::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.kroki_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `solview.toml` in current directory and parents.
    /// Without any file, defaults are used.
    ///
    /// CLI settings are applied last and take precedence over file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(mode) = settings.mode {
            self.diagrams_resolved.mode = mode;
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams_resolved.kroki_url = Some(kroki_url.clone());
        }
        if let Some(language) = &settings.fallback_language {
            self.code.fallback_language.clone_from(language);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.resolve();
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_code()?;
        self.validate_diagrams()?;
        Ok(())
    }

    fn validate_code(&self) -> Result<(), ConfigError> {
        let language = &self.code.fallback_language;
        require_non_empty(language, "code.fallback_language")?;
        if language.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "code.fallback_language must be a single token".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        let diagrams = &self.diagrams_resolved;

        if let Some(ref kroki_url) = diagrams.kroki_url {
            require_non_empty(kroki_url, "diagrams.kroki_url")?;
            require_http_url(kroki_url, "diagrams.kroki_url")?;
        }
        require_non_empty(&diagrams.theme, "diagrams.theme")?;
        require_non_empty(&diagrams.font_family, "diagrams.font_family")?;

        if diagrams.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.diagrams.kroki_url {
            self.diagrams.kroki_url = Some(expand::expand_env(url, "diagrams.kroki_url")?);
        }
        Ok(())
    }

    /// Fill the resolved diagrams section from raw values and defaults.
    fn resolve(&mut self) {
        let raw = std::mem::take(&mut self.diagrams);
        let defaults = DiagramsConfig::default();
        self.diagrams_resolved = DiagramsConfig {
            mode: raw.mode.unwrap_or(defaults.mode),
            kroki_url: raw.kroki_url.map(|url| url.trim_end_matches('/').to_owned()),
            theme: raw.theme.unwrap_or(defaults.theme),
            font_family: raw.font_family.unwrap_or(defaults.font_family),
            security_level: raw.security_level.unwrap_or(defaults.security_level),
            timeout: raw
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(toml: &str) -> Config {
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.code.fallback_language, "python");
        assert_eq!(config.diagrams_resolved.mode, DiagramMode::Structural);
        assert!(config.diagrams_resolved.kroki_url.is_none());
        assert_eq!(config.diagrams_resolved.theme, "default");
        assert_eq!(config.diagrams_resolved.font_family, "Arial, sans-serif");
        assert_eq!(config.diagrams_resolved.security_level, SecurityLevel::Loose);
        assert_eq!(config.diagrams_resolved.timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse("");
        assert_eq!(config.code.fallback_language, "python");
        assert_eq!(config.diagrams_resolved.mode, DiagramMode::Structural);
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r#"
[code]
fallback_language = "rust"

[diagrams]
mode = "rich"
kroki_url = "https://kroki.example.com/"
theme = "forest"
font_family = "Inter"
security_level = "strict"
timeout_secs = 5
"#,
        );
        assert_eq!(config.code.fallback_language, "rust");
        let diagrams = &config.diagrams_resolved;
        assert_eq!(diagrams.mode, DiagramMode::Rich);
        assert_eq!(
            diagrams.kroki_url.as_deref(),
            Some("https://kroki.example.com")
        );
        assert_eq!(diagrams.theme, "forest");
        assert_eq!(diagrams.font_family, "Inter");
        assert_eq!(diagrams.security_level, SecurityLevel::Strict);
        assert_eq!(diagrams.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let result: Result<Config, _> = toml::from_str("[diagrams]\nmode = \"fancy\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_kroki_url() {
        let config = parse("[diagrams]\nkroki_url = \"kroki.io\"\n");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("diagrams.kroki_url"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = parse("[diagrams]\ntimeout_secs = 0\n");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_multi_word_language() {
        let config = parse("[code]\nfallback_language = \"plain text\"\n");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("code.fallback_language"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let overrides = CliSettings {
            mode: Some(DiagramMode::Rich),
            kroki_url: Some("http://localhost:8000".to_owned()),
            fallback_language: None,
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.diagrams_resolved.mode, DiagramMode::Rich);
        assert_eq!(
            config.diagrams_resolved.kroki_url.as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(config.code.fallback_language, "python"); // Unchanged
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/solview.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_sets_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("solview.toml");
        std::fs::write(&path, "[diagrams]\nmode = \"rich\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.diagrams_resolved.mode, DiagramMode::Rich);
    }

    #[test]
    fn test_load_cli_settings_override_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("solview.toml");
        std::fs::write(&path, "[code]\nfallback_language = \"java\"\n").unwrap();
        let settings = CliSettings {
            fallback_language: Some("go".to_owned()),
            ..Default::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.code.fallback_language, "go");
    }

    #[test]
    fn test_load_validates_cli_settings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("solview.toml");
        std::fs::write(&path, "").unwrap();
        let settings = CliSettings {
            kroki_url: Some("ftp://kroki".to_owned()),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_unknown_security_level_is_parse_error() {
        let result: Result<Config, _> =
            toml::from_str("[diagrams]\nsecurity_level = \"open\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_security_level_as_str() {
        assert_eq!(SecurityLevel::Strict.as_str(), "strict");
        assert_eq!(SecurityLevel::Loose.as_str(), "loose");
        assert_eq!(SecurityLevel::Antiscript.as_str(), "antiscript");
        assert_eq!(SecurityLevel::Sandbox.as_str(), "sandbox");
    }

    #[test]
    fn test_diagram_mode_as_str() {
        assert_eq!(DiagramMode::Structural.as_str(), "structural");
        assert_eq!(DiagramMode::Rich.as_str(), "rich");
    }
}
