//! Configuration for promptlift
//!
//! Configuration is discovered from a TOML file (`promptlift.toml` in the
//! working directory, or an explicit path) with environment-variable
//! overrides for the provider and model. API keys are never stored in the
//! file; each provider table names the environment variable that holds its
//! key (`api_key_env`).

use promptlift_utils::LiftError;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "promptlift.toml";

/// Top-level configuration model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Engine tuning
    #[serde(default)]
    pub engine: EngineConfig,
}

/// `[llm]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmConfig {
    /// Provider name; defaults to `anthropic`
    pub provider: Option<String>,
    /// `[llm.anthropic]` provider table
    pub anthropic: Option<AnthropicConfig>,
}

/// `[llm.anthropic]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicConfig {
    /// Override for the Messages API endpoint
    pub base_url: Option<String>,
    /// Environment variable holding the API key (default `ANTHROPIC_API_KEY`)
    pub api_key_env: Option<String>,
    /// Model name; required to construct the backend
    pub model: Option<String>,
    /// Per-response token cap
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// `[engine]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Hard iteration cap for one orchestration run
    pub max_steps: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_steps: None }
    }
}

impl Config {
    /// Load configuration from an explicit TOML file.
    ///
    /// # Errors
    ///
    /// Returns `LiftError::Config` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, LiftError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LiftError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| LiftError::Config(format!("invalid {}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Discover configuration: explicit path if given, then
    /// `promptlift.toml` in the working directory, then built-in defaults.
    ///
    /// Environment overrides (`PROMPTLIFT_PROVIDER`, `PROMPTLIFT_MODEL`) are
    /// applied on top of whatever was loaded.
    ///
    /// # Errors
    ///
    /// Returns `LiftError::Config` only when an explicitly named file is
    /// unreadable or malformed; a missing default file is not an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, LiftError> {
        let mut config = if let Some(path) = explicit {
            Self::from_file(path)?
        } else {
            let default = Path::new(CONFIG_FILE_NAME);
            if default.exists() {
                Self::from_file(default)?
            } else {
                Self::default()
            }
        };

        if let Ok(provider) = std::env::var("PROMPTLIFT_PROVIDER") {
            config.llm.provider = Some(provider);
        }
        if let Ok(model) = std::env::var("PROMPTLIFT_MODEL") {
            config
                .llm
                .anthropic
                .get_or_insert_with(AnthropicConfig::empty)
                .model = Some(model);
        }

        Ok(config)
    }

    /// Effective provider name.
    #[must_use]
    pub fn provider(&self) -> &str {
        self.llm.provider.as_deref().unwrap_or("anthropic")
    }

    /// Minimal configuration for tests: mock-friendly, no file IO.
    #[must_use]
    pub fn minimal_for_testing() -> Self {
        Self {
            llm: LlmConfig {
                provider: Some("anthropic".to_string()),
                anthropic: Some(AnthropicConfig {
                    base_url: None,
                    api_key_env: Some("PROMPTLIFT_TEST_API_KEY".to_string()),
                    model: Some("claude-haiku-test".to_string()),
                    max_tokens: Some(1024),
                    temperature: Some(0.2),
                    timeout_secs: Some(30),
                }),
            },
            engine: EngineConfig::default(),
        }
    }
}

impl AnthropicConfig {
    fn empty() -> Self {
        Self {
            base_url: None,
            api_key_env: None,
            model: None,
            max_tokens: None,
            temperature: None,
            timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_full_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[llm]
provider = "anthropic"

[llm.anthropic]
model = "claude-sonnet"
max_tokens = 2048
temperature = 0.3
timeout_secs = 60

[engine]
max_steps = 12
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.provider(), "anthropic");
        let anthropic = config.llm.anthropic.unwrap();
        assert_eq!(anthropic.model.as_deref(), Some("claude-sonnet"));
        assert_eq!(anthropic.max_tokens, Some(2048));
        assert_eq!(config.engine.max_steps, Some(12));
    }

    #[test]
    fn defaults_apply_when_sections_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.provider(), "anthropic");
        assert!(config.llm.anthropic.is_none());
        assert!(config.engine.max_steps.is_none());
    }

    #[test]
    fn malformed_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[llm\nprovider=").unwrap();

        let result = Config::from_file(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn minimal_for_testing_is_complete() {
        let config = Config::minimal_for_testing();
        assert_eq!(config.provider(), "anthropic");
        let anthropic = config.llm.anthropic.unwrap();
        assert!(anthropic.model.is_some());
        assert!(anthropic.api_key_env.is_some());
    }
}
