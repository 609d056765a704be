use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::llm::{Credentials, Provider};

const CONFIG_FILE: &str = ".tsc-fixer.toml";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_TSCONFIG: &str = "tsconfig.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing API key for provider \"{provider}\". Set `llm.{setting}` in .tsc-fixer.toml or the {env} environment variable.")]
    MissingApiKey {
        provider: Provider,
        setting: &'static str,
        env: &'static str,
    },
}

/// Top-level configuration loaded from .tsc-fixer.toml.
/// All fields are optional; the tool works with zero config when an API key
/// is present in the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fixer: FixerConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixerConfig {
    /// Fix attempts before giving up (default 3)
    pub max_retries: Option<u32>,
    /// Project config handed to tsc (default tsconfig.json)
    pub tsconfig_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmConfig {
    pub provider: Option<Provider>,
    /// Model override; the provider default is used otherwise
    pub model: Option<String>,
    /// If None, falls back to ANTHROPIC_API_KEY
    pub anthropic_api_key: Option<String>,
    /// If None, falls back to OPENAI_API_KEY
    pub openai_api_key: Option<String>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_retries: Option<u32>,
    pub tsconfig_path: Option<PathBuf>,
    pub provider: Option<Provider>,
    pub model: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub max_retries: u32,
    pub tsconfig_path: PathBuf,
    pub provider: Provider,
    pub credentials: Credentials,
}

impl Config {
    /// Load configuration from .tsc-fixer.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if config.llm.anthropic_api_key.is_none() {
            config.llm.anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        if config.llm.openai_api_key.is_none() {
            config.llm.openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Merge command-line overrides and pick the credentials for the chosen provider.
    pub fn resolve(self, overrides: Overrides) -> Result<Settings, ConfigError> {
        let provider = overrides
            .provider
            .or(self.llm.provider)
            .unwrap_or_default();

        let (api_key, setting, env) = match provider {
            Provider::Anthropic => (
                self.llm.anthropic_api_key,
                "anthropic_api_key",
                "ANTHROPIC_API_KEY",
            ),
            Provider::OpenAi => (self.llm.openai_api_key, "openai_api_key", "OPENAI_API_KEY"),
        };
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey {
                provider,
                setting,
                env,
            })?;

        Ok(Settings {
            max_retries: overrides
                .max_retries
                .or(self.fixer.max_retries)
                .unwrap_or(DEFAULT_MAX_RETRIES),
            tsconfig_path: overrides
                .tsconfig_path
                .or(self.fixer.tsconfig_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TSCONFIG)),
            provider,
            credentials: Credentials {
                api_key,
                model: overrides.model.or(self.llm.model),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_keys() -> Config {
        let mut config = Config::default();
        config.llm.anthropic_api_key = Some("ant-key".to_string());
        config.llm.openai_api_key = Some("oai-key".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.fixer.max_retries.is_none());
        assert!(config.fixer.tsconfig_path.is_none());
        assert!(config.llm.provider.is_none());
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[fixer]
max_retries = 5
tsconfig_path = "packages/web/tsconfig.json"

[llm]
provider = "openai"
model = "gpt-4o-mini"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.fixer.max_retries, Some(5));
        assert_eq!(
            config.fixer.tsconfig_path,
            Some(PathBuf::from("packages/web/tsconfig.json"))
        );
        assert_eq!(config.llm.provider, Some(Provider::OpenAi));
        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[fixer]\nmax_retries = 1\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.fixer.max_retries, Some(1));
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[llm]\nprovider = \"gemini\"\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = with_keys().resolve(Overrides::default()).unwrap();
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.tsconfig_path, PathBuf::from("tsconfig.json"));
        assert_eq!(settings.provider, Provider::Anthropic);
        assert_eq!(settings.credentials.api_key, "ant-key");
        assert!(settings.credentials.model.is_none());
    }

    #[test]
    fn test_resolve_overrides_win() {
        let mut config = with_keys();
        config.fixer.max_retries = Some(7);
        config.llm.model = Some("from-file".to_string());

        let settings = config
            .resolve(Overrides {
                max_retries: Some(2),
                tsconfig_path: Some(PathBuf::from("tsconfig.build.json")),
                provider: Some(Provider::OpenAi),
                model: Some("from-cli".to_string()),
            })
            .unwrap();

        assert_eq!(settings.max_retries, 2);
        assert_eq!(settings.tsconfig_path, PathBuf::from("tsconfig.build.json"));
        assert_eq!(settings.provider, Provider::OpenAi);
        assert_eq!(settings.credentials.api_key, "oai-key");
        assert_eq!(settings.credentials.model.as_deref(), Some("from-cli"));
    }

    #[test]
    fn test_resolve_missing_key() {
        let mut config = Config::default();
        config.llm.provider = Some(Provider::OpenAi);
        config.llm.anthropic_api_key = Some("ant-key".to_string());

        let err = config.resolve(Overrides::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("OpenAI"));
        assert!(message.contains("openai_api_key"));
        assert!(message.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_resolve_blank_key_is_missing() {
        let mut config = Config::default();
        config.llm.anthropic_api_key = Some("   ".to_string());
        assert!(matches!(
            config.resolve(Overrides::default()),
            Err(ConfigError::MissingApiKey { .. })
        ));
    }
}
