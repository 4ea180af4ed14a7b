use std::collections::HashMap;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use thiserror::Error;

use crate::forge::github::DEFAULT_API_URL;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Set the GITHUB_TOKEN environment variable to a personal access token created at https://github.com/settings/tokens")]
    MissingToken,
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Unable to create the GitHub client: {0}")]
    Client(#[from] crate::forge::github::ClientError),
    #[error("Unable to determine the current directory: {0}")]
    WorkingDirectory(std::io::Error),
}

/// Settings read from the environment once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct BumpConfig {
    pub token: String,
    pub api_url: String,
}

impl std::fmt::Debug for BumpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BumpConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl BumpConfig {
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::from_raw(RawConfig::load(None)?)
    }

    fn from_raw(raw_config: RawConfig) -> Result<Self, ConfigurationError> {
        let token = raw_config
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigurationError::MissingToken)?;

        Ok(Self {
            token,
            api_url: raw_config
                .api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    token: Option<String>,
    api_url: Option<String>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("GITHUB")
                    .prefix_separator("_")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn load_empty() {
        let env = HashMap::from([]);
        let config = RawConfig::load(Some(env)).unwrap();
        assert_eq!(
            config,
            RawConfig {
                token: None,
                api_url: None
            }
        );
        assert!(matches!(
            BumpConfig::from_raw(config),
            Err(ConfigurationError::MissingToken)
        ));
    }

    #[test]
    fn load_environment() {
        let env = HashMap::from([
            ("GITHUB_TOKEN".to_owned(), "ghp_secret".to_owned()),
            (
                "GITHUB_API_URL".to_owned(),
                "https://github.example.com/api/v3".to_owned(),
            ),
            ("GITHUB_ACTIONS".to_owned(), "true".to_owned()),
        ]);
        let config = BumpConfig::from_raw(RawConfig::load(Some(env)).unwrap()).unwrap();
        assert_eq!(
            config,
            BumpConfig {
                token: "ghp_secret".to_owned(),
                api_url: "https://github.example.com/api/v3".to_owned(),
            }
        );
        assert!(!format!("{config:?}").contains("ghp_secret"));
    }

    #[test]
    fn blank_token_is_missing() {
        let env = HashMap::from([("GITHUB_TOKEN".to_owned(), "  ".to_owned())]);
        let config = BumpConfig::from_raw(RawConfig::load(Some(env)).unwrap());
        assert!(matches!(config, Err(ConfigurationError::MissingToken)));
    }

    #[test]
    fn default_api_url() {
        let env = HashMap::from([("GITHUB_TOKEN".to_owned(), "t".to_owned())]);
        let config = BumpConfig::from_raw(RawConfig::load(Some(env)).unwrap()).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
