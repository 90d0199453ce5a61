use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::dns::resolver::{DEFAULT_RESOLVER, DEFAULT_TIMEOUT};
use crate::io::validation::validate_resolver;
use crate::provider::ProviderError;
use crate::provider::cloudflare::{CloudflareClient, Credentials};

pub const DEFAULT_CONFIG_PATH: &str = "./cloudflare-rdns.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[derive(Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub use_token: bool,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub key: String,
    pub resolver: Option<String>,
    pub timeout_secs: Option<u64>,
    pub api_base_url: Option<String>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.display().to_string(), e.to_string()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(resolver) = &self.resolver {
            validate_resolver(resolver).map_err(ConfigError::Validation)?;
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn resolver(&self) -> SocketAddr {
        self.resolver
            .as_deref()
            .and_then(|resolver| validate_resolver(resolver).ok())
            .unwrap_or(DEFAULT_RESOLVER)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }

    /// Selects bearer-token or global-key auth according to `use_token`.
    pub fn credentials(&self) -> Result<Credentials, ProviderError> {
        if self.use_token {
            Credentials::token(&self.api_token)
        } else {
            Credentials::global_key(&self.email, &self.key)
        }
    }

    pub fn build_client(&self) -> Result<CloudflareClient, ProviderError> {
        let credentials = self.credentials()?;
        match &self.api_base_url {
            Some(base_url) => CloudflareClient::with_base_url(credentials, base_url.as_str()),
            None => CloudflareClient::new(credentials),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |secret: &str| if secret.is_empty() { "" } else { "<REDACTED>" };
        f.debug_struct("Config")
            .field("use_token", &self.use_token)
            .field("api_token", &redact(&self.api_token))
            .field("email", &self.email)
            .field("key", &redact(&self.key))
            .field("resolver", &self.resolver)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_token_config() {
        let file = write_config(
            r#"
use_token = true
api_token = "abc123"
"#,
        );

        let config = Config::load(file.path()).unwrap();

        assert!(config.use_token);
        assert_eq!(config.credentials().unwrap(), Credentials::Token("abc123".to_owned()));
        assert_eq!(config.resolver(), DEFAULT_RESOLVER);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_load_global_key_config_with_overrides() {
        let file = write_config(
            r#"
use_token = false
email = "admin@example.com"
key = "global"
resolver = "9.9.9.9"
timeout_secs = 2
api_base_url = "http://127.0.0.1:8080"
"#,
        );

        let config = Config::load(file.path()).unwrap();

        assert_eq!(
            config.credentials().unwrap(),
            Credentials::GlobalKey {
                email: "admin@example.com".to_owned(),
                key: "global".to_owned(),
            }
        );
        assert_eq!(config.resolver().to_string(), "9.9.9.9:53");
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("absent.toml"));

        assert!(matches!(result, Err(ConfigError::FileRead(..))));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("use_token = \"maybe");
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(matches!(
            Config::parse("api_tokn = \"typo\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_resolver_and_timeout() {
        assert!(matches!(
            Config::parse("resolver = \"dns.example\""),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            Config::parse("timeout_secs = 0"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_credentials() {
        let config = Config::parse("use_token = true").unwrap();
        assert!(matches!(config.credentials(), Err(ProviderError::Credentials(_))));

        let config = Config::parse("email = \"admin@example.com\"").unwrap();
        assert!(matches!(config.build_client(), Err(ProviderError::Credentials(_))));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::parse(
            r#"
api_token = "token-secret"
email = "admin@example.com"
key = "key-secret"
"#,
        )
        .unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("token-secret"));
        assert!(!debug.contains("key-secret"));
        assert!(debug.contains("admin@example.com"));
    }
}
