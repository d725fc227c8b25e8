//! Client configuration
//!
//! Consumers point the client at a portal with a base URL; timeouts are
//! optional. Configuration can be built directly, loaded from a YAML file, or
//! read from environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::utils::error::{ClientError, Result};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Configuration for a portal client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the data portal, e.g. `https://seqr.example.org`
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl ClientConfig {
    /// Create a configuration with default timeouts
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ClientError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// `GENOBATCH_BASE_URL` is required; `GENOBATCH_REQUEST_TIMEOUT` and
    /// `GENOBATCH_CONNECT_TIMEOUT` (seconds) are optional.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("GENOBATCH_BASE_URL")
            .map_err(|_| ClientError::Config("GENOBATCH_BASE_URL is not set".to_string()))?;

        let mut config = Self::new(base_url);
        if let Ok(timeout) = std::env::var("GENOBATCH_REQUEST_TIMEOUT") {
            config.request_timeout = timeout
                .parse()
                .map_err(|e| ClientError::Config(format!("Invalid request timeout: {}", e)))?;
        }
        if let Ok(timeout) = std::env::var("GENOBATCH_CONNECT_TIMEOUT") {
            config.connect_timeout = timeout
                .parse()
                .map_err(|e| ClientError::Config(format!("Invalid connect timeout: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        if self.request_timeout == 0 {
            return Err(ClientError::Config(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve an API path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<String> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| ClientError::Config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        let joined = base
            .join(path)
            .map_err(|e| ClientError::Config(format!("Invalid endpoint path {}: {}", path, e)))?;
        Ok(joined.into())
    }

    /// Per-request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_from_file() {
        let config_content = r#"
base_url: "https://seqr.example.org"
request_timeout: 60
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = ClientConfig::from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.base_url, "https://seqr.example.org");
        assert_eq!(config.request_timeout, 60);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT_SECS);
    }

    #[tokio::test]
    async fn test_config_from_file_rejects_bad_url() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"base_url: \"not a url\"\n").unwrap();

        let err = ClientConfig::from_file(temp_file.path()).await.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_endpoint_join() {
        let config = ClientConfig::new("https://seqr.example.org");
        assert_eq!(
            config.endpoint("/api/gene_variant_lookup").unwrap(),
            "https://seqr.example.org/api/gene_variant_lookup"
        );
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let mut config = ClientConfig::new("https://seqr.example.org");
        config.request_timeout = 0;
        assert!(config.validate().is_err());
    }
}
