use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty, validate_url, Validate};
use serde::{Deserialize, Serialize};

/// Connection settings for one remote tracking service.
///
/// There is deliberately no process-wide default instance: every client
/// owns the config (and the connection pool built from it) it was given,
/// so tests can point independent clients at independent fake servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root URL of the service, e.g. `https://track.example.com`.
    pub base_url: String,

    /// Shared secret sent with every request when set. Public read-only
    /// deployments leave it unset.
    #[serde(default)]
    pub api_secret: Option<String>,

    #[serde(default)]
    pub verbose: bool,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_secret: None,
            verbose: false,
        }
    }

    pub fn with_api_secret(mut self, secret: impl Into<String>) -> Self {
        self.api_secret = Some(secret.into());
        self
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        if let Some(secret) = &self.api_secret {
            validate_non_empty("api_secret", secret)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_base_url_and_secret() {
        assert!(ClientConfig::new("https://track.example.com")
            .validate()
            .is_ok());
        assert!(ClientConfig::new("not a url").validate().is_err());
        assert!(ClientConfig::new("https://track.example.com")
            .with_api_secret("   ")
            .validate()
            .is_err());
    }

    #[test]
    fn deserializes_with_optional_fields() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "https://track.example.com"}"#).unwrap();
        assert!(config.api_secret.is_none());
        assert!(!config.verbose);
    }
}
