use std::env;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for an OpenAI-compatible chat completions provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub request_timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ProviderConfig {
    /// `Ok(None)` when no API key is configured; callers fall back to the
    /// offline generator.
    pub fn from_env() -> Result<Option<Self>, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(api_key) = lookup("MAFIA_PROVIDER_API_KEY").filter(|k| !k.trim().is_empty())
        else {
            return Ok(None);
        };
        let base_url = lookup("MAFIA_PROVIDER_URL").unwrap_or_else(|| DEFAULT_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::config(format!(
                "MAFIA_PROVIDER_URL must be an http(s) URL, got '{base_url}'"
            )));
        }
        Ok(Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: lookup("MAFIA_PROVIDER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: api_key.trim().to_string(),
            request_timeout: Duration::from_secs(30),
            temperature: 0.8,
            max_tokens: 200,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_means_offline() {
        assert_eq!(ProviderConfig::from_lookup(|_| None).unwrap(), None);
        let blank = ProviderConfig::from_lookup(|name| {
            (name == "MAFIA_PROVIDER_API_KEY").then(|| "  ".to_string())
        })
        .unwrap();
        assert_eq!(blank, None);
    }

    #[test]
    fn key_with_defaults() {
        let cfg = ProviderConfig::from_lookup(|name| match name {
            "MAFIA_PROVIDER_API_KEY" => Some("sk-test".into()),
            "MAFIA_PROVIDER_URL" => Some("http://localhost:8080/v1/".into()),
            _ => None,
        })
        .unwrap()
        .unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8080/v1");
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.api_key, "sk-test");
    }

    #[test]
    fn bad_url_is_rejected() {
        let err = ProviderConfig::from_lookup(|name| match name {
            "MAFIA_PROVIDER_API_KEY" => Some("sk-test".into()),
            "MAFIA_PROVIDER_URL" => Some("localhost".into()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
    }
}
