//! Endpoint resolution for OpenAI-compatible and Azure-OpenAI endpoints.
//!
//! Pure string logic: derives the URL to POST to and the auth header to send
//! from the configured base URL, API key, and optional Azure deployment name.

use url::Url;

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};

/// Base URL used when the configuration leaves it empty.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// API version pinned for Azure OpenAI deployments.
const AZURE_API_VERSION: &str = "2024-12-01-preview";

/// Path suffix of the standard chat-completion endpoint.
const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// A resolved endpoint: where to POST and how to authenticate.
///
/// Computed once per call from the configuration; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// The full URL to POST the chat request to.
    pub url: String,

    /// The name of the auth header to send.
    pub auth_header: &'static str,

    /// The value of the auth header.
    pub auth_value: String,
}

/// Resolve the endpoint URL and auth header for a configuration.
///
/// A non-empty `azure_deployment_name` selects the Azure URL shape and the
/// raw `api-key` header; otherwise the standard shape and a bearer
/// `Authorization` header are used. A base URL that already names
/// `/chat/completions` is used verbatim.
///
/// # Errors
///
/// Returns [`Error::Url`] if the resolved URL does not parse.
pub fn resolve(config: &OpenAiConfig) -> Result<Endpoint> {
    let base_url = if config.base_url.is_empty() {
        DEFAULT_BASE_URL
    } else {
        config.base_url.as_str()
    };

    let endpoint = if !config.azure_deployment_name.is_empty() {
        let base = base_url.trim_end_matches('/');
        let url = format!(
            "{}/openai/deployments/{}{}?api-version={}",
            base, config.azure_deployment_name, CHAT_COMPLETIONS_PATH, AZURE_API_VERSION
        );
        Endpoint {
            url,
            auth_header: "api-key",
            auth_value: config.api_key.clone(),
        }
    } else {
        let url = if base_url.contains(CHAT_COMPLETIONS_PATH) {
            base_url.to_string()
        } else {
            let base = base_url.strip_suffix('/').unwrap_or(base_url);
            format!("{base}{CHAT_COMPLETIONS_PATH}")
        };
        Endpoint {
            url,
            auth_header: "Authorization",
            auth_value: format!("Bearer {}", config.api_key),
        }
    };

    Url::parse(&endpoint.url)
        .map_err(|e| Error::url(format!("invalid endpoint URL {}: {e}", endpoint.url), Some(e)))?;
    Ok(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, azure_deployment_name: &str) -> OpenAiConfig {
        OpenAiConfig {
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            model_name: String::new(),
            azure_deployment_name: azure_deployment_name.to_string(),
        }
    }

    #[test]
    fn standard_base_url() {
        let endpoint = resolve(&config("https://api.openai.com/v1", "")).unwrap();
        assert_eq!(endpoint.url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(endpoint.auth_header, "Authorization");
        assert_eq!(endpoint.auth_value, "Bearer test-key");
    }

    #[test]
    fn full_endpoint_url_used_verbatim() {
        let endpoint = resolve(&config("https://api.openai.com/v1/chat/completions", "")).unwrap();
        assert_eq!(endpoint.url, "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn trailing_slash_stripped() {
        let endpoint = resolve(&config("https://api.openai.com/v1/", "")).unwrap();
        assert_eq!(endpoint.url, "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn empty_base_url_defaults() {
        let endpoint = resolve(&config("", "")).unwrap();
        assert_eq!(endpoint.url, "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn azure_deployment() {
        let endpoint = resolve(&config("https://x.openai.azure.com/", "dep1")).unwrap();
        assert_eq!(
            endpoint.url,
            "https://x.openai.azure.com/openai/deployments/dep1/chat/completions?api-version=2024-12-01-preview"
        );
        assert_eq!(endpoint.auth_header, "api-key");
        assert_eq!(endpoint.auth_value, "test-key");
    }

    #[test]
    fn azure_without_trailing_slash() {
        let endpoint = resolve(&config("https://x.openai.azure.com", "dep1")).unwrap();
        assert_eq!(
            endpoint.url,
            "https://x.openai.azure.com/openai/deployments/dep1/chat/completions?api-version=2024-12-01-preview"
        );
    }

    #[test]
    fn unparseable_url_rejected() {
        let err = resolve(&config("not a url", "")).unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }
}
