//! YAML configuration for quaero.
//!
//! The configuration file lives at `~/.config/quaero.yaml` by default:
//!
//! ```yaml
//! llm:
//!   openai:
//!     base_url: https://api.openai.com/v1
//!     api_key: your-api-key
//!     model_name: gpt-4
//!     azure_deployment_name: optional-azure-deployment-name
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the configuration file under the user config directory.
const CONFIG_FILE_NAME: &str = "quaero.yaml";

/// The application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Configuration for LLM providers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// The OpenAI-compatible provider.
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// Configuration for an OpenAI-compatible endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL of the API. May be a base (`https://api.openai.com/v1`), a
    /// full endpoint URL, or an Azure resource endpoint. Empty selects the
    /// public OpenAI API.
    #[serde(default)]
    pub base_url: String,

    /// The API key (OpenAI or Azure).
    #[serde(default)]
    pub api_key: String,

    /// Model to use. Empty selects the default model.
    #[serde(default)]
    pub model_name: String,

    /// Azure deployment name. Non-empty switches to the Azure URL shape and
    /// auth header.
    #[serde(default)]
    pub azure_deployment_name: String,
}

/// Returns the default path of the configuration file, if the user config
/// directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

impl Config {
    /// Load the configuration from `path`, or from the default location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read (a not-found cause is
    /// reported by [`Error::is_not_found`]) and [`Error::Serialization`] if
    /// it is not valid YAML.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path().ok_or_else(|| {
                Error::validation("could not determine the user config directory", None)
            })?,
        };
        let data = fs::read_to_string(&path)
            .map_err(|e| Error::io(format!("failed to read config file {}", path.display()), e))?;
        let config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the API key is empty.
    pub fn validate(&self) -> Result<()> {
        if self.llm.openai.api_key.is_empty() {
            return Err(Error::validation(
                "OpenAI API key is required",
                Some("api_key".to_string()),
            ));
        }
        Ok(())
    }
}
