//! Runtime configuration
//!
//! Values come from the process environment. Command-line flags passed to the
//! binaries take precedence over environment variables.
//!
//! | variable              | required | default                     |
//! |-----------------------|----------|-----------------------------|
//! | `GITHUB_TOKEN`        | yes      |                             |
//! | `LLM_API_KEY`         | yes      |                             |
//! | `LLM_MODEL`           | no       | `gpt-4`                     |
//! | `OUTPUT_DIR`          | no       | `./docs`                    |
//! | `PORT`                | no       | `8000`                      |
//! | `GITHUB_API_BASE_URL` | no       | `https://api.github.com`    |
//! | `LLM_API_BASE_URL`    | no       | `https://api.openai.com/v1` |

use std::path::PathBuf;

use thiserror::Error;

use crate::clients::github::DEFAULT_GITHUB_API_URL;
use crate::clients::llm::{DEFAULT_LLM_API_URL, DEFAULT_LLM_MODEL};
use crate::services::document::DEFAULT_OUTPUT_DIR;

pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const LLM_API_KEY_VAR: &str = "LLM_API_KEY";
pub const LLM_MODEL_VAR: &str = "LLM_MODEL";
pub const OUTPUT_DIR_VAR: &str = "OUTPUT_DIR";
pub const PORT_VAR: &str = "PORT";
pub const GITHUB_API_BASE_URL_VAR: &str = "GITHUB_API_BASE_URL";
pub const LLM_API_BASE_URL_VAR: &str = "LLM_API_BASE_URL";

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<&'static str>),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub github_token: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub output_dir: PathBuf,
    pub port: u16,
    pub github_api_base_url: String,
    pub llm_api_base_url: String,
}

/// Values supplied on the command line, each overriding its environment variable
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub github_token: Option<String>,
    pub llm_api_key: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub port: Option<u16>,
}

impl ConfigOverrides {
    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            GITHUB_TOKEN_VAR => self.github_token.clone(),
            LLM_API_KEY_VAR => self.llm_api_key.clone(),
            OUTPUT_DIR_VAR => self
                .output_dir
                .as_ref()
                .map(|dir| dir.to_string_lossy().into_owned()),
            PORT_VAR => self.port.map(|port| port.to_string()),
            _ => None,
        }
    }
}

impl Config {
    /// Loads configuration from the environment with command-line overrides applied
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| {
            overrides
                .lookup(name)
                .filter(|value| !value.is_empty())
                .or_else(|| std::env::var(name).ok())
        })
    }

    /// Loads configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset. All missing required variables are
    /// reported together.
    ///
    /// ```
    /// use gitguide_mcp::config::Config;
    ///
    /// let config = Config::from_lookup(|name| match name {
    ///     "GITHUB_TOKEN" => Some("ghp_test".to_string()),
    ///     "LLM_API_KEY" => Some("sk-test".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.port, 8000);
    /// assert_eq!(config.llm_model, "gpt-4");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let github_token = get(GITHUB_TOKEN_VAR);
        let llm_api_key = get(LLM_API_KEY_VAR);

        let mut missing = Vec::new();
        if github_token.is_none() {
            missing.push(GITHUB_TOKEN_VAR);
        }
        if llm_api_key.is_none() {
            missing.push(LLM_API_KEY_VAR);
        }
        let (Some(github_token), Some(llm_api_key)) = (github_token, llm_api_key) else {
            return Err(ConfigError::MissingVariables(missing));
        };

        let port = match get(PORT_VAR) {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: PORT_VAR,
                    reason: format!("'{}' is not a valid port ({})", value, e),
                })?,
            None => DEFAULT_PORT,
        };

        let github_api_base_url = validate_url(
            GITHUB_API_BASE_URL_VAR,
            get(GITHUB_API_BASE_URL_VAR).unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
        )?;
        let llm_api_base_url = validate_url(
            LLM_API_BASE_URL_VAR,
            get(LLM_API_BASE_URL_VAR).unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
        )?;

        Ok(Self {
            github_token,
            llm_api_key,
            llm_model: get(LLM_MODEL_VAR).unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            output_dir: PathBuf::from(
                get(OUTPUT_DIR_VAR).unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            ),
            port,
            github_api_base_url,
            llm_api_base_url,
        })
    }
}

fn validate_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    url::Url::parse(&value).map_err(|e| ConfigError::InvalidValue {
        name,
        reason: format!("'{}' is not a valid URL ({})", value, e),
    })?;
    Ok(value)
}
