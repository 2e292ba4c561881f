//! Server configuration
//!
//! Resolution order: config file, then environment (including `.env`),
//! then command-line flags.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::env::EnvVars;
use crate::errors::{Result, SpecmockError};

/// Default system instruction for the generator
pub const DEFAULT_SYSTEM_PROMPT: &str = "Generate realistic mock data for an API.";

/// A string that redacts its value in Debug output to prevent credential leakage
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString(pub String);

impl SecretString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "SecretString(\"\")")
        } else {
            write!(f, "SecretString(\"[REDACTED]\")")
        }
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        SecretString(s)
    }
}

impl std::str::FromStr for SecretString {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(SecretString(s.to_string()))
    }
}

/// Which chat-completions API the generator talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    #[value(name = "openai")]
    OpenAi,
    Azure,
}

/// Generator endpoint and model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// `None` until set by the config file, a flag or the environment
    #[serde(default)]
    pub provider: Option<Provider>,

    /// Model name (OpenAI) or deployment name (Azure)
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL (OpenAI) or resource endpoint (Azure)
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_key: SecretString,

    /// Azure `api-version` query parameter
    #[serde(default)]
    pub api_version: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: default_model(),
            base_url: None,
            api_key: SecretString::default(),
            api_version: None,
            timeout_secs: default_timeout(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl GeneratorConfig {
    /// The selected provider, OpenAI unless set otherwise
    pub fn provider(&self) -> Provider {
        self.provider.unwrap_or_default()
    }

    /// Fill unset fields from the environment.
    ///
    /// With no provider configured, `AZURE_OPENAI_API_KEY` selects Azure.
    /// An explicit provider only reads its own key variable.
    pub fn apply_env(&mut self, env: &EnvVars) {
        let provider = match self.provider {
            Some(provider) => provider,
            None if self.api_key.is_empty() && env.first_of(&["AZURE_OPENAI_API_KEY"]).is_some() => {
                Provider::Azure
            }
            None => Provider::OpenAi,
        };
        self.provider = Some(provider);

        if self.api_key.is_empty() {
            let key = match provider {
                Provider::Azure => env.first_of(&["AZURE_OPENAI_API_KEY"]),
                Provider::OpenAi => env.first_of(&["OPENAI_API_KEY"]),
            };
            if let Some(key) = key {
                self.api_key = SecretString(key);
            }
        }

        if self.base_url.is_none() {
            self.base_url = match provider {
                Provider::Azure => env.first_of(&["AZURE_OPENAI_ENDPOINT"]),
                Provider::OpenAi => env.first_of(&["OPENAI_BASE_URL"]),
            };
        }

        if self.api_version.is_none() {
            self.api_version = env.first_of(&["OPENAI_API_VERSION"]);
        }

        if let Some(model) = env.first_of(&["SPECMOCK_MODEL"]) {
            self.model = model;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(SpecmockError::Config(
                "No API key configured: set OPENAI_API_KEY, AZURE_OPENAI_API_KEY or --api-key".to_string(),
            ));
        }
        if self.provider() == Provider::Azure {
            if self.base_url.is_none() {
                return Err(SpecmockError::Config(
                    "Azure provider needs an endpoint: set AZURE_OPENAI_ENDPOINT or --base-url".to_string(),
                ));
            }
            if self.api_version.is_none() {
                return Err(SpecmockError::Config(
                    "Azure provider needs an API version: set OPENAI_API_VERSION or --api-version".to_string(),
                ));
            }
        }
        if self.timeout_secs == 0 {
            return Err(SpecmockError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Mock server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Spec document to serve
    #[serde(default)]
    pub spec: Option<PathBuf>,

    /// Enable request logging
    #[serde(default = "default_true")]
    pub log_requests: bool,

    /// Enable CORS headers
    #[serde(default)]
    pub cors: bool,

    #[serde(default)]
    pub generator: GeneratorConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5010
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            spec: None,
            log_requests: true,
            cors: false,
            generator: GeneratorConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Load config from a file, expanding `{{VAR}}` references first
    pub fn load<P: AsRef<Path>>(path: P, env: &EnvVars) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let content = env.expand(&raw)?;

        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("json");

        match ext {
            "yaml" | "yml" => Self::from_yaml(&content),
            "toml" => toml::from_str(&content)
                .map_err(|e| SpecmockError::Config(format!("Failed to parse TOML config: {}", e))),
            _ => serde_json::from_str(&content)
                .map_err(|e| SpecmockError::Config(format!("Failed to parse JSON config: {}", e))),
        }
    }

    /// Load config from YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| SpecmockError::Config(format!("Failed to parse YAML config: {}", e)))
    }

    /// Get address string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let Some(ref spec) = self.spec else {
            return Err(SpecmockError::Config("No spec file configured".to_string()));
        };
        if !spec.exists() {
            return Err(SpecmockError::Config(format!(
                "Spec file not found: {}",
                spec.display()
            )));
        }
        self.generator.validate()
    }
}
