//! CLI argument definitions using clap

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Provider, SecretString};

/// specmock - answer OpenAPI operations with model-generated JSON
#[derive(Parser, Debug, Clone)]
#[command(name = "specmock", version, about, long_about = None)]
pub struct Args {
    /// OpenAPI 3.x or Swagger 2.0 document (JSON or YAML)
    #[arg(value_name = "SPEC")]
    pub spec: Option<PathBuf>,

    /// Config file (YAML, JSON, or TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    // =========================================================================
    // SERVER
    // =========================================================================

    /// Bind host (default: 127.0.0.1)
    #[arg(long = "host", value_name = "HOST")]
    pub host: Option<String>,

    /// Bind port (default: 5010)
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Add CORS headers to every response
    #[arg(long = "cors", action = ArgAction::SetTrue)]
    pub cors: bool,

    /// Don't log each request
    #[arg(long = "no-log", action = ArgAction::SetTrue)]
    pub no_log: bool,

    // =========================================================================
    // GENERATOR
    // =========================================================================

    /// Chat-completions API flavour
    #[arg(long = "provider", value_name = "PROVIDER", value_enum)]
    pub provider: Option<Provider>,

    /// Model (OpenAI) or deployment (Azure) name (default: gpt-4o)
    #[arg(short = 'm', long = "model", value_name = "MODEL")]
    pub model: Option<String>,

    /// API base URL (OpenAI) or resource endpoint (Azure)
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// API key (prefer OPENAI_API_KEY / AZURE_OPENAI_API_KEY)
    #[arg(long = "api-key", value_name = "KEY")]
    pub api_key: Option<SecretString>,

    /// Azure OpenAI api-version
    #[arg(long = "api-version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Generator request timeout in seconds (default: 60)
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    // =========================================================================
    // OFFLINE
    // =========================================================================

    /// Print the strict envelope schema for METHOD PATH and exit
    #[arg(long = "print-schema", num_args = 2, value_names = ["METHOD", "PATH"])]
    pub print_schema: Option<Vec<String>>,

    /// List the spec's operations and exit
    #[arg(long = "list", action = ArgAction::SetTrue)]
    pub list: bool,

    // =========================================================================
    // TROUBLESHOOTING
    // =========================================================================

    /// Output format for logs: json (JSON Lines) or text (default)
    #[arg(long = "log-format", value_name = "FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log envelope schemas, prompts and generated values
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,
}

/// Log format for structured output
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}
