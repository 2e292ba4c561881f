//! .env file loading and variable expansion
//!
//! Credentials and endpoints can come from a `.env` file in the working
//! directory. Config files may reference variables as `{{VAR}}` or
//! `{{VAR:-default}}`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Result, SpecmockError};

static EXPAND_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}\}").expect("Invalid expand regex")
});

/// Environment variable store
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// `.env` from the working directory (if present) overlaid with the
    /// process environment, which takes precedence
    pub fn load() -> Self {
        let mut vars = Self::try_load_default();
        vars.merge_with_system();
        vars
    }

    /// Load from a .env file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SpecmockError::Config(format!("Failed to read .env file: {}", e)))?;

        Self::parse(&content)
    }

    /// Try to load .env from current directory (returns empty if not found)
    pub fn try_load_default() -> Self {
        let env_path = Path::new(".env");
        match Self::load_file(env_path) {
            Ok(vars) => vars,
            Err(e) => {
                if env_path.exists() {
                    tracing::warn!(error = %e, "Ignoring unreadable .env file");
                }
                Self::new()
            }
        }
    }

    /// Parse .env file content
    pub fn parse(content: &str) -> Result<Self> {
        let mut vars = HashMap::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);

            if let Some((key, value)) = parse_env_line(line) {
                vars.insert(key, value);
            } else {
                return Err(SpecmockError::Config(format!(
                    "Invalid .env syntax at line {}: {}",
                    line_num + 1,
                    line
                )));
            }
        }

        Ok(Self { vars })
    }

    /// Merge with system environment (system takes precedence over file)
    pub fn merge_with_system(&mut self) {
        for (key, value) in std::env::vars() {
            self.vars.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    /// First non-empty value among `keys`
    pub fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.vars.insert(key, value);
    }

    /// Expand {{variable}} syntax in a string
    pub fn expand(&self, input: &str) -> Result<String> {
        let mut missing: Vec<String> = Vec::new();

        let expanded = EXPAND_VAR_RE.replace_all(input, |cap: &regex::Captures<'_>| {
            let name = &cap[1];
            match (self.get(name), cap.get(2)) {
                (Some(value), _) => value.to_string(),
                (None, Some(default)) => default.as_str().to_string(),
                (None, None) => {
                    missing.push(name.to_string());
                    cap[0].to_string()
                }
            }
        });

        if !missing.is_empty() {
            return Err(SpecmockError::Config(format!(
                "Undefined environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(expanded.into_owned())
    }
}

/// Parse a single .env line into key-value pair
fn parse_env_line(line: &str) -> Option<(String, String)> {
    let (key, value_part) = line.split_once('=')?;
    let key = key.trim();

    if key.is_empty() {
        return None;
    }

    let value_part = value_part.trim();

    let value = if value_part.len() >= 2 && value_part.starts_with('"') && value_part.ends_with('"') {
        unescape_double_quoted(&value_part[1..value_part.len() - 1])
    } else if value_part.len() >= 2 && value_part.starts_with('\'') && value_part.ends_with('\'') {
        value_part[1..value_part.len() - 1].to_string()
    } else {
        // Unquoted: stop at # (comment)
        match value_part.find(" #") {
            Some(comment_pos) => value_part[..comment_pos].trim().to_string(),
            None => value_part.to_string(),
        }
    };

    Some((key.to_string(), value))
}

fn unescape_double_quoted(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}
