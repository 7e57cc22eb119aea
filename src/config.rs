//! Compiler and runtime settings.
//!
//! Settings are read from an optional JSON file, then overridden by
//! `RILL_*` environment variables, then by command-line flags.
use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_TRACE: &str = "RILL_TRACE";
pub const ENV_MAX_DEPTH: &str = "RILL_MAX_DEPTH";
pub const ENV_PARALLEL: &str = "RILL_PARALLEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value `{value}` for {key}")]
    InvalidOverride { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Translate `if`, `for`, `{` and `<-` to branches instead of calls.
    pub inline_control_flow: bool,
    /// Lower integer-slot comparisons to a native compare-and-branch.
    pub integer_fast_path: bool,
    /// Builtins called directly, skipping the callee lookup.
    pub static_primitives: Vec<String>,
    /// Compile top-level definitions on the rayon pool.
    pub parallel: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            inline_control_flow: true,
            integer_fast_path: true,
            static_primitives: Vec::new(),
            parallel: true,
        }
    }
}

impl CompilerOptions {
    pub fn is_static_primitive(&self, name: &str) -> bool {
        self.static_primitives.iter().any(|p| p == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Nested call limit before `DepthExceeded`.
    pub max_depth: usize,
    pub trace: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            trace: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub compiler: CompilerOptions,
    pub runtime: RuntimeOptions,
}

impl Config {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&source).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Applies `RILL_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_TRACE) {
            self.runtime.trace = parse_flag(ENV_TRACE, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_DEPTH) {
            self.runtime.max_depth =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidOverride {
                        key: ENV_MAX_DEPTH,
                        value: value.clone(),
                    })?;
        }
        if let Some(value) = lookup(ENV_PARALLEL) {
            self.compiler.parallel = parse_flag(ENV_PARALLEL, &value)?;
        }
        Ok(())
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidOverride {
            key,
            value: value.to_string(),
        }),
    }
}
