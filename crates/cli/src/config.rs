//! Optional TOML configuration for `bcd --config`.
//!
//! # Example
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [engine]
//! max_depth = 512
//!
//! [output]
//! pretty = true
//! ```
//!
//! Every section and field may be omitted.

use std::path::Path;

use bcd_core::{Limits, DEFAULT_MAX_DEPTH};
use serde::Deserialize;

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub log: LogSettings,
    pub engine: EngineSettings,
    pub output: OutputSettings,
}

/// `[log]`: filter directive used when neither `--log-level` nor
/// `RUST_LOG` is set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    pub level: Option<String>,
}

/// `[engine]`: resource bounds for decoding binary input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    pub max_depth: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// `[output]`: JSON rendering.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings { pretty: true }
    }
}

// ── Functions ─────────────────────────────────────────────────────────────────

impl Config {
    pub fn limits(&self) -> Limits {
        Limits {
            max_depth: self.engine.max_depth,
        }
    }
}

/// Read and parse a config file from `path`.
///
/// Returns a human-readable error string on failure.
pub fn read_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    parse_config(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}
