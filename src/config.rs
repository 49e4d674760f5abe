//! Configuration file parsing (`rmake.toml`).
//!
//! The file is optional; every field has a default, so a project with no
//! `rmake.toml` builds with `rustc --edition 2021` and an output binary
//! named `make`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Name of the optional configuration file.
pub const CONFIG_FILE: &str = "rmake.toml";

#[derive(Deserialize, Debug, Default)]
pub struct RmakeConfig {
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Deserialize, Debug)]
pub struct BuildConfig {
    /// Rust edition passed to the compiler.
    #[serde(default = "default_edition")]
    pub edition: String,
    /// Compiler binary to invoke instead of `rustc`.
    pub compiler: Option<String>,
    /// Extra flags appended to the compiler invocation.
    pub flags: Option<Vec<String>>,
    /// Base name of the produced executable (platform suffix is appended).
    pub output: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            edition: default_edition(),
            compiler: None,
            flags: None,
            output: None,
        }
    }
}

fn default_edition() -> String {
    "2021".to_string()
}

/// Loads `rmake.toml` from `dir`, falling back to defaults when absent.
pub fn load(dir: &Path) -> Result<RmakeConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(RmakeConfig::default());
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
