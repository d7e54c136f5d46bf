//! Configuration discovery and effective settings resolution.
//!
//! Specter reads `specter.toml|yaml|yml` from the rules directory (or the
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config. Defaults:
//! - `base`: `spectral.base.yaml`
//! - `target`: `spectral.yaml`
//! - `output`: `human`
//! - `functions`: `functions`
//! - `indent`: 2
//! - `fence`: `yaml`
//! - `marker`: `#👻-`
//! - `engine.command`: `["spectral"]`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{Error, Result};
use crate::parse::DEFAULT_MARKER;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILES: [&str; 3] = ["specter.toml", "specter.yaml", "specter.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Engine section under `[engine]`.
pub struct EngineCfg {
    /// Program and leading arguments, e.g. `["npx", "@stoplight/spectral-cli"]`.
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `specter.toml|yaml`.
pub struct SpecterConfig {
    pub base: Option<String>,
    pub target: Option<String>,
    pub output: Option<String>,
    pub functions: Option<String>,
    pub indent: Option<usize>,
    pub fence: Option<String>,
    pub marker: Option<String>,
    #[serde(default)]
    pub engine: Option<EngineCfg>,
}

#[derive(Debug, Default, Clone)]
/// Flags given on the command line; `None` means "not given".
pub struct Overrides {
    pub base: Option<String>,
    pub target: Option<String>,
    pub output: Option<String>,
    pub engine: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub rules_dir: PathBuf,
    /// File the config was read from, if any.
    pub config_file: Option<PathBuf>,
    pub base: String,
    pub target: String,
    pub output: String,
    pub functions: String,
    pub indent: usize,
    pub fence: String,
    pub marker: String,
    pub engine: Vec<String>,
}

/// Walk upward from `start` to the directory holding the config.
///
/// Stops when a `specter.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `SpecterConfig` from `root`, returning the file it came from.
///
/// A missing file is `Ok(None)`; a file that does not parse is an error.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, SpecterConfig)>> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<SpecterConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<SpecterConfig>(&s).map_err(|e| e.to_string())
        };
        return match parsed {
            Ok(cfg) => Ok(Some((path, cfg))),
            Err(message) => Err(Error::Config { path, message }),
        };
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(rules_dir: &Path, cli: &Overrides) -> Result<Effective> {
    let start = if rules_dir.is_absolute() {
        rules_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| Error::io(rules_dir, e))?
            .join(rules_dir)
    };
    let root = detect_root(&start);
    let (config_file, cfg) = match load_config(&root)? {
        Some((path, cfg)) => (Some(path), cfg),
        None => (None, SpecterConfig::default()),
    };

    let base = cli
        .base
        .clone()
        .or(cfg.base)
        .unwrap_or_else(|| "spectral.base.yaml".to_string());
    let target = cli
        .target
        .clone()
        .or(cfg.target)
        .unwrap_or_else(|| "spectral.yaml".to_string());
    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    let engine = cli
        .engine
        .as_deref()
        .map(split_command)
        .or_else(|| cfg.engine.and_then(|e| e.command))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| vec!["spectral".to_string()]);

    Ok(Effective {
        rules_dir: rules_dir.to_path_buf(),
        config_file,
        base,
        target,
        output,
        functions: cfg.functions.unwrap_or_else(|| "functions".to_string()),
        indent: cfg.indent.unwrap_or(2),
        fence: cfg.fence.unwrap_or_else(|| "yaml".to_string()),
        marker: cfg.marker.unwrap_or_else(|| DEFAULT_MARKER.to_string()),
        engine,
    })
}

/// Split a `--engine` value on whitespace.
pub fn split_command(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}
