//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/gof/gof.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `GOF_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{Animal, DomainError, NAIL_BOX_WEIGHT, NAIL_WEIGHT};

/// Weights used when building the demo package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompositeConfig {
    pub nail_weight: u64,
    pub box_weight: u64,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            nail_weight: NAIL_WEIGHT,
            box_weight: NAIL_BOX_WEIGHT,
        }
    }
}

/// Feeding chain layout and the requests sent into it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChainConfig {
    /// Handlers from head to tail
    pub order: Vec<Animal>,
    /// Handler that receives the requests (need not be the head)
    pub entry: Animal,
    pub requests: Vec<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            order: vec![Animal::Monkey, Animal::Squirrel, Animal::Dog],
            entry: Animal::Squirrel,
            requests: vec!["Nut".into(), "Banana".into(), "Cup of coffee".into()],
        }
    }
}

/// Raw composite config for intermediate parsing (None means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCompositeConfig {
    pub nail_weight: Option<u64>,
    pub box_weight: Option<u64>,
}

/// Raw chain config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawChainConfig {
    pub order: Option<Vec<Animal>>,
    pub entry: Option<Animal>,
    pub requests: Option<Vec<String>>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub composite: RawCompositeConfig,
    pub chain: RawChainConfig,
}

/// Unified configuration for gof.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub composite: CompositeConfig,
    pub chain: ChainConfig,
}

/// Get the XDG config directory for gof.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gof").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("gof.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    parse_raw_settings(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_raw_settings(content: &str) -> Result<RawSettings, toml::de::Error> {
    toml::from_str(content)
}

impl Settings {
    /// Merge overlay config onto self (base). Every specified field replaces.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            composite: CompositeConfig {
                nail_weight: overlay
                    .composite
                    .nail_weight
                    .unwrap_or(self.composite.nail_weight),
                box_weight: overlay
                    .composite
                    .box_weight
                    .unwrap_or(self.composite.box_weight),
            },
            chain: ChainConfig {
                order: overlay
                    .chain
                    .order
                    .clone()
                    .unwrap_or_else(|| self.chain.order.clone()),
                entry: overlay.chain.entry.unwrap_or(self.chain.entry),
                requests: overlay
                    .chain
                    .requests
                    .clone()
                    .unwrap_or_else(|| self.chain.requests.clone()),
            },
        }
    }

    /// Merge a TOML document onto self.
    pub fn merge_toml(&self, content: &str) -> Result<Self, ApplicationError> {
        let raw = parse_raw_settings(content).map_err(|e| ApplicationError::Config {
            message: format!("parse: {}", e),
        })?;
        Ok(self.merge_with(&raw))
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/gof/gof.toml`
    /// 3. Explicit config file
    /// 4. Environment variables: `GOF_*` prefix
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let env = Config::builder()
            .add_source(
                Environment::with_prefix("GOF")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        Self::load_with(global_config_path().as_deref(), config_file, |key| {
            env.get_string(key).ok()
        })
    }

    /// Layered load with an explicit global path and override lookup in place of the environment.
    pub fn load_with<F>(
        global: Option<&Path>,
        config_file: Option<&Path>,
        lookup: F,
    ) -> Result<Self, ApplicationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let current = Self::load_files(global, config_file)?;
        Self::apply_overrides(current, lookup)
    }

    /// Defaults plus config files only, without environment overrides.
    ///
    /// A missing global file is skipped; a missing explicit file is an error.
    pub fn load_files(
        global: Option<&Path>,
        config_file: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global {
            if global_path.exists() {
                debug!("loading global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApplicationError::ConfigNotFound(path.to_path_buf()));
            }
            debug!("loading config: {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        Ok(current)
    }

    /// Apply string overrides looked up by dotted key such as `chain.entry`.
    ///
    /// `GOF_CHAIN__REQUESTS` and `GOF_CHAIN__ORDER` arrive here comma separated.
    pub fn apply_overrides<F>(mut settings: Self, lookup: F) -> Result<Self, ApplicationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("composite.nail_weight") {
            settings.composite.nail_weight = parse_weight("composite.nail_weight", &val)?;
        }
        if let Some(val) = lookup("composite.box_weight") {
            settings.composite.box_weight = parse_weight("composite.box_weight", &val)?;
        }
        if let Some(val) = lookup("chain.entry") {
            settings.chain.entry = val.parse()?;
        }
        if let Some(val) = lookup("chain.order") {
            settings.chain.order = split_list(&val)
                .map(str::parse::<Animal>)
                .collect::<Result<Vec<_>, DomainError>>()?;
        }
        if let Some(val) = lookup("chain.requests") {
            settings.chain.requests = split_list(&val).map(String::from).collect();
        }
        Ok(settings)
    }

    /// Render as TOML for `gof config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize: {}", e),
        })
    }
}

fn split_list(val: &str) -> impl Iterator<Item = &str> {
    val.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_weight(key: &str, val: &str) -> Result<u64, ApplicationError> {
    val.trim().parse().map_err(|_| ApplicationError::Config {
        message: format!("{}: not a weight: {}", key, val),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
