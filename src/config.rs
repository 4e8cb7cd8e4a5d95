//! Where data lives and who is using it.
//!
//! Resolution order, last wins: built-in defaults, `config.toml` in the data
//! directory, environment variables, command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CadenceError, Result};
use crate::fields::Granularity;

pub const CONFIG_FILE: &str = "config.toml";
pub const DB_FILE: &str = "tasks.json";

/// User settings, persisted as TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Owner recorded on new tasks and used to filter every query.
    #[serde(default = "default_owner")]
    pub owner: String,
    /// Scale used by `plan`, `trend` and `stats` when none is given.
    #[serde(default = "default_scale")]
    pub default_scale: Granularity,
}

fn default_owner() -> String {
    std::env::var("USER")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "local".into())
}

fn default_scale() -> Granularity {
    Granularity::Day
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            default_scale: default_scale(),
        }
    }
}

impl Config {
    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)
            .map_err(|e| CadenceError::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), owner = %cfg.owner, "loaded config");
        Ok(cfg)
    }

    /// Like [`Config::load`], but a missing file is written out with the
    /// defaults so there is something to edit.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Config::load(path);
        }
        let cfg = Config::default();
        cfg.save(path)?;
        info!(path = %path.display(), "wrote default config");
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CadenceError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `CADENCE_OWNER` and `CADENCE_SCALE` through `lookup` (normally
    /// `std::env::var`). The scale is matched case-insensitively.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(owner) = lookup("CADENCE_OWNER").filter(|o| !o.trim().is_empty()) {
            self.owner = owner.trim().to_string();
        }
        if let Some(scale) = lookup("CADENCE_SCALE").filter(|s| !s.trim().is_empty()) {
            self.default_scale = Granularity::parse(&scale)?;
        }
        Ok(self)
    }
}

/// On-disk locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub db_file: PathBuf,
    pub config_file: PathBuf,
}

impl Paths {
    /// `CADENCE_HOME`, else `$HOME/.cadence`, else `./.cadence`. An explicit
    /// database path replaces the default `tasks.json` only.
    pub fn resolve(db: Option<PathBuf>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("CADENCE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = lookup("HOME").unwrap_or_else(|| ".".into());
                PathBuf::from(home).join(".cadence")
            });
        Paths {
            db_file: db.unwrap_or_else(|| data_dir.join(DB_FILE)),
            config_file: data_dir.join(CONFIG_FILE),
            data_dir,
        }
    }
}

/// Environment lookup backed by the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
