//! Engine configuration stored as TOML
//!
//! Lives in ~/.config/tetrs/engine.toml (or platform equivalent) unless a
//! path is given explicitly.

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::randomizer::RandomizerKind;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Narrowest board a piece's 4-wide box fits on at spawn
pub const MIN_WIDTH: usize = 4;
pub const MAX_WIDTH: usize = 64;
pub const MIN_HEIGHT: usize = 4;
pub const MAX_HEIGHT: usize = 256;

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Board columns
    pub width: usize,
    /// Board rows
    pub height: usize,
    /// Piece generator seed; drawn at random when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Piece generator: "uniform" or "bag"
    pub randomizer: RandomizerKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            seed: None,
            randomizer: RandomizerKind::Uniform,
        }
    }
}

impl EngineConfig {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "tetrs", "tetrs").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Default location of the config file, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("engine.toml"))
    }

    /// Parse and validate TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("invalid engine config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location. A missing file gives the defaults.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file gives the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("in {}", path.display()))
    }

    /// Save to the default location
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::default_path() else {
            bail!("could not determine config directory");
        };
        self.save_to(&path)
    }

    /// Save to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Reject board sizes the engine cannot play on
    pub fn validate(&self) -> Result<()> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&self.width) {
            bail!(
                "width {} out of range {}..={}",
                self.width,
                MIN_WIDTH,
                MAX_WIDTH
            );
        }
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&self.height) {
            bail!(
                "height {} out of range {}..={}",
                self.height,
                MIN_HEIGHT,
                MAX_HEIGHT
            );
        }
        Ok(())
    }
}
