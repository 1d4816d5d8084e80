use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::config::project_dirs;

/// File name of the preferences namespace.
pub const PREFS_FILE: &str = "weather_prefs.toml";

/// On-disk layout of the preferences namespace. `last_city` is the only key
/// read back; `saved_at` is informational.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Prefs {
    last_city: Option<String>,
    saved_at: Option<DateTime<Utc>>,
}

/// Single-slot, process-durable store for the last searched city.
#[derive(Debug, Clone)]
pub struct LastQueryStore {
    path: PathBuf,
}

impl LastQueryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(project_dirs()?.data_dir().join(PREFS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored city.
    pub fn save(&self, city: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let prefs = Prefs { last_city: Some(city.to_string()), saved_at: Some(Utc::now()) };
        let toml = toml::to_string_pretty(&prefs).context("Failed to serialize preferences")?;

        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write preferences: {}", self.path.display()))?;

        debug!(city, path = %self.path.display(), "Saved last searched city");
        Ok(())
    }

    /// The most recently saved city, or `None` if nothing was ever saved.
    pub fn get_last(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences: {}", self.path.display()))?;

        let prefs: Prefs = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse preferences: {}", self.path.display()))?;

        Ok(prefs.last_city)
    }
}
