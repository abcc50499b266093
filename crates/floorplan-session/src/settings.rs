//! Editor settings persisted in the config directory.
//!
//! Missing or unreadable settings fall back to defaults; the CLI can
//! override any of them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default horizontal pixels per terminal cell
pub const DEFAULT_CELL_WIDTH_PX: f64 = 8.0;
/// Default vertical pixels per terminal cell
pub const DEFAULT_CELL_HEIGHT_PX: f64 = 16.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed canvas width in pixels; the visible area is used when unset
    pub canvas_width: Option<f64>,
    /// Fixed canvas height in pixels; the visible area is used when unset
    pub canvas_height: Option<f64>,
    pub cell_width_px: f64,
    pub cell_height_px: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: None,
            canvas_height: None,
            cell_width_px: DEFAULT_CELL_WIDTH_PX,
            cell_height_px: DEFAULT_CELL_HEIGHT_PX,
        }
    }
}

impl Settings {
    /// Load from the default config path
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let parsed = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))
            .and_then(|content| serde_json::from_str::<Settings>(&content).map_err(Into::into));
        match parsed {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable settings");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
        Ok(())
    }

    /// `$XDG_CONFIG_HOME/floorplan/settings.json`, else `~/.config/...`
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".config")
            });
        config_dir.join("floorplan").join("settings.json")
    }

    fn sanitized(mut self) -> Self {
        if !(self.cell_width_px.is_finite() && self.cell_width_px > 0.0) {
            self.cell_width_px = DEFAULT_CELL_WIDTH_PX;
        }
        if !(self.cell_height_px.is_finite() && self.cell_height_px > 0.0) {
            self.cell_height_px = DEFAULT_CELL_HEIGHT_PX;
        }
        self.canvas_width = self.canvas_width.filter(|w| w.is_finite() && *w > 0.0);
        self.canvas_height = self.canvas_height.filter(|h| h.is_finite() && *h > 0.0);
        self
    }
}

/// `$XDG_DATA_HOME/floorplan`, else `~/.local/share/floorplan`
pub fn default_data_dir() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local/share")
        });
    data_dir.join("floorplan")
}
