//! # Settings
//!
//! Persisted editor preferences, stored as a flat JSON object.
//!
//! Missing keys fall back to their defaults, so settings files written by
//! older versions keep loading.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::editor_state::voxels::color::Color;

/// Editor preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Width of a new model, in voxels
    pub default_model_width: i32,
    /// Height of a new model, in voxels
    pub default_model_height: i32,
    /// Depth of a new model, in voxels
    pub default_model_depth: i32,
    /// Paint color selected at startup
    pub default_color: Color,
    /// Noise intensity used by the fill tool, in `[0, 1]`
    pub fill_intensity: f32,
    /// Maximum number of undo steps kept, unbounded if unset
    pub undo_limit: Option<usize>,
    /// Split an undo batch after this many changes, never if unset
    pub undo_auto_commit: Option<usize>,
    /// Fixed seed for the fill tool's noise, random if unset
    pub noise_seed: Option<u64>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        EditorSettings {
            default_model_width: 16,
            default_model_height: 16,
            default_model_depth: 16,
            default_color: Color::WHITE,
            fill_intensity: 0.3,
            undo_limit: None,
            undo_auto_commit: None,
            noise_seed: None,
        }
    }
}

impl EditorSettings {
    /// Parses settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes settings to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads settings from `path`.
    ///
    /// # Errors
    /// [`crate::core::EditError::Io`] if the file cannot be read,
    /// [`crate::core::EditError::Settings`] if it is not valid settings JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Self::from_json(&fs::read_to_string(path)?)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reads settings from `path`, falling back to defaults if the file is
    /// missing or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            warn!("Using default settings, could not read {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Writes settings to `path`, replacing any existing file.
    ///
    /// # Arguments
    /// * `path` - Destination file; its directory must exist
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }
}
