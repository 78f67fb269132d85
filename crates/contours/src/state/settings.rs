//! Tool settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::KeyMap;

/// Contour tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Vertices per loop for new paths
    pub loop_vert_count: usize,
    /// Spans between the end loops of a new path
    pub default_segments: usize,
    /// Target size of a loop's handle subsample
    pub handle_count: usize,
    /// A new loop joins a path whose backbone is closer than
    /// `path_proximity * loop radius`
    pub path_proximity: f32,
    /// Hit-test radius in pixels
    pub pick_radius_px: f64,
    /// Weight of the previous stroke point (0 = raw input)
    pub stroke_smoothing: f64,
    /// Maximum undo entries
    pub undo_depth: usize,
    /// Shorter click-drags cut along the screen horizontal
    pub min_cut_length_px: f64,
    /// Physical bindings for the tool actions
    pub keymap: KeyMap,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            loop_vert_count: 16,
            default_segments: 8,
            handle_count: 8,
            path_proximity: 2.0,
            pick_radius_px: 12.0,
            stroke_smoothing: 0.5,
            undo_depth: 50,
            min_cut_length_px: 4.0,
            keymap: KeyMap::default(),
        }
    }
}

impl ToolSettings {
    /// Settings file in the user config directory
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "contours", "contours")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the config directory, or return default if not found
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
        serde_json::from_str(&json).map_err(|e| format!("Invalid settings JSON: {e}"))
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path().ok_or("No config directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| format!("Cannot create {}: {e}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| format!("Cannot write {}: {e}", path.display()))
    }
}
