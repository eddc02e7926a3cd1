// ============================================================================
// FILTER PRESETS — named custom matrices persisted as JSON
// ============================================================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::filters::ColorMatrix;

/// A user-named custom matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPreset {
    pub name: String,
    pub matrix: ColorMatrix,
}

/// On-disk store for presets. Loading tolerates a missing or corrupt file
/// (you get an empty store); saving is best-effort and only logged on error.
pub struct PresetStore {
    path: Option<PathBuf>,
    pub presets: Vec<FilterPreset>,
}

impl PresetStore {
    /// Load from the default per-user config location.
    pub fn load() -> Self {
        match Self::presets_path() {
            Some(path) => Self::load_from(path),
            None => Self {
                path: None,
                presets: Vec::new(),
            },
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: PathBuf) -> Self {
        let presets = std::fs::read_to_string(&path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();
        Self {
            path: Some(path),
            presets,
        }
    }

    /// Write the store back to disk.
    pub fn save(&self) {
        let Some(path) = &self.path else { return };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.presets) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    crate::log_warn!("Failed to write presets to {}: {}", path.display(), e);
                }
            }
            Err(e) => crate::log_warn!("Failed to serialize presets: {}", e),
        }
    }

    /// Add a preset, replacing any existing one with the same name.
    pub fn add(&mut self, name: String, matrix: ColorMatrix) {
        if let Some(existing) = self.presets.iter_mut().find(|p| p.name == name) {
            existing.matrix = matrix;
        } else {
            self.presets.push(FilterPreset { name, matrix });
        }
        self.save();
    }

    pub fn remove(&mut self, name: &str) {
        self.presets.retain(|p| p.name != name);
        self.save();
    }

    /// Per-user config path:
    ///   Linux:   `~/.config/filterfe/filter_presets.json` (XDG respected)
    ///   Windows: `%APPDATA%\FilterFE\filter_presets.json`
    ///   macOS:   `~/Library/Application Support/FilterFE/filter_presets.json`
    fn presets_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("filterfe");
            return Some(config_dir.join("filter_presets.json"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").ok()?;
            return Some(
                PathBuf::from(appdata)
                    .join("FilterFE")
                    .join("filter_presets.json"),
            );
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("FilterFE")
                    .join("filter_presets.json"),
            );
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("filter_presets.json")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");

        let mut store = PresetStore::load_from(path.clone());
        assert!(store.presets.is_empty());
        store.add("warm".to_string(), ColorMatrix::identity());
        drop(store);

        let store = PresetStore::load_from(path);
        assert_eq!(store.presets.len(), 1);
        assert_eq!(store.presets[0].name, "warm");
        assert_eq!(store.presets[0].matrix, ColorMatrix::identity());
    }

    #[test]
    fn test_add_replaces_same_name_and_remove_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PresetStore::load_from(dir.path().join("presets.json"));

        store.add("x".to_string(), ColorMatrix::identity());
        store.add(
            "x".to_string(),
            ColorMatrix::new([
                [2.0, 0.0, 0.0, 0.0],
                [0.0, 2.0, 0.0, 0.0],
                [0.0, 0.0, 2.0, 0.0],
            ]),
        );
        assert_eq!(store.presets.len(), 1);

        store.remove("x");
        assert!(store.presets.is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");
        std::fs::write(&path, "not json").unwrap();

        let store = PresetStore::load_from(path);
        assert!(store.presets.is_empty());
    }
}
