// Settings persistence: workspace and layout configuration.
// Uses platform-native config dir: e.g. ~/Library/Application Support/termgrid/settings.json
// on macOS, ~/.config/termgrid/settings.json on Linux.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use termgrid_core::Orientation;
use termgrid_layout::LayoutSettings;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub workspace: WorkspaceSettings,
    /// Splits applied, in order, to build the initial workspace.
    #[serde(default)]
    pub splits: Vec<SplitStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceSettings {
    #[serde(default = "default_rows")]
    pub rows: u16,
    #[serde(default = "default_columns")]
    pub columns: u16,
    /// Name bound to the first terminal.
    #[serde(default = "default_root_name")]
    pub root_name: String,
}

fn default_rows() -> u16 {
    40
}

fn default_columns() -> u16 {
    120
}

fn default_root_name() -> String {
    "main".to_string()
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            columns: default_columns(),
            root_name: default_root_name(),
        }
    }
}

/// One split of the initial layout: split the terminal bound to `target`,
/// optionally binding the new pane to `bind_as`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitStep {
    pub target: String,
    pub orientation: Orientation,
    #[serde(default)]
    pub bind_as: Option<String>,
}

fn settings_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("termgrid").join("settings.json"))
}

pub fn load_settings() -> AppSettings {
    match settings_path() {
        Some(path) => load_settings_from(&path),
        None => AppSettings::default(),
    }
}

pub fn load_settings_from(path: &Path) -> AppSettings {
    match std::fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to parse {}: {}", path.display(), e);
                AppSettings::default()
            }
        },
        Err(_) => AppSettings::default(),
    }
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from(&dir.path().join("nope.json"));
        assert_eq!(settings.workspace.rows, 40);
        assert_eq!(settings.workspace.columns, 120);
        assert_eq!(settings.layout, LayoutSettings::default());
        assert!(settings.splits.is_empty());
    }

    #[test]
    fn test_invalid_json_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let settings = load_settings_from(&path);
        assert_eq!(settings.workspace.root_name, "main");
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "layout": { "trench_thickness_px": 3.0 },
                "workspace": { "rows": 24 },
                "splits": [ { "target": "main", "orientation": "vertical", "bind_as": "logs" } ]
            }"#,
        )
        .unwrap();
        let settings = load_settings_from(&path);
        assert_eq!(settings.layout.trench_thickness_px, 3.0);
        assert_eq!(settings.layout.min_pane_rows, LayoutSettings::default().min_pane_rows);
        assert_eq!(settings.workspace.rows, 24);
        assert_eq!(settings.workspace.columns, 120);
        assert_eq!(settings.splits.len(), 1);
        assert_eq!(settings.splits[0].orientation, Orientation::Vertical);
        assert_eq!(settings.splits[0].bind_as.as_deref(), Some("logs"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = AppSettings::default();
        settings.workspace.columns = 80;
        save_settings_to(&path, &settings).unwrap();
        assert_eq!(load_settings_from(&path).workspace.columns, 80);
    }
}
