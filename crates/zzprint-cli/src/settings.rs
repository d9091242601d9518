//! Persistent user settings
//!
//! Remembers the last grid, copy count and folders between runs, stored as
//! pretty JSON in the config directory.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use zzprint_layout::Grid;
use zzprint_layout::constants::{MAX_COPIES, MIN_COPIES};

pub const SETTINGS_FILE: &str = "settings.json";
pub const HISTORY_FILE: &str = "print_history.json";

/// Keys accepted by `config set`
pub const KEYS: [&str; 4] = ["grid", "copies", "last_path", "last_save_path"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid: Grid,
    pub copies: u8,
    /// Folder invoices were last imported from
    pub last_path: Option<PathBuf>,
    /// Folder the last output was saved to
    pub last_save_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid: Grid::OneByTwo,
            copies: 2,
            last_path: None,
            last_save_path: None,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is missing or unreadable
    pub async fn load(path: &Path) -> Self {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(_) => return Self::default(),
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Cannot write {}", path.display()))?;
        Ok(())
    }

    /// Update one setting from its textual form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "grid" => self.grid = value.parse()?,
            "copies" => {
                let copies: u8 = value
                    .parse()
                    .with_context(|| format!("Invalid copies '{}'", value))?;
                if !(MIN_COPIES..=MAX_COPIES).contains(&copies) {
                    bail!("Copies must be between {} and {}", MIN_COPIES, MAX_COPIES);
                }
                self.copies = copies;
            }
            "last_path" => self.last_path = optional_path(value),
            "last_save_path" => self.last_save_path = optional_path(value),
            _ => bail!("Unknown setting '{}', expected one of: {}", key, KEYS.join(", ")),
        }
        Ok(())
    }

    /// Settings as `key = value` lines
    pub fn describe(&self) -> Vec<String> {
        let path = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unset)".to_string())
        };
        vec![
            format!("grid = {}", self.grid),
            format!("copies = {}", self.copies),
            format!("last_path = {}", path(&self.last_path)),
            format!("last_save_path = {}", path(&self.last_save_path)),
        ]
    }
}

fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_first_run() {
        let settings = Settings::default();
        assert_eq!(settings.grid, Grid::OneByTwo);
        assert_eq!(settings.copies, 2);
    }

    #[test]
    fn test_set_values() {
        let mut settings = Settings::default();
        settings.set("grid", "2x4").unwrap();
        settings.set("copies", "4").unwrap();
        settings.set("last_path", "/tmp/invoices").unwrap();

        assert_eq!(settings.grid, Grid::TwoByFour);
        assert_eq!(settings.copies, 4);
        assert_eq!(settings.last_path, Some(PathBuf::from("/tmp/invoices")));

        settings.set("last_path", "").unwrap();
        assert_eq!(settings.last_path, None);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(settings.set("copies", "5").is_err());
        assert!(settings.set("copies", "many").is_err());
        assert!(settings.set("grid", "0x1").is_err());
        assert!(settings.set("printer", "office").is_err());
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let mut settings = Settings::default();
        settings.set("grid", "2×3").unwrap();
        settings.save(&path).await.unwrap();

        assert_eq!(Settings::load(&path).await, settings);
    }

    #[tokio::test]
    async fn test_corrupt_settings_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "[]").unwrap();

        assert_eq!(Settings::load(&path).await, Settings::default());
    }
}
