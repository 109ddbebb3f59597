//! Application settings and defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;


/// Workbook read when no path is given.
pub const DEFAULT_WORKBOOK: &str = "Arquivo final.xlsx";

/// Sheet holding the sales table.
pub const DEFAULT_SHEET_NAME: &str = "Arquivo final";

/// Maximum number of data rows read from the sheet.
pub const DEFAULT_ROW_LIMIT: usize = 7225;

/// Width of terminal bar charts, in cells.
pub const BAR_WIDTH: usize = 30;

/// Environment variables consulted for the data source.
pub const WORKBOOK_ENV: &str = "SDASH_WORKBOOK";
pub const SHEET_ENV: &str = "SDASH_SHEET";


/// Values read from the optional settings file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub workbook: Option<PathBuf>,
    pub sheet: Option<String>,
    pub row_limit: Option<usize>,
    pub theme: Option<String>,
}


impl Settings {
    /// Load the settings file from the default location, or defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_settings_path())
    }

    /// Load settings from a JSON file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// Workbook path, preferring an explicit value over the file and the default.
    pub fn workbook_or(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.workbook.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK))
    }

    pub fn sheet_or(&self, explicit: Option<String>) -> String {
        explicit
            .or_else(|| self.sheet.clone())
            .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string())
    }

    pub fn row_limit_or(&self, explicit: Option<usize>) -> usize {
        explicit.or(self.row_limit).unwrap_or(DEFAULT_ROW_LIMIT)
    }
}


/// Get the settings file path.
pub fn get_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sales-dashboard")
        .join("settings.json")
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_ROW_LIMIT, 7225);
        assert_eq!(DEFAULT_SHEET_NAME, "Arquivo final");
    }

    #[test]
    fn test_get_settings_path() {
        let path = get_settings_path();
        assert!(path.to_string_lossy().contains("sales-dashboard"));
        assert!(path.to_string_lossy().ends_with("settings.json"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.row_limit_or(None), DEFAULT_ROW_LIMIT);
        assert_eq!(settings.workbook_or(None), PathBuf::from(DEFAULT_WORKBOOK));
    }

    #[test]
    fn test_precedence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"sheet": "Vendas", "row_limit": 100}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.sheet_or(None), "Vendas");
        assert_eq!(settings.sheet_or(Some("Outra".to_string())), "Outra");
        assert_eq!(settings.row_limit_or(None), 100);
        assert_eq!(settings.row_limit_or(Some(5)), 5);
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid settings file"));
    }
}
