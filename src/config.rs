//! Configuration management for dossier.
//!
//! Handles loading configuration from a TOML file, with environment fallbacks
//! for the pager and editor programs.

use crate::error::{DossierError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for dossier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Print full error traces for handler and pipeline failures.
    #[serde(default)]
    pub debug: bool,

    /// Colorize command output.
    #[serde(default = "default_true")]
    pub color: bool,

    /// Append creation/modification metadata to listed rows.
    #[serde(default)]
    pub show_metadata: bool,

    /// Delimiter character that introduces a modifier stage (`$L` pages output).
    #[serde(default = "default_modifier")]
    pub modifier: String,

    /// External pager used by the page modifier.
    #[serde(default = "ProgramConfig::default_pager")]
    pub pager: ProgramConfig,

    /// External editor used by edit commands.
    #[serde(default = "ProgramConfig::default_editor")]
    pub editor: ProgramConfig,

    /// Data store location.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// An external program invocation: executable plus leading arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Program name or path.
    pub command: String,

    /// Arguments placed before the file path.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Data store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file; the platform data directory is used when unset.
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_modifier() -> String {
    "$".to_string()
}

impl ProgramConfig {
    fn default_pager() -> Self {
        Self::from_env("PAGER", "less")
    }

    fn default_editor() -> Self {
        Self::from_env("EDITOR", "vi")
    }

    /// Builds a program from an environment variable such as `PAGER="less -S"`.
    fn from_env(var: &str, fallback: &str) -> Self {
        let raw = std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        let mut parts = raw.split_whitespace().map(String::from);
        let command = parts.next().unwrap_or_else(|| fallback.to_string());
        Self {
            command,
            args: parts.collect(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            color: true,
            show_metadata: false,
            modifier: default_modifier(),
            pager: ProgramConfig::default_pager(),
            editor: ProgramConfig::default_editor(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dossier")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file; a missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DossierError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses and validates configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            DossierError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        config.modifier_char()?;
        Ok(config)
    }

    /// Returns the modifier delimiter as a single character.
    ///
    /// It must not collide with the filter delimiter or the help suffix.
    pub fn modifier_char(&self) -> Result<char> {
        let mut chars = self.modifier.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c == '~' || c == '?' || c.is_whitespace() => Err(
                DossierError::config(format!("modifier '{c}' is reserved")),
            ),
            (Some(c), None) => Ok(c),
            _ => Err(DossierError::config(format!(
                "modifier must be a single character, got '{}'",
                self.modifier
            ))),
        }
    }

    /// Returns the database path, falling back to the platform data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| DossierError::config("Could not determine data directory"))?;
        Ok(data_dir.join("dossier").join("dossier.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let toml = r#"
debug = true
color = false
show_metadata = true
modifier = "%"

[pager]
command = "most"

[editor]
command = "nano"
args = ["-w"]

[database]
path = "/tmp/dossier-test.db"
"#;
        let config = Config::parse_toml(toml, Path::new("config.toml")).unwrap();

        assert!(config.debug);
        assert!(!config.color);
        assert!(config.show_metadata);
        assert_eq!(config.modifier_char().unwrap(), '%');
        assert_eq!(config.pager.command, "most");
        assert!(config.pager.args.is_empty());
        assert_eq!(config.editor.command, "nano");
        assert_eq!(config.editor.args, vec!["-w".to_string()]);
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/dossier-test.db")
        );
    }

    #[test]
    fn test_missing_optional_fields() {
        let config = Config::parse_toml("", Path::new("config.toml")).unwrap();

        assert!(!config.debug);
        assert!(config.color);
        assert!(!config.show_metadata);
        assert_eq!(config.modifier_char().unwrap(), '$');
        assert!(!config.pager.command.is_empty());
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_reserved_modifier_rejected() {
        let result = Config::parse_toml("modifier = \"~\"", Path::new("config.toml"));
        assert!(result.unwrap_err().to_string().contains("reserved"));

        let result = Config::parse_toml("modifier = \"?\"", Path::new("config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_multi_char_modifier_rejected() {
        let result = Config::parse_toml("modifier = \"$$\"", Path::new("config.toml"));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("single character"));

        let result = Config::parse_toml("modifier = \"\"", Path::new("config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_names_file() {
        let result = Config::parse_toml("debug = ", Path::new("/etc/dossier.toml"));
        assert!(result.unwrap_err().to_string().contains("/etc/dossier.toml"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.modifier, "$");
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        assert!(Config::default_path().ends_with("dossier/config.toml"));
    }
}
