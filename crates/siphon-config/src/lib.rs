//! # Siphon Configuration
//!
//! Configuration handling with support for:
//! - Directive files (`Siphonfile`), dispensed token by token to modules
//! - Structured files (JSON, YAML, TOML) keyed by module name
//! - Environment variable placeholders

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod dispenser;
pub mod loader;

pub use dispenser::{Dispenser, Line};
pub use loader::{expand_env_vars, load_from_file, load_from_str};

use siphon_core::ConfigError;
use std::collections::BTreeMap;
use std::path::Path;

/// Raw per-module configuration keyed by module name
pub type ModuleConfigs = BTreeMap<String, serde_json::Value>;

/// File name recognised as a directive file
pub const DIRECTIVE_FILE_NAME: &str = "Siphonfile";

/// Parsed configuration, before any module has seen it
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Directive lines
    Directives(Dispenser),
    /// Structured module configs
    Modules(ModuleConfigs),
}

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// Directive lines
    Directive,
    /// YAML format
    Yaml,
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Detect format from file name or extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if path.file_name().and_then(|s| s.to_str()) == Some(DIRECTIVE_FILE_NAME) {
            return Ok(ConfigFormat::Directive);
        }

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        match ext {
            "siphonfile" => Ok(ConfigFormat::Directive),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Human-readable format name
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Directive => "directives",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("config.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("config.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("config.json")).unwrap(),
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("/etc/siphon/Siphonfile")).unwrap(),
            ConfigFormat::Directive
        );
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("site.siphonfile")).unwrap(),
            ConfigFormat::Directive
        );
    }

    #[test]
    fn test_unsupported_format() {
        let result = ConfigFormat::from_path(&PathBuf::from("config.txt"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));

        let result = ConfigFormat::from_path(&PathBuf::from("noext"));
        assert!(result.is_err());
    }
}
