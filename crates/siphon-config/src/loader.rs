//! Configuration loading

use crate::{ConfigFormat, ConfigSource, Dispenser, ModuleConfigs};
use regex::Regex;
use siphon_core::{ConfigError, Result};
use std::env;
use std::fs;
use std::path::Path;

/// Load configuration from a file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ConfigSource> {
    let path = path.as_ref();

    let content = fs::read_to_string(path)?;
    let format = ConfigFormat::from_path(path)?;

    tracing::debug!(path = %path.display(), ?format, "Loading configuration");

    Ok(load_from_str(&content, format)?)
}

/// Expand environment variables in configuration text.
/// Supports syntax: ${VAR} and ${VAR:-default}
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(:-([^}]*))?\}").map_err(|e| {
        ConfigError::Parse {
            format: "placeholder",
            message: e.to_string(),
        }
    })?;

    let mut result = String::with_capacity(content.len());
    let mut last_match = 0;

    for cap in re.captures_iter(content) {
        let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let default_value = cap.get(3).map(|m| m.as_str());

        let value = match env::var(var_name.as_str()) {
            Ok(val) => val,
            Err(_) => match default_value {
                Some(default) => default.to_string(),
                None => return Err(ConfigError::MissingEnvVar(var_name.as_str().to_string())),
            },
        };

        result.push_str(&content[last_match..full_match.start()]);
        result.push_str(&value);
        last_match = full_match.end();
    }

    result.push_str(&content[last_match..]);

    Ok(result)
}

/// Load configuration from a string
pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<ConfigSource, ConfigError> {
    let value: serde_json::Value = match format {
        // Expanded per argument token, after comments are stripped, so a
        // substituted value stays a single argument
        ConfigFormat::Directive => {
            let dispenser = Dispenser::parse(content)?.try_map_args(expand_env_vars)?;
            return Ok(ConfigSource::Directives(dispenser));
        }
        ConfigFormat::Json => {
            serde_json::from_str(&expand_env_vars(content)?).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            })?
        }
        ConfigFormat::Yaml => {
            serde_yaml::from_str(&expand_env_vars(content)?).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            })?
        }
        ConfigFormat::Toml => {
            toml::from_str(&expand_env_vars(content)?).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            })?
        }
    };

    match value {
        serde_json::Value::Object(map) => {
            let modules: ModuleConfigs = map.into_iter().collect();
            Ok(ConfigSource::Modules(modules))
        }
        serde_json::Value::Null => Ok(ConfigSource::Modules(ModuleConfigs::new())),
        _ => Err(ConfigError::Parse {
            format: format.name(),
            message: "expected a map of module name to module config".to_string(),
        }),
    }
}
