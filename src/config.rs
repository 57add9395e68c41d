use std::collections::HashMap;
use std::env;
use std::fs;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_WORKING_HOURS_START: &str = "09:00";
pub const DEFAULT_WORKING_HOURS_END: &str = "17:00";

/// Flat KEY=VALUE config loaded from an optional file, with the process
/// environment as the fallback for every key.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::InvalidLine {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            values.insert(key.trim().to_string(), unquote(value.trim()));
        }
        Ok(Self { values })
    }

    /// File value first, then the process environment.
    pub fn prop(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .cloned()
            .or_else(|| env::var(key).ok())
    }

    pub fn prop_or(&self, key: &str, default: &str) -> String {
        self.prop(key).unwrap_or_else(|| default.to_string())
    }

    pub fn model(&self) -> String {
        self.prop_or("OPENAI_MODEL", DEFAULT_MODEL)
    }

    pub fn timezone(&self) -> String {
        self.prop_or("TIMEZONE", DEFAULT_TIMEZONE)
    }

    pub fn working_hours(&self) -> (String, String) {
        (
            self.prop_or("WORKING_HOURS_START", DEFAULT_WORKING_HOURS_START),
            self.prop_or("WORKING_HOURS_END", DEFAULT_WORKING_HOURS_END),
        )
    }
}

fn unquote(value: &str) -> String {
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}
