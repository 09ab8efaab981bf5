use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

use crate::error::ConfigError;

/// Settings for [`crate::formatter::format_error_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// How many characters of the remaining input to quote after "got"
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            excerpt_length: default_excerpt_length(),
        }
    }
}

impl FormatConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        from_file(path)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        from_str(s)
    }
}

fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> Result<T, ConfigError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)?;
    Ok(config)
}

fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, ConfigError> {
    let config = serde_json::from_str(s)?;
    Ok(config)
}

fn default_excerpt_length() -> usize {
    12
}
