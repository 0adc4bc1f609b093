use crate::error::{CampusDbError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional per-directory settings, read from `campusdb.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub students_file: String,
    pub colleges_file: String,
    pub programs_file: String,
    pub delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            students_file: "students.csv".into(),
            colleges_file: "colleges.csv".into(),
            programs_file: "programs.csv".into(),
            delimiter: ',',
        }
    }
}

impl Config {
    pub const FILE_NAME: &'static str = "campusdb.yaml";

    /// Load `campusdb.yaml` from the data directory, or the defaults if absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(Self::FILE_NAME);
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_yaml_str(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.delimiter_byte()?;
        for (key, value) in [
            ("students_file", &config.students_file),
            ("colleges_file", &config.colleges_file),
            ("programs_file", &config.programs_file),
        ] {
            if value.trim().is_empty() {
                return Err(CampusDbError::Config(format!("'{key}' must not be empty")));
            }
        }
        Ok(config)
    }

    /// The delimiter as a byte. Must be a single ASCII character other than
    /// a quote or line break.
    pub fn delimiter_byte(&self) -> Result<u8> {
        let c = self.delimiter;
        if !c.is_ascii() || matches!(c, '"' | '\n' | '\r') {
            return Err(CampusDbError::Config(format!(
                "unsupported delimiter {c:?}"
            )));
        }
        Ok(c as u8)
    }
}
