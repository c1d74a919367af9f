use crate::error::{MergeError, Result};
use crate::template::render::{Layout, OutputFormat, DEFAULT_SIGNATURE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

pub const CONFIG_KEYS: &[&str] = &["format", "layout", "signature"];

/// Settings stored in `<data dir>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeConfig {
    /// Output format used by `generate` when none is given.
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub layout: Layout,

    /// Closing line of the letter layout.
    #[serde(default = "default_signature")]
    pub signature: String,
}

fn default_signature() -> String {
    DEFAULT_SIGNATURE.to_string()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            layout: Layout::default(),
            signature: default_signature(),
        }
    }
}

impl MergeConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(MergeError::Io)?;
        let config: MergeConfig =
            serde_json::from_str(&content).map_err(MergeError::Serialization)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(MergeError::Io)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(MergeError::Serialization)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content).map_err(MergeError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "format" => Some(self.format.to_string()),
            "layout" => Some(self.layout.to_string()),
            "signature" => Some(self.signature.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "format" => self.format = value.parse()?,
            "layout" => self.layout = value.parse()?,
            "signature" => self.signature = value.to_string(),
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}
