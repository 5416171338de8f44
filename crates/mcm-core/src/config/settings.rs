use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::paths;
use crate::error::{Error, Result};
use crate::reloc::{RuntimeVersion, ScanPolicy};

/// Runtime configuration, read from a TOML file.
///
/// ```toml
/// data_root = "Data/MCM"
/// runtime_version = "1.10.20"
/// scan_policy = "table_first"
/// offsets_file = "offsets.txt"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McmConfig {
    pub data_root: PathBuf,
    /// Overrides the version reported by the host
    pub runtime_version: Option<RuntimeVersion>,
    pub scan_policy: ScanPolicy,
    /// Extra version table merged over the built-in one
    pub offsets_file: Option<PathBuf>,
}

impl Default for McmConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(paths::DATA_ROOT),
            runtime_version: None,
            scan_policy: ScanPolicy::default(),
            offsets_file: None,
        }
    }
}

impl McmConfig {
    pub fn with_data_root<P: Into<PathBuf>>(data_root: P) -> Self {
        Self {
            data_root: data_root.into(),
            ..Self::default()
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParseError(e.to_string()))
    }

    /// Directory holding per-mod definition folders
    pub fn config_dir(&self) -> PathBuf {
        self.data_root.join(paths::CONFIG_DIR)
    }

    pub fn keybinds_file(&self) -> PathBuf {
        self.data_root
            .join(paths::SETTINGS_DIR)
            .join(paths::KEYBINDS_FILE)
    }
}
