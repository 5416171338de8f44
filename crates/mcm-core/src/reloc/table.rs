use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{Error, Result};
use crate::reloc::RuntimeVersion;

/// Known relative virtual addresses per runtime version.
///
/// Tables are data: they can be compiled in for known releases or loaded from
/// an offsets file, and are applied to declared addresses by name.
#[derive(Debug, Clone, Default)]
pub struct VersionTable {
    entries: HashMap<RuntimeVersion, BTreeMap<String, u64>>,
}

impl VersionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, version: RuntimeVersion, name: &str, rva: u64) {
        self.entries
            .entry(version)
            .or_default()
            .insert(name.to_lowercase(), rva);
    }

    pub fn get(&self, version: RuntimeVersion, name: &str) -> Option<u64> {
        self.entries
            .get(&version)
            .and_then(|names| names.get(&name.to_lowercase()))
            .copied()
    }

    /// Every `(version, rva)` known for `name`
    pub fn versions_of(&self, name: &str) -> Vec<(RuntimeVersion, u64)> {
        let key = name.to_lowercase();
        let mut found: Vec<_> = self
            .entries
            .iter()
            .filter_map(|(version, names)| names.get(&key).map(|rva| (*version, *rva)))
            .collect();
        found.sort_unstable();
        found
    }

    pub fn versions(&self) -> Vec<RuntimeVersion> {
        let mut versions: Vec<_> = self.entries.keys().copied().collect();
        versions.sort_unstable();
        versions
    }

    pub fn merge(&mut self, other: VersionTable) {
        for (version, names) in other.entries {
            self.entries.entry(version).or_default().extend(names);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|names| names.is_empty())
    }

    /// Load a single-version offsets file.
    ///
    /// ```text
    /// 1.10.20.0
    /// # comment
    /// execute_command = 0x01259430
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, version: RuntimeVersion) -> Result<()> {
        fs::write(path, self.format(version))?;
        Ok(())
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with(';'));

        // First line is version
        let version: RuntimeVersion = lines
            .next()
            .ok_or_else(|| Error::InvalidOffset("Offsets file is empty".to_string()))?
            .parse()?;

        let mut table = Self::new();
        for line in lines {
            match line.split_once('=') {
                Some((key, value)) => {
                    table.insert(version, key.trim(), parse_hex_value(value)?);
                }
                None => warn!("Ignoring malformed offsets line: '{}'", line),
            }
        }

        Ok(table)
    }

    pub fn format(&self, version: RuntimeVersion) -> String {
        let mut lines = vec![version.to_string()];
        if let Some(names) = self.entries.get(&version) {
            lines.extend(
                names
                    .iter()
                    .map(|(name, rva)| format!("{} = {:#010x}", name, rva)),
            );
        }
        lines.join("\n")
    }
}

pub(crate) fn parse_hex_value(value: &str) -> Result<u64> {
    let value = value.trim();
    // Strip hex prefix (case-insensitive), only once
    let value = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    u64::from_str_radix(value, 16)
        .map_err(|e| Error::InvalidOffset(format!("Failed to parse '{}': {}", value, e)))
}
