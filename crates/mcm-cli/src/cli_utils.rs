//! Common CLI utility functions shared across commands.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use mcm_core::process::MockMemoryReader;
use mcm_core::{EngineContext, LoadOrder, McmConfig};
use tracing::info;

pub fn load_config(path: &Path) -> McmConfig {
    EngineContext::load_config(path)
}

/// Parse a hex address with or without a `0x` prefix.
pub fn parse_hex_address(s: &str) -> Result<u64> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        bail!("Empty address");
    }
    u64::from_str_radix(digits, 16).with_context(|| format!("Invalid hex address: {}", s))
}

/// Load a raw module dump as if it were mapped at `base`.
pub fn load_image(path: &Path, base: &str) -> Result<MockMemoryReader> {
    let base = parse_hex_address(base)?;
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    info!(
        "Loaded {} ({} bytes) at base {:#x}",
        path.display(),
        data.len(),
        base
    );
    Ok(MockMemoryReader::with_base(data, base))
}

pub fn load_forms(path: Option<&Path>) -> Result<Arc<LoadOrder>> {
    let order = match path {
        Some(path) => LoadOrder::load(path)
            .with_context(|| format!("Failed to read load order {}", path.display()))?,
        None => LoadOrder::new(),
    };
    Ok(Arc::new(order))
}

/// Config with the data root overridden when given.
pub fn with_root(config: &McmConfig, root: Option<&Path>) -> McmConfig {
    match root {
        Some(root) => McmConfig {
            data_root: root.to_path_buf(),
            ..config.clone()
        },
        None => config.clone(),
    }
}
