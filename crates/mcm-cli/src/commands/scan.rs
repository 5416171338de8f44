//! Signature search over a module dump.

use std::path::Path;

use anyhow::Result;
use mcm_core::Pattern;
use mcm_core::process::{ReadMemory, scan_all, scan_first};
use owo_colors::OwoColorize;

use crate::cli_utils;

pub fn run(image: &Path, base: &str, pattern: &str, all: bool) -> Result<()> {
    let reader = cli_utils::load_image(image, base)?;
    let pattern = Pattern::parse(pattern)?;
    let base = reader.base_address();

    eprintln!("Pattern: {} ({} bytes)", pattern, pattern.len());

    let matches = if all {
        scan_all(&reader, &pattern)?
    } else {
        scan_first(&reader, &pattern)?.into_iter().collect()
    };

    if matches.is_empty() {
        println!("{}", "No match".red());
        return Ok(());
    }

    for address in &matches {
        println!(
            "{}  RVA {}",
            format!("{:#x}", address).green(),
            format!("{:#010x}", address - base).dimmed()
        );
    }
    if all {
        eprintln!("{} match(es)", matches.len());
    }

    Ok(())
}
