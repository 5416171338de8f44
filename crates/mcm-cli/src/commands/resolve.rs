//! Resolve the engine address set against a module dump.

use std::path::Path;

use anyhow::{Context, Result};
use mcm_core::McmConfig;
use mcm_core::process::ReadMemory;
use mcm_core::reloc::{AddressResolver, EngineAddresses, RuntimeVersion, ScanPolicy, VersionTable};
use owo_colors::OwoColorize;

use crate::cli_utils;

pub fn run(
    config: &McmConfig,
    image: &Path,
    base: &str,
    runtime: Option<&str>,
    offsets: Option<&Path>,
    always_scan: bool,
    output: Option<&Path>,
) -> Result<()> {
    let reader = cli_utils::load_image(image, base)?;
    let base = reader.base_address();

    let version = match runtime {
        Some(text) => text.parse::<RuntimeVersion>()?,
        None => config.runtime_version.unwrap_or(RuntimeVersion::V1_10_20),
    };
    let policy = if always_scan {
        ScanPolicy::AlwaysScan
    } else {
        config.scan_policy
    };

    let mut table = VersionTable::new();
    if let Some(path) = offsets.or(config.offsets_file.as_deref()) {
        let loaded = VersionTable::load(path)
            .with_context(|| format!("Failed to load offsets {}", path.display()))?;
        table.merge(loaded);
    }

    let mut resolver = AddressResolver::new(reader)
        .with_policy(policy)
        .with_table(table);
    let engine = EngineAddresses::declare(&mut resolver);
    let report = resolver.resolve_all(version);

    eprintln!(
        "Runtime {} / {:?} / {} ms",
        version,
        policy,
        report.elapsed.as_millis()
    );

    let mut derived = VersionTable::new();
    for address in engine.all() {
        match address.get() {
            Some(ea) => {
                let rva = ea.wrapping_sub(base);
                derived.insert(version, address.name(), rva);
                println!(
                    "{:<26} {}  RVA {}",
                    address.name(),
                    format!("{:#x}", ea).green(),
                    format!("{:#010x}", rva).dimmed()
                );
            }
            None => println!("{:<26} {}", address.name(), "unresolved".red()),
        }
    }

    if let Some(path) = output {
        derived.save(path, version)?;
        eprintln!("Wrote offsets to {}", path.display());
    }

    if !report.is_complete() {
        eprintln!(
            "{}",
            format!("{} address(es) unresolved", report.unresolved.len()).yellow()
        );
    }

    Ok(())
}
