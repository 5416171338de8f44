//! Show persisted registrations and whether they still resolve.

use std::path::Path;

use anyhow::{Context, Result};
use mcm_core::persist::KeybindsDocument;
use mcm_core::{KeybindCatalog, KeybindStore, McmConfig};
use owo_colors::OwoColorize;

use crate::cli_utils;

pub fn run(
    config: &McmConfig,
    file: Option<&Path>,
    root: Option<&Path>,
    load_order: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = cli_utils::with_root(config, root);
    let path = file.map_or_else(|| config.keybinds_file(), Path::to_path_buf);

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = KeybindsDocument::parse(&content)?;

    let forms = cli_utils::load_forms(load_order)?;
    let store = KeybindStore::new(KeybindCatalog::new(config.config_dir(), forms));

    let mut missing = Vec::new();
    for entry in &document.keybinds {
        if !store.register_from_catalog(entry.chord(), &entry.mod_name, &entry.id) {
            missing.push(entry);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&store.list_all())?);
        return Ok(());
    }

    if let Some(saved_at) = document.saved_at {
        eprintln!("Saved at {}", saved_at.to_rfc3339());
    }

    for info in store.list_all() {
        let chord = mcm_core::Chord::from_raw(info.keycode, info.modifiers);
        println!(
            "{:<16} {:<20} {:<24} {} {}",
            chord.to_string().bold(),
            info.owner,
            info.id,
            info.action.map(|kind| kind.to_string()).unwrap_or_default().cyan(),
            info.call_target.dimmed()
        );
    }

    for entry in &missing {
        println!(
            "{:<16} {:<20} {:<24} {}",
            entry.chord().to_string().bold(),
            entry.mod_name,
            entry.id,
            "definition missing".red()
        );
    }

    eprintln!(
        "{} registered, {} missing",
        document.keybinds.len() - missing.len(),
        missing.len()
    );
    Ok(())
}
