//! List a mod's keybind definitions.

use std::path::Path;

use anyhow::Result;
use mcm_core::{Action, KeybindCatalog, McmConfig};
use owo_colors::OwoColorize;
use serde_json::json;

use crate::cli_utils;

pub fn run(
    config: &McmConfig,
    root: Option<&Path>,
    mod_name: &str,
    load_order: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = cli_utils::with_root(config, root);
    let forms = cli_utils::load_forms(load_order)?;
    let mut catalog = KeybindCatalog::new(config.config_dir(), forms);

    eprintln!("Reading {}", catalog.definition_path(mod_name).display());
    let count = catalog.load_owner(mod_name)?;
    eprintln!("{} valid definition(s)", count);

    let definitions = catalog.cached_for(mod_name);

    if json {
        let entries: Vec<_> = definitions
            .iter()
            .map(|definition| {
                json!({
                    "modName": definition.owner,
                    "id": definition.id,
                    "desc": definition.description,
                    "type": definition.action.kind().to_string(),
                    "target": definition.action.target_form().map(|form| form.to_string()),
                    "callback": definition.action.callback(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for definition in definitions {
        let detail = match &definition.action {
            Action::CallFunction {
                target,
                function,
                params,
            } => format!("{}.{}({} params)", target, function, params.len()),
            Action::CallGlobalFunction {
                script,
                function,
                params,
            } => format!("{}.{}({} params)", script, function, params.len()),
            Action::RunConsoleCommand { command } => format!("\"{}\"", command),
            Action::SendEvent { target } => target.to_string(),
        };
        println!(
            "{:<24} {:<20} {}  {}",
            definition.id.bold(),
            definition.action.kind().cyan(),
            detail,
            definition.description.dimmed()
        );
    }

    Ok(())
}
