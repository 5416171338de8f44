//! Keybind definitions shipped by mods.
//!
//! Each mod describes its keybinds in `<config dir>/<mod>/keybinds.json`.
//! Files are read on first request for an owner and every valid definition
//! in them is cached for the rest of the process.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::paths::DEFINITION_FILE;
use crate::error::{Error, Result};
use crate::forms::FormResolver;
use crate::keybind::{Action, ActionKind, ActionParam, KeybindDefinition};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DefinitionFile {
    mod_name: String,
    keybinds: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawKeybind {
    id: String,
    #[serde(default)]
    desc: String,
    action: RawAction,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    kind: String,
    form: Option<String>,
    function: Option<String>,
    script: Option<String>,
    command: Option<String>,
    #[serde(default)]
    params: Value,
}

impl RawKeybind {
    fn into_definition(self, owner: &str, forms: &dyn FormResolver) -> Result<KeybindDefinition> {
        let invalid = |reason: String| Error::definition_invalid(owner, &self.id, reason);

        let kind: ActionKind = self
            .action
            .kind
            .parse()
            .map_err(|_| invalid(format!("unknown action type '{}'", self.action.kind)))?;

        let target = || -> Result<_> {
            let identifier = self
                .action
                .form
                .as_deref()
                .ok_or_else(|| invalid("missing form".to_string()))?;
            forms
                .form_from_identifier(identifier)
                .ok_or_else(|| invalid(format!("form '{}' does not resolve", identifier)))
        };

        let action = match kind {
            ActionKind::CallFunction => Action::CallFunction {
                target: target()?,
                function: self
                    .action
                    .function
                    .clone()
                    .ok_or_else(|| invalid("missing function".to_string()))?,
                params: ActionParam::list_from_json(&self.action.params),
            },
            ActionKind::CallGlobalFunction => Action::CallGlobalFunction {
                script: self.action.script.clone().unwrap_or_default(),
                function: self.action.function.clone().unwrap_or_default(),
                params: ActionParam::list_from_json(&self.action.params),
            },
            ActionKind::RunConsoleCommand => Action::RunConsoleCommand {
                command: self.action.command.clone().unwrap_or_default(),
            },
            ActionKind::SendEvent => Action::SendEvent { target: target()? },
        };

        Ok(KeybindDefinition {
            owner: owner.to_string(),
            id: self.id,
            description: self.desc,
            action,
        })
    }
}

fn cache_key(owner: &str, id: &str) -> String {
    format!("{}{}", owner, id).to_lowercase()
}

/// Strip a trailing plugin extension: `ModA.esp` -> `ModA`.
fn mod_folder(owner: &str) -> &str {
    owner.rfind('.').map_or(owner, |index| &owner[..index])
}

pub struct KeybindCatalog {
    config_dir: PathBuf,
    forms: Arc<dyn FormResolver>,
    definitions: HashMap<String, KeybindDefinition>,
    loaded_owners: HashSet<String>,
}

impl KeybindCatalog {
    pub fn new<P: Into<PathBuf>>(config_dir: P, forms: Arc<dyn FormResolver>) -> Self {
        Self {
            config_dir: config_dir.into(),
            forms,
            definitions: HashMap::new(),
            loaded_owners: HashSet::new(),
        }
    }

    pub fn forms(&self) -> &Arc<dyn FormResolver> {
        &self.forms
    }

    pub fn definition_path(&self, owner: &str) -> PathBuf {
        self.config_dir.join(mod_folder(owner)).join(DEFINITION_FILE)
    }

    /// Look up a definition, reading the owner's file on first use.
    pub fn get_definition(&mut self, owner: &str, id: &str) -> Option<KeybindDefinition> {
        let key = cache_key(owner, id);
        if let Some(definition) = self.definitions.get(&key) {
            return Some(definition.clone());
        }

        if !self.loaded_owners.contains(&owner.to_lowercase()) {
            if let Err(e) = self.load_owner(owner) {
                warn!("{}", e);
                return None;
            }
        }

        self.definitions.get(&key).cloned()
    }

    /// Read and cache every valid definition in `owner`'s file.
    ///
    /// Missing or malformed files are not remembered, so a later request
    /// retries. Returns how many definitions were cached.
    pub fn load_owner(&mut self, owner: &str) -> Result<usize> {
        let path = self.definition_path(owner);
        info!("Loading keybind definitions for {}", owner);

        let definitions = Self::read_file(&path, owner, self.forms.as_ref())?;
        let count = definitions.len();
        for definition in definitions {
            self.definitions
                .insert(cache_key(&definition.owner, &definition.id), definition);
        }
        self.loaded_owners.insert(owner.to_lowercase());
        Ok(count)
    }

    /// Parse a definition file without touching the cache.
    pub fn read_file(
        path: &Path,
        owner: &str,
        forms: &dyn FormResolver,
    ) -> Result<Vec<KeybindDefinition>> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::DefinitionMissing {
                    owner: owner.to_string(),
                    path: path.to_path_buf(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let file: DefinitionFile = serde_json::from_str(&content).map_err(|e| {
            Error::definition_invalid(owner, "*", format!("malformed definition file: {}", e))
        })?;

        let mut definitions = Vec::with_capacity(file.keybinds.len());
        for entry in file.keybinds {
            let parsed = serde_json::from_value::<RawKeybind>(entry)
                .map_err(|e| Error::definition_invalid(&file.mod_name, "?", e.to_string()))
                .and_then(|raw| raw.into_definition(&file.mod_name, forms));
            match parsed {
                Ok(definition) => definitions.push(definition),
                Err(e) => warn!("Skipping keybind: {}", e),
            }
        }

        Ok(definitions)
    }

    /// Cached definitions belonging to `owner`, sorted by id.
    pub fn cached_for(&self, owner: &str) -> Vec<&KeybindDefinition> {
        let mut found: Vec<_> = self
            .definitions
            .values()
            .filter(|definition| definition.owner.eq_ignore_ascii_case(owner))
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
