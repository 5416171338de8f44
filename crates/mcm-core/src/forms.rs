//! Form identifiers.
//!
//! Definition files name forms as `"<plugin file>|<hex local id>"`. The
//! runtime form id depends on where the plugin sits in the load order:
//!
//! - regular plugin: `(index << 24) | (local & 0xFFFFFF)`
//! - light plugin:   `0xFE000000 | (light_index << 12) | (local & 0xFFF)`
//!
//! Turning a form id back into an identifier only works for regular plugins.
//! Ids in the `0xFE` (light) and `0xFF` (runtime-created) ranges yield `None`.
//! Callers showing a target for such forms display an empty string.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::reloc::parse_hex_value;

const LIGHT_PLUGIN_INDEX: u32 = 0xFE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub u32);

impl FormId {
    pub fn mod_index(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn is_light(self) -> bool {
        self.0 >> 24 == LIGHT_PLUGIN_INDEX
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// Split `"ModA.esp|F99"` into the plugin name and local id.
pub fn parse_identifier(identifier: &str) -> Result<(&str, u32)> {
    let (plugin, local) = identifier
        .split_once('|')
        .ok_or_else(|| Error::InvalidFormIdentifier(format!("'{}': missing '|'", identifier)))?;

    if plugin.is_empty() {
        return Err(Error::InvalidFormIdentifier(format!(
            "'{}': empty plugin name",
            identifier
        )));
    }

    let local = parse_hex_value(local)
        .ok()
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| {
            Error::InvalidFormIdentifier(format!("'{}': bad local id", identifier))
        })?;

    Ok((plugin, local))
}

/// Converts between textual identifiers and runtime form ids.
pub trait FormResolver: Send + Sync {
    fn form_from_identifier(&self, identifier: &str) -> Option<FormId>;

    /// Regular plugins only; see the module documentation.
    fn identifier_from_form(&self, form: FormId) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginSlot {
    Regular(u8),
    Light(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: String,
    pub slot: PluginSlot,
}

impl PluginInfo {
    pub fn form_id(&self, local: u32) -> FormId {
        match self.slot {
            PluginSlot::Regular(index) => FormId((index as u32) << 24 | (local & 0xFF_FFFF)),
            PluginSlot::Light(index) => FormId(
                LIGHT_PLUGIN_INDEX << 24 | ((index as u32) & 0xFFF) << 12 | (local & 0xFFF),
            ),
        }
    }
}

/// Loaded plugins in load order.
#[derive(Debug, Clone, Default)]
pub struct LoadOrder {
    plugins: Vec<PluginInfo>,
    next_regular: u32,
    next_light: u32,
}

impl LoadOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign slots in order: `.esl` files become light plugins, the rest regular.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut order = Self::new();
        for name in names {
            let name = name.as_ref();
            let light = Path::new(name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("esl"));
            if light {
                order.push_light(name);
            } else {
                order.push_regular(name);
            }
        }
        order
    }

    /// Read a plugin list: one file per line, `#` comments, an optional
    /// leading `*` marking active plugins is stripped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_names(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(|line| line.trim_start_matches('*')),
        ))
    }

    pub fn push_regular(&mut self, name: &str) -> bool {
        let Ok(index) = u8::try_from(self.next_regular) else {
            warn!("Too many regular plugins, ignoring {}", name);
            return false;
        };
        if index as u32 >= LIGHT_PLUGIN_INDEX {
            warn!("Too many regular plugins, ignoring {}", name);
            return false;
        }
        self.next_regular += 1;
        self.plugins.push(PluginInfo {
            name: name.to_string(),
            slot: PluginSlot::Regular(index),
        });
        true
    }

    pub fn push_light(&mut self, name: &str) -> bool {
        if self.next_light > 0xFFF {
            warn!("Too many light plugins, ignoring {}", name);
            return false;
        }
        self.plugins.push(PluginInfo {
            name: name.to_string(),
            slot: PluginSlot::Light(self.next_light as u16),
        });
        self.next_light += 1;
        true
    }

    pub fn plugins(&self) -> &[PluginInfo] {
        &self.plugins
    }

    pub fn find(&self, name: &str) -> Option<&PluginInfo> {
        self.plugins
            .iter()
            .find(|plugin| plugin.name.eq_ignore_ascii_case(name))
    }
}

impl FormResolver for LoadOrder {
    fn form_from_identifier(&self, identifier: &str) -> Option<FormId> {
        let (plugin, local) = match parse_identifier(identifier) {
            Ok(parts) => parts,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };
        self.find(plugin).map(|info| info.form_id(local))
    }

    fn identifier_from_form(&self, form: FormId) -> Option<String> {
        if form.mod_index() as u32 >= LIGHT_PLUGIN_INDEX {
            return None;
        }
        self.plugins
            .iter()
            .find(|plugin| plugin.slot == PluginSlot::Regular(form.mod_index()))
            .map(|plugin| format!("{}|{:X}", plugin.name, form.0 & 0xFF_FFFF))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_order() -> LoadOrder {
        LoadOrder::from_names(["Fallout4.esm", "DLCRobot.esm", "Tiny.esl", "ModA.esp", "Other.esl"])
    }

    #[test]
    fn test_parse_identifier() {
        assert_eq!(parse_identifier("ModA.esp|F99").unwrap(), ("ModA.esp", 0xF99));
        assert_eq!(parse_identifier("ModA.esp|0x800").unwrap(), ("ModA.esp", 0x800));
        assert!(parse_identifier("ModA.esp").is_err());
        assert!(parse_identifier("|F99").is_err());
        assert!(parse_identifier("ModA.esp|zz").is_err());
    }

    #[test]
    fn test_regular_plugin_form_id() {
        let order = load_order();
        assert_eq!(
            order.form_from_identifier("ModA.esp|F99"),
            Some(FormId(0x02000F99))
        );
        // Upper byte of the local id is discarded
        assert_eq!(
            order.form_from_identifier("modA.ESP|FF000F99"),
            Some(FormId(0x02000F99))
        );
        assert_eq!(order.form_from_identifier("Missing.esp|1"), None);
    }

    #[test]
    fn test_light_plugin_form_id() {
        let order = load_order();
        assert_eq!(
            order.form_from_identifier("Tiny.esl|ABC"),
            Some(FormId(0xFE000ABC))
        );
        assert_eq!(
            order.form_from_identifier("Other.esl|1FFF"),
            Some(FormId(0xFE001FFF))
        );
    }

    #[test]
    fn test_reverse_lookup_is_regular_only() {
        let order = load_order();
        assert_eq!(
            order.identifier_from_form(FormId(0x02000F99)),
            Some("ModA.esp|F99".to_string())
        );

        let light = order.form_from_identifier("Tiny.esl|ABC").unwrap();
        assert!(light.is_light());
        assert_eq!(order.identifier_from_form(light), None);
        assert_eq!(order.identifier_from_form(FormId(0xFF000001)), None);
        assert_eq!(order.identifier_from_form(FormId(0x30000001)), None);
    }

    #[test]
    fn test_load_plugin_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugins.txt");
        fs::write(&path, "# header\nFallout4.esm\n*ModA.esp\n\n*Tiny.esl\n").unwrap();

        let order = LoadOrder::load(&path).unwrap();
        assert_eq!(order.plugins().len(), 3);
        assert_eq!(order.find("moda.esp").unwrap().slot, PluginSlot::Regular(1));
        assert_eq!(order.find("Tiny.esl").unwrap().slot, PluginSlot::Light(0));
    }
}
