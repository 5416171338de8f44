use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::config::persistence::SCHEMA_VERSION;
use crate::error::{Error, Result};
use crate::keybind::Chord;

/// One persisted registration. Only the chord and the definition's key are
/// stored; the definition itself is re-read from the owner's file on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedKeybind {
    pub keycode: u32,
    pub modifiers: u8,
    pub mod_name: String,
    pub id: String,
}

impl PersistedKeybind {
    pub fn chord(&self) -> Chord {
        Chord::from_raw(self.keycode, self.modifiers)
    }
}

/// Contents of `Settings/Keybinds.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeybindsDocument {
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    pub keybinds: Vec<PersistedKeybind>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    version: i64,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    keybinds: Vec<Value>,
}

impl KeybindsDocument {
    pub fn from_snapshot(snapshot: Vec<(Chord, String, String)>) -> Self {
        Self {
            version: SCHEMA_VERSION as i64,
            saved_at: Some(Utc::now()),
            keybinds: snapshot
                .into_iter()
                .map(|(chord, mod_name, id)| PersistedKeybind {
                    keycode: chord.keycode,
                    modifiers: chord.modifiers.bits(),
                    mod_name,
                    id,
                })
                .collect(),
        }
    }

    /// Parse and validate. Documents older than version 1 or without a
    /// `keybinds` array are rejected as a whole; entries that do not fit a
    /// chord are skipped with a warning.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(content)
            .map_err(|e| Error::Serialization(format!("malformed keybind storage: {}", e)))?;

        if raw.version < SCHEMA_VERSION as i64 {
            return Err(Error::Serialization(format!(
                "unsupported keybind storage version {}",
                raw.version
            )));
        }

        let mut keybinds = Vec::with_capacity(raw.keybinds.len());
        for entry in raw.keybinds {
            match serde_json::from_value::<PersistedKeybind>(entry) {
                Ok(keybind) => keybinds.push(keybind),
                Err(e) => warn!("Skipping stored keybind: {}", e),
            }
        }

        Ok(Self {
            version: raw.version,
            saved_at: raw.saved_at,
            keybinds,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybind::Modifiers;

    #[test]
    fn test_snapshot_to_json() {
        let document = KeybindsDocument::from_snapshot(vec![(
            Chord::new(48, Modifiers::CONTROL),
            "ModA.esp".to_string(),
            "toggle_menu".to_string(),
        )]);
        let json = document.to_json().unwrap();

        assert!(json.contains("\"version\": 1"));
        assert!(json.contains("\"savedAt\""));
        assert!(json.contains("\"modName\": \"ModA.esp\""));
        assert!(json.contains("\"modifiers\": 2"));

        let parsed = KeybindsDocument::parse(&json).unwrap();
        assert_eq!(parsed.keybinds[0].chord(), Chord::new(48, Modifiers::CONTROL));
    }

    #[test]
    fn test_parse_without_timestamp() {
        let document = KeybindsDocument::parse(
            r#"{"version":1,"keybinds":[{"keycode":30,"modifiers":0,"modName":"ModA.esp","id":"a"}]}"#,
        )
        .unwrap();
        assert_eq!(document.saved_at, None);
        assert_eq!(document.keybinds[0].id, "a");
    }

    #[test]
    fn test_parse_rejects_bad_documents() {
        assert!(KeybindsDocument::parse(r#"{"version":0,"keybinds":[]}"#).is_err());
        assert!(KeybindsDocument::parse(r#"{"version":-3,"keybinds":[]}"#).is_err());
        assert!(KeybindsDocument::parse(r#"{"version":1}"#).is_err());
        assert!(KeybindsDocument::parse(r#"{"version":1,"keybinds":{}}"#).is_err());
        assert!(KeybindsDocument::parse("not json").is_err());
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let document = KeybindsDocument::parse(
            r#"{"version":1,"keybinds":[
                {"keycode":30,"modifiers":256,"modName":"ModA.esp","id":"a"},
                {"keycode":-1,"modifiers":0,"modName":"ModA.esp","id":"b"},
                "junk",
                {"keycode":31,"modifiers":1,"modName":"ModA.esp","id":"c"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(document.keybinds.len(), 1);
        assert_eq!(document.keybinds[0].id, "c");
    }

    #[test]
    fn test_missing_entry_fields_default() {
        let document =
            KeybindsDocument::parse(r#"{"version":2,"keybinds":[{"keycode":30}]}"#).unwrap();
        assert_eq!(document.keybinds[0].mod_name, "");
        assert_eq!(document.keybinds[0].modifiers, 0);
    }
}
