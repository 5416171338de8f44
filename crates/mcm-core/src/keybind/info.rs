use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::config::host::HOST_MASTER_FILE;
use crate::forms::FormResolver;
use crate::keybind::{Action, ActionKind, Chord, KeybindDefinition};

/// Where a keybind comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Display, IntoStaticStr)]
pub enum KeybindSource {
    /// Nothing is bound to the chord
    #[default]
    Invalid,
    Mcm,
    /// Bound by the engine's own control map
    Game,
    /// Host category for script-extender bindings; not produced by this crate
    ScriptExtender,
}

/// Keybind metadata handed to the UI and to scripts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeybindInfo {
    pub keycode: u32,
    pub modifiers: u8,
    pub source: KeybindSource,
    pub id: String,
    pub description: String,
    pub owner: String,
    pub action: Option<ActionKind>,
    /// Form identifier, script name or console command, depending on the action
    pub call_target: String,
    pub callback: String,
}

impl KeybindInfo {
    pub fn not_found(chord: Chord) -> Self {
        Self {
            keycode: chord.keycode,
            modifiers: chord.modifiers.bits(),
            ..Self::default()
        }
    }

    pub fn registered(
        chord: Chord,
        definition: &KeybindDefinition,
        forms: &dyn FormResolver,
    ) -> Self {
        let call_target = match &definition.action {
            Action::CallFunction { target, .. } | Action::SendEvent { target } => {
                forms.identifier_from_form(*target).unwrap_or_default()
            }
            Action::CallGlobalFunction { script, .. } => script.clone(),
            Action::RunConsoleCommand { command } => command.clone(),
        };

        Self {
            keycode: chord.keycode,
            modifiers: chord.modifiers.bits(),
            source: KeybindSource::Mcm,
            id: definition.id.clone(),
            description: definition.description.clone(),
            owner: definition.owner.clone(),
            action: Some(definition.action.kind()),
            call_target,
            callback: definition.action.callback().to_string(),
        }
    }

    /// A chord the engine itself uses for `control`.
    pub fn host_control(chord: Chord, control: String) -> Self {
        Self {
            keycode: chord.keycode,
            modifiers: chord.modifiers.bits(),
            source: KeybindSource::Game,
            description: control,
            owner: HOST_MASTER_FILE.to_string(),
            ..Self::default()
        }
    }

    pub fn is_found(&self) -> bool {
        self.source != KeybindSource::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{FormId, LoadOrder};
    use crate::keybind::Modifiers;

    #[test]
    fn test_registered_info() {
        let forms = LoadOrder::from_names(["Fallout4.esm", "ModA.esp"]);
        let definition = KeybindDefinition {
            owner: "ModA.esp".to_string(),
            id: "e".to_string(),
            description: "Event".to_string(),
            action: Action::SendEvent {
                target: FormId(0x01000800),
            },
        };

        let info = KeybindInfo::registered(Chord::new(30, Modifiers::SHIFT), &definition, &forms);
        assert_eq!(info.source, KeybindSource::Mcm);
        assert_eq!(info.modifiers, 1);
        assert_eq!(info.call_target, "ModA.esp|800");
        assert_eq!(info.callback, "");
        assert_eq!(info.action, Some(ActionKind::SendEvent));
    }

    #[test]
    fn test_light_plugin_target_is_blank() {
        let forms = LoadOrder::from_names(["Fallout4.esm", "Tiny.esl"]);
        let definition = KeybindDefinition {
            owner: "Tiny.esl".to_string(),
            id: "fire".to_string(),
            description: String::new(),
            action: Action::CallFunction {
                target: FormId(0xFE000ABC),
                function: "Fire".to_string(),
                params: vec![],
            },
        };

        let info = KeybindInfo::registered(Chord::key(2), &definition, &forms);
        assert_eq!(info.call_target, "");
        assert_eq!(info.callback, "Fire");
    }

    #[test]
    fn test_host_control_and_not_found() {
        let info = KeybindInfo::host_control(Chord::key(17), "Forward".to_string());
        assert_eq!(info.source, KeybindSource::Game);
        assert_eq!(info.owner, "Fallout4.esm");
        assert_eq!(info.description, "Forward");
        assert!(info.id.is_empty());

        let missing = KeybindInfo::not_found(Chord::key(17));
        assert!(!missing.is_found());
        assert_eq!(missing.keycode, 17);
    }
}
