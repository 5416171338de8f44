use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::host::{EVENT_SCRIPT, ON_CONTROL_DOWN, ON_CONTROL_UP};
use crate::error::Result;
use crate::input::{ButtonEvent, ConsoleExecutor, HostUi, ModifierSource, ScriptHost};
use crate::keybind::{Action, ActionKind, ActionParam, Chord, KeybindDefinition, KeybindStore};

/// What happened to one button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a bindable press or release, or the game is paused
    Ignored,
    /// No binding on the chord
    Unbound,
    Dispatched(ActionKind),
    /// Bound, but the host rejected the call or the action had nothing to run
    Dropped,
}

/// Turns engine button events into keybind actions.
pub struct InputDispatcher {
    store: Arc<KeybindStore>,
    script: Arc<dyn ScriptHost>,
    console: Arc<dyn ConsoleExecutor>,
    ui: Arc<dyn HostUi>,
    modifiers: Arc<dyn ModifierSource>,
}

impl InputDispatcher {
    pub fn new(
        store: Arc<KeybindStore>,
        script: Arc<dyn ScriptHost>,
        console: Arc<dyn ConsoleExecutor>,
        ui: Arc<dyn HostUi>,
        modifiers: Arc<dyn ModifierSource>,
    ) -> Self {
        Self {
            store,
            script,
            console,
            ui,
            modifiers,
        }
    }

    pub fn handle(&self, event: &ButtonEvent) -> DispatchOutcome {
        let press = event.is_press();
        if !press && !event.is_release() {
            return DispatchOutcome::Ignored;
        }

        let Some(keycode) = event.keycode() else {
            return DispatchOutcome::Ignored;
        };
        let mut chord = Chord::key(keycode);
        if chord.is_modifier_key() || self.ui.is_paused() {
            return DispatchOutcome::Ignored;
        }

        // Releases are looked up without modifiers
        if press {
            chord.modifiers = self.modifiers.sample();
        }

        let Some(definition) = self.store.lookup_binding(chord) else {
            return DispatchOutcome::Unbound;
        };

        if press {
            self.on_press(&definition)
        } else {
            self.on_release(&definition, event.timer)
        }
    }

    fn on_press(&self, definition: &KeybindDefinition) -> DispatchOutcome {
        let kind = definition.action.kind();
        let result = match &definition.action {
            Action::CallFunction {
                target,
                function,
                params,
            } => self.script.call_function(*target, function, params),
            Action::CallGlobalFunction {
                script,
                function,
                params,
            } => {
                if function.is_empty() {
                    return Self::nothing_to_run(definition);
                }
                self.script.call_global_function(script, function, params)
            }
            Action::RunConsoleCommand { command } => {
                if command.is_empty() {
                    return Self::nothing_to_run(definition);
                }
                self.console.execute(command)
            }
            Action::SendEvent { target } => self.script.send_event(
                *target,
                EVENT_SCRIPT,
                ON_CONTROL_DOWN,
                &[ActionParam::String(definition.id.clone())],
            ),
        };

        Self::finish(definition, kind, result)
    }

    fn on_release(&self, definition: &KeybindDefinition, held_for: f32) -> DispatchOutcome {
        let Action::SendEvent { target } = definition.action else {
            return DispatchOutcome::Ignored;
        };

        let result = self.script.send_event(
            target,
            EVENT_SCRIPT,
            ON_CONTROL_UP,
            &[
                ActionParam::String(definition.id.clone()),
                ActionParam::Float(held_for),
            ],
        );
        Self::finish(definition, ActionKind::SendEvent, result)
    }

    fn nothing_to_run(definition: &KeybindDefinition) -> DispatchOutcome {
        debug!("{}/{} has nothing to run", definition.owner, definition.id);
        DispatchOutcome::Dropped
    }

    fn finish(
        definition: &KeybindDefinition,
        kind: ActionKind,
        result: Result<()>,
    ) -> DispatchOutcome {
        match result {
            Ok(()) => DispatchOutcome::Dispatched(kind),
            Err(e) => {
                warn!("Keybind {}/{} not run: {}", definition.owner, definition.id, e);
                DispatchOutcome::Dropped
            }
        }
    }
}
