use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString, IntoStaticStr};
use tracing::warn;

use crate::forms::FormId;

/// Argument passed to a script function.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionParam {
    Int(i32),
    Bool(bool),
    Float(f32),
    String(String),
}

impl ActionParam {
    /// Integers become `Int`, other numbers `Float`. Arrays, objects, nulls
    /// and integers outside the `i32` range are not representable.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) if n.is_f64() => n.as_f64().map(|f| Self::Float(f as f32)),
            Value::Number(n) => n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .map(Self::Int),
            _ => None,
        }
    }

    /// Typed parameters from a `params` array; anything else yields none.
    pub fn list_from_json(value: &Value) -> Vec<Self> {
        let Some(values) = value.as_array() else {
            return Vec::new();
        };

        values
            .iter()
            .filter_map(|value| {
                let param = Self::from_json(value);
                if param.is_none() {
                    warn!("Cannot register unknown parameter value type: {}", value);
                }
                param
            })
            .collect()
    }
}

/// Action type without its payload, named as in definition files.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
pub enum ActionKind {
    CallFunction,
    CallGlobalFunction,
    RunConsoleCommand,
    SendEvent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Call a function on the script attached to a form
    CallFunction {
        target: FormId,
        function: String,
        params: Vec<ActionParam>,
    },
    CallGlobalFunction {
        script: String,
        function: String,
        params: Vec<ActionParam>,
    },
    RunConsoleCommand { command: String },
    /// `OnControlDown` on press, `OnControlUp` on release
    SendEvent { target: FormId },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::CallFunction { .. } => ActionKind::CallFunction,
            Action::CallGlobalFunction { .. } => ActionKind::CallGlobalFunction,
            Action::RunConsoleCommand { .. } => ActionKind::RunConsoleCommand,
            Action::SendEvent { .. } => ActionKind::SendEvent,
        }
    }

    pub fn target_form(&self) -> Option<FormId> {
        match self {
            Action::CallFunction { target, .. } | Action::SendEvent { target } => Some(*target),
            _ => None,
        }
    }

    /// Function name, or the command line for console actions
    pub fn callback(&self) -> &str {
        match self {
            Action::CallFunction { function, .. } | Action::CallGlobalFunction { function, .. } => {
                function
            }
            Action::RunConsoleCommand { command } => command,
            Action::SendEvent { .. } => "",
        }
    }
}

/// A mod-defined keybind loaded from its definition file.
#[derive(Debug, Clone, PartialEq)]
pub struct KeybindDefinition {
    pub owner: String,
    pub id: String,
    pub description: String,
    pub action: Action,
}

impl KeybindDefinition {
    /// Owner and id compare case-insensitively.
    pub fn is(&self, owner: &str, id: &str) -> bool {
        self.owner.eq_ignore_ascii_case(owner) && self.id.eq_ignore_ascii_case(id)
    }
}
