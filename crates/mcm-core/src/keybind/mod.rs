//! Keybind registry: chords, mod-defined actions and their definition catalog.

mod action;
mod catalog;
mod chord;
mod info;
mod store;

pub use action::{Action, ActionKind, ActionParam, KeybindDefinition};
pub use catalog::KeybindCatalog;
pub use chord::{
    Chord, DeviceType, Modifiers, device_for_keycode, gamepad_keycode_to_mask,
    gamepad_mask_to_keycode, keycode_for,
};
pub use info::{KeybindInfo, KeybindSource};
pub use store::KeybindStore;
