//! Keybind registrations across game saves.

mod bridge;
mod document;

pub use bridge::{LoadSummary, PersistenceBridge};
pub use document::{KeybindsDocument, PersistedKeybind};
