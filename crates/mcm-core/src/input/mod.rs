//! Input event handling and the host services it calls into.

mod dispatcher;
mod event;
mod host;
mod modifiers;

pub use dispatcher::{DispatchOutcome, InputDispatcher};
pub use event::ButtonEvent;
pub use host::{ConsoleExecutor, HostInputMap, HostUi, ModifierSource, ScriptHost};
#[cfg(target_os = "windows")]
pub use modifiers::AsyncKeyState;
pub use modifiers::{FixedModifiers, platform_modifiers};
