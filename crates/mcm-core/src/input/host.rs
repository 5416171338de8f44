//! Host collaborators the runtime calls into.
//!
//! The engine-side implementations live in the plugin shim; tests use
//! recording fakes.

use crate::error::Result;
use crate::forms::FormId;
use crate::keybind::{ActionParam, DeviceType, Modifiers};

/// Script VM calls. All calls are queued by the VM and return immediately.
///
/// A target form that no longer exists is reported as
/// [`Error::DispatchTargetMissing`](crate::error::Error::DispatchTargetMissing).
pub trait ScriptHost: Send + Sync {
    fn call_function(&self, target: FormId, function: &str, params: &[ActionParam]) -> Result<()>;

    fn call_global_function(
        &self,
        script: &str,
        function: &str,
        params: &[ActionParam],
    ) -> Result<()>;

    fn send_event(
        &self,
        target: FormId,
        script: &str,
        event: &str,
        args: &[ActionParam],
    ) -> Result<()>;
}

pub trait ConsoleExecutor: Send + Sync {
    fn execute(&self, command: &str) -> Result<()>;
}

pub trait HostUi: Send + Sync {
    /// True while any menu pauses the game.
    fn is_paused(&self) -> bool;
}

/// Modifier keys currently held.
pub trait ModifierSource: Send + Sync {
    fn sample(&self) -> Modifiers;
}

/// The engine's own control map (gameplay context).
pub trait HostInputMap: Send + Sync {
    fn mapped_control(&self, device: DeviceType, mask: u32) -> Option<String>;
}
