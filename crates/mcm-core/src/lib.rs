pub mod config;
pub mod context;
pub mod error;
pub mod forms;
pub mod input;
pub mod keybind;
pub mod persist;
pub mod process;
pub mod reloc;

pub use config::McmConfig;
pub use context::EngineContext;
pub use error::{Error, Result};
pub use forms::{FormId, FormResolver, LoadOrder};
pub use input::{ButtonEvent, DispatchOutcome, InputDispatcher};
pub use keybind::{
    Action, ActionKind, ActionParam, Chord, DeviceType, KeybindCatalog, KeybindDefinition,
    KeybindInfo, KeybindSource, KeybindStore, Modifiers,
};
pub use persist::{LoadSummary, PersistenceBridge};
pub use process::{LoadedModule, Pattern, ReadMemory};
pub use reloc::{AbstractAddress, AddressResolver, EngineAddresses, RuntimeVersion, ScanPolicy};
