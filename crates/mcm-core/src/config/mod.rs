//! Configuration and fixed layout constants.
//!
//! This module contains:
//! - `McmConfig` - the runtime configuration file (TOML)
//! - Directory layout of the data root
//! - The unified keycode space shared by input dispatch and keybind lookup
//! - Signature scan and persistence constants

mod settings;

pub use settings::*;

/// Signature scan configuration.
pub mod scan {
    /// Bytes read from the module image per scan step (1MB).
    pub const CHUNK_SIZE: usize = 0x10_0000;
}

/// Data root layout.
///
/// ```text
/// <data root>/Config/<mod>/keybinds.json   per-mod keybind definitions
/// <data root>/Settings/Keybinds.json       persisted registrations
/// ```
pub mod paths {
    pub const DATA_ROOT: &str = "Data/MCM";
    pub const CONFIG_DIR: &str = "Config";
    pub const SETTINGS_DIR: &str = "Settings";
    pub const DEFINITION_FILE: &str = "keybinds.json";
    pub const KEYBINDS_FILE: &str = "Keybinds.json";
}

/// Unified keycode space.
///
/// Keyboard scan codes occupy `0..256`, followed by mouse buttons, the mouse
/// wheel and gamepad buttons.
pub mod keycodes {
    use std::ops::RangeInclusive;

    pub const MOUSE_BUTTON_OFFSET: u32 = 256;
    pub const NUM_MOUSE_BUTTONS: u32 = 8;
    pub const MOUSE_WHEEL_OFFSET: u32 = MOUSE_BUTTON_OFFSET + NUM_MOUSE_BUTTONS;
    pub const NUM_MOUSE_WHEEL_DIRECTIONS: u32 = 2;
    pub const GAMEPAD_OFFSET: u32 = MOUSE_WHEEL_OFFSET + NUM_MOUSE_WHEEL_DIRECTIONS;
    pub const NUM_GAMEPAD_BUTTONS: u32 = 16;
    /// One past the last valid keycode; also the "unmapped" sentinel.
    pub const MAX_KEYCODE: u32 = GAMEPAD_OFFSET + NUM_GAMEPAD_BUTTONS;

    /// Mouse masks that may be bound. Primary/secondary buttons (0, 1) are
    /// reserved for the UI.
    pub const BINDABLE_MOUSE_MASKS: RangeInclusive<u32> = 2..=7;

    /// Left/right shift, control and alt. These never trigger a binding.
    pub const MODIFIER_KEYS: RangeInclusive<u32> = 160..=165;
}

/// Host naming conventions used when talking to the script VM.
pub mod host {
    /// Owner reported for controls bound by the engine itself.
    pub const HOST_MASTER_FILE: &str = "Fallout4.esm";

    pub const EVENT_SCRIPT: &str = "ScriptObject";
    pub const ON_CONTROL_DOWN: &str = "OnControlDown";
    pub const ON_CONTROL_UP: &str = "OnControlUp";
}

/// Registration file format.
pub mod persistence {
    pub const SCHEMA_VERSION: u32 = 1;
}
