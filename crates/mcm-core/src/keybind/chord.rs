use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, FromRepr, IntoStaticStr};

use crate::config::keycodes::{
    BINDABLE_MOUSE_MASKS, GAMEPAD_OFFSET, MAX_KEYCODE, MODIFIER_KEYS, MOUSE_BUTTON_OFFSET,
};

bitflags! {
    /// Modifier keys held when a chord is pressed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
    }
}

/// A keycode plus the modifiers held with it.
///
/// Ordered by keycode first, then modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Chord {
    pub keycode: u32,
    pub modifiers: Modifiers,
}

impl Chord {
    pub const fn new(keycode: u32, modifiers: Modifiers) -> Self {
        Self { keycode, modifiers }
    }

    pub const fn key(keycode: u32) -> Self {
        Self::new(keycode, Modifiers::empty())
    }

    /// Build from the raw values stored in registration files. Unknown
    /// modifier bits are dropped.
    pub fn from_raw(keycode: u32, modifiers: u8) -> Self {
        Self::new(keycode, Modifiers::from_bits_truncate(modifiers))
    }

    pub fn is_modifier_key(&self) -> bool {
        MODIFIER_KEYS.contains(&self.keycode)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(Modifiers::CONTROL) {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            write!(f, "Shift+")?;
        }
        if self.modifiers.contains(Modifiers::ALT) {
            write!(f, "Alt+")?;
        }
        write!(f, "{}", self.keycode)
    }
}

/// Input device that produced a button event, numbered as the engine does.
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
    FromRepr,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
#[repr(u32)]
pub enum DeviceType {
    Keyboard = 0,
    Mouse = 1,
    Gamepad = 2,
    Touch = 3,
    VirtualKeyboard = 4,
}

/// XInput button masks in keycode order starting at the gamepad offset.
const GAMEPAD_MASKS: [u32; 16] = [
    0x0001, // DPAD_UP
    0x0002, // DPAD_DOWN
    0x0004, // DPAD_LEFT
    0x0008, // DPAD_RIGHT
    0x0010, // START
    0x0020, // BACK
    0x0040, // LEFT_THUMB
    0x0080, // RIGHT_THUMB
    0x0100, // LEFT_SHOULDER
    0x0200, // RIGHT_SHOULDER
    0x1000, // A
    0x2000, // B
    0x4000, // X
    0x8000, // Y
    0x0009, // LT
    0x000A, // RT
];

pub fn gamepad_mask_to_keycode(mask: u32) -> Option<u32> {
    GAMEPAD_MASKS
        .iter()
        .position(|&m| m == mask)
        .map(|index| GAMEPAD_OFFSET + index as u32)
}

pub fn gamepad_keycode_to_mask(keycode: u32) -> Option<u32> {
    keycode
        .checked_sub(GAMEPAD_OFFSET)
        .and_then(|index| GAMEPAD_MASKS.get(index as usize).copied())
}

/// Unified keycode for a device button, or `None` if it cannot be bound.
///
/// Primary and secondary mouse buttons and the wheel are reserved for the UI.
pub fn keycode_for(device: DeviceType, mask: u32) -> Option<u32> {
    match device {
        DeviceType::Keyboard if mask < MOUSE_BUTTON_OFFSET => Some(mask),
        DeviceType::Mouse if BINDABLE_MOUSE_MASKS.contains(&mask) => {
            Some(MOUSE_BUTTON_OFFSET + mask)
        }
        DeviceType::Gamepad => gamepad_mask_to_keycode(mask),
        _ => None,
    }
}

/// Device and raw mask for a unified keycode, for host control lookups.
///
/// Keycode 0 and anything past the gamepad range map to nothing.
pub fn device_for_keycode(keycode: u32) -> Option<(DeviceType, u32)> {
    match keycode {
        0 => None,
        k if k < MOUSE_BUTTON_OFFSET => Some((DeviceType::Keyboard, k)),
        k if k < GAMEPAD_OFFSET => Some((DeviceType::Mouse, k - MOUSE_BUTTON_OFFSET)),
        k if k < MAX_KEYCODE => gamepad_keycode_to_mask(k).map(|mask| (DeviceType::Gamepad, mask)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_ordering() {
        let a = Chord::key(30);
        let b = Chord::new(30, Modifiers::SHIFT);
        let c = Chord::new(30, Modifiers::CONTROL);
        let d = Chord::key(31);

        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_raw_truncates_unknown_bits() {
        let chord = Chord::from_raw(42, 0b1111_0011);
        assert_eq!(chord.modifiers, Modifiers::SHIFT | Modifiers::CONTROL);
    }

    #[test]
    fn test_display() {
        assert_eq!(Chord::new(30, Modifiers::all()).to_string(), "Ctrl+Shift+Alt+30");
        assert_eq!(Chord::key(57).to_string(), "57");
    }

    #[test]
    fn test_keyboard_and_mouse_keycodes() {
        assert_eq!(keycode_for(DeviceType::Keyboard, 0x1E), Some(0x1E));
        assert_eq!(keycode_for(DeviceType::Mouse, 0), None);
        assert_eq!(keycode_for(DeviceType::Mouse, 1), None);
        assert_eq!(keycode_for(DeviceType::Mouse, 2), Some(258));
        assert_eq!(keycode_for(DeviceType::Mouse, 7), Some(263));
        assert_eq!(keycode_for(DeviceType::Mouse, 8), None);
        assert_eq!(keycode_for(DeviceType::Touch, 1), None);
    }

    #[test]
    fn test_gamepad_keycodes() {
        assert_eq!(keycode_for(DeviceType::Gamepad, 0x0001), Some(266));
        assert_eq!(keycode_for(DeviceType::Gamepad, 0x1000), Some(276));
        assert_eq!(keycode_for(DeviceType::Gamepad, 0x000A), Some(281));
        assert_eq!(keycode_for(DeviceType::Gamepad, 0x0400), None);
        assert_eq!(gamepad_keycode_to_mask(280), Some(0x0009));
        assert_eq!(gamepad_keycode_to_mask(282), None);
    }

    #[test]
    fn test_device_for_keycode() {
        assert_eq!(device_for_keycode(0), None);
        assert_eq!(device_for_keycode(57), Some((DeviceType::Keyboard, 57)));
        assert_eq!(device_for_keycode(260), Some((DeviceType::Mouse, 4)));
        assert_eq!(device_for_keycode(265), Some((DeviceType::Mouse, 9)));
        assert_eq!(device_for_keycode(279), Some((DeviceType::Gamepad, 0x8000)));
        assert_eq!(device_for_keycode(282), None);
    }

    #[test]
    fn test_device_type_names() {
        assert_eq!(DeviceType::Gamepad.to_string(), "Gamepad");
        assert_eq!("mouse".parse::<DeviceType>().unwrap(), DeviceType::Mouse);
        assert_eq!(DeviceType::from_repr(0), Some(DeviceType::Keyboard));
    }
}
