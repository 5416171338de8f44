use crate::keybind::{DeviceType, keycode_for};

/// A button event as delivered by the engine's input loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonEvent {
    pub device: DeviceType,
    pub key_mask: u32,
    /// 1.0 while held, 0.0 once released
    pub is_down: f32,
    /// Seconds the button has been held
    pub timer: f32,
}

impl ButtonEvent {
    pub fn new(device: DeviceType, key_mask: u32, is_down: f32, timer: f32) -> Self {
        Self {
            device,
            key_mask,
            is_down,
            timer,
        }
    }

    pub fn press(device: DeviceType, key_mask: u32) -> Self {
        Self::new(device, key_mask, 1.0, 0.0)
    }

    pub fn release(device: DeviceType, key_mask: u32, held_for: f32) -> Self {
        Self::new(device, key_mask, 0.0, held_for)
    }

    /// First frame of a press. Repeats while held have a non-zero timer.
    pub fn is_press(&self) -> bool {
        self.is_down == 1.0 && self.timer == 0.0
    }

    pub fn is_release(&self) -> bool {
        self.is_down == 0.0 && self.timer != 0.0
    }

    pub fn keycode(&self) -> Option<u32> {
        keycode_for(self.device, self.key_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let press = ButtonEvent::press(DeviceType::Keyboard, 30);
        assert!(press.is_press());
        assert!(!press.is_release());

        let held = ButtonEvent::new(DeviceType::Keyboard, 30, 1.0, 0.5);
        assert!(!held.is_press());
        assert!(!held.is_release());

        let release = ButtonEvent::release(DeviceType::Keyboard, 30, 0.5);
        assert!(release.is_release());

        // Released on the same frame it was pressed
        let instant = ButtonEvent::new(DeviceType::Keyboard, 30, 0.0, 0.0);
        assert!(!instant.is_press());
        assert!(!instant.is_release());
    }

    #[test]
    fn test_keycode() {
        assert_eq!(ButtonEvent::press(DeviceType::Mouse, 3).keycode(), Some(259));
        assert_eq!(ButtonEvent::press(DeviceType::Mouse, 0).keycode(), None);
        assert_eq!(ButtonEvent::press(DeviceType::Gamepad, 0x2000).keycode(), Some(277));
    }
}
