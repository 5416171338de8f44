use std::sync::Arc;

use crate::input::ModifierSource;
use crate::keybind::Modifiers;

/// Reads shift/control/alt from the OS key state at sample time.
#[cfg(target_os = "windows")]
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncKeyState;

#[cfg(target_os = "windows")]
impl ModifierSource for AsyncKeyState {
    fn sample(&self) -> Modifiers {
        use windows::Win32::UI::Input::KeyboardAndMouse::{
            GetAsyncKeyState, VIRTUAL_KEY, VK_CONTROL, VK_MENU, VK_SHIFT,
        };

        // High bit set while the key is down
        let held =
            |key: VIRTUAL_KEY| (unsafe { GetAsyncKeyState(key.0 as i32) } as u16) & 0x8000 != 0;

        let mut modifiers = Modifiers::empty();
        if held(VK_SHIFT) {
            modifiers |= Modifiers::SHIFT;
        }
        if held(VK_CONTROL) {
            modifiers |= Modifiers::CONTROL;
        }
        if held(VK_MENU) {
            modifiers |= Modifiers::ALT;
        }
        modifiers
    }
}

/// Always reports the same modifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedModifiers(pub Modifiers);

impl ModifierSource for FixedModifiers {
    fn sample(&self) -> Modifiers {
        self.0
    }
}

/// The live modifier source on Windows; no modifiers elsewhere.
pub fn platform_modifiers() -> Arc<dyn ModifierSource> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(AsyncKeyState)
    }
    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(FixedModifiers::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_modifiers() {
        let source = FixedModifiers(Modifiers::SHIFT | Modifiers::ALT);
        assert_eq!(source.sample(), Modifiers::SHIFT | Modifiers::ALT);
        assert_eq!(FixedModifiers::default().sample(), Modifiers::empty());
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_platform_modifiers_off_windows() {
        assert_eq!(platform_modifiers().sample(), Modifiers::empty());
    }
}
