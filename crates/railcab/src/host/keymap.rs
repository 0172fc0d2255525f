use winit::event::{ElementState, MouseButton as WinitMouseButton};
use winit::keyboard::{KeyCode, ModifiersState};

use crate::controls::KeyModifiers;
use crate::input::{InputEvent, MouseButton};

/// Virtual-key code stored in binding files for a physical key.
pub(crate) fn virtual_key_code(code: KeyCode) -> Option<i32> {
    let vk = match code {
        KeyCode::Digit0 => 48,
        KeyCode::Digit1 => 49,
        KeyCode::Digit2 => 50,
        KeyCode::Digit3 => 51,
        KeyCode::Digit4 => 52,
        KeyCode::Digit5 => 53,
        KeyCode::Digit6 => 54,
        KeyCode::Digit7 => 55,
        KeyCode::Digit8 => 56,
        KeyCode::Digit9 => 57,
        KeyCode::KeyA => 65,
        KeyCode::KeyB => 66,
        KeyCode::KeyC => 67,
        KeyCode::KeyD => 68,
        KeyCode::KeyE => 69,
        KeyCode::KeyF => 70,
        KeyCode::KeyG => 71,
        KeyCode::KeyH => 72,
        KeyCode::KeyI => 73,
        KeyCode::KeyJ => 74,
        KeyCode::KeyK => 75,
        KeyCode::KeyL => 76,
        KeyCode::KeyM => 77,
        KeyCode::KeyN => 78,
        KeyCode::KeyO => 79,
        KeyCode::KeyP => 80,
        KeyCode::KeyQ => 81,
        KeyCode::KeyR => 82,
        KeyCode::KeyS => 83,
        KeyCode::KeyT => 84,
        KeyCode::KeyU => 85,
        KeyCode::KeyV => 86,
        KeyCode::KeyW => 87,
        KeyCode::KeyX => 88,
        KeyCode::KeyY => 89,
        KeyCode::KeyZ => 90,
        KeyCode::F1 => 112,
        KeyCode::F2 => 113,
        KeyCode::F3 => 114,
        KeyCode::F4 => 115,
        KeyCode::F5 => 116,
        KeyCode::F6 => 117,
        KeyCode::F7 => 118,
        KeyCode::F8 => 119,
        KeyCode::F9 => 120,
        KeyCode::F10 => 121,
        KeyCode::F11 => 122,
        KeyCode::F12 => 123,
        KeyCode::F13 => 124,
        KeyCode::F14 => 125,
        KeyCode::F15 => 126,
        KeyCode::Numpad0 => 96,
        KeyCode::Numpad1 => 97,
        KeyCode::Numpad2 => 98,
        KeyCode::Numpad3 => 99,
        KeyCode::Numpad4 => 100,
        KeyCode::Numpad5 => 101,
        KeyCode::Numpad6 => 102,
        KeyCode::Numpad7 => 103,
        KeyCode::Numpad8 => 104,
        KeyCode::Numpad9 => 105,
        KeyCode::NumpadMultiply => 106,
        KeyCode::NumpadAdd => 107,
        KeyCode::NumpadSubtract => 109,
        KeyCode::NumpadDecimal => 110,
        KeyCode::NumpadDivide => 111,
        KeyCode::NumpadEnter | KeyCode::Enter => 13,
        KeyCode::Backspace => 8,
        KeyCode::Tab => 9,
        KeyCode::Pause => 19,
        KeyCode::CapsLock => 20,
        KeyCode::Escape => 27,
        KeyCode::Space => 32,
        KeyCode::PageUp => 33,
        KeyCode::PageDown => 34,
        KeyCode::End => 35,
        KeyCode::Home => 36,
        KeyCode::ArrowLeft => 37,
        KeyCode::ArrowUp => 38,
        KeyCode::ArrowRight => 39,
        KeyCode::ArrowDown => 40,
        KeyCode::Insert => 45,
        KeyCode::Delete => 46,
        KeyCode::SuperLeft => 91,
        KeyCode::SuperRight => 92,
        KeyCode::ContextMenu => 93,
        KeyCode::NumLock => 144,
        KeyCode::ScrollLock => 145,
        KeyCode::ShiftLeft => 160,
        KeyCode::ShiftRight => 161,
        KeyCode::ControlLeft => 162,
        KeyCode::ControlRight => 163,
        KeyCode::AltLeft => 164,
        KeyCode::AltRight => 165,
        KeyCode::Semicolon => 186,
        KeyCode::Equal => 187,
        KeyCode::Comma => 188,
        KeyCode::Minus => 189,
        KeyCode::Period => 190,
        KeyCode::Slash => 191,
        KeyCode::Backquote => 192,
        KeyCode::BracketLeft => 219,
        KeyCode::Backslash => 220,
        KeyCode::BracketRight => 221,
        KeyCode::Quote => 222,
        _ => return None,
    };
    Some(vk)
}

pub(crate) fn key_modifiers(state: ModifiersState) -> KeyModifiers {
    let mut modifiers = KeyModifiers::empty();
    modifiers.set(KeyModifiers::SHIFT, state.shift_key());
    modifiers.set(KeyModifiers::CTRL, state.control_key());
    modifiers.set(KeyModifiers::ALT, state.alt_key());
    modifiers
}

/// Keyboard event for the session, or `None` for unmapped keys and OS
/// auto-repeat (repeats come from the session's own timer).
pub(crate) fn key_event(
    code: KeyCode,
    state: ElementState,
    repeat: bool,
    modifiers: ModifiersState,
) -> Option<InputEvent> {
    if repeat {
        return None;
    }
    let key = virtual_key_code(code)?;
    Some(match state {
        ElementState::Pressed => InputEvent::KeyDown {
            key,
            modifiers: key_modifiers(modifiers),
        },
        ElementState::Released => InputEvent::KeyUp { key },
    })
}

pub(crate) fn mouse_button_event(
    button: WinitMouseButton,
    state: ElementState,
) -> Option<InputEvent> {
    if state != ElementState::Pressed {
        return None;
    }
    let button = match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        _ => return None,
    };
    Some(InputEvent::MouseButtonDown { button })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::find_key;

    #[test]
    fn letters_and_digits_use_virtual_key_numbering() {
        assert_eq!(virtual_key_code(KeyCode::KeyA), Some(65));
        assert_eq!(virtual_key_code(KeyCode::KeyZ), Some(90));
        assert_eq!(virtual_key_code(KeyCode::Digit0), Some(48));
        assert_eq!(virtual_key_code(KeyCode::F12), Some(123));
    }

    #[test]
    fn mapped_codes_exist_in_key_table() {
        let samples = [
            KeyCode::KeyQ,
            KeyCode::Digit7,
            KeyCode::F5,
            KeyCode::Numpad4,
            KeyCode::NumpadAdd,
            KeyCode::Escape,
            KeyCode::Pause,
            KeyCode::ArrowUp,
            KeyCode::BracketLeft,
            KeyCode::ShiftRight,
            KeyCode::Equal,
            KeyCode::Enter,
        ];
        for code in samples {
            let vk = virtual_key_code(code).expect("mapped");
            assert!(find_key(vk).is_some(), "{code:?} -> {vk} missing from key table");
        }
        assert_eq!(find_key(virtual_key_code(KeyCode::KeyA).expect("a")).map(|k| k.name), Some("a"));
    }

    #[test]
    fn unmapped_keys_produce_no_event() {
        assert_eq!(virtual_key_code(KeyCode::AudioVolumeUp), None);
        assert_eq!(
            key_event(
                KeyCode::AudioVolumeUp,
                ElementState::Pressed,
                false,
                ModifiersState::empty()
            ),
            None
        );
    }

    #[test]
    fn key_down_carries_modifiers_and_os_repeat_is_dropped() {
        let event = key_event(
            KeyCode::KeyP,
            ElementState::Pressed,
            false,
            ModifiersState::SHIFT | ModifiersState::CONTROL,
        );
        assert_eq!(
            event,
            Some(InputEvent::KeyDown {
                key: 80,
                modifiers: KeyModifiers::SHIFT | KeyModifiers::CTRL,
            })
        );
        assert_eq!(
            key_event(KeyCode::KeyP, ElementState::Pressed, true, ModifiersState::empty()),
            None
        );
        assert_eq!(
            key_event(KeyCode::KeyP, ElementState::Released, false, ModifiersState::SHIFT),
            Some(InputEvent::KeyUp { key: 80 })
        );
    }

    #[test]
    fn only_mouse_presses_are_forwarded() {
        assert_eq!(
            mouse_button_event(WinitMouseButton::Right, ElementState::Pressed),
            Some(InputEvent::MouseButtonDown {
                button: MouseButton::Right
            })
        );
        assert_eq!(
            mouse_button_event(WinitMouseButton::Right, ElementState::Released),
            None
        );
        assert_eq!(
            mouse_button_event(WinitMouseButton::Back, ElementState::Pressed),
            None
        );
    }
}
