use super::strings::InterfaceStrings;

/// Keyboard element codes stored in binding files use the Windows virtual-key
/// numbering, so `65` is the `A` key regardless of layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInfo {
    pub code: i32,
    pub name: &'static str,
    pub description: &'static str,
}

const fn key(code: i32, name: &'static str, description: &'static str) -> KeyInfo {
    KeyInfo {
        code,
        name,
        description,
    }
}

pub const KEY_BACKSPACE: i32 = 8;
pub const KEY_TAB: i32 = 9;
pub const KEY_RETURN: i32 = 13;
pub const KEY_ESCAPE: i32 = 27;
pub const KEY_SPACE: i32 = 32;
pub const KEY_LEFT: i32 = 37;
pub const KEY_UP: i32 = 38;
pub const KEY_RIGHT: i32 = 39;
pub const KEY_DOWN: i32 = 40;

pub const KEYS: &[KeyInfo] = &[
    key(48, "0", "0"),
    key(49, "1", "1"),
    key(50, "2", "2"),
    key(51, "3", "3"),
    key(52, "4", "4"),
    key(53, "5", "5"),
    key(54, "6", "6"),
    key(55, "7", "7"),
    key(56, "8", "8"),
    key(57, "9", "9"),
    key(192, "BACKQUOTE", "Backquote"),
    key(220, "BACKSLASH", "Backslash"),
    key(KEY_BACKSPACE, "BACKSPACE", "Backspace"),
    key(19, "BREAK", "Break"),
    key(20, "CAPSLOCK", "Capslock"),
    key(12, "CLEAR", "Clear"),
    key(188, "COMMA", "Comma"),
    key(46, "DELETE", "Delete"),
    key(KEY_DOWN, "DOWN", "Down"),
    key(35, "END", "End"),
    key(KEY_ESCAPE, "ESCAPE", "Escape"),
    key(112, "F1", "F1"),
    key(113, "F2", "F2"),
    key(114, "F3", "F3"),
    key(115, "F4", "F4"),
    key(116, "F5", "F5"),
    key(117, "F6", "F6"),
    key(118, "F7", "F7"),
    key(119, "F8", "F8"),
    key(120, "F9", "F9"),
    key(121, "F10", "F10"),
    key(122, "F11", "F11"),
    key(123, "F12", "F12"),
    key(124, "F13", "F13"),
    key(125, "F14", "F14"),
    key(126, "F15", "F15"),
    key(36, "HOME", "Home"),
    key(45, "INSERT", "Insert"),
    key(96, "KP0", "Keypad 0"),
    key(97, "KP1", "Keypad 1"),
    key(98, "KP2", "Keypad 2"),
    key(99, "KP3", "Keypad 3"),
    key(100, "KP4", "Keypad 4"),
    key(101, "KP5", "Keypad 5"),
    key(102, "KP6", "Keypad 6"),
    key(103, "KP7", "Keypad 7"),
    key(104, "KP8", "Keypad 8"),
    key(105, "KP9", "Keypad 9"),
    key(111, "KP_DIVIDE", "Keypad Divide"),
    key(109, "KP_MINUS", "Keypad Minus"),
    key(106, "KP_MULTIPLY", "Keypad Multiply"),
    key(110, "KP_PERIOD", "Keypad Period"),
    key(107, "KP_PLUS", "Keypad Plus"),
    key(164, "LALT", "Left Alt"),
    key(162, "LCTRL", "Left Ctrl"),
    key(KEY_LEFT, "LEFT", "Left"),
    key(219, "LEFTBRACKET", "Left bracket"),
    key(160, "LSHIFT", "Left Shift"),
    key(91, "LSUPER", "Left Application"),
    key(93, "MENU", "Menu"),
    key(189, "MINUS", "Minus"),
    key(144, "NUMLOCK", "Numlock"),
    key(34, "PAGEDOWN", "Page down"),
    key(33, "PAGEUP", "Page up"),
    key(190, "PERIOD", "Period"),
    key(187, "PLUS", "Plus"),
    key(222, "QUOTE", "Quote"),
    key(165, "RALT", "Right Alt"),
    key(163, "RCTRL", "Right Ctrl"),
    key(KEY_RETURN, "RETURN", "Return"),
    key(KEY_RIGHT, "RIGHT", "Right"),
    key(221, "RIGHTBRACKET", "Right bracket"),
    key(161, "RSHIFT", "Right Shift"),
    key(92, "RSUPER", "Right Application"),
    key(145, "SCROLLLOCK", "Scrolllock"),
    key(186, "SEMICOLON", "Semicolon"),
    key(191, "SLASH", "Slash"),
    key(KEY_SPACE, "SPACE", "Space"),
    key(KEY_TAB, "TAB", "Tab"),
    key(KEY_UP, "UP", "Up"),
    key(65, "a", "A"),
    key(66, "b", "B"),
    key(67, "c", "C"),
    key(68, "d", "D"),
    key(69, "e", "E"),
    key(70, "f", "F"),
    key(71, "g", "G"),
    key(72, "h", "H"),
    key(73, "i", "I"),
    key(74, "j", "J"),
    key(75, "k", "K"),
    key(76, "l", "L"),
    key(77, "m", "M"),
    key(78, "n", "N"),
    key(79, "o", "O"),
    key(80, "p", "P"),
    key(81, "q", "Q"),
    key(82, "r", "R"),
    key(83, "s", "S"),
    key(84, "t", "T"),
    key(85, "u", "U"),
    key(86, "v", "V"),
    key(87, "w", "W"),
    key(88, "x", "X"),
    key(89, "y", "Y"),
    key(90, "z", "Z"),
];

pub fn find_key(code: i32) -> Option<&'static KeyInfo> {
    KEYS.iter().find(|info| info.code == code)
}

pub fn find_key_by_name(name: &str) -> Option<&'static KeyInfo> {
    let name = name.trim();
    KEYS.iter().find(|info| info.name.eq_ignore_ascii_case(name))
}

/// Display text for a key code, preferring the localized description.
pub fn describe_key(code: i32, strings: &InterfaceStrings) -> String {
    match find_key(code) {
        Some(info) => strings
            .key_description(info.name)
            .unwrap_or(info.description)
            .to_string(),
        None => format!("key {code}"),
    }
}
