use std::collections::VecDeque;

use crate::controls::KeyModifiers;

use super::joystick::HatPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Quit,
    Resize {
        width: u32,
        height: u32,
    },
    KeyDown {
        key: i32,
        modifiers: KeyModifiers,
    },
    KeyUp {
        key: i32,
    },
    JoyButtonDown {
        device: usize,
        button: usize,
    },
    JoyButtonUp {
        device: usize,
        button: usize,
    },
    JoyHatMotion {
        device: usize,
        hat: usize,
        position: HatPosition,
    },
    JoyAxisMotion {
        device: usize,
        axis: usize,
        value: f64,
    },
    MouseButtonDown {
        button: MouseButton,
    },
    MouseMotion {
        dx: f64,
        dy: f64,
    },
}

/// FIFO of raw events gathered between two update passes.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
