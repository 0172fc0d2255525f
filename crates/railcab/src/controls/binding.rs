use bitflags::bitflags;

use super::command::{Command, CommandKind, CommandRegistry};

bitflags! {
    /// Modifier bitmask as stored in binding files.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CTRL  = 0b0000_0010;
        const ALT   = 0b0000_0100;
    }
}

/// Edge-tracking state of a digital control.
///
/// The normalizer raises `Pressed`/`Released`; the dispatcher consumes the
/// edge by moving to the matching `*Acknowledged` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigitalState {
    #[default]
    ReleasedAcknowledged,
    Released,
    Pressed,
    PressedAcknowledged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMethod {
    Keyboard,
    Joystick,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoystickComponent {
    Axis,
    Hat,
    Button,
}

impl JoystickComponent {
    pub fn file_token(self) -> &'static str {
        match self {
            Self::Axis => "axis",
            Self::Hat => "hat",
            Self::Button => "button",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBinding {
    Invalid,
    Keyboard {
        key: i32,
        modifiers: KeyModifiers,
    },
    Joystick {
        device: usize,
        component: JoystickComponent,
        element: usize,
        /// Axis: -1 or 1. Hat: the position that counts as pressed.
        direction: i32,
    },
}

impl InputBinding {
    pub fn method(&self) -> InputMethod {
        match self {
            Self::Invalid => InputMethod::Invalid,
            Self::Keyboard { .. } => InputMethod::Keyboard,
            Self::Joystick { .. } => InputMethod::Joystick,
        }
    }
}

/// One physical input bound to a command, plus its live state.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    /// `None` for a line whose command name did not resolve.
    pub command: Option<Command>,
    pub kind: CommandKind,
    pub binding: InputBinding,
    pub digital_state: DigitalState,
    pub analog_state: f64,
    /// Original text of an unresolved line, written back verbatim on save.
    pub placeholder: Option<String>,
}

impl Control {
    pub fn new(registry: &CommandRegistry, command: Command, binding: InputBinding) -> Self {
        Self {
            command: Some(command),
            kind: registry.kind(command),
            binding,
            digital_state: DigitalState::default(),
            analog_state: 0.0,
            placeholder: None,
        }
    }

    pub fn keyboard(
        registry: &CommandRegistry,
        command: Command,
        key: i32,
        modifiers: KeyModifiers,
    ) -> Self {
        Self::new(registry, command, InputBinding::Keyboard { key, modifiers })
    }

    pub fn joystick(
        registry: &CommandRegistry,
        command: Command,
        device: usize,
        component: JoystickComponent,
        element: usize,
        direction: i32,
    ) -> Self {
        Self::new(
            registry,
            command,
            InputBinding::Joystick {
                device,
                component,
                element,
                direction,
            },
        )
    }

    pub(crate) fn unresolved(raw_line: &str) -> Self {
        Self {
            command: None,
            kind: CommandKind::Digital,
            binding: InputBinding::Invalid,
            digital_state: DigitalState::default(),
            analog_state: 0.0,
            placeholder: Some(raw_line.trim().to_string()),
        }
    }

    pub fn method(&self) -> InputMethod {
        self.binding.method()
    }

    pub(crate) fn press(&mut self) {
        self.analog_state = 1.0;
        self.digital_state = DigitalState::Pressed;
    }

    pub(crate) fn release(&mut self) {
        self.analog_state = 0.0;
        self.digital_state = DigitalState::Released;
    }
}

/// Arena of controls. Everything else refers to controls by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlSet {
    controls: Vec<Control>,
}

impl ControlSet {
    pub fn new(controls: Vec<Control>) -> Self {
        Self { controls }
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Control> {
        self.controls.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Control> {
        self.controls.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Control> {
        self.controls.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Control> {
        self.controls.iter_mut()
    }

    pub fn as_slice(&self) -> &[Control] {
        &self.controls
    }

    pub fn contains_command(&self, command: Command) -> bool {
        self.controls
            .iter()
            .any(|control| control.command == Some(command))
    }

    pub fn push(&mut self, control: Control) {
        self.controls.push(control);
    }

    pub fn into_vec(self) -> Vec<Control> {
        self.controls
    }
}

impl FromIterator<Control> for ControlSet {
    fn from_iter<I: IntoIterator<Item = Control>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
