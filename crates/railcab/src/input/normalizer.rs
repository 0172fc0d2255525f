use tracing::debug;

use crate::controls::{
    CommandKind, Control, ControlSet, DigitalState, InputBinding, JoystickComponent, KeyModifiers,
};

use super::event::{EventQueue, InputEvent, MouseButton};
use super::mouse::MouseGrab;
use super::repeat::RepeatTimer;

/// A digital control driven by an axis presses above this magnitude...
const AXIS_PRESS_THRESHOLD: f64 = 0.67;
/// ...and releases below this one.
const AXIS_RELEASE_THRESHOLD: f64 = 0.33;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizerConfig {
    pub use_joysticks: bool,
    /// Dead zone for joystick axes, in [0, 1].
    pub axis_threshold: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            use_joysticks: true,
            axis_threshold: 0.0,
        }
    }
}

/// Things the normalizer noticed that are not control state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameSignals {
    pub quit: bool,
    pub resized: Option<(u32, u32)>,
    /// New grab state when the right button toggled it.
    pub mouse_grab: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputNormalizer {
    config: NormalizerConfig,
}

impl InputNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            config: NormalizerConfig {
                axis_threshold: config.axis_threshold.clamp(0.0, 1.0),
                ..config
            },
        }
    }

    pub fn config(&self) -> NormalizerConfig {
        self.config
    }

    /// Drains `queue` in order, updating every control bound to each event.
    /// A quit event stops processing immediately.
    pub fn process(
        &self,
        queue: &mut EventQueue,
        controls: &mut ControlSet,
        repeats: &mut RepeatTimer,
        mouse: &mut MouseGrab,
    ) -> FrameSignals {
        let mut signals = FrameSignals::default();
        while let Some(event) = queue.pop() {
            match event {
                InputEvent::Quit => {
                    signals.quit = true;
                    return signals;
                }
                InputEvent::Resize { width, height } => signals.resized = Some((width, height)),
                InputEvent::KeyDown { key, modifiers } => {
                    key_down(controls, repeats, key, modifiers)
                }
                InputEvent::KeyUp { key } => key_up(controls, repeats, key),
                InputEvent::JoyButtonDown { device, button } if self.config.use_joysticks => {
                    joy_button(controls, repeats, device, button, true)
                }
                InputEvent::JoyButtonUp { device, button } if self.config.use_joysticks => {
                    joy_button(controls, repeats, device, button, false)
                }
                InputEvent::JoyHatMotion {
                    device,
                    hat,
                    position,
                } if self.config.use_joysticks => joy_hat(controls, device, hat, position.code()),
                InputEvent::JoyAxisMotion {
                    device,
                    axis,
                    value,
                } if self.config.use_joysticks => {
                    self.joy_axis(controls, device, axis, value);
                }
                InputEvent::JoyButtonDown { .. }
                | InputEvent::JoyButtonUp { .. }
                | InputEvent::JoyHatMotion { .. }
                | InputEvent::JoyAxisMotion { .. } => {}
                InputEvent::MouseButtonDown {
                    button: MouseButton::Right,
                } => {
                    let enabled = mouse.toggle();
                    debug!(enabled, "mouse_grab_toggled");
                    signals.mouse_grab = Some(enabled);
                }
                InputEvent::MouseButtonDown { .. } => {}
                InputEvent::MouseMotion { dx, dy } => mouse.motion(dx, dy),
            }
        }
        signals
    }

    fn joy_axis(&self, controls: &mut ControlSet, device: usize, axis: usize, value: f64) {
        let threshold = self.config.axis_threshold;
        for control in controls.iter_mut() {
            let Some(direction) = bound_joystick(control, device, JoystickComponent::Axis, axis)
            else {
                continue;
            };
            match control.kind {
                CommandKind::AnalogHalf => {
                    if let Some(scaled) = half_axis_value(value, direction, threshold) {
                        control.analog_state = scaled;
                    }
                }
                CommandKind::AnalogFull => {
                    control.analog_state = full_axis_value(value, direction, threshold);
                }
                CommandKind::Digital => {
                    if let Some(scaled) = half_axis_value(value, direction, threshold) {
                        apply_axis_hysteresis(control, scaled);
                    }
                }
            }
        }
    }
}

fn key_down(controls: &mut ControlSet, repeats: &mut RepeatTimer, key: i32, modifiers: KeyModifiers) {
    for (index, control) in controls.iter_mut().enumerate() {
        if control.binding == (InputBinding::Keyboard { key, modifiers }) {
            control.press();
            repeats.on_pressed(index);
        }
    }
}

// Release ignores modifiers so changing Shift/Ctrl/Alt while holding a key
// cannot leave the control stuck.
fn key_up(controls: &mut ControlSet, repeats: &mut RepeatTimer, key: i32) {
    for (index, control) in controls.iter_mut().enumerate() {
        if matches!(control.binding, InputBinding::Keyboard { key: bound, .. } if bound == key) {
            control.release();
            repeats.on_released(index);
        }
    }
}

fn joy_button(
    controls: &mut ControlSet,
    repeats: &mut RepeatTimer,
    device: usize,
    button: usize,
    pressed: bool,
) {
    for (index, control) in controls.iter_mut().enumerate() {
        if bound_joystick(control, device, JoystickComponent::Button, button).is_none() {
            continue;
        }
        if pressed {
            control.press();
            repeats.on_pressed(index);
        } else {
            control.release();
            repeats.on_released(index);
        }
    }
}

fn joy_hat(controls: &mut ControlSet, device: usize, hat: usize, position: i32) {
    for control in controls.iter_mut() {
        let Some(direction) = bound_joystick(control, device, JoystickComponent::Hat, hat) else {
            continue;
        };
        if direction == position {
            control.press();
        } else {
            control.release();
        }
    }
}

fn bound_joystick(
    control: &Control,
    device: usize,
    component: JoystickComponent,
    element: usize,
) -> Option<i32> {
    match control.binding {
        InputBinding::Joystick {
            device: bound_device,
            component: bound_component,
            element: bound_element,
            direction,
        } if bound_device == device && bound_component == component && bound_element == element => {
            Some(direction)
        }
        _ => None,
    }
}

/// Magnitude of `raw` on the half selected by `direction`, rescaled so the
/// dead zone maps to 0 and full deflection to 1. `None` when `raw` lies on
/// the other half.
pub fn half_axis_value(raw: f64, direction: i32, threshold: f64) -> Option<f64> {
    if raw * f64::from(direction) < 0.0 {
        return None;
    }
    let magnitude = raw.abs();
    Some(if magnitude < threshold {
        0.0
    } else if threshold < 1.0 {
        ((magnitude - threshold) / (1.0 - threshold)).min(1.0)
    } else {
        1.0
    })
}

/// Signed axis value after applying `direction` and a symmetric dead zone.
pub fn full_axis_value(raw: f64, direction: i32, threshold: f64) -> f64 {
    let value = raw * f64::from(direction);
    if value > -threshold && value < threshold {
        return 0.0;
    }
    if threshold >= 1.0 {
        return value.signum();
    }
    let scaled = if value < 0.0 {
        (value + threshold) / (1.0 - threshold)
    } else if value > 0.0 {
        (value - threshold) / (1.0 - threshold)
    } else {
        0.0
    };
    scaled.clamp(-1.0, 1.0)
}

fn apply_axis_hysteresis(control: &mut Control, scaled: f64) {
    match control.digital_state {
        DigitalState::Released | DigitalState::ReleasedAcknowledged => {
            if scaled > AXIS_PRESS_THRESHOLD {
                control.digital_state = DigitalState::Pressed;
            }
        }
        DigitalState::Pressed | DigitalState::PressedAcknowledged => {
            if scaled < AXIS_RELEASE_THRESHOLD {
                control.digital_state = DigitalState::Released;
            }
        }
    }
}
