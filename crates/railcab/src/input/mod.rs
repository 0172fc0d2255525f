mod event;
mod joystick;
mod mouse;
mod normalizer;
mod repeat;

pub use event::{EventQueue, InputEvent, MouseButton};
pub use joystick::{DeviceSnapshot, HatPosition, JoystickPoller, JoystickSource, NoJoysticks};
pub use mouse::MouseGrab;
pub use normalizer::{
    full_axis_value, half_axis_value, FrameSignals, InputNormalizer, NormalizerConfig,
};
pub use repeat::{ControlRepeat, RepeatTimer, DEFAULT_REPEAT_DELAY, DEFAULT_REPEAT_INTERVAL};
