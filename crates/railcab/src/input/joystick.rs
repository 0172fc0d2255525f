use tracing::{debug, info};

use super::event::{EventQueue, InputEvent};

/// Axis changes smaller than this are treated as noise.
const AXIS_CHANGE_EPSILON: f64 = 0.001;

/// Hat positions, numbered the way binding files store them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HatPosition {
    #[default]
    Centered,
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl HatPosition {
    pub fn code(self) -> i32 {
        match self {
            Self::Centered => 0,
            Self::Up => 1,
            Self::UpRight => 2,
            Self::Right => 3,
            Self::DownRight => 4,
            Self::Down => 5,
            Self::DownLeft => 6,
            Self::Left => 7,
            Self::UpLeft => 8,
        }
    }
}

/// Raw state of one device at poll time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    pub buttons: Vec<bool>,
    pub axes: Vec<f64>,
    pub hats: Vec<HatPosition>,
}

impl DeviceSnapshot {
    fn neutral_like(other: &DeviceSnapshot) -> Self {
        Self {
            buttons: vec![false; other.buttons.len()],
            axes: vec![0.0; other.axes.len()],
            hats: vec![HatPosition::Centered; other.hats.len()],
        }
    }
}

/// Device enumeration and low-level polling, supplied by the host.
pub trait JoystickSource {
    fn device_count(&self) -> usize;
    /// `None` when the device is currently disconnected.
    fn snapshot(&mut self, device: usize) -> Option<DeviceSnapshot>;
}

/// Host without a joystick backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoJoysticks;

impl JoystickSource for NoJoysticks {
    fn device_count(&self) -> usize {
        0
    }

    fn snapshot(&mut self, _device: usize) -> Option<DeviceSnapshot> {
        None
    }
}

/// Turns successive device snapshots into discrete events.
#[derive(Debug, Default)]
pub struct JoystickPoller {
    previous: Vec<Option<DeviceSnapshot>>,
}

impl JoystickPoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self, source: &mut dyn JoystickSource, queue: &mut EventQueue) {
        let count = source.device_count();
        if self.previous.len() < count {
            self.previous.resize(count, None);
        }

        for device in 0..count {
            let Some(current) = source.snapshot(device) else {
                if self.previous[device].take().is_some() {
                    info!(device, "joystick_unavailable");
                }
                continue;
            };
            let previous = match self.previous[device].take() {
                Some(previous) => previous,
                None => {
                    debug!(device, "joystick_attached");
                    DeviceSnapshot::neutral_like(&current)
                }
            };
            diff_device(device, &previous, &current, queue);
            self.previous[device] = Some(current);
        }

        for stale in self.previous.iter_mut().skip(count) {
            *stale = None;
        }
    }
}

fn diff_device(
    device: usize,
    previous: &DeviceSnapshot,
    current: &DeviceSnapshot,
    queue: &mut EventQueue,
) {
    for (button, &pressed) in current.buttons.iter().enumerate() {
        let was_pressed = previous.buttons.get(button).copied().unwrap_or(false);
        if pressed != was_pressed {
            queue.push(if pressed {
                InputEvent::JoyButtonDown { device, button }
            } else {
                InputEvent::JoyButtonUp { device, button }
            });
        }
    }

    for (axis, &value) in current.axes.iter().enumerate() {
        let old = previous.axes.get(axis).copied().unwrap_or(0.0);
        if (old - value).abs() > AXIS_CHANGE_EPSILON {
            queue.push(InputEvent::JoyAxisMotion {
                device,
                axis,
                value,
            });
        }
    }

    for (hat, &position) in current.hats.iter().enumerate() {
        let old = previous.hats.get(hat).copied().unwrap_or_default();
        if position != old {
            queue.push(InputEvent::JoyHatMotion {
                device,
                hat,
                position,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct ScriptedSource {
        devices: Vec<Option<DeviceSnapshot>>,
    }

    impl JoystickSource for ScriptedSource {
        fn device_count(&self) -> usize {
            self.devices.len()
        }

        fn snapshot(&mut self, device: usize) -> Option<DeviceSnapshot> {
            self.devices.get(device).cloned().flatten()
        }
    }

    fn drain(queue: &mut EventQueue) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while let Some(event) = queue.pop() {
            events.push(event);
        }
        events
    }

    #[test]
    fn first_poll_diffs_against_neutral_state() {
        let mut source = ScriptedSource {
            devices: vec![Some(DeviceSnapshot {
                buttons: vec![false, true],
                axes: vec![0.0, -0.5],
                hats: vec![HatPosition::Left],
            })],
        };
        let mut poller = JoystickPoller::new();
        let mut queue = EventQueue::new();

        poller.poll(&mut source, &mut queue);

        assert_eq!(
            drain(&mut queue),
            vec![
                InputEvent::JoyButtonDown {
                    device: 0,
                    button: 1
                },
                InputEvent::JoyAxisMotion {
                    device: 0,
                    axis: 1,
                    value: -0.5
                },
                InputEvent::JoyHatMotion {
                    device: 0,
                    hat: 0,
                    position: HatPosition::Left
                },
            ]
        );
    }

    #[test]
    fn unchanged_snapshot_emits_nothing_and_small_axis_noise_is_ignored() {
        let snapshot = DeviceSnapshot {
            buttons: vec![true],
            axes: vec![0.25],
            hats: vec![],
        };
        let mut source = ScriptedSource {
            devices: vec![Some(snapshot.clone())],
        };
        let mut poller = JoystickPoller::new();
        let mut queue = EventQueue::new();
        poller.poll(&mut source, &mut queue);
        queue.clear();

        source.devices[0] = Some(DeviceSnapshot {
            axes: vec![0.2505],
            ..snapshot
        });
        poller.poll(&mut source, &mut queue);

        assert!(queue.is_empty());
    }

    #[test]
    fn release_and_axis_change_are_reported() {
        let mut source = ScriptedSource {
            devices: vec![Some(DeviceSnapshot {
                buttons: vec![true],
                axes: vec![0.25],
                hats: vec![HatPosition::Up],
            })],
        };
        let mut poller = JoystickPoller::new();
        let mut queue = EventQueue::new();
        poller.poll(&mut source, &mut queue);
        queue.clear();

        source.devices[0] = Some(DeviceSnapshot {
            buttons: vec![false],
            axes: vec![0.75],
            hats: vec![HatPosition::Centered],
        });
        poller.poll(&mut source, &mut queue);

        assert_eq!(
            drain(&mut queue),
            vec![
                InputEvent::JoyButtonUp {
                    device: 0,
                    button: 0
                },
                InputEvent::JoyAxisMotion {
                    device: 0,
                    axis: 0,
                    value: 0.75
                },
                InputEvent::JoyHatMotion {
                    device: 0,
                    hat: 0,
                    position: HatPosition::Centered
                },
            ]
        );
    }

    #[test]
    fn vanished_device_stops_producing_events() {
        let mut source = ScriptedSource {
            devices: vec![Some(DeviceSnapshot {
                buttons: vec![true],
                ..DeviceSnapshot::default()
            })],
        };
        let mut poller = JoystickPoller::new();
        let mut queue = EventQueue::new();
        poller.poll(&mut source, &mut queue);
        queue.clear();

        source.devices[0] = None;
        poller.poll(&mut source, &mut queue);
        poller.poll(&mut source, &mut queue);

        assert!(queue.is_empty());
    }

    #[test]
    fn no_joysticks_source_is_silent() {
        let mut poller = JoystickPoller::new();
        let mut queue = EventQueue::new();
        poller.poll(&mut NoJoysticks, &mut queue);
        assert!(queue.is_empty());
    }

    #[test]
    fn hat_codes_follow_file_numbering() {
        assert_eq!(HatPosition::Centered.code(), 0);
        assert_eq!(HatPosition::Up.code(), 1);
        assert_eq!(HatPosition::UpLeft.code(), 8);
    }
}
