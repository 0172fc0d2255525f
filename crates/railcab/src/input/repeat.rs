use crate::controls::ControlSet;

pub const DEFAULT_REPEAT_DELAY: f64 = 0.5;
pub const DEFAULT_REPEAT_INTERVAL: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRepeat {
    pub control: usize,
    pub countdown: f64,
}

/// Re-raises the pressed edge of held digital controls on a fixed cadence.
#[derive(Debug, Clone)]
pub struct RepeatTimer {
    delay: f64,
    interval: f64,
    entries: Vec<ControlRepeat>,
}

impl Default for RepeatTimer {
    fn default() -> Self {
        Self::new(DEFAULT_REPEAT_DELAY, DEFAULT_REPEAT_INTERVAL)
    }
}

impl RepeatTimer {
    pub fn new(delay: f64, interval: f64) -> Self {
        Self {
            delay: delay.max(0.0),
            interval: normalize_interval(interval),
            entries: Vec::new(),
        }
    }

    pub fn on_pressed(&mut self, control: usize) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.control == control) {
            entry.countdown = self.delay;
            return;
        }
        self.entries.push(ControlRepeat {
            control,
            countdown: self.delay,
        });
    }

    pub fn on_released(&mut self, control: usize) {
        if let Some(position) = self.entries.iter().position(|entry| entry.control == control) {
            self.entries.swap_remove(position);
        }
    }

    pub fn tick(&mut self, dt: f64, controls: &mut ControlSet) {
        for entry in &mut self.entries {
            entry.countdown -= dt;
            if entry.countdown > 0.0 {
                continue;
            }
            if let Some(control) = controls.get_mut(entry.control) {
                control.press();
            }
            entry.countdown += self.interval;
            // A stall longer than several intervals fires once, not once per
            // missed interval.
            if entry.countdown <= 0.0 {
                entry.countdown = self.interval;
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ControlRepeat] {
        &self.entries
    }
}

fn normalize_interval(interval: f64) -> f64 {
    if interval > 0.0 {
        interval
    } else {
        DEFAULT_REPEAT_INTERVAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Command, CommandRegistry, Control, DigitalState, KeyModifiers};

    fn controls() -> ControlSet {
        let registry = CommandRegistry::builtin();
        ControlSet::new(vec![
            Control::keyboard(&registry, Command::PowerIncrease, 65, KeyModifiers::empty()),
            Control::keyboard(&registry, Command::PowerDecrease, 90, KeyModifiers::empty()),
        ])
    }

    #[test]
    fn fires_after_delay_then_every_interval() {
        let mut controls = controls();
        let mut timer = RepeatTimer::new(0.5, 0.25);
        timer.on_pressed(0);
        controls.get_mut(0).expect("control").digital_state = DigitalState::PressedAcknowledged;

        timer.tick(0.25, &mut controls);
        assert_eq!(
            controls.get(0).expect("control").digital_state,
            DigitalState::PressedAcknowledged
        );

        timer.tick(0.25, &mut controls);
        assert_eq!(controls.get(0).expect("control").digital_state, DigitalState::Pressed);
        assert!((timer.entries()[0].countdown - 0.25).abs() < 0.0001);

        controls.get_mut(0).expect("control").digital_state = DigitalState::PressedAcknowledged;
        timer.tick(0.125, &mut controls);
        assert_eq!(
            controls.get(0).expect("control").digital_state,
            DigitalState::PressedAcknowledged
        );
        timer.tick(0.125, &mut controls);
        assert_eq!(controls.get(0).expect("control").digital_state, DigitalState::Pressed);
    }

    #[test]
    fn release_removes_only_matching_entry() {
        let mut timer = RepeatTimer::new(0.5, 0.1);
        timer.on_pressed(0);
        timer.on_pressed(1);
        timer.on_released(0);

        assert_eq!(timer.entries().len(), 1);
        assert_eq!(timer.entries()[0].control, 1);

        timer.on_released(7);
        assert_eq!(timer.entries().len(), 1);
    }

    #[test]
    fn repeated_press_restarts_delay_instead_of_duplicating() {
        let mut timer = RepeatTimer::new(0.5, 0.1);
        timer.on_pressed(1);
        let mut controls = controls();
        timer.tick(0.3, &mut controls);
        timer.on_pressed(1);

        assert_eq!(timer.entries().len(), 1);
        assert!((timer.entries()[0].countdown - 0.5).abs() < 0.0001);
    }

    #[test]
    fn long_stall_fires_once() {
        let mut controls = controls();
        let mut timer = RepeatTimer::new(0.5, 0.1);
        timer.on_pressed(0);
        timer.tick(3.0, &mut controls);

        assert_eq!(controls.get(0).expect("control").digital_state, DigitalState::Pressed);
        assert!((timer.entries()[0].countdown - 0.1).abs() < 0.0001);

        // Back on the normal cadence: nothing until a full interval passes.
        controls.get_mut(0).expect("control").digital_state = DigitalState::PressedAcknowledged;
        timer.tick(0.05, &mut controls);
        assert_eq!(
            controls.get(0).expect("control").digital_state,
            DigitalState::PressedAcknowledged
        );
        timer.tick(0.05, &mut controls);
        assert_eq!(controls.get(0).expect("control").digital_state, DigitalState::Pressed);
    }

    #[test]
    fn zero_interval_falls_back_to_default() {
        let timer = RepeatTimer::new(0.5, 0.0);
        assert!((timer.interval - DEFAULT_REPEAT_INTERVAL).abs() < 0.0001);
    }
}
