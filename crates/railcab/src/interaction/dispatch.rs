use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::GameMode;
use crate::controls::{Command, ControlSet, DigitalState, InterfaceStrings};
use crate::session::Frontend;
use crate::sim::{SimulationClock, Simulation};

use super::cab::CabState;
use super::camera::CameraState;
use super::display::{DisplayOptions, MessageLog};
use super::mode::{InteractionMode, InteractionState};

/// How a control reached its handler this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    Pressed,
    Released,
    /// Non-zero analog state.
    Analog(f64),
}

/// Everything a command handler may touch.
pub struct CommandContext<'a> {
    pub interaction: &'a mut InteractionState,
    pub cab: &'a mut CabState,
    pub camera: &'a mut CameraState,
    pub display: &'a mut DisplayOptions,
    pub messages: &'a mut MessageLog,
    pub clock: &'a mut SimulationClock,
    pub simulation: &'a mut dyn Simulation,
    pub frontend: &'a mut dyn Frontend,
    pub strings: &'a InterfaceStrings,
    pub game_mode: GameMode,
    /// Simulated seconds of this pass; zero in the pause and menu spin.
    pub elapsed: f64,
}

impl CommandContext<'_> {
    /// Shows the localized text for `key` for `duration` simulated seconds.
    pub fn notify(&mut self, key: &str, duration: f64) {
        let text = self.strings.get(key).to_string();
        self.messages
            .add(text, duration, self.clock.seconds_since_midnight());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("a handler for {command:?} is already registered in {mode:?} mode")]
    Duplicate {
        mode: InteractionMode,
        command: Command,
    },
}

type HandlerFn = dyn Fn(&mut CommandContext<'_>, Activation) + Send + Sync;

/// Command handlers keyed by interaction mode and command.
pub struct HandlerTable {
    handlers: HashMap<(InteractionMode, Command), Box<HandlerFn>>,
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerTable {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<F>(
        &mut self,
        mode: InteractionMode,
        command: Command,
        handler: F,
    ) -> Result<(), RegisterError>
    where
        F: Fn(&mut CommandContext<'_>, Activation) + Send + Sync + 'static,
    {
        if self.handlers.contains_key(&(mode, command)) {
            return Err(RegisterError::Duplicate { mode, command });
        }
        self.handlers.insert((mode, command), Box::new(handler));
        Ok(())
    }

    pub fn contains(&self, mode: InteractionMode, command: Command) -> bool {
        self.handlers.contains_key(&(mode, command))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn invoke(
        &self,
        mode: InteractionMode,
        command: Command,
        context: &mut CommandContext<'_>,
        activation: Activation,
    ) {
        if let Some(handler) = self.handlers.get(&(mode, command)) {
            handler(context, activation);
        }
    }

    /// One dispatch pass over the control arena.
    ///
    /// The mode is read once up front, so a command that changes it only
    /// affects the next pass. Digital edges are acknowledged here; a command
    /// bound to several controls fires at most once per edge kind per pass.
    /// Analog controls and released edges are only consumed in `Normal`.
    pub fn process_controls(&self, controls: &mut ControlSet, context: &mut CommandContext<'_>) {
        let mode = context.interaction.mode();
        let mut pressed = HashSet::new();
        let mut released = HashSet::new();

        for control in controls.iter_mut() {
            let Some(command) = control.command else {
                continue;
            };

            if control.kind.is_analog() {
                if mode == InteractionMode::Normal && control.analog_state != 0.0 {
                    self.invoke(
                        mode,
                        command,
                        context,
                        Activation::Analog(control.analog_state),
                    );
                }
                continue;
            }

            match control.digital_state {
                DigitalState::Pressed => {
                    control.digital_state = DigitalState::PressedAcknowledged;
                    if pressed.insert(command) {
                        self.invoke(mode, command, context, Activation::Pressed);
                    }
                }
                DigitalState::Released if mode == InteractionMode::Normal => {
                    control.digital_state = DigitalState::ReleasedAcknowledged;
                    if released.insert(command) {
                        self.invoke(mode, command, context, Activation::Released);
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::controls::{CommandRegistry, Control, KeyModifiers};
    use crate::session::test_support::{RecordingFrontend, RecordingSimulation};

    struct Fixture {
        interaction: InteractionState,
        cab: CabState,
        camera: CameraState,
        display: DisplayOptions,
        messages: MessageLog,
        clock: SimulationClock,
        simulation: RecordingSimulation,
        frontend: RecordingFrontend,
        strings: InterfaceStrings,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                interaction: InteractionState::default(),
                cab: CabState::default(),
                camera: CameraState::default(),
                display: DisplayOptions::default(),
                messages: MessageLog::default(),
                clock: SimulationClock::default(),
                simulation: RecordingSimulation::default(),
                frontend: RecordingFrontend::default(),
                strings: InterfaceStrings::default(),
            }
        }

        fn context(&mut self) -> CommandContext<'_> {
            CommandContext {
                interaction: &mut self.interaction,
                cab: &mut self.cab,
                camera: &mut self.camera,
                display: &mut self.display,
                messages: &mut self.messages,
                clock: &mut self.clock,
                simulation: &mut self.simulation,
                frontend: &mut self.frontend,
                strings: &self.strings,
                game_mode: GameMode::Normal,
                elapsed: 0.0,
            }
        }
    }

    fn key_control(registry: &CommandRegistry, command: Command, key: i32) -> Control {
        Control::keyboard(registry, command, key, KeyModifiers::empty())
    }

    fn counting_table(command: Command, mode: InteractionMode) -> (HandlerTable, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let mut table = HandlerTable::new();
        table
            .register(mode, command, move |_, activation| {
                if activation == Activation::Pressed {
                    seen.fetch_add(1, Ordering::Relaxed);
                }
            })
            .expect("register");
        (table, count)
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut table = HandlerTable::new();
        table
            .register(InteractionMode::Normal, Command::MiscClock, |_, _| {})
            .expect("first registration");
        let error = table
            .register(InteractionMode::Normal, Command::MiscClock, |_, _| {})
            .expect_err("duplicate");
        assert_eq!(
            error,
            RegisterError::Duplicate {
                mode: InteractionMode::Normal,
                command: Command::MiscClock,
            }
        );
        assert!(error.to_string().contains("MiscClock"));
        table
            .register(InteractionMode::Pause, Command::MiscClock, |_, _| {})
            .expect("other mode is a different key");
    }

    #[test]
    fn command_bound_twice_fires_once_per_frame() {
        let registry = CommandRegistry::builtin();
        let mut controls = ControlSet::new(vec![
            key_control(&registry, Command::MiscClock, 0x43),
            key_control(&registry, Command::MiscClock, 0x70),
        ]);
        for control in controls.iter_mut() {
            control.press();
        }
        let (table, count) = counting_table(Command::MiscClock, InteractionMode::Normal);
        let mut fixture = Fixture::new();

        table.process_controls(&mut controls, &mut fixture.context());

        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert!(controls
            .iter()
            .all(|control| control.digital_state == DigitalState::PressedAcknowledged));

        table.process_controls(&mut controls, &mut fixture.context());
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn released_edges_wait_for_normal_mode() {
        let registry = CommandRegistry::builtin();
        let mut controls =
            ControlSet::new(vec![key_control(&registry, Command::SecurityA1, 0x31)]);
        let released = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&released);
        let mut table = HandlerTable::new();
        table
            .register(InteractionMode::Normal, Command::SecurityA1, move |_, activation| {
                if activation == Activation::Released {
                    seen.fetch_add(1, Ordering::Relaxed);
                }
            })
            .expect("register");
        let mut fixture = Fixture::new();
        fixture.interaction.set_mode(InteractionMode::Pause);

        if let Some(control) = controls.get_mut(0) {
            control.release();
        }
        table.process_controls(&mut controls, &mut fixture.context());
        assert_eq!(
            controls.get(0).map(|control| control.digital_state),
            Some(DigitalState::Released)
        );

        fixture.interaction.set_mode(InteractionMode::Normal);
        table.process_controls(&mut controls, &mut fixture.context());
        assert_eq!(released.load(Ordering::Relaxed), 1);
        assert_eq!(
            controls.get(0).map(|control| control.digital_state),
            Some(DigitalState::ReleasedAcknowledged)
        );
    }

    #[test]
    fn analog_controls_are_ignored_outside_normal_mode() {
        let registry = CommandRegistry::builtin();
        let mut control = key_control(&registry, Command::CameraMoveForward, 0x57);
        control.analog_state = 1.0;
        let mut controls = ControlSet::new(vec![control]);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut table = HandlerTable::new();
        table
            .register(InteractionMode::Normal, Command::CameraMoveForward, move |_, _| {
                seen.fetch_add(1, Ordering::Relaxed);
            })
            .expect("register");
        let mut fixture = Fixture::new();

        fixture.interaction.set_mode(InteractionMode::Pause);
        table.process_controls(&mut controls, &mut fixture.context());
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        fixture.interaction.set_mode(InteractionMode::Normal);
        table.process_controls(&mut controls, &mut fixture.context());
        table.process_controls(&mut controls, &mut fixture.context());
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn mode_is_captured_for_the_whole_pass() {
        let registry = CommandRegistry::builtin();
        let mut controls = ControlSet::new(vec![
            key_control(&registry, Command::MiscPause, 0x13),
            key_control(&registry, Command::MiscClock, 0x43),
        ]);
        for control in controls.iter_mut() {
            control.press();
        }
        let mut table = HandlerTable::new();
        table
            .register(InteractionMode::Normal, Command::MiscPause, |context, _| {
                context.interaction.set_mode(InteractionMode::Pause);
            })
            .expect("register pause");
        table
            .register(InteractionMode::Normal, Command::MiscClock, |context, _| {
                context.display.clock = !context.display.clock;
            })
            .expect("register clock");
        let mut fixture = Fixture::new();

        table.process_controls(&mut controls, &mut fixture.context());

        assert_eq!(fixture.interaction.mode(), InteractionMode::Pause);
        assert!(fixture.display.clock);
    }

    #[test]
    fn notify_uses_clock_time() {
        let mut fixture = Fixture::new();
        fixture.clock = SimulationClock::new(100.0, 0.0);
        fixture.context().notify("notification_exterior", 2.0);
        let message = fixture.messages.iter().next().cloned().expect("message");
        assert_eq!(message.text, "notification_exterior");
        assert_eq!(message.expires_at, 102.0);
    }
}
