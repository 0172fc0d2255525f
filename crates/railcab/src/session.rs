use tracing::{debug, info};

use crate::config::{GameMode, Options};
use crate::controls::{CommandRegistry, ControlSet, InterfaceStrings};
use crate::input::{
    EventQueue, InputEvent, InputNormalizer, JoystickPoller, JoystickSource, MouseGrab,
    RepeatTimer,
};
use crate::interaction::{
    timetable_height, CabSpecs, CabState, CameraRestriction, CameraState, CommandContext,
    DisplayOptions, HandlerTable, InteractionMode, InteractionState, Menu, MessageLog,
    QuitRequest, RegisterError, TimetableView,
};
use crate::sim::{
    FrameRateCounter, MetricsHandle, PhysicsStepper, Scheduler, Simulation, SimulationClock,
    SimulationMetrics, StartupSchedule,
};

/// How long a mouse grab toggle stays on screen, in simulated seconds.
const MOUSE_GRAB_MESSAGE_SECONDS: f64 = 5.0;

/// Side effects the session asks of the window host.
pub trait Frontend {
    fn render_scene(&mut self, view: &FrameView<'_>);
    fn toggle_fullscreen(&mut self);
    fn set_muted(&mut self, muted: bool);
}

/// Everything needed to start driving a route.
pub struct SessionSetup {
    pub registry: CommandRegistry,
    pub controls: ControlSet,
    pub strings: InterfaceStrings,
    pub options: Options,
    pub cab: CabSpecs,
    pub camera_restriction: CameraRestriction,
    pub has_custom_timetable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// The host should sleep briefly before the next frame.
    Paused,
    Quit(QuitRequest),
}

/// Read-only state handed to the renderer.
pub struct FrameView<'a> {
    pub mode: InteractionMode,
    pub menu: Option<&'a Menu>,
    pub cab: &'a CabState,
    pub camera: &'a CameraState,
    pub display: &'a DisplayOptions,
    pub messages: &'a MessageLog,
    pub clock: &'a SimulationClock,
    pub controls: &'a ControlSet,
    pub strings: &'a InterfaceStrings,
    pub metrics: SimulationMetrics,
    pub elapsed: f64,
}

struct TrainStepper<'a> {
    simulation: &'a mut dyn Simulation,
    cab: &'a CabState,
}

impl PhysicsStepper for TrainStepper<'_> {
    fn step(&mut self, dt: f64) {
        self.simulation.update_trains(dt, self.cab);
    }

    fn update_signalling(&mut self) {
        self.simulation.update_signalling();
    }
}

/// One driving session: owns the control arena, the clock and the
/// interaction state, and runs one update per host frame.
pub struct Session {
    registry: CommandRegistry,
    controls: ControlSet,
    strings: InterfaceStrings,
    handlers: HandlerTable,
    normalizer: InputNormalizer,
    repeats: RepeatTimer,
    mouse: MouseGrab,
    joysticks: JoystickPoller,
    events: EventQueue,
    scheduler: Scheduler,
    interaction: InteractionState,
    cab: CabState,
    camera: CameraState,
    display: DisplayOptions,
    messages: MessageLog,
    game_mode: GameMode,
    frame_rate: FrameRateCounter,
    metrics: MetricsHandle,
    fps: f64,
    last_elapsed: f64,
    last_sub_steps: u32,
    window_size: Option<(u32, u32)>,
    timetable_height: f64,
    options: Options,
}

impl Session {
    /// Computes the startup schedule and pre-drives the route up to it.
    pub fn start(
        setup: SessionSetup,
        simulation: &mut dyn Simulation,
    ) -> Result<Self, RegisterError> {
        let handlers = HandlerTable::with_builtins()?;
        let schedule =
            StartupSchedule::compute(simulation.stations(), simulation.preceding_train_offsets());
        let mut scheduler = Scheduler::from_schedule(&schedule);
        let cab = CabState::new(setup.cab);

        if schedule.fast_forward_seconds() > 0.0 {
            simulation.set_minimal_simulation(true);
            let summary = scheduler.fast_forward(&mut TrainStepper {
                simulation: &mut *simulation,
                cab: &cab,
            });
            simulation.set_minimal_simulation(false);
            info!(
                seconds = summary.seconds,
                chunks = summary.chunks,
                signalling_updates = summary.signalling_updates,
                "startup_fast_forward_complete"
            );
        }
        info!(
            startup_time = schedule.startup_time,
            clock_start = schedule.clock_start,
            first_player_station = ?schedule.first_player_station,
            "startup_schedule"
        );

        let options = setup.options.normalized();
        let timetable_height = timetable_height(simulation.stations().len());
        let display = DisplayOptions {
            timetable: TimetableView::new(setup.has_custom_timetable),
            limit_frame_rate: options.limit_frame_rate,
            ..DisplayOptions::default()
        };

        Ok(Self {
            registry: setup.registry,
            controls: setup.controls,
            strings: setup.strings,
            handlers,
            normalizer: InputNormalizer::new(options.normalizer_config()),
            repeats: RepeatTimer::new(options.key_repeat_delay, options.key_repeat_interval),
            mouse: MouseGrab::default(),
            joysticks: JoystickPoller::new(),
            events: EventQueue::new(),
            scheduler,
            interaction: InteractionState::default(),
            cab,
            camera: CameraState::new(setup.camera_restriction),
            display,
            messages: MessageLog::default(),
            game_mode: options.game_mode,
            frame_rate: FrameRateCounter::default(),
            metrics: MetricsHandle::default(),
            fps: 0.0,
            last_elapsed: 0.0,
            last_sub_steps: 0,
            window_size: None,
            timetable_height,
            options,
        })
    }

    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Runs one update. `Normal` frames advance the simulation; `Pause` and
    /// `Menu` frames only process input.
    pub fn update_frame(
        &mut self,
        real_dt: f64,
        simulation: &mut dyn Simulation,
        frontend: &mut dyn Frontend,
        joysticks: &mut dyn JoystickSource,
    ) -> FrameOutcome {
        if let Some(request) = self.interaction.quit_request() {
            return FrameOutcome::Quit(request);
        }
        match self.interaction.mode() {
            InteractionMode::Normal => self.normal_frame(real_dt, simulation, frontend, joysticks),
            InteractionMode::Pause | InteractionMode::Menu => {
                self.spin_frame(real_dt, simulation, frontend, joysticks)
            }
        }
    }

    pub fn render_frame(&self, frontend: &mut dyn Frontend) {
        frontend.render_scene(&self.view());
    }

    fn normal_frame(
        &mut self,
        real_dt: f64,
        simulation: &mut dyn Simulation,
        frontend: &mut dyn Frontend,
        joysticks: &mut dyn JoystickSource,
    ) -> FrameOutcome {
        let time = self.scheduler.frame_time(real_dt);

        if self.scheduler.accumulate_signalling(time.elapsed) {
            simulation.update_signalling();
            debug!(
                seconds_since_midnight = self.scheduler.clock().seconds_since_midnight(),
                "signalling_updated"
            );
        }
        if let Some(fps) = self
            .frame_rate
            .record(time.elapsed, self.scheduler.clock().time_factor())
        {
            self.fps = fps;
        }

        self.repeats.tick(time.real, &mut self.controls);
        self.collect_input(joysticks);

        self.camera.reset_direction();
        if self.mouse.is_enabled() {
            let (dx, dy) = self.mouse.take_target();
            self.camera.apply_mouse_grab(dx, dy);
        }

        self.process_controls(time.elapsed, simulation, frontend);

        let plan = self.scheduler.advance(
            time.elapsed,
            &mut TrainStepper {
                simulation: &mut *simulation,
                cab: &self.cab,
            },
        );
        self.camera.advance(time.elapsed);
        simulation.update_scene(time.elapsed, &self.camera);
        for event in self.cab.take_events() {
            simulation.handle_cab_event(event);
        }
        self.messages
            .prune(self.scheduler.clock().seconds_since_midnight());

        self.last_elapsed = time.elapsed;
        self.last_sub_steps = plan.steps;
        self.publish_metrics();
        self.outcome()
    }

    fn spin_frame(
        &mut self,
        real_dt: f64,
        simulation: &mut dyn Simulation,
        frontend: &mut dyn Frontend,
        joysticks: &mut dyn JoystickSource,
    ) -> FrameOutcome {
        self.repeats.tick(real_dt.max(0.0), &mut self.controls);
        self.collect_input(joysticks);
        // Mouse look is frozen outside Normal; motion must not pile up.
        self.mouse.take_target();
        self.process_controls(0.0, simulation, frontend);
        for event in self.cab.take_events() {
            simulation.handle_cab_event(event);
        }
        self.last_elapsed = 0.0;
        self.last_sub_steps = 0;
        self.publish_metrics();
        self.outcome()
    }

    fn collect_input(&mut self, joysticks: &mut dyn JoystickSource) {
        self.joysticks.poll(joysticks, &mut self.events);
        let signals = self.normalizer.process(
            &mut self.events,
            &mut self.controls,
            &mut self.repeats,
            &mut self.mouse,
        );
        if signals.quit {
            self.interaction.request_quit(QuitRequest::Quit);
        }
        if let Some(enabled) = signals.mouse_grab {
            let key = if enabled {
                "notification_mousegrab_on"
            } else {
                "notification_mousegrab_off"
            };
            self.messages.add(
                self.strings.get(key),
                MOUSE_GRAB_MESSAGE_SECONDS,
                self.scheduler.clock().seconds_since_midnight(),
            );
        }
        if let Some((width, height)) = signals.resized {
            self.window_size = Some((width, height));
            self.display
                .timetable
                .set_layout(f64::from(height), self.timetable_height);
        }
    }

    fn process_controls(
        &mut self,
        elapsed: f64,
        simulation: &mut dyn Simulation,
        frontend: &mut dyn Frontend,
    ) {
        let mut context = CommandContext {
            interaction: &mut self.interaction,
            cab: &mut self.cab,
            camera: &mut self.camera,
            display: &mut self.display,
            messages: &mut self.messages,
            clock: self.scheduler.clock_mut(),
            simulation,
            frontend,
            strings: &self.strings,
            game_mode: self.game_mode,
            elapsed,
        };
        self.handlers
            .process_controls(&mut self.controls, &mut context);
    }

    fn outcome(&self) -> FrameOutcome {
        if let Some(request) = self.interaction.quit_request() {
            return FrameOutcome::Quit(request);
        }
        match self.interaction.mode() {
            InteractionMode::Pause => FrameOutcome::Paused,
            InteractionMode::Normal | InteractionMode::Menu => FrameOutcome::Continue,
        }
    }

    fn publish_metrics(&self) {
        self.metrics.publish(self.current_metrics());
    }

    fn current_metrics(&self) -> SimulationMetrics {
        let clock = self.scheduler.clock();
        SimulationMetrics {
            fps: self.fps,
            seconds_since_midnight: clock.seconds_since_midnight(),
            time_factor: clock.time_factor(),
            sub_steps: self.last_sub_steps,
        }
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            mode: self.interaction.mode(),
            menu: self.interaction.menu(),
            cab: &self.cab,
            camera: &self.camera,
            display: &self.display,
            messages: &self.messages,
            clock: self.scheduler.clock(),
            controls: &self.controls,
            strings: &self.strings,
            metrics: self.current_metrics(),
            elapsed: self.last_elapsed,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    pub fn menu(&self) -> Option<&Menu> {
        self.interaction.menu()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    pub fn cab(&self) -> &CabState {
        &self.cab
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn display(&self) -> &DisplayOptions {
        &self.display
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn clock(&self) -> &SimulationClock {
        self.scheduler.clock()
    }

    pub fn metrics_handle(&self) -> MetricsHandle {
        self.metrics.clone()
    }

    pub fn strings(&self) -> &InterfaceStrings {
        &self.strings
    }

    pub fn mouse_grab_enabled(&self) -> bool {
        self.mouse.is_enabled()
    }

    /// Startup options with the settings the driver can change in a session
    /// (currently CPU mode) folded back in.
    pub fn current_options(&self) -> Options {
        Options {
            limit_frame_rate: self.display.limit_frame_rate,
            ..self.options.clone()
        }
    }

    /// Last size reported by a resize event.
    pub fn window_size(&self) -> Option<(u32, u32)> {
        self.window_size
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{RecordingFrontend, RecordingSimulation};
    use super::*;
    use crate::controls::{Command, Control, KeyModifiers};
    use crate::input::{MouseButton, NoJoysticks};
    use crate::interaction::{CabEvent, Horn};

    const KEY_A: i32 = 0x41;
    const KEY_B: i32 = 0x42;
    const KEY_W: i32 = 0x57;
    const KEY_Q: i32 = 0x51;
    const KEY_DOWN: i32 = 0x28;
    const KEY_RETURN: i32 = 0x0D;
    const KEY_PAUSE: i32 = 0x13;
    const KEY_H: i32 = 0x48;

    struct Harness {
        session: Session,
        simulation: RecordingSimulation,
        frontend: RecordingFrontend,
    }

    impl Harness {
        fn new(bindings: &[(Command, i32)]) -> Self {
            Self::with_simulation(bindings, RecordingSimulation::with_route())
        }

        fn with_simulation(bindings: &[(Command, i32)], mut simulation: RecordingSimulation) -> Self {
            let registry = CommandRegistry::builtin();
            let controls = bindings
                .iter()
                .map(|&(command, key)| {
                    Control::keyboard(&registry, command, key, KeyModifiers::empty())
                })
                .collect();
            let setup = SessionSetup {
                registry,
                controls,
                strings: InterfaceStrings::default(),
                options: Options::default(),
                cab: CabSpecs::default(),
                camera_restriction: CameraRestriction::NotAvailable,
                has_custom_timetable: false,
            };
            let session = Session::start(setup, &mut simulation).expect("session");
            Self {
                session,
                simulation,
                frontend: RecordingFrontend::default(),
            }
        }

        fn frame(&mut self, real_dt: f64) -> FrameOutcome {
            self.session.update_frame(
                real_dt,
                &mut self.simulation,
                &mut self.frontend,
                &mut NoJoysticks,
            )
        }

        fn tap(&mut self, key: i32) -> FrameOutcome {
            self.session.push_event(InputEvent::KeyDown {
                key,
                modifiers: KeyModifiers::empty(),
            });
            let outcome = self.frame(0.01);
            self.session.push_event(InputEvent::KeyUp { key });
            outcome
        }
    }

    #[test]
    fn start_fast_forwards_preceding_trains_with_minimal_simulation() {
        let mut simulation = RecordingSimulation::with_route();
        simulation.stations[0].stops_for_others = false;
        simulation.offsets = vec![2.5];
        let harness = Harness::with_simulation(&[], simulation);

        assert_eq!(harness.simulation.minimal, vec![true, false]);
        assert_eq!(harness.simulation.steps.len(), 10);
        assert_eq!(harness.session.clock().seconds_since_midnight(), 1000.0);
        assert_eq!(harness.simulation.signalling, 2);
    }

    #[test]
    fn start_without_gap_does_not_fast_forward() {
        let harness = Harness::new(&[]);
        assert!(harness.simulation.minimal.is_empty());
        assert!(harness.simulation.steps.is_empty());
        assert!(harness.session.clock().has_reached_startup());
    }

    #[test]
    fn pause_toggles_and_stops_physics() {
        let mut harness = Harness::new(&[(Command::MiscPause, KEY_PAUSE)]);

        assert_eq!(harness.tap(KEY_PAUSE), FrameOutcome::Paused);
        assert_eq!(harness.session.mode(), InteractionMode::Pause);
        let steps_before = harness.simulation.steps.len();

        assert_eq!(harness.frame(0.1), FrameOutcome::Paused);
        assert_eq!(harness.frame(0.1), FrameOutcome::Paused);
        assert_eq!(harness.simulation.steps.len(), steps_before);

        assert_eq!(harness.tap(KEY_PAUSE), FrameOutcome::Continue);
        assert_eq!(harness.session.mode(), InteractionMode::Normal);
        harness.frame(0.01);
        assert_eq!(harness.simulation.steps.len(), steps_before + 1);
    }

    #[test]
    fn command_bound_to_two_pressed_keys_fires_once() {
        let mut harness = Harness::new(&[
            (Command::PowerIncrease, KEY_A),
            (Command::PowerIncrease, KEY_B),
        ]);
        for key in [KEY_A, KEY_B] {
            harness.session.push_event(InputEvent::KeyDown {
                key,
                modifiers: KeyModifiers::empty(),
            });
        }
        harness.frame(0.01);
        assert_eq!(harness.session.cab().power_notch(), 1);
        assert_eq!(harness.simulation.power_per_step, vec![1]);
    }

    #[test]
    fn quit_from_confirmation_menu_ends_session() {
        let mut harness = Harness::new(&[
            (Command::MiscQuit, KEY_Q),
            (Command::MenuDown, KEY_DOWN),
            (Command::MenuEnter, KEY_RETURN),
        ]);

        assert_eq!(harness.tap(KEY_Q), FrameOutcome::Continue);
        assert_eq!(harness.session.mode(), InteractionMode::Menu);
        harness.tap(KEY_DOWN);
        assert_eq!(harness.tap(KEY_RETURN), FrameOutcome::Quit(QuitRequest::Quit));
        assert_eq!(harness.frame(0.01), FrameOutcome::Quit(QuitRequest::Quit));
    }

    #[test]
    fn window_close_lets_the_physics_batch_finish() {
        let mut harness = Harness::new(&[]);
        harness.session.push_event(InputEvent::Quit);
        assert_eq!(harness.frame(3.0), FrameOutcome::Quit(QuitRequest::Quit));
        assert_eq!(harness.simulation.steps.len(), 75);
        assert!((harness.session.clock().seconds_since_midnight() - 1003.0).abs() < 1e-9);
    }

    #[test]
    fn analog_camera_controls_are_inert_while_paused() {
        let mut harness = Harness::new(&[
            (Command::MiscPause, KEY_PAUSE),
            (Command::CameraMoveForward, KEY_W),
        ]);
        harness.session.push_event(InputEvent::KeyDown {
            key: KEY_W,
            modifiers: KeyModifiers::empty(),
        });
        harness.frame(0.01);
        assert!(harness.session.camera().direction().z > 0.0);

        harness.tap(KEY_PAUSE);
        let alignment = *harness.session.camera().alignment();
        let steps = harness.simulation.steps.len();
        for _ in 0..5 {
            assert_eq!(harness.frame(0.1), FrameOutcome::Paused);
        }
        assert_eq!(harness.session.camera().alignment(), &alignment);
        assert_eq!(harness.simulation.steps.len(), steps);
    }

    #[test]
    fn long_frame_is_split_into_sub_steps_and_published() {
        let mut harness = Harness::new(&[]);
        harness.frame(3.0);
        let metrics = harness.session.metrics_handle().snapshot();
        assert_eq!(metrics.sub_steps, 75);
        assert_eq!(metrics.time_factor, 1);
        assert!((metrics.seconds_since_midnight - 1003.0).abs() < 1e-9);
        assert_eq!(harness.simulation.scene_updates, vec![3.0]);
    }

    #[test]
    fn signalling_runs_once_per_simulated_second() {
        let mut harness = Harness::new(&[]);
        for _ in 0..4 {
            harness.frame(0.5);
        }
        assert_eq!(harness.simulation.signalling, 2);
    }

    #[test]
    fn cab_events_reach_the_simulation() {
        let mut harness = Harness::new(&[(Command::HornPrimary, KEY_H)]);
        harness.tap(KEY_H);
        assert_eq!(
            harness.simulation.cab_events,
            vec![CabEvent::HornBlown(Horn::Primary)]
        );
    }

    #[test]
    fn messages_expire_with_simulated_time() {
        let mut harness = Harness::new(&[(Command::CameraExterior, KEY_A)]);
        harness.tap(KEY_A);
        assert_eq!(harness.session.messages().len(), 1);
        harness.frame(3.0);
        assert!(harness.session.messages().is_empty());
    }

    #[test]
    fn render_frame_reports_current_mode() {
        let mut harness = Harness::new(&[(Command::MiscPause, KEY_PAUSE)]);
        harness.session.render_frame(&mut harness.frontend);
        harness.tap(KEY_PAUSE);
        harness.session.render_frame(&mut harness.frontend);
        assert_eq!(
            harness.frontend.rendered_modes,
            vec![InteractionMode::Normal, InteractionMode::Pause]
        );
    }

    #[test]
    fn holding_a_key_repeats_after_the_delay() {
        let mut harness = Harness::new(&[(Command::PowerIncrease, KEY_A)]);
        harness.session.push_event(InputEvent::KeyDown {
            key: KEY_A,
            modifiers: KeyModifiers::empty(),
        });
        harness.frame(0.125);
        assert_eq!(harness.session.cab().power_notch(), 1);

        for _ in 0..3 {
            harness.frame(0.125);
        }
        assert_eq!(harness.session.cab().power_notch(), 1);

        harness.frame(0.125);
        assert_eq!(harness.session.cab().power_notch(), 2);
        harness.frame(0.125);
        harness.frame(0.125);
        assert_eq!(harness.session.cab().power_notch(), 4);
    }

    #[test]
    fn mouse_grab_toggle_posts_a_notification() {
        let mut harness = Harness::new(&[]);
        harness.session.push_event(InputEvent::MouseButtonDown {
            button: MouseButton::Right,
        });
        harness.frame(0.01);
        assert!(harness.session.mouse_grab_enabled());
        let texts = harness
            .session
            .messages()
            .iter()
            .map(|message| message.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["notification_mousegrab_on"]);

        harness.session.push_event(InputEvent::MouseButtonDown {
            button: MouseButton::Right,
        });
        harness.frame(0.01);
        assert!(!harness.session.mouse_grab_enabled());
        assert!(harness
            .session
            .messages()
            .iter()
            .any(|message| message.text == "notification_mousegrab_off"));

        harness.frame(6.0);
        assert!(harness.session.messages().is_empty());
    }

    #[test]
    fn mouse_motion_while_paused_is_discarded() {
        let mut harness = Harness::new(&[(Command::MiscPause, KEY_PAUSE)]);
        harness.session.push_event(InputEvent::MouseButtonDown {
            button: MouseButton::Right,
        });
        harness.session.push_event(InputEvent::MouseMotion { dx: 5.0, dy: 0.0 });
        harness.frame(0.01);
        harness.session.push_event(InputEvent::MouseMotion { dx: 4.0, dy: 0.0 });
        harness.frame(0.01);
        assert!(harness.session.camera().direction().yaw > 0.0);

        harness.tap(KEY_PAUSE);
        assert_eq!(harness.session.mode(), InteractionMode::Pause);
        harness.session.push_event(InputEvent::MouseMotion { dx: 40.0, dy: 0.0 });
        assert_eq!(harness.frame(0.1), FrameOutcome::Paused);
        harness.tap(KEY_PAUSE);
        assert_eq!(harness.session.mode(), InteractionMode::Normal);

        harness.frame(0.01);
        assert_eq!(harness.session.camera().direction().yaw, 0.0);
    }

    #[test]
    fn current_options_reflect_cpu_mode_toggle() {
        let mut harness = Harness::new(&[(Command::MiscCpuMode, KEY_A)]);
        assert!(!harness.session.current_options().limit_frame_rate);
        harness.tap(KEY_A);
        let options = harness.session.current_options();
        assert!(options.limit_frame_rate);
        assert_eq!(options.key_repeat_delay, Options::default().key_repeat_delay);
    }

    #[test]
    fn resize_events_are_remembered() {
        let mut harness = Harness::new(&[]);
        harness.session.push_event(InputEvent::Resize {
            width: 1280,
            height: 720,
        });
        harness.frame(0.01);
        assert_eq!(harness.session.window_size(), Some((1280, 720)));
    }
}
