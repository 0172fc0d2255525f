use crate::config::GameMode;
use crate::controls::Command;

use super::cab::{DoorSide, Horn, SecurityKey};
use super::dispatch::{Activation, CommandContext, HandlerTable, RegisterError};
use super::menu::{Menu, MenuOutcome};
use super::mode::{InteractionMode, QuitRequest};

const VIEW_MESSAGE_SECONDS: f64 = 2.0;
const EXPERT_MESSAGE_SECONDS: f64 = 5.0;
const TIME_FACTOR_MESSAGE_SECONDS: f64 = 5.0;

type PressedFn = fn(&mut CommandContext<'_>);
type AnalogFn = fn(&mut CommandContext<'_>, f64);

impl HandlerTable {
    pub fn with_builtins() -> Result<Self, RegisterError> {
        let mut table = Self::new();
        register_every_mode(&mut table)?;
        register_normal_mode(&mut table)?;
        register_pause_mode(&mut table)?;
        register_menu_mode(&mut table)?;
        Ok(table)
    }
}

fn on_pressed(
    table: &mut HandlerTable,
    mode: InteractionMode,
    command: Command,
    handler: PressedFn,
) -> Result<(), RegisterError> {
    table.register(mode, command, move |context, activation| {
        if activation == Activation::Pressed {
            handler(context);
        }
    })
}

fn on_analog(
    table: &mut HandlerTable,
    command: Command,
    handler: AnalogFn,
) -> Result<(), RegisterError> {
    table.register(InteractionMode::Normal, command, move |context, activation| {
        if let Activation::Analog(value) = activation {
            handler(context, value);
        }
    })
}

fn register_every_mode(table: &mut HandlerTable) -> Result<(), RegisterError> {
    for mode in InteractionMode::ALL {
        on_pressed(table, mode, Command::MiscFullscreen, |context| {
            context.frontend.toggle_fullscreen();
        })?;
        on_pressed(table, mode, Command::MiscMute, |context| {
            context.display.muted = !context.display.muted;
            context.frontend.set_muted(context.display.muted);
        })?;
    }
    Ok(())
}

fn register_pause_mode(table: &mut HandlerTable) -> Result<(), RegisterError> {
    let pause = InteractionMode::Pause;
    on_pressed(table, pause, Command::MiscPause, |context| {
        context.interaction.set_mode(InteractionMode::Normal);
    })?;
    on_pressed(table, pause, Command::MenuActivate, open_root_menu)?;
    on_pressed(table, pause, Command::MiscQuit, open_quit_menu)?;
    Ok(())
}

fn register_menu_mode(table: &mut HandlerTable) -> Result<(), RegisterError> {
    let menu = InteractionMode::Menu;
    on_pressed(table, menu, Command::MenuUp, |context| {
        if let Some(menu) = context.interaction.menu_mut() {
            menu.move_up();
        }
    })?;
    on_pressed(table, menu, Command::MenuDown, |context| {
        if let Some(menu) = context.interaction.menu_mut() {
            menu.move_down();
        }
    })?;
    on_pressed(table, menu, Command::MenuEnter, |context| {
        let next_stop = context.simulation.next_stop_station();
        let outcome = context
            .interaction
            .menu_mut()
            .map(|menu| menu.enter(next_stop));
        if let Some(outcome) = outcome {
            apply_menu_outcome(context, outcome);
        }
    })?;
    on_pressed(table, menu, Command::MenuBack, |context| {
        let outcome = context.interaction.menu_mut().map(|menu| menu.back());
        if let Some(outcome) = outcome {
            apply_menu_outcome(context, outcome);
        }
    })?;
    Ok(())
}

fn apply_menu_outcome(context: &mut CommandContext<'_>, outcome: MenuOutcome) {
    match outcome {
        MenuOutcome::Stay => {}
        MenuOutcome::Close => context.interaction.set_mode(InteractionMode::Normal),
        MenuOutcome::JumpToStation(station) => {
            context.simulation.jump_to_station(station);
            context.interaction.set_mode(InteractionMode::Normal);
        }
        MenuOutcome::ExitToMainMenu => context.interaction.request_quit(QuitRequest::ExitToMainMenu),
        MenuOutcome::Quit => context.interaction.request_quit(QuitRequest::Quit),
    }
}

fn open_root_menu(context: &mut CommandContext<'_>) {
    let jump_available = context.game_mode != GameMode::Expert;
    let menu = Menu::root(context.strings, context.simulation.stations(), jump_available);
    context.interaction.open_menu(menu);
}

fn open_quit_menu(context: &mut CommandContext<'_>) {
    let menu = Menu::quit_confirmation(context.strings);
    context.interaction.open_menu(menu);
}

/// Shows the expert-mode notice and returns true when `Expert` forbids the
/// command.
fn blocked_in_expert(context: &mut CommandContext<'_>) -> bool {
    if context.game_mode == GameMode::Expert {
        context.notify("notification_notavailableexpert", EXPERT_MESSAGE_SECONDS);
        true
    } else {
        false
    }
}

fn register_normal_mode(table: &mut HandlerTable) -> Result<(), RegisterError> {
    register_normal_interaction(table)?;
    register_cab(table)?;
    register_camera(table)?;
    register_display(table)?;
    Ok(())
}

fn register_normal_interaction(table: &mut HandlerTable) -> Result<(), RegisterError> {
    let normal = InteractionMode::Normal;
    on_pressed(table, normal, Command::MiscPause, |context| {
        context.interaction.set_mode(InteractionMode::Pause);
    })?;
    on_pressed(table, normal, Command::MenuActivate, open_root_menu)?;
    on_pressed(table, normal, Command::MiscQuit, open_quit_menu)?;
    Ok(())
}

fn register_cab(table: &mut HandlerTable) -> Result<(), RegisterError> {
    let normal = InteractionMode::Normal;

    on_analog(table, Command::PowerHalfAxis, |context, value| {
        context.cab.power_axis(value, false);
    })?;
    on_analog(table, Command::PowerFullAxis, |context, value| {
        context.cab.power_axis(value, true);
    })?;
    on_analog(table, Command::BrakeHalfAxis, |context, value| {
        context.cab.brake_axis(value, false);
    })?;
    on_analog(table, Command::BrakeFullAxis, |context, value| {
        context.cab.brake_axis(value, true);
    })?;
    on_analog(table, Command::SingleFullAxis, |context, value| {
        context.cab.single_axis(value);
    })?;
    on_analog(table, Command::ReverserFullAxis, |context, value| {
        context.cab.reverser_axis(value);
    })?;

    on_pressed(table, normal, Command::PowerIncrease, |context| context.cab.power_increase())?;
    on_pressed(table, normal, Command::PowerDecrease, |context| context.cab.power_decrease())?;
    on_pressed(table, normal, Command::BrakeIncrease, |context| context.cab.brake_increase())?;
    on_pressed(table, normal, Command::BrakeDecrease, |context| context.cab.brake_decrease())?;
    on_pressed(table, normal, Command::BrakeEmergency, |context| context.cab.brake_emergency())?;
    on_pressed(table, normal, Command::SinglePower, |context| context.cab.single_power())?;
    on_pressed(table, normal, Command::SingleNeutral, |context| context.cab.single_neutral())?;
    on_pressed(table, normal, Command::SingleBrake, |context| context.cab.single_brake())?;
    on_pressed(table, normal, Command::SingleEmergency, |context| {
        context.cab.single_emergency();
    })?;
    on_pressed(table, normal, Command::ReverserForward, |context| {
        context.cab.reverser_forward();
    })?;
    on_pressed(table, normal, Command::ReverserBackward, |context| {
        context.cab.reverser_backward();
    })?;
    on_pressed(table, normal, Command::DeviceConstSpeed, |context| {
        context.cab.toggle_const_speed();
    })?;
    on_pressed(table, normal, Command::DoorsLeft, |context| {
        context.cab.toggle_doors(DoorSide::Left);
    })?;
    on_pressed(table, normal, Command::DoorsRight, |context| {
        context.cab.toggle_doors(DoorSide::Right);
    })?;
    on_pressed(table, normal, Command::HornPrimary, |context| {
        context.cab.blow_horn(Horn::Primary);
    })?;
    on_pressed(table, normal, Command::HornSecondary, |context| {
        context.cab.blow_horn(Horn::Secondary);
    })?;
    on_pressed(table, normal, Command::HornMusic, |context| {
        context.cab.blow_horn(Horn::Music);
    })?;
    on_pressed(table, normal, Command::MiscAi, |context| {
        if !blocked_in_expert(context) {
            context.cab.toggle_ai_driver();
        }
    })?;

    let security_keys = [
        (Command::SecurityS, SecurityKey::S),
        (Command::SecurityA1, SecurityKey::A1),
        (Command::SecurityA2, SecurityKey::A2),
        (Command::SecurityB1, SecurityKey::B1),
        (Command::SecurityB2, SecurityKey::B2),
        (Command::SecurityC1, SecurityKey::C1),
        (Command::SecurityC2, SecurityKey::C2),
        (Command::SecurityD, SecurityKey::D),
        (Command::SecurityE, SecurityKey::E),
        (Command::SecurityF, SecurityKey::F),
        (Command::SecurityG, SecurityKey::G),
        (Command::SecurityH, SecurityKey::H),
        (Command::SecurityI, SecurityKey::I),
        (Command::SecurityJ, SecurityKey::J),
        (Command::SecurityK, SecurityKey::K),
        (Command::SecurityL, SecurityKey::L),
    ];
    for (command, key) in security_keys {
        table
            .register(normal, command, move |context, activation| match activation {
                Activation::Pressed => context.cab.security_key(key, true),
                Activation::Released => context.cab.security_key(key, false),
                Activation::Analog(_) => {}
            })?;
    }
    Ok(())
}

fn register_camera(table: &mut HandlerTable) -> Result<(), RegisterError> {
    let normal = InteractionMode::Normal;

    on_pressed(table, normal, Command::CameraInterior, |context| {
        let key = context.camera.select_interior();
        context.notify(key, VIEW_MESSAGE_SECONDS);
    })?;
    on_pressed(table, normal, Command::CameraExterior, |context| {
        let key = context.camera.select_exterior();
        context.notify(key, VIEW_MESSAGE_SECONDS);
    })?;
    on_pressed(table, normal, Command::CameraTrack, |context| {
        let position = context.simulation.player_track_position();
        let key = context.camera.select_track(position);
        context.notify(key, VIEW_MESSAGE_SECONDS);
    })?;
    on_pressed(table, normal, Command::CameraFlyBy, |context| {
        let key = context.camera.select_fly_by();
        context.notify(key, VIEW_MESSAGE_SECONDS);
    })?;
    on_pressed(table, normal, Command::CameraPreviousPoi, |context| {
        let points = context.simulation.points_of_interest();
        if let Some(key) = context.camera.jump_to_point_of_interest(points, false) {
            context.notify(key, VIEW_MESSAGE_SECONDS);
        }
    })?;
    on_pressed(table, normal, Command::CameraNextPoi, |context| {
        let points = context.simulation.points_of_interest();
        if let Some(key) = context.camera.jump_to_point_of_interest(points, true) {
            context.notify(key, VIEW_MESSAGE_SECONDS);
        }
    })?;
    on_pressed(table, normal, Command::CameraReset, |context| {
        let position = context.simulation.player_track_position();
        let speed = context.simulation.player_speed();
        context.camera.reset(position, speed);
    })?;
    on_pressed(table, normal, Command::CameraRestriction, |context| {
        if let Some(key) = context.camera.toggle_restriction() {
            context.notify(key, VIEW_MESSAGE_SECONDS);
        }
    })?;

    on_analog(table, Command::CameraMoveForward, |context, value| {
        context.camera.move_longitudinal(value);
    })?;
    on_analog(table, Command::CameraMoveBackward, |context, value| {
        context.camera.move_longitudinal(-value);
    })?;
    on_analog(table, Command::CameraMoveLeft, |context, value| {
        context.camera.move_lateral(-value);
    })?;
    on_analog(table, Command::CameraMoveRight, |context, value| {
        context.camera.move_lateral(value);
    })?;
    on_analog(table, Command::CameraMoveUp, |context, value| {
        context.camera.move_vertical(value);
    })?;
    on_analog(table, Command::CameraMoveDown, |context, value| {
        context.camera.move_vertical(-value);
    })?;
    on_analog(table, Command::CameraRotateLeft, |context, value| {
        context.camera.rotate_yaw(-value);
    })?;
    on_analog(table, Command::CameraRotateRight, |context, value| {
        context.camera.rotate_yaw(value);
    })?;
    on_analog(table, Command::CameraRotateUp, |context, value| {
        context.camera.rotate_pitch(value);
    })?;
    on_analog(table, Command::CameraRotateDown, |context, value| {
        context.camera.rotate_pitch(-value);
    })?;
    on_analog(table, Command::CameraRotateCcw, |context, value| {
        context.camera.rotate_roll(-value);
    })?;
    on_analog(table, Command::CameraRotateCw, |context, value| {
        context.camera.rotate_roll(value);
    })?;
    on_analog(table, Command::CameraZoomIn, |context, value| {
        if context.elapsed > 0.0 {
            context.camera.zoom(-value);
        }
    })?;
    on_analog(table, Command::CameraZoomOut, |context, value| {
        if context.elapsed > 0.0 {
            context.camera.zoom(value);
        }
    })?;
    Ok(())
}

fn register_display(table: &mut HandlerTable) -> Result<(), RegisterError> {
    let normal = InteractionMode::Normal;

    on_pressed(table, normal, Command::TimetableToggle, |context| {
        context.display.timetable.toggle();
    })?;
    on_analog(table, Command::TimetableUp, |context, value| {
        if context.elapsed > 0.0 {
            context.display.timetable.scroll_up(value, context.elapsed);
        }
    })?;
    on_analog(table, Command::TimetableDown, |context, value| {
        if context.elapsed > 0.0 {
            context.display.timetable.scroll_down(value, context.elapsed);
        }
    })?;

    on_pressed(table, normal, Command::DebugWireframe, |context| {
        context.display.wireframe = !context.display.wireframe;
    })?;
    on_pressed(table, normal, Command::DebugNormals, |context| {
        context.display.normals = !context.display.normals;
    })?;
    on_pressed(table, normal, Command::DebugBrakeSystems, |context| {
        if !blocked_in_expert(context) {
            context.display.brake_systems = !context.display.brake_systems;
        }
    })?;
    on_pressed(table, normal, Command::MiscInterfaceMode, |context| {
        let game_mode = context.game_mode;
        context.display.cycle_interface_mode(game_mode);
    })?;
    on_pressed(table, normal, Command::MiscBackfaceCulling, |context| {
        context.display.backface_culling = !context.display.backface_culling;
        let key = if context.display.backface_culling {
            "notification_backfaceculling_on"
        } else {
            "notification_backfaceculling_off"
        };
        context.notify(key, VIEW_MESSAGE_SECONDS);
    })?;
    on_pressed(table, normal, Command::MiscCpuMode, |context| {
        context.display.limit_frame_rate = !context.display.limit_frame_rate;
        let key = if context.display.limit_frame_rate {
            "notification_cpu_low"
        } else {
            "notification_cpu_normal"
        };
        context.notify(key, VIEW_MESSAGE_SECONDS);
    })?;
    on_pressed(table, normal, Command::MiscClock, |context| {
        context.display.clock = !context.display.clock;
    })?;
    on_pressed(table, normal, Command::MiscSpeed, |context| {
        if !blocked_in_expert(context) {
            context.display.cycle_speed();
        }
    })?;
    on_pressed(table, normal, Command::MiscFps, |context| {
        context.display.frame_rates = !context.display.frame_rates;
    })?;
    on_pressed(table, normal, Command::MiscTimeFactor, |context| {
        if blocked_in_expert(context) {
            return;
        }
        let factor = context.clock.toggle_time_factor();
        let now = context.clock.seconds_since_midnight();
        let duration = TIME_FACTOR_MESSAGE_SECONDS * f64::from(factor);
        context.messages.add(format!("{factor}x"), duration, now);
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{CommandRegistry, InterfaceStrings};
    use crate::interaction::{
        AirBrakeHandle, CabEvent, CabSpecs, CabState, CameraState, CameraViewMode,
        DisplayOptions, InteractionState, MessageLog,
    };
    use crate::session::test_support::{RecordingFrontend, RecordingSimulation};
    use crate::sim::{SimulationClock, ACCELERATED_TIME_FACTOR, NORMAL_TIME_FACTOR};

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
        game_mode: GameMode,
        table: HandlerTable,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                interaction: InteractionState::default(),
                cab: CabState::new(CabSpecs::default()),
                camera: CameraState::default(),
                display: DisplayOptions::default(),
                messages: MessageLog::default(),
                clock: SimulationClock::new(1000.0, 1000.0),
                simulation: RecordingSimulation::with_route(),
                frontend: RecordingFrontend::default(),
                strings: InterfaceStrings::default(),
                game_mode: GameMode::Normal,
                table: HandlerTable::with_builtins().expect("builtins"),
            }
        }

        fn fire(&mut self, command: Command, activation: Activation, elapsed: f64) {
            let mode = self.interaction.mode();
            let mut context = CommandContext {
                interaction: &mut self.interaction,
                cab: &mut self.cab,
                camera: &mut self.camera,
                display: &mut self.display,
                messages: &mut self.messages,
                clock: &mut self.clock,
                simulation: &mut self.simulation,
                frontend: &mut self.frontend,
                strings: &self.strings,
                game_mode: self.game_mode,
                elapsed,
            };
            self.table.invoke(mode, command, &mut context, activation);
        }

        fn press(&mut self, command: Command) {
            self.fire(command, Activation::Pressed, 0.0);
        }

        fn message_texts(&self) -> Vec<String> {
            self.messages.iter().map(|message| message.text.clone()).collect()
        }
    }

    #[test]
    fn every_command_has_a_handler() {
        let registry = CommandRegistry::builtin();
        let table = HandlerTable::with_builtins().expect("builtins");
        for info in registry.iter() {
            let menu_only = matches!(
                info.command,
                Command::MenuUp | Command::MenuDown | Command::MenuEnter | Command::MenuBack
            );
            if menu_only {
                assert!(table.contains(InteractionMode::Menu, info.command));
                continue;
            }
            assert!(
                table.contains(InteractionMode::Normal, info.command),
                "missing handler for {}",
                info.name
            );
        }
    }

    #[test]
    fn pause_menu_and_normal_share_fullscreen_and_mute() {
        let mut fixture = Fixture::new();
        for mode in InteractionMode::ALL {
            fixture.interaction.set_mode(mode);
            fixture.press(Command::MiscFullscreen);
            fixture.press(Command::MiscMute);
        }
        assert_eq!(fixture.frontend.fullscreen_toggles, 3);
        assert_eq!(fixture.frontend.muted, vec![true, false, true]);
    }

    #[test]
    fn pause_toggles_and_menu_opens_from_pause() {
        let mut fixture = Fixture::new();
        fixture.press(Command::MiscPause);
        assert_eq!(fixture.interaction.mode(), InteractionMode::Pause);
        fixture.press(Command::PowerIncrease);
        assert_eq!(fixture.cab.power_notch(), 0);
        fixture.press(Command::MenuActivate);
        assert_eq!(fixture.interaction.mode(), InteractionMode::Menu);
        fixture.press(Command::MenuBack);
        assert_eq!(fixture.interaction.mode(), InteractionMode::Normal);
    }

    #[test]
    fn quit_confirmation_requests_quit() {
        let mut fixture = Fixture::new();
        fixture.press(Command::MiscQuit);
        assert_eq!(fixture.interaction.mode(), InteractionMode::Menu);
        fixture.press(Command::MenuDown);
        fixture.press(Command::MenuEnter);
        assert_eq!(fixture.interaction.quit_request(), Some(QuitRequest::Quit));
    }

    #[test]
    fn jump_entry_moves_train_and_resumes() {
        let mut fixture = Fixture::new();
        fixture.press(Command::MenuActivate);
        fixture.press(Command::MenuDown);
        fixture.press(Command::MenuEnter);
        fixture.press(Command::MenuEnter);
        assert_eq!(fixture.simulation.jumps, vec![2]);
        assert_eq!(fixture.interaction.mode(), InteractionMode::Normal);
    }

    #[test]
    fn expert_mode_hides_jump_menu_and_blocks_time_factor() {
        let mut fixture = Fixture::new();
        fixture.game_mode = GameMode::Expert;
        fixture.press(Command::MenuActivate);
        let texts: Vec<String> = fixture
            .interaction
            .menu()
            .map(|menu| menu.entries().iter().map(|entry| entry.text().to_string()).collect())
            .unwrap_or_default();
        assert!(!texts.iter().any(|text| text == "menu_jump"));

        fixture.interaction.set_mode(InteractionMode::Normal);
        fixture.press(Command::MiscTimeFactor);
        assert_eq!(fixture.clock.time_factor(), NORMAL_TIME_FACTOR);
        assert_eq!(fixture.message_texts(), vec!["notification_notavailableexpert"]);
    }

    #[test]
    fn time_factor_message_lasts_five_seconds_per_factor() {
        let mut fixture = Fixture::new();
        fixture.press(Command::MiscTimeFactor);
        assert_eq!(fixture.clock.time_factor(), ACCELERATED_TIME_FACTOR);
        let message = fixture.messages.iter().next().cloned().expect("message");
        assert_eq!(message.text, "5x");
        assert_eq!(message.expires_at, 1025.0);
    }

    #[test]
    fn camera_commands_post_notifications() {
        let mut fixture = Fixture::new();
        fixture.press(Command::CameraExterior);
        fixture.press(Command::CameraFlyBy);
        fixture.press(Command::CameraFlyBy);
        assert_eq!(fixture.camera.mode(), CameraViewMode::FlyByZooming);
        assert_eq!(
            fixture.message_texts(),
            vec![
                "notification_exterior",
                "notification_flybynormal",
                "notification_flybyzooming",
            ]
        );
    }

    #[test]
    fn zoom_needs_elapsed_time() {
        let mut fixture = Fixture::new();
        fixture.fire(Command::CameraZoomIn, Activation::Analog(1.0), 0.0);
        assert_eq!(fixture.camera.direction().zoom, 0.0);
        fixture.fire(Command::CameraZoomIn, Activation::Analog(1.0), 0.1);
        assert!(fixture.camera.direction().zoom < 0.0);
    }

    #[test]
    fn security_keys_report_both_edges() {
        let mut fixture = Fixture::new();
        fixture.fire(Command::SecurityS, Activation::Pressed, 0.0);
        fixture.fire(Command::SecurityS, Activation::Released, 0.0);
        assert_eq!(
            fixture.cab.take_events(),
            vec![
                CabEvent::SecurityKeyDown(SecurityKey::S),
                CabEvent::SecurityKeyUp(SecurityKey::S),
            ]
        );
    }

    #[test]
    fn digital_handlers_ignore_release_edges() {
        let mut fixture = Fixture::new();
        fixture.fire(Command::PowerIncrease, Activation::Released, 0.0);
        assert_eq!(fixture.cab.power_notch(), 0);
        fixture.press(Command::PowerIncrease);
        assert_eq!(fixture.cab.power_notch(), 1);
        fixture.press(Command::BrakeIncrease);
        assert_eq!(fixture.cab.air_brake(), AirBrakeHandle::Release);
        assert_eq!(fixture.cab.brake_notch(), 1);
    }

    #[test]
    fn cpu_mode_and_backface_culling_notify_new_state() {
        let mut fixture = Fixture::new();
        fixture.press(Command::MiscCpuMode);
        fixture.press(Command::MiscBackfaceCulling);
        assert!(fixture.display.limit_frame_rate);
        assert_eq!(
            fixture.message_texts(),
            vec!["notification_cpu_low", "notification_backfaceculling_on"]
        );
    }
}
