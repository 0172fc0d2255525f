use std::collections::HashMap;

use super::strings::InterfaceStrings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    PowerIncrease,
    PowerDecrease,
    PowerHalfAxis,
    PowerFullAxis,
    BrakeDecrease,
    BrakeIncrease,
    BrakeHalfAxis,
    BrakeFullAxis,
    BrakeEmergency,
    SinglePower,
    SingleNeutral,
    SingleBrake,
    SingleEmergency,
    SingleFullAxis,
    ReverserForward,
    ReverserBackward,
    ReverserFullAxis,
    DoorsLeft,
    DoorsRight,
    HornPrimary,
    HornSecondary,
    HornMusic,
    DeviceConstSpeed,
    SecurityS,
    SecurityA1,
    SecurityA2,
    SecurityB1,
    SecurityB2,
    SecurityC1,
    SecurityC2,
    SecurityD,
    SecurityE,
    SecurityF,
    SecurityG,
    SecurityH,
    SecurityI,
    SecurityJ,
    SecurityK,
    SecurityL,
    CameraInterior,
    CameraExterior,
    CameraTrack,
    CameraFlyBy,
    CameraMoveForward,
    CameraMoveBackward,
    CameraMoveLeft,
    CameraMoveRight,
    CameraMoveUp,
    CameraMoveDown,
    CameraRotateLeft,
    CameraRotateRight,
    CameraRotateUp,
    CameraRotateDown,
    CameraRotateCcw,
    CameraRotateCw,
    CameraZoomIn,
    CameraZoomOut,
    CameraPreviousPoi,
    CameraNextPoi,
    CameraReset,
    CameraRestriction,
    TimetableToggle,
    TimetableUp,
    TimetableDown,
    MenuActivate,
    MenuUp,
    MenuDown,
    MenuEnter,
    MenuBack,
    MiscClock,
    MiscSpeed,
    MiscFps,
    MiscAi,
    MiscFullscreen,
    MiscMute,
    MiscPause,
    MiscTimeFactor,
    MiscQuit,
    MiscInterfaceMode,
    MiscBackfaceCulling,
    MiscCpuMode,
    DebugWireframe,
    DebugNormals,
    DebugBrakeSystems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Digital,
    AnalogHalf,
    AnalogFull,
}

impl CommandKind {
    pub fn is_analog(self) -> bool {
        matches!(self, Self::AnalogHalf | Self::AnalogFull)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub command: Command,
    pub kind: CommandKind,
    pub name: &'static str,
    pub description: String,
}

use Command as C;
use CommandKind::{AnalogFull as Full, AnalogHalf as Half, Digital as Dig};

const BUILTIN_COMMANDS: &[(Command, CommandKind, &str, &str)] = &[
    (C::PowerIncrease, Dig, "POWER_INCREASE", "Increases the power notch"),
    (C::PowerDecrease, Dig, "POWER_DECREASE", "Decreases the power notch"),
    (C::PowerHalfAxis, Half, "POWER_HALFAXIS", "Controls power on a half axis"),
    (C::PowerFullAxis, Full, "POWER_FULLAXIS", "Controls power on a full axis"),
    (C::BrakeDecrease, Dig, "BRAKE_DECREASE", "Decreases the brake notch"),
    (C::BrakeIncrease, Dig, "BRAKE_INCREASE", "Increases the brake notch"),
    (C::BrakeHalfAxis, Half, "BRAKE_HALFAXIS", "Controls the brake on a half axis"),
    (C::BrakeFullAxis, Full, "BRAKE_FULLAXIS", "Controls the brake on a full axis"),
    (C::BrakeEmergency, Dig, "BRAKE_EMERGENCY", "Applies the emergency brake"),
    (C::SinglePower, Dig, "SINGLE_POWER", "Moves the single handle toward power"),
    (C::SingleNeutral, Dig, "SINGLE_NEUTRAL", "Moves the single handle toward neutral"),
    (C::SingleBrake, Dig, "SINGLE_BRAKE", "Moves the single handle toward brake"),
    (C::SingleEmergency, Dig, "SINGLE_EMERGENCY", "Moves the single handle to emergency"),
    (C::SingleFullAxis, Full, "SINGLE_FULLAXIS", "Controls the single handle on a full axis"),
    (C::ReverserForward, Dig, "REVERSER_FORWARD", "Moves the reverser forward"),
    (C::ReverserBackward, Dig, "REVERSER_BACKWARD", "Moves the reverser backward"),
    (C::ReverserFullAxis, Full, "REVERSER_FULLAXIS", "Controls the reverser on a full axis"),
    (C::DoorsLeft, Dig, "DOORS_LEFT", "Opens or closes the left doors"),
    (C::DoorsRight, Dig, "DOORS_RIGHT", "Opens or closes the right doors"),
    (C::HornPrimary, Dig, "HORN_PRIMARY", "Sounds the primary horn"),
    (C::HornSecondary, Dig, "HORN_SECONDARY", "Sounds the secondary horn"),
    (C::HornMusic, Dig, "HORN_MUSIC", "Toggles the music horn"),
    (C::DeviceConstSpeed, Dig, "DEVICE_CONSTSPEED", "Toggles constant speed control"),
    (C::SecurityS, Dig, "SECURITY_S", "Safety system key S"),
    (C::SecurityA1, Dig, "SECURITY_A1", "Safety system key A1"),
    (C::SecurityA2, Dig, "SECURITY_A2", "Safety system key A2"),
    (C::SecurityB1, Dig, "SECURITY_B1", "Safety system key B1"),
    (C::SecurityB2, Dig, "SECURITY_B2", "Safety system key B2"),
    (C::SecurityC1, Dig, "SECURITY_C1", "Safety system key C1"),
    (C::SecurityC2, Dig, "SECURITY_C2", "Safety system key C2"),
    (C::SecurityD, Dig, "SECURITY_D", "Safety system key D"),
    (C::SecurityE, Dig, "SECURITY_E", "Safety system key E"),
    (C::SecurityF, Dig, "SECURITY_F", "Safety system key F"),
    (C::SecurityG, Dig, "SECURITY_G", "Safety system key G"),
    (C::SecurityH, Dig, "SECURITY_H", "Safety system key H"),
    (C::SecurityI, Dig, "SECURITY_I", "Safety system key I"),
    (C::SecurityJ, Dig, "SECURITY_J", "Safety system key J"),
    (C::SecurityK, Dig, "SECURITY_K", "Safety system key K"),
    (C::SecurityL, Dig, "SECURITY_L", "Safety system key L"),
    (C::CameraInterior, Dig, "CAMERA_INTERIOR", "Switches to the interior view"),
    (C::CameraExterior, Dig, "CAMERA_EXTERIOR", "Switches to the exterior view"),
    (C::CameraTrack, Dig, "CAMERA_TRACK", "Switches to the track view"),
    (C::CameraFlyBy, Dig, "CAMERA_FLYBY", "Switches between fly-by views"),
    (C::CameraMoveForward, Half, "CAMERA_MOVE_FORWARD", "Moves the camera forward"),
    (C::CameraMoveBackward, Half, "CAMERA_MOVE_BACKWARD", "Moves the camera backward"),
    (C::CameraMoveLeft, Half, "CAMERA_MOVE_LEFT", "Moves the camera left"),
    (C::CameraMoveRight, Half, "CAMERA_MOVE_RIGHT", "Moves the camera right"),
    (C::CameraMoveUp, Half, "CAMERA_MOVE_UP", "Moves the camera up"),
    (C::CameraMoveDown, Half, "CAMERA_MOVE_DOWN", "Moves the camera down"),
    (C::CameraRotateLeft, Half, "CAMERA_ROTATE_LEFT", "Rotates the camera left"),
    (C::CameraRotateRight, Half, "CAMERA_ROTATE_RIGHT", "Rotates the camera right"),
    (C::CameraRotateUp, Half, "CAMERA_ROTATE_UP", "Rotates the camera up"),
    (C::CameraRotateDown, Half, "CAMERA_ROTATE_DOWN", "Rotates the camera down"),
    (C::CameraRotateCcw, Half, "CAMERA_ROTATE_CCW", "Rolls the camera counter-clockwise"),
    (C::CameraRotateCw, Half, "CAMERA_ROTATE_CW", "Rolls the camera clockwise"),
    (C::CameraZoomIn, Half, "CAMERA_ZOOM_IN", "Zooms the camera in"),
    (C::CameraZoomOut, Half, "CAMERA_ZOOM_OUT", "Zooms the camera out"),
    (C::CameraPreviousPoi, Dig, "CAMERA_POI_PREVIOUS", "Jumps to the previous point of interest"),
    (C::CameraNextPoi, Dig, "CAMERA_POI_NEXT", "Jumps to the next point of interest"),
    (C::CameraReset, Dig, "CAMERA_RESET", "Resets the camera"),
    (C::CameraRestriction, Dig, "CAMERA_RESTRICTION", "Toggles camera restriction"),
    (C::TimetableToggle, Dig, "TIMETABLE_TOGGLE", "Cycles the timetable display"),
    (C::TimetableUp, Half, "TIMETABLE_UP", "Scrolls the timetable up"),
    (C::TimetableDown, Half, "TIMETABLE_DOWN", "Scrolls the timetable down"),
    (C::MenuActivate, Dig, "MENU_ACTIVATE", "Opens the menu"),
    (C::MenuUp, Dig, "MENU_UP", "Moves the menu selection up"),
    (C::MenuDown, Dig, "MENU_DOWN", "Moves the menu selection down"),
    (C::MenuEnter, Dig, "MENU_ENTER", "Activates the selected menu entry"),
    (C::MenuBack, Dig, "MENU_BACK", "Goes back one menu level"),
    (C::MiscClock, Dig, "MISC_CLOCK", "Toggles the clock"),
    (C::MiscSpeed, Dig, "MISC_SPEED", "Cycles the speed display"),
    (C::MiscFps, Dig, "MISC_FPS", "Toggles the frame rate display"),
    (C::MiscAi, Dig, "MISC_AI", "Toggles the AI driver"),
    (C::MiscFullscreen, Dig, "MISC_FULLSCREEN", "Toggles fullscreen"),
    (C::MiscMute, Dig, "MISC_MUTE", "Toggles audio mute"),
    (C::MiscPause, Dig, "MISC_PAUSE", "Pauses or resumes the simulation"),
    (C::MiscTimeFactor, Dig, "MISC_TIMEFACTOR", "Toggles accelerated time"),
    (C::MiscQuit, Dig, "MISC_QUIT", "Asks to quit"),
    (C::MiscInterfaceMode, Dig, "MISC_INTERFACE", "Cycles the interface mode"),
    (C::MiscBackfaceCulling, Dig, "MISC_BACKFACE", "Toggles backface culling"),
    (C::MiscCpuMode, Dig, "MISC_CPUMODE", "Toggles the frame rate limiter"),
    (C::DebugWireframe, Dig, "DEBUG_WIREFRAME", "Toggles wireframe rendering"),
    (C::DebugNormals, Dig, "DEBUG_NORMALS", "Toggles normal rendering"),
    (C::DebugBrakeSystems, Dig, "DEBUG_BRAKE", "Toggles the brake system overlay"),
];

/// Immutable per-run table of command metadata.
///
/// Indexed by `Command` discriminant, so every command has exactly one entry.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    infos: Vec<CommandInfo>,
    lookup_by_lower_name: HashMap<String, Command>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CommandRegistry {
    pub fn builtin() -> Self {
        let mut infos = Vec::with_capacity(BUILTIN_COMMANDS.len());
        let mut lookup_by_lower_name = HashMap::with_capacity(BUILTIN_COMMANDS.len());
        for (index, &(command, kind, name, description)) in BUILTIN_COMMANDS.iter().enumerate() {
            debug_assert_eq!(command as usize, index, "command table out of order: {name}");
            infos.push(CommandInfo {
                command,
                kind,
                name,
                description: description.to_string(),
            });
            lookup_by_lower_name.insert(name.to_ascii_lowercase(), command);
        }
        Self {
            infos,
            lookup_by_lower_name,
        }
    }

    /// Builtin table with descriptions replaced by the `[commands]` section
    /// of a language file, where present.
    pub fn with_descriptions(strings: &InterfaceStrings) -> Self {
        let mut registry = Self::builtin();
        for info in &mut registry.infos {
            if let Some(text) = strings.command_description(info.name) {
                info.description = text.to_string();
            }
        }
        registry
    }

    pub fn info(&self, command: Command) -> &CommandInfo {
        &self.infos[command as usize]
    }

    pub fn kind(&self, command: Command) -> CommandKind {
        self.info(command).kind
    }

    pub fn find_by_name(&self, name: &str) -> Option<Command> {
        self.lookup_by_lower_name
            .get(&name.trim().to_ascii_lowercase())
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandInfo> {
        self.infos.iter()
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_exactly_one_info() {
        let registry = CommandRegistry::builtin();
        assert_eq!(registry.len(), BUILTIN_COMMANDS.len());
        for (index, info) in registry.iter().enumerate() {
            assert_eq!(info.command as usize, index);
        }
        assert_eq!(registry.info(Command::DebugBrakeSystems).name, "DEBUG_BRAKE");
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let registry = CommandRegistry::builtin();
        assert_eq!(
            registry.find_by_name("power_increase"),
            Some(Command::PowerIncrease)
        );
        assert_eq!(
            registry.find_by_name("  Camera_Poi_Next "),
            Some(Command::CameraNextPoi)
        );
        assert_eq!(registry.find_by_name("POWER_TURBO"), None);
    }

    #[test]
    fn kinds_match_table() {
        let registry = CommandRegistry::builtin();
        assert_eq!(registry.kind(Command::BrakeHalfAxis), CommandKind::AnalogHalf);
        assert_eq!(registry.kind(Command::ReverserFullAxis), CommandKind::AnalogFull);
        assert_eq!(registry.kind(Command::MiscPause), CommandKind::Digital);
        assert!(CommandKind::AnalogHalf.is_analog());
        assert!(!CommandKind::Digital.is_analog());
    }

    #[test]
    fn descriptions_are_overridden_from_language_file() {
        let strings = InterfaceStrings::parse("[commands]\npower_increase = Mehr Leistung\n");
        let registry = CommandRegistry::with_descriptions(&strings);
        assert_eq!(
            registry.info(Command::PowerIncrease).description,
            "Mehr Leistung"
        );
        assert_eq!(
            registry.info(Command::PowerDecrease).description,
            "Decreases the power notch"
        );
    }
}
