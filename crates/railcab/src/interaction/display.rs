use crate::config::GameMode;

/// Pixels per simulated second the timetable scrolls at full deflection.
pub const TIMETABLE_SCROLL_SPEED: f64 = 250.0;

pub const TIMETABLE_ROW_HEIGHT: f64 = 20.0;

/// Rendered height of a timetable with one row per station plus a header.
pub fn timetable_height(stations: usize) -> f64 {
    TIMETABLE_ROW_HEIGHT * (stations + 1) as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimetableMode {
    #[default]
    None,
    Default,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterfaceMode {
    #[default]
    Default,
    Debug,
    None,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimetableView {
    mode: TimetableMode,
    has_custom: bool,
    position: f64,
    /// Lowest scroll position; negative when the timetable is taller than
    /// the screen.
    min_position: f64,
}

impl TimetableView {
    pub fn new(has_custom: bool) -> Self {
        Self {
            has_custom,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> TimetableMode {
        self.mode
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn set_layout(&mut self, screen_height: f64, timetable_height: f64) {
        self.min_position = (screen_height - timetable_height).min(0.0);
        self.position = self.position.clamp(self.min_position, 0.0);
    }

    pub fn toggle(&mut self) {
        self.mode = match (self.mode, self.has_custom) {
            (TimetableMode::Custom, _) => TimetableMode::Default,
            (TimetableMode::Default, _) => TimetableMode::None,
            (TimetableMode::None, true) => TimetableMode::Custom,
            (TimetableMode::None, false) => TimetableMode::Default,
        };
    }

    pub fn scroll_up(&mut self, value: f64, elapsed: f64) {
        self.position = (self.position + TIMETABLE_SCROLL_SPEED * value * elapsed).min(0.0);
    }

    pub fn scroll_down(&mut self, value: f64, elapsed: f64) {
        self.position =
            (self.position - TIMETABLE_SCROLL_SPEED * value * elapsed).max(self.min_position);
    }
}

/// Overlay and renderer switches flipped by driver commands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayOptions {
    pub timetable: TimetableView,
    pub interface_mode: InterfaceMode,
    pub wireframe: bool,
    pub normals: bool,
    pub backface_culling: bool,
    pub limit_frame_rate: bool,
    pub brake_systems: bool,
    pub clock: bool,
    /// 0 = hidden, then km/h, mph, m/s.
    pub speed: u8,
    pub frame_rates: bool,
    pub muted: bool,
}

impl DisplayOptions {
    pub fn cycle_interface_mode(&mut self, game_mode: GameMode) {
        self.interface_mode = match self.interface_mode {
            InterfaceMode::Default if game_mode == GameMode::Expert => InterfaceMode::None,
            InterfaceMode::Default => InterfaceMode::Debug,
            InterfaceMode::Debug => InterfaceMode::None,
            InterfaceMode::None => InterfaceMode::Default,
        };
    }

    pub fn cycle_speed(&mut self) {
        self.speed = (self.speed + 1) % 4;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudMessage {
    pub text: String,
    /// Clock value at which the message disappears.
    pub expires_at: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<HudMessage>,
}

impl MessageLog {
    /// Showing a message again restarts its timeout rather than stacking a
    /// duplicate.
    pub fn add(&mut self, text: impl Into<String>, duration: f64, now: f64) {
        let text = text.into();
        let expires_at = now + duration;
        match self.messages.iter_mut().find(|message| message.text == text) {
            Some(existing) => existing.expires_at = expires_at,
            None => self.messages.push(HudMessage { text, expires_at }),
        }
    }

    pub fn prune(&mut self, now: f64) {
        self.messages.retain(|message| message.expires_at > now);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HudMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
