pub const INTERIOR_TOP_SPEED: f64 = 1.0;
pub const EXTERIOR_TOP_SPEED: f64 = 50.0;
pub const INTERIOR_TOP_ANGULAR_SPEED: f64 = 2.0;
pub const EXTERIOR_TOP_ANGULAR_SPEED: f64 = 1.0;
pub const ZOOM_TOP_SPEED: f64 = 2.0;

/// Radians per pixel of grabbed mouse motion.
const INTERIOR_MOUSE_FACTOR: f64 = 0.01;
const EXTERIOR_MOUSE_FACTOR: f64 = 0.03;

/// Half-extent of the box a restricted interior camera may move in.
const RESTRICTED_INTERIOR_EXTENT: f64 = 0.5;

const FLY_BY_BASE_DISTANCE: f64 = 30.0;
const FLY_BY_SPEED_DISTANCE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraViewMode {
    #[default]
    Interior,
    InteriorLookAhead,
    Exterior,
    Track,
    FlyBy,
    FlyByZooming,
}

impl CameraViewMode {
    pub fn is_interior(self) -> bool {
        matches!(self, Self::Interior | Self::InteriorLookAhead)
    }

    fn is_track_based(self) -> bool {
        matches!(self, Self::Track | Self::FlyBy | Self::FlyByZooming)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraRestriction {
    #[default]
    NotAvailable,
    Off,
    On,
}

/// Camera offset, or per-second rate of change when used as a direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraAlignment {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub track_position: f64,
    pub zoom: f64,
}

impl CameraAlignment {
    fn advance(&mut self, rate: &CameraAlignment, elapsed: f64) {
        self.x += rate.x * elapsed;
        self.y += rate.y * elapsed;
        self.z += rate.z * elapsed;
        self.yaw += rate.yaw * elapsed;
        self.pitch += rate.pitch * elapsed;
        self.roll += rate.roll * elapsed;
        self.track_position += rate.track_position * elapsed;
        self.zoom += rate.zoom * elapsed;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CameraState {
    mode: CameraViewMode,
    restriction: CameraRestriction,
    alignment: CameraAlignment,
    direction: CameraAlignment,
    speed: f64,
}

impl CameraState {
    pub fn new(restriction: CameraRestriction) -> Self {
        Self {
            restriction,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> CameraViewMode {
        self.mode
    }

    pub fn restriction(&self) -> CameraRestriction {
        self.restriction
    }

    pub fn alignment(&self) -> &CameraAlignment {
        &self.alignment
    }

    pub fn direction(&self) -> &CameraAlignment {
        &self.direction
    }

    fn top_speed(&self) -> f64 {
        if self.mode.is_interior() {
            INTERIOR_TOP_SPEED
        } else {
            EXTERIOR_TOP_SPEED
        }
    }

    fn top_angular_speed(&self) -> f64 {
        if self.mode.is_interior() {
            INTERIOR_TOP_ANGULAR_SPEED
        } else {
            EXTERIOR_TOP_ANGULAR_SPEED
        }
    }

    fn set_view(&mut self, mode: CameraViewMode) {
        self.mode = mode;
        self.direction = CameraAlignment::default();
        self.speed = 0.0;
    }

    /// Clears the per-frame motion rates; controls set them again.
    pub fn reset_direction(&mut self) {
        self.direction = CameraAlignment::default();
    }

    // View commands return the notification to show.

    pub fn select_interior(&mut self) -> &'static str {
        if self.mode != CameraViewMode::InteriorLookAhead
            && self.restriction == CameraRestriction::NotAvailable
        {
            self.set_view(CameraViewMode::InteriorLookAhead);
            "notification_interior_lookahead"
        } else {
            self.set_view(CameraViewMode::Interior);
            "notification_interior"
        }
    }

    pub fn select_exterior(&mut self) -> &'static str {
        self.set_view(CameraViewMode::Exterior);
        "notification_exterior"
    }

    pub fn select_track(&mut self, train_position: f64) -> &'static str {
        self.set_view(CameraViewMode::Track);
        self.alignment.track_position = train_position;
        "notification_track"
    }

    pub fn select_fly_by(&mut self) -> &'static str {
        if self.mode == CameraViewMode::FlyBy {
            self.set_view(CameraViewMode::FlyByZooming);
            "notification_flybyzooming"
        } else {
            self.set_view(CameraViewMode::FlyBy);
            "notification_flybynormal"
        }
    }

    /// Moves along the track to the nearest point of interest ahead of or
    /// behind the camera. Returns a notification when the view had to switch
    /// to the track camera.
    pub fn jump_to_point_of_interest(&mut self, points: &[f64], forward: bool) -> Option<&'static str> {
        let current = self.alignment.track_position;
        let target = if forward {
            points
                .iter()
                .copied()
                .filter(|point| *point > current)
                .min_by(f64::total_cmp)
        } else {
            points
                .iter()
                .copied()
                .filter(|point| *point < current)
                .max_by(f64::total_cmp)
        }?;

        let notification = if self.mode.is_track_based() {
            None
        } else {
            self.mode = CameraViewMode::Track;
            Some("notification_track")
        };
        self.alignment.track_position = target;
        self.alignment.z = 0.0;
        self.alignment.zoom = 0.0;
        self.direction = CameraAlignment::default();
        self.speed = 0.0;
        notification
    }

    pub fn reset(&mut self, train_position: f64, train_speed: f64) {
        if self.mode.is_interior() {
            self.alignment.x = 0.0;
            self.alignment.y = 0.0;
            self.alignment.z = 0.0;
        }
        self.alignment.yaw = 0.0;
        self.alignment.pitch = 0.0;
        self.alignment.roll = 0.0;
        match self.mode {
            CameraViewMode::Track => self.alignment.track_position = train_position,
            CameraViewMode::FlyBy | CameraViewMode::FlyByZooming => {
                let lead = FLY_BY_BASE_DISTANCE + FLY_BY_SPEED_DISTANCE * train_speed.abs();
                self.alignment.track_position = if train_speed >= 0.0 {
                    train_position + lead
                } else {
                    train_position - lead
                };
            }
            _ => {}
        }
        self.alignment.zoom = 0.0;
        self.direction = CameraAlignment::default();
        self.speed = 0.0;
    }

    pub fn toggle_restriction(&mut self) -> Option<&'static str> {
        match self.restriction {
            CameraRestriction::NotAvailable => None,
            CameraRestriction::On => {
                self.restriction = CameraRestriction::Off;
                Some("notification_camerarestriction_off")
            }
            CameraRestriction::Off => {
                self.restriction = CameraRestriction::On;
                Some("notification_camerarestriction_on")
            }
        }
    }

    // Analog rates; positive values move forward, right, up.

    pub fn move_longitudinal(&mut self, value: f64) {
        if self.mode.is_interior() || self.mode == CameraViewMode::Exterior {
            self.direction.z = self.top_speed() * value;
        } else {
            self.direction.track_position = EXTERIOR_TOP_SPEED * value;
        }
    }

    pub fn move_lateral(&mut self, value: f64) {
        self.direction.x = self.top_speed() * value;
    }

    pub fn move_vertical(&mut self, value: f64) {
        self.direction.y = self.top_speed() * value;
    }

    pub fn rotate_yaw(&mut self, value: f64) {
        self.direction.yaw = self.top_angular_speed() * value;
    }

    pub fn rotate_pitch(&mut self, value: f64) {
        self.direction.pitch = self.top_angular_speed() * value;
    }

    pub fn rotate_roll(&mut self, value: f64) {
        if self.mode.is_interior() && self.restriction == CameraRestriction::On {
            return;
        }
        self.direction.roll = self.top_angular_speed() * value;
    }

    /// Negative values zoom in.
    pub fn zoom(&mut self, value: f64) {
        self.direction.zoom = ZOOM_TOP_SPEED * value;
    }

    pub fn apply_mouse_grab(&mut self, dx: f64, dy: f64) {
        let factor = if self.mode.is_interior() {
            INTERIOR_MOUSE_FACTOR
        } else {
            EXTERIOR_MOUSE_FACTOR
        };
        self.direction.yaw += factor * dx;
        self.direction.pitch -= factor * dy;
    }

    pub fn advance(&mut self, elapsed: f64) {
        self.alignment.advance(&self.direction, elapsed);
        if self.mode.is_interior() && self.restriction == CameraRestriction::On {
            let extent = RESTRICTED_INTERIOR_EXTENT;
            self.alignment.x = self.alignment.x.clamp(-extent, extent);
            self.alignment.y = self.alignment.y.clamp(-extent, extent);
            self.alignment.z = self.alignment.z.clamp(-extent, extent);
            self.alignment.roll = 0.0;
        }
        self.alignment.zoom = self.alignment.zoom.clamp(-1.0, 1.0);
    }
}
