use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BrakeSystem {
    /// Notched electric command brake.
    #[default]
    Notched,
    /// Automatic air brake driven by a Release/Lap/Service handle.
    AutomaticAir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DoorMode {
    #[default]
    Manual,
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AirBrakeHandle {
    #[default]
    Release,
    Lap,
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horn {
    Primary,
    Secondary,
    Music,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityKey {
    S,
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
}

/// Things the cab asks of the train that are not handle positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CabEvent {
    HornBlown(Horn),
    /// The looping music horn started or stopped.
    MusicHorn(bool),
    SecurityKeyDown(SecurityKey),
    SecurityKeyUp(SecurityKey),
}

/// Fixed properties of the player's train.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CabSpecs {
    pub max_power_notch: i32,
    pub max_brake_notch: i32,
    pub single_handle: bool,
    pub has_hold_brake: bool,
    pub has_const_speed: bool,
    pub brake_system: BrakeSystem,
    pub door_open_mode: DoorMode,
    pub door_close_mode: DoorMode,
    /// Number of horns fitted, in Primary, Secondary, Music order.
    pub horns: usize,
}

impl Default for CabSpecs {
    fn default() -> Self {
        Self {
            max_power_notch: 4,
            max_brake_notch: 7,
            single_handle: false,
            has_hold_brake: false,
            has_const_speed: false,
            brake_system: BrakeSystem::Notched,
            door_open_mode: DoorMode::Manual,
            door_close_mode: DoorMode::Manual,
            horns: 3,
        }
    }
}

/// Driver-side handle positions and switches.
#[derive(Debug, Clone, PartialEq)]
pub struct CabState {
    specs: CabSpecs,
    power_notch: i32,
    brake_notch: i32,
    air_brake: AirBrakeHandle,
    emergency: bool,
    hold_brake: bool,
    reverser: i32,
    const_speed: bool,
    doors_left_open: bool,
    doors_right_open: bool,
    music_horn: bool,
    ai_driver: bool,
    events: Vec<CabEvent>,
}

impl CabState {
    pub fn new(specs: CabSpecs) -> Self {
        Self {
            specs: CabSpecs {
                max_power_notch: specs.max_power_notch.max(0),
                max_brake_notch: specs.max_brake_notch.max(0),
                ..specs
            },
            power_notch: 0,
            brake_notch: 0,
            air_brake: AirBrakeHandle::Release,
            emergency: false,
            hold_brake: false,
            reverser: 0,
            const_speed: false,
            doors_left_open: false,
            doors_right_open: false,
            music_horn: false,
            ai_driver: false,
            events: Vec::new(),
        }
    }

    pub fn specs(&self) -> &CabSpecs {
        &self.specs
    }

    pub fn power_notch(&self) -> i32 {
        self.power_notch
    }

    pub fn brake_notch(&self) -> i32 {
        self.brake_notch
    }

    pub fn air_brake(&self) -> AirBrakeHandle {
        self.air_brake
    }

    pub fn emergency(&self) -> bool {
        self.emergency
    }

    pub fn hold_brake(&self) -> bool {
        self.hold_brake
    }

    pub fn reverser(&self) -> i32 {
        self.reverser
    }

    pub fn const_speed(&self) -> bool {
        self.const_speed
    }

    pub fn doors_open(&self, side: DoorSide) -> bool {
        match side {
            DoorSide::Left => self.doors_left_open,
            DoorSide::Right => self.doors_right_open,
        }
    }

    pub fn ai_driver(&self) -> bool {
        self.ai_driver
    }

    pub fn take_events(&mut self) -> Vec<CabEvent> {
        std::mem::take(&mut self.events)
    }

    // Primitive handle operations.

    pub fn apply_notch(&mut self, power: i32, power_relative: bool, brake: i32, brake_relative: bool) {
        let power = if power_relative {
            self.power_notch + power
        } else {
            power
        };
        let brake = if brake_relative {
            self.brake_notch + brake
        } else {
            brake
        };
        self.power_notch = power.clamp(0, self.specs.max_power_notch);
        self.brake_notch = brake.clamp(0, self.specs.max_brake_notch);
        if self.specs.single_handle && self.brake_notch > 0 {
            self.power_notch = 0;
        }
    }

    pub fn apply_air_brake(&mut self, handle: AirBrakeHandle) {
        self.air_brake = handle;
    }

    pub fn apply_hold_brake(&mut self, applied: bool) {
        self.hold_brake = applied && self.specs.has_hold_brake;
    }

    pub fn apply_emergency(&mut self) {
        self.emergency = true;
        self.hold_brake = false;
        self.const_speed = false;
        self.brake_notch = self.specs.max_brake_notch;
        self.air_brake = AirBrakeHandle::Service;
        if self.specs.single_handle {
            self.power_notch = 0;
        }
    }

    pub fn release_emergency(&mut self) {
        self.emergency = false;
    }

    pub fn apply_reverser(&mut self, value: i32, relative: bool) {
        let value = if relative {
            self.reverser + value
        } else {
            value
        };
        self.reverser = value.clamp(-1, 1);
    }

    // Digital commands.

    pub fn power_increase(&mut self) {
        if !self.specs.single_handle && self.power_notch < self.specs.max_power_notch {
            self.apply_notch(1, true, 0, true);
        }
    }

    pub fn power_decrease(&mut self) {
        if !self.specs.single_handle && self.power_notch > 0 {
            self.apply_notch(-1, true, 0, true);
        }
    }

    pub fn brake_increase(&mut self) {
        if self.specs.single_handle {
            return;
        }
        match self.specs.brake_system {
            BrakeSystem::AutomaticAir => {
                if self.specs.has_hold_brake
                    && self.air_brake == AirBrakeHandle::Release
                    && !self.hold_brake
                {
                    self.apply_hold_brake(true);
                } else if self.hold_brake {
                    self.apply_air_brake(AirBrakeHandle::Lap);
                    self.apply_hold_brake(false);
                } else if self.air_brake == AirBrakeHandle::Lap {
                    self.apply_air_brake(AirBrakeHandle::Service);
                } else if self.air_brake == AirBrakeHandle::Release {
                    self.apply_air_brake(AirBrakeHandle::Lap);
                }
            }
            BrakeSystem::Notched => self.notched_brake_step_up(),
        }
    }

    pub fn brake_decrease(&mut self) {
        if self.specs.single_handle {
            return;
        }
        match self.specs.brake_system {
            BrakeSystem::AutomaticAir => {
                if self.emergency {
                    self.release_emergency();
                } else if self.specs.has_hold_brake
                    && self.air_brake == AirBrakeHandle::Lap
                    && !self.hold_brake
                {
                    self.apply_hold_brake(true);
                } else if self.hold_brake {
                    self.apply_air_brake(AirBrakeHandle::Release);
                    self.apply_hold_brake(false);
                } else if self.air_brake == AirBrakeHandle::Lap {
                    self.apply_air_brake(AirBrakeHandle::Release);
                } else if self.air_brake == AirBrakeHandle::Service {
                    self.apply_air_brake(AirBrakeHandle::Lap);
                }
            }
            BrakeSystem::Notched => self.notched_brake_step_down(),
        }
    }

    pub fn brake_emergency(&mut self) {
        if !self.specs.single_handle {
            self.apply_emergency();
        }
    }

    pub fn single_power(&mut self) {
        if !self.specs.single_handle {
            return;
        }
        if self.emergency || self.brake_notch > 0 || self.hold_brake {
            self.notched_brake_step_down();
        } else if self.power_notch < self.specs.max_power_notch {
            self.apply_notch(1, true, 0, true);
        }
    }

    pub fn single_neutral(&mut self) {
        if !self.specs.single_handle {
            return;
        }
        if self.power_notch > 0 {
            self.apply_notch(-1, true, 0, true);
        } else {
            self.notched_brake_step_down();
        }
    }

    pub fn single_brake(&mut self) {
        if !self.specs.single_handle {
            return;
        }
        if self.power_notch > 0 {
            self.apply_notch(-1, true, 0, true);
        } else {
            self.notched_brake_step_up();
        }
    }

    pub fn single_emergency(&mut self) {
        if self.specs.single_handle {
            self.apply_emergency();
        }
    }

    // Notch 0 -> hold brake -> notch 1 -> ... on handles with a hold brake.
    fn notched_brake_step_up(&mut self) {
        if self.specs.has_hold_brake && self.brake_notch == 0 && !self.hold_brake {
            self.apply_hold_brake(true);
        } else if self.brake_notch < self.specs.max_brake_notch {
            self.apply_notch(0, true, 1, true);
            self.apply_hold_brake(false);
        }
    }

    fn notched_brake_step_down(&mut self) {
        if self.emergency {
            self.release_emergency();
        } else if self.brake_notch == 1 && self.specs.has_hold_brake {
            self.apply_notch(0, true, 0, false);
            self.apply_hold_brake(true);
        } else if self.hold_brake {
            self.apply_hold_brake(false);
        } else if self.brake_notch > 0 {
            self.apply_notch(0, true, -1, true);
        }
    }

    pub fn toggle_const_speed(&mut self) {
        if self.specs.has_const_speed {
            self.const_speed = !self.const_speed;
        }
    }

    pub fn reverser_forward(&mut self) {
        if self.reverser < 1 {
            self.apply_reverser(1, true);
        }
    }

    pub fn reverser_backward(&mut self) {
        if self.reverser > -1 {
            self.apply_reverser(-1, true);
        }
    }

    pub fn toggle_doors(&mut self, side: DoorSide) {
        let open = self.doors_open(side);
        let allowed = if open {
            self.specs.door_close_mode != DoorMode::Automatic
        } else {
            self.specs.door_open_mode != DoorMode::Automatic
        };
        if !allowed {
            return;
        }
        match side {
            DoorSide::Left => self.doors_left_open = !open,
            DoorSide::Right => self.doors_right_open = !open,
        }
    }

    pub fn blow_horn(&mut self, horn: Horn) {
        let index = match horn {
            Horn::Primary => 0,
            Horn::Secondary => 1,
            Horn::Music => 2,
        };
        if self.specs.horns <= index {
            return;
        }
        if horn == Horn::Music {
            self.music_horn = !self.music_horn;
            self.events.push(CabEvent::MusicHorn(self.music_horn));
        } else {
            self.events.push(CabEvent::HornBlown(horn));
        }
    }

    pub fn security_key(&mut self, key: SecurityKey, down: bool) {
        self.events.push(if down {
            CabEvent::SecurityKeyDown(key)
        } else {
            CabEvent::SecurityKeyUp(key)
        });
    }

    pub fn toggle_ai_driver(&mut self) -> bool {
        self.ai_driver = !self.ai_driver;
        self.ai_driver
    }

    // Analog commands. `value` is the control's analog state; full axes
    // arrive in [-1, 1] and are rescaled to [0, 1] first.

    pub fn power_axis(&mut self, value: f64, full_axis: bool) {
        if self.specs.single_handle {
            return;
        }
        let a = if full_axis { 0.5 * (value + 1.0) } else { value };
        let notch = (a * f64::from(self.specs.max_power_notch)).round() as i32;
        self.apply_notch(notch, false, 0, true);
    }

    pub fn brake_axis(&mut self, value: f64, full_axis: bool) {
        if self.specs.single_handle {
            return;
        }
        let a = if full_axis { 0.5 * (value + 1.0) } else { value };
        let max_brake = self.specs.max_brake_notch;
        match self.specs.brake_system {
            BrakeSystem::AutomaticAir => match (3.0 * a).round() as i32 {
                i32::MIN..=0 => {
                    self.release_emergency();
                    self.apply_air_brake(AirBrakeHandle::Release);
                }
                1 => {
                    self.release_emergency();
                    self.apply_air_brake(AirBrakeHandle::Lap);
                }
                2 => {
                    self.release_emergency();
                    self.apply_air_brake(AirBrakeHandle::Service);
                }
                _ => self.apply_emergency(),
            },
            BrakeSystem::Notched if self.specs.has_hold_brake => {
                let mut notch = (a * f64::from(max_brake + 2)).round() as i32;
                let hold = notch == 1;
                if notch > 0 {
                    notch -= 1;
                }
                self.apply_brake_notch_or_emergency(0, notch);
                self.apply_hold_brake(hold);
            }
            BrakeSystem::Notched => {
                let notch = (a * f64::from(max_brake + 1)).round() as i32;
                self.apply_brake_notch_or_emergency(self.power_notch, notch);
            }
        }
    }

    pub fn single_axis(&mut self, value: f64) {
        if !self.specs.single_handle {
            return;
        }
        let max_power = f64::from(self.specs.max_power_notch);
        let max_brake = f64::from(self.specs.max_brake_notch);
        let power = ((value * max_power).round() as i32).max(0);
        if self.specs.has_hold_brake {
            let mut brake = ((-value * max_brake + 2.0).round() as i32).max(0);
            let hold = brake == 1;
            if brake > 0 {
                brake -= 1;
            }
            self.apply_brake_notch_or_emergency(power, brake);
            self.apply_hold_brake(hold);
        } else {
            let brake = ((-value * (max_brake + 1.0)).round() as i32).max(0);
            self.apply_brake_notch_or_emergency(power, brake);
        }
    }

    pub fn reverser_axis(&mut self, value: f64) {
        self.apply_reverser(value.round() as i32, false);
    }

    fn apply_brake_notch_or_emergency(&mut self, power: i32, brake: i32) {
        if brake <= self.specs.max_brake_notch {
            self.release_emergency();
            self.apply_notch(power, false, brake, false);
        } else {
            self.apply_emergency();
        }
    }
}

impl Default for CabState {
    fn default() -> Self {
        Self::new(CabSpecs::default())
    }
}
