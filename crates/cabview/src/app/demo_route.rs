use std::fs;
use std::path::{Path, PathBuf};

use railcab::interaction::{AirBrakeHandle, BrakeSystem, CabEvent, CabState, DoorSide};
use railcab::{CabSpecs, CameraRestriction, Simulation, Station};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

const MAX_ACCELERATION: f64 = 1.0;
const MAX_SERVICE_DECELERATION: f64 = 1.1;
const EMERGENCY_DECELERATION: f64 = 1.4;
const HOLD_BRAKE_DECELERATION: f64 = 0.3;
const ROLLING_RESISTANCE: f64 = 0.02;
/// Rate at which the automatic air brake builds up or releases, per second.
const AIR_BRAKE_RATE: f64 = 0.5;
const PRECEDING_TRAIN_SPEED: f64 = 20.0;
const SIGNAL_BLOCK_LENGTH: f64 = 400.0;
const STOP_TOLERANCE: f64 = 5.0;

#[derive(Debug, Error)]
pub(crate) enum RouteError {
    #[error("failed to read route file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse route file {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("route file {path} has no stations")]
    NoStations { path: PathBuf },
}

#[derive(Debug, Deserialize)]
struct RouteFile {
    name: String,
    #[serde(default)]
    cab: CabSpecs,
    /// Absent when the route has no restricted cab view.
    #[serde(default)]
    camera_restricted: Option<bool>,
    #[serde(default)]
    has_custom_timetable: bool,
    stations: Vec<RouteStation>,
    #[serde(default)]
    preceding_train_offsets: Vec<f64>,
    #[serde(default)]
    points_of_interest: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct RouteStation {
    #[serde(flatten)]
    station: Station,
    track_position: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignalAspect {
    Clear,
    Stop,
}

/// A single-track line with the player's train and a few timetabled
/// trains running ahead of it.
#[derive(Debug)]
pub(crate) struct DemoRoute {
    name: String,
    cab: CabSpecs,
    camera_restriction: CameraRestriction,
    has_custom_timetable: bool,
    stations: Vec<Station>,
    station_positions: Vec<f64>,
    preceding_train_offsets: Vec<f64>,
    points_of_interest: Vec<f64>,
    position: f64,
    speed: f64,
    air_brake_deceleration: f64,
    preceding_trains: Vec<f64>,
    signal: SignalAspect,
    minimal: bool,
}

impl DemoRoute {
    pub(crate) fn load(path: &Path) -> Result<Self, RouteError> {
        let raw = fs::read_to_string(path).map_err(|source| RouteError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    pub(crate) fn parse(raw: &str, path: &Path) -> Result<Self, RouteError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let file: RouteFile = serde_path_to_error::deserialize(&mut deserializer).map_err(
            |error| {
                let field = error.path().to_string();
                RouteError::Parse {
                    path: path.to_path_buf(),
                    field,
                    source: error.into_inner(),
                }
            },
        )?;
        if file.stations.is_empty() {
            return Err(RouteError::NoStations {
                path: path.to_path_buf(),
            });
        }
        Ok(Self::from_file(file))
    }

    /// Route used when no route file is present.
    pub(crate) fn builtin() -> Self {
        let station = |name: &str, arrival: f64, departure: f64, player: bool| Station {
            name: name.to_string(),
            arrival,
            departure,
            stop_time: 30.0,
            stops_for_player: player,
            stops_for_others: true,
        };
        Self::from_file(RouteFile {
            name: "Demo Line".to_string(),
            cab: CabSpecs::default(),
            camera_restricted: Some(true),
            has_custom_timetable: false,
            stations: vec![
                RouteStation {
                    station: station("Depot", -1.0, 28_800.0, false),
                    track_position: 0.0,
                },
                RouteStation {
                    station: station("Central", 28_980.0, 29_010.0, true),
                    track_position: 2_000.0,
                },
                RouteStation {
                    station: station("Market Street", 29_160.0, 29_190.0, true),
                    track_position: 4_500.0,
                },
                RouteStation {
                    station: station("Harbour", 29_400.0, -1.0, true),
                    track_position: 8_000.0,
                },
            ],
            preceding_train_offsets: vec![120.0, 300.0],
            points_of_interest: vec![0.0, 1_950.0, 4_450.0, 7_950.0],
        })
    }

    fn from_file(file: RouteFile) -> Self {
        let camera_restriction = match file.camera_restricted {
            None => CameraRestriction::NotAvailable,
            Some(false) => CameraRestriction::Off,
            Some(true) => CameraRestriction::On,
        };
        let (stations, station_positions): (Vec<_>, Vec<_>) = file
            .stations
            .into_iter()
            .map(|entry| (entry.station, entry.track_position))
            .unzip();
        let start = station_positions.first().copied().unwrap_or(0.0);
        let preceding_trains = file
            .preceding_train_offsets
            .iter()
            .map(|offset| start + offset * PRECEDING_TRAIN_SPEED)
            .collect();
        Self {
            name: file.name,
            cab: file.cab,
            camera_restriction,
            has_custom_timetable: file.has_custom_timetable,
            stations,
            station_positions,
            preceding_train_offsets: file.preceding_train_offsets,
            points_of_interest: file.points_of_interest,
            position: start,
            speed: 0.0,
            air_brake_deceleration: 0.0,
            preceding_trains,
            signal: SignalAspect::Clear,
            minimal: false,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn cab_specs(&self) -> &CabSpecs {
        &self.cab
    }

    pub(crate) fn camera_restriction(&self) -> CameraRestriction {
        self.camera_restriction
    }

    pub(crate) fn has_custom_timetable(&self) -> bool {
        self.has_custom_timetable
    }

    fn traction(&self, cab: &CabState) -> f64 {
        let doors_open = cab.doors_open(DoorSide::Left) || cab.doors_open(DoorSide::Right);
        if cab.reverser() == 0 || doors_open || cab.emergency() || cab.specs().max_power_notch <= 0
        {
            return 0.0;
        }
        let power = cab.power_notch() as f64 / cab.specs().max_power_notch as f64;
        power * MAX_ACCELERATION * cab.reverser().signum() as f64
    }

    fn braking(&mut self, dt: f64, cab: &CabState) -> f64 {
        if cab.emergency() {
            return EMERGENCY_DECELERATION;
        }
        let service = match cab.specs().brake_system {
            BrakeSystem::Notched if cab.specs().max_brake_notch > 0 => {
                cab.brake_notch() as f64 / cab.specs().max_brake_notch as f64
                    * MAX_SERVICE_DECELERATION
            }
            BrakeSystem::Notched => 0.0,
            BrakeSystem::AutomaticAir => {
                let rate = AIR_BRAKE_RATE * MAX_SERVICE_DECELERATION * dt;
                self.air_brake_deceleration = match cab.air_brake() {
                    AirBrakeHandle::Release => (self.air_brake_deceleration - rate).max(0.0),
                    AirBrakeHandle::Lap => self.air_brake_deceleration,
                    AirBrakeHandle::Service => {
                        (self.air_brake_deceleration + rate).min(MAX_SERVICE_DECELERATION)
                    }
                };
                self.air_brake_deceleration
            }
        };
        let hold = if cab.hold_brake() {
            HOLD_BRAKE_DECELERATION
        } else {
            0.0
        };
        service + hold
    }
}

impl Simulation for DemoRoute {
    fn update_trains(&mut self, dt: f64, cab: &CabState) {
        if dt <= 0.0 {
            return;
        }
        self.speed += self.traction(cab) * dt;
        let retard = (self.braking(dt, cab) + ROLLING_RESISTANCE) * dt;
        if self.speed.abs() <= retard {
            self.speed = 0.0;
        } else {
            self.speed -= retard * self.speed.signum();
        }
        self.position += self.speed * dt;

        for train in &mut self.preceding_trains {
            *train += PRECEDING_TRAIN_SPEED * dt;
        }
    }

    fn update_signalling(&mut self) {
        let occupied = self
            .preceding_trains
            .iter()
            .any(|train| *train > self.position && *train - self.position < SIGNAL_BLOCK_LENGTH);
        let aspect = if occupied {
            SignalAspect::Stop
        } else {
            SignalAspect::Clear
        };
        if aspect != self.signal && !self.minimal {
            debug!(aspect = ?aspect, position = self.position, "signal_aspect_changed");
        }
        self.signal = aspect;
    }

    fn set_minimal_simulation(&mut self, enabled: bool) {
        self.minimal = enabled;
    }

    fn stations(&self) -> &[Station] {
        &self.stations
    }

    fn preceding_train_offsets(&self) -> &[f64] {
        &self.preceding_train_offsets
    }

    fn points_of_interest(&self) -> &[f64] {
        &self.points_of_interest
    }

    fn next_stop_station(&self) -> Option<usize> {
        self.stations
            .iter()
            .zip(&self.station_positions)
            .position(|(station, track_position)| {
                station.stops_for_player && *track_position > self.position + STOP_TOLERANCE
            })
    }

    fn jump_to_station(&mut self, station: usize) {
        let Some(track_position) = self.station_positions.get(station).copied() else {
            return;
        };
        self.position = track_position;
        self.speed = 0.0;
        self.air_brake_deceleration = 0.0;
        info!(
            station = self.stations[station].name.as_str(),
            track_position, "jumped_to_station"
        );
    }

    fn player_track_position(&self) -> f64 {
        self.position
    }

    fn player_speed(&self) -> f64 {
        self.speed
    }

    fn handle_cab_event(&mut self, event: CabEvent) {
        debug!(event = ?event, "cab_event");
    }
}
