use serde::{Deserialize, Serialize};

/// A timetable entry. Negative times mean the time is not set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub arrival: f64,
    pub departure: f64,
    pub stop_time: f64,
    pub stops_for_player: bool,
    #[serde(default)]
    pub stops_for_others: bool,
}

impl Station {
    /// When a train stopping here is first expected at the platform.
    pub fn scheduled_time(&self) -> f64 {
        if self.arrival >= 0.0 {
            self.arrival
        } else if self.departure >= 0.0 {
            self.departure - self.stop_time
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartupSchedule {
    /// Time at which real-time driving begins.
    pub startup_time: f64,
    /// Initial clock value; earlier than `startup_time` when preceding trains
    /// need to be pre-driven.
    pub clock_start: f64,
    pub first_player_station: Option<usize>,
}

impl StartupSchedule {
    pub fn compute(stations: &[Station], preceding_train_offsets: &[f64]) -> Self {
        let first_player_station = stations.iter().position(|station| station.stops_for_player);
        let startup_time = first_player_station
            .map(|index| stations[index].scheduled_time())
            .unwrap_or(0.0);

        let mut clock_start = startup_time;
        let largest_offset = preceding_train_offsets
            .iter()
            .copied()
            .fold(None, |acc: Option<f64>, offset| {
                Some(acc.map_or(offset, |current| current.max(offset)))
            });
        if let Some(offset) = largest_offset {
            let others_time = stations
                .iter()
                .find(|station| station.stops_for_others)
                .map(Station::scheduled_time)
                .unwrap_or(0.0);
            clock_start = clock_start.min(others_time - offset);
        }

        Self {
            startup_time,
            clock_start,
            first_player_station,
        }
    }

    pub fn fast_forward_seconds(&self) -> f64 {
        (self.startup_time - self.clock_start).max(0.0)
    }
}
