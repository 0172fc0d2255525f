pub const NORMAL_TIME_FACTOR: u32 = 1;
pub const ACCELERATED_TIME_FACTOR: u32 = 5;

/// In-world time of day, in seconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    seconds_since_midnight: f64,
    time_factor: u32,
    startup_time: f64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl SimulationClock {
    pub fn new(seconds_since_midnight: f64, startup_time: f64) -> Self {
        Self {
            seconds_since_midnight,
            time_factor: NORMAL_TIME_FACTOR,
            startup_time,
        }
    }

    pub fn seconds_since_midnight(&self) -> f64 {
        self.seconds_since_midnight
    }

    pub fn startup_time(&self) -> f64 {
        self.startup_time
    }

    pub fn time_factor(&self) -> u32 {
        self.time_factor
    }

    pub fn has_reached_startup(&self) -> bool {
        self.seconds_since_midnight >= self.startup_time
    }

    pub(crate) fn advance(&mut self, seconds: f64) {
        self.seconds_since_midnight += seconds;
    }

    /// Switches between normal and accelerated time; returns the new factor.
    pub fn toggle_time_factor(&mut self) -> u32 {
        self.time_factor = if self.time_factor == NORMAL_TIME_FACTOR {
            ACCELERATED_TIME_FACTOR
        } else {
            NORMAL_TIME_FACTOR
        };
        self.time_factor
    }

    /// `HH:MM:SS`, wrapping at midnight.
    pub fn format_time_of_day(&self) -> String {
        let total = self.seconds_since_midnight.floor().rem_euclid(86_400.0) as u32;
        format!(
            "{:02}:{:02}:{:02}",
            total / 3600,
            (total / 60) % 60,
            total % 60
        )
    }
}
