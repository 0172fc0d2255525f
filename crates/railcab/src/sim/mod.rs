mod clock;
mod metrics;
mod schedule;
mod scheduler;

pub use clock::{SimulationClock, ACCELERATED_TIME_FACTOR, NORMAL_TIME_FACTOR};
pub use metrics::{MetricsHandle, SimulationMetrics, FRAME_RATE_WINDOW};
pub(crate) use metrics::FrameRateCounter;
pub use schedule::{StartupSchedule, Station};
pub use scheduler::{
    plan_sub_steps, FastForwardSummary, FrameTime, PhysicsStepper, Scheduler, SubStepPlan,
    FAST_FORWARD_CHUNK, MAX_SUB_STEPS, SIGNALLING_INTERVAL, SUB_STEP_CEILING,
};

use crate::interaction::{CabEvent, CabState, CameraState};

/// The route world: trains, signalling and animated scenery.
///
/// Implemented by the host application. The session drives it once per frame
/// and during startup fast-forward.
pub trait Simulation {
    /// Advances train physics by one sub-step using the current cab handles.
    fn update_trains(&mut self, dt: f64, cab: &CabState);

    /// Re-evaluates block signalling.
    fn update_signalling(&mut self);

    /// Updates animated objects and the camera with the frame's unsplit
    /// elapsed time.
    fn update_scene(&mut self, _elapsed: f64, _camera: &CameraState) {}

    /// Cheaper physics during fast-forward.
    fn set_minimal_simulation(&mut self, _enabled: bool) {}

    fn stations(&self) -> &[Station];

    fn preceding_train_offsets(&self) -> &[f64] {
        &[]
    }

    /// Track positions the camera can jump between.
    fn points_of_interest(&self) -> &[f64] {
        &[]
    }

    /// Next station the player is scheduled to stop at.
    fn next_stop_station(&self) -> Option<usize> {
        None
    }

    fn jump_to_station(&mut self, station: usize);

    fn player_track_position(&self) -> f64 {
        0.0
    }

    fn player_speed(&self) -> f64 {
        0.0
    }

    fn handle_cab_event(&mut self, _event: CabEvent) {}
}
