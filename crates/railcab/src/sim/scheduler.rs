use tracing::debug;

use super::clock::SimulationClock;
use super::schedule::StartupSchedule;

/// Longest physics step applied in one piece.
pub const SUB_STEP_CEILING: f64 = 1.0 / 75.0;
pub const MAX_SUB_STEPS: u32 = 75;
pub const FAST_FORWARD_CHUNK: f64 = 0.25;
pub const SIGNALLING_INTERVAL: f64 = 1.0;

/// The physics side of the simulation, as seen by the scheduler.
pub trait PhysicsStepper {
    fn step(&mut self, dt: f64);
    fn update_signalling(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubStepPlan {
    pub steps: u32,
    pub step_seconds: f64,
}

impl SubStepPlan {
    pub fn total_seconds(&self) -> f64 {
        self.step_seconds * f64::from(self.steps)
    }
}

/// Splits a frame's elapsed time into equal physics steps no longer than
/// the ceiling, capped at `MAX_SUB_STEPS` steps.
pub fn plan_sub_steps(elapsed: f64) -> SubStepPlan {
    debug_assert!(
        elapsed.is_finite() && elapsed >= 0.0,
        "frame elapsed time must be finite and non-negative, got {elapsed}"
    );
    let elapsed = if elapsed.is_finite() {
        elapsed.max(0.0)
    } else {
        0.0
    };

    if elapsed <= SUB_STEP_CEILING {
        return SubStepPlan {
            steps: 1,
            step_seconds: elapsed,
        };
    }

    let steps = ((elapsed / SUB_STEP_CEILING).round() as u32).clamp(1, MAX_SUB_STEPS);
    SubStepPlan {
        steps,
        step_seconds: elapsed / f64::from(steps),
    }
}

/// Time budget of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Wall-clock seconds, used for key repeat.
    pub real: f64,
    /// Simulated seconds to apply this frame.
    pub elapsed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FastForwardSummary {
    pub chunks: u32,
    pub seconds: f64,
    pub signalling_updates: u32,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    clock: SimulationClock,
    signalling_elapsed: f64,
}

impl Scheduler {
    pub fn new(clock: SimulationClock) -> Self {
        Self {
            clock,
            signalling_elapsed: 0.0,
        }
    }

    pub fn from_schedule(schedule: &StartupSchedule) -> Self {
        Self::new(SimulationClock::new(
            schedule.clock_start,
            schedule.startup_time,
        ))
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    /// Before startup the frame snaps straight to the startup time and no
    /// wall-clock time is considered to have passed.
    pub fn frame_time(&self, real_dt: f64) -> FrameTime {
        if self.clock.has_reached_startup() {
            let real = real_dt.max(0.0);
            FrameTime {
                real,
                elapsed: real * f64::from(self.clock.time_factor()),
            }
        } else {
            FrameTime {
                real: 0.0,
                elapsed: self.clock.startup_time() - self.clock.seconds_since_midnight(),
            }
        }
    }

    /// Adds `elapsed` to the signalling aggregator; returns true (and resets
    /// it) once a full interval has accumulated.
    pub fn accumulate_signalling(&mut self, elapsed: f64) -> bool {
        self.signalling_elapsed += elapsed;
        if self.signalling_elapsed >= SIGNALLING_INTERVAL {
            self.signalling_elapsed = 0.0;
            true
        } else {
            false
        }
    }

    /// Runs the physics for one frame in bounded sub-steps, advancing the
    /// clock before each step.
    pub fn advance(&mut self, elapsed: f64, physics: &mut dyn PhysicsStepper) -> SubStepPlan {
        let plan = plan_sub_steps(elapsed);
        for _ in 0..plan.steps {
            self.clock.advance(plan.step_seconds);
            physics.step(plan.step_seconds);
        }
        plan
    }

    /// Pre-drives the simulation from the current clock to the startup time
    /// in fixed chunks, re-evaluating signalling every simulated second.
    pub fn fast_forward(&mut self, physics: &mut dyn PhysicsStepper) -> FastForwardSummary {
        let mut summary = FastForwardSummary::default();
        let mut remaining = self.clock.startup_time() - self.clock.seconds_since_midnight();
        if remaining <= 0.0 {
            return summary;
        }

        loop {
            let chunk = remaining.min(FAST_FORWARD_CHUNK);
            remaining -= chunk;
            self.clock.advance(chunk);
            physics.step(chunk);
            summary.chunks += 1;
            summary.seconds += chunk;
            if remaining <= 0.0 {
                break;
            }
            if self.accumulate_signalling(chunk) {
                physics.update_signalling();
                summary.signalling_updates += 1;
                debug!(
                    seconds_since_midnight = self.clock.seconds_since_midnight(),
                    "fast_forward_signalling"
                );
            }
        }
        summary
    }
}
