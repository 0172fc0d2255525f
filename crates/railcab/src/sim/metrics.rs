use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::warn;

/// Simulated time over which the frame rate is averaged.
pub const FRAME_RATE_WINDOW: f64 = 0.2;

static METRICS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_metrics_lock_poison_once(operation: &'static str) {
    if METRICS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "metrics lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulationMetrics {
    pub fps: f64,
    pub seconds_since_midnight: f64,
    pub time_factor: u32,
    pub sub_steps: u32,
}

/// Shared read side for the HUD; the session is the only writer.
#[derive(Clone, Debug)]
pub struct MetricsHandle {
    snapshot: Arc<RwLock<SimulationMetrics>>,
}

impl Default for MetricsHandle {
    fn default() -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(SimulationMetrics::default())),
        }
    }
}

impl MetricsHandle {
    pub fn snapshot(&self) -> SimulationMetrics {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, snapshot: SimulationMetrics) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = snapshot;
            }
        }
    }
}

/// Averages frames over `FRAME_RATE_WINDOW` of simulated time. Scaling by
/// the time factor turns the result back into a wall-clock frame rate.
#[derive(Debug, Default)]
pub(crate) struct FrameRateCounter {
    elapsed: f64,
    frames: u32,
}

impl FrameRateCounter {
    pub(crate) fn record(&mut self, elapsed: f64, time_factor: u32) -> Option<f64> {
        self.elapsed += elapsed;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < FRAME_RATE_WINDOW {
            return None;
        }
        let fps = f64::from(time_factor) * f64::from(self.frames) / self.elapsed;
        self.elapsed = 0.0;
        self.frames = 0;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::RwLock;
    use std::thread;

    use super::*;

    fn poison_lock(lock: &RwLock<SimulationMetrics>) {
        thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = lock.write().expect("write guard");
                    panic!("poison metrics lock");
                })
                .join();
        });
    }

    #[test]
    fn frame_rate_is_reported_after_window() {
        let mut counter = FrameRateCounter::default();
        assert_eq!(counter.record(0.0625, 1), None);
        assert_eq!(counter.record(0.0625, 1), None);
        assert_eq!(counter.record(0.0625, 1), None);
        let fps = counter.record(0.0625, 1).expect("window complete");
        assert!((fps - 16.0).abs() < 1e-9);
        assert_eq!(counter.record(0.0625, 1), None);
    }

    #[test]
    fn time_factor_is_divided_back_out() {
        let mut counter = FrameRateCounter::default();
        // Five frames of 0.05 s real time at factor 5.
        let mut fps = None;
        for _ in 0..5 {
            fps = counter.record(0.25, 5).or(fps);
        }
        assert!((fps.expect("window complete") - 20.0).abs() < 1e-9);
    }

    #[test]
    fn publish_recovers_after_poison_without_panic() {
        let handle = MetricsHandle::default();
        poison_lock(handle.snapshot.as_ref());

        let expected = SimulationMetrics {
            fps: 60.0,
            seconds_since_midnight: 3600.0,
            time_factor: 5,
            sub_steps: 3,
        };
        handle.publish(expected);
        assert_eq!(handle.snapshot(), expected);
    }
}
