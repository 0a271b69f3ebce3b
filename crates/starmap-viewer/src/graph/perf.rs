use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct PerfTracker {
    pub started_at: Option<Instant>,
    pub last_tick_at: Option<Instant>,
    pub tick_interval: Duration,
    pub current_tick: u32,
    pub progress: f32,
    pub elapsed: Duration,
    pub ticks_received: u64,
    pub finished: bool,
    pub fps: f32,
}

impl PerfTracker {
    pub fn start(&mut self, now: Instant) {
        *self = Self {
            started_at: Some(now),
            ..Self::default()
        };
    }

    pub fn record_tick(&mut self, tick: u32, progress: f32, now: Instant) -> Duration {
        if let Some(last) = self.last_tick_at {
            self.tick_interval = now.saturating_duration_since(last);
        }
        self.last_tick_at = Some(now);
        self.current_tick = tick;
        self.progress = progress.clamp(0.0, 1.0);
        self.ticks_received += 1;
        if let Some(start) = self.started_at {
            self.elapsed = now.saturating_duration_since(start);
        }
        self.tick_interval
    }

    pub fn record_end(&mut self, now: Instant) {
        self.progress = 1.0;
        if let Some(start) = self.started_at {
            self.elapsed = now.saturating_duration_since(start);
        }
    }

    pub fn record_frame(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let instant_fps = 1.0 / dt;
        self.fps = if self.fps == 0.0 {
            instant_fps
        } else {
            self.fps * 0.9 + instant_fps * 0.1
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_interval_measures_gap_between_ticks() {
        let t0 = Instant::now();
        let mut perf = PerfTracker::default();
        perf.start(t0);

        let first = perf.record_tick(1, 0.0, t0 + Duration::from_millis(10));
        let second = perf.record_tick(2, 0.1, t0 + Duration::from_millis(45));

        assert_eq!(first, Duration::ZERO);
        assert_eq!(second, Duration::from_millis(35));
        assert_eq!(perf.elapsed, Duration::from_millis(45));
        assert_eq!(perf.current_tick, 2);
        assert_eq!(perf.ticks_received, 2);
    }

    #[test]
    fn progress_is_clamped_and_end_completes_it() {
        let t0 = Instant::now();
        let mut perf = PerfTracker::default();
        perf.start(t0);
        perf.record_tick(1, 1.7, t0);
        assert_eq!(perf.progress, 1.0);
        perf.record_tick(2, -0.2, t0);
        assert_eq!(perf.progress, 0.0);

        perf.record_end(t0 + Duration::from_secs(2));
        assert_eq!(perf.progress, 1.0);
        assert_eq!(perf.elapsed, Duration::from_secs(2));
    }

    #[test]
    fn fps_is_smoothed() {
        let mut perf = PerfTracker::default();
        perf.record_frame(1.0 / 60.0);
        assert!((perf.fps - 60.0).abs() < 0.01);
        perf.record_frame(1.0 / 30.0);
        assert!((perf.fps - 57.0).abs() < 0.01);
        perf.record_frame(0.0);
        assert!((perf.fps - 57.0).abs() < 0.01);
    }
}
