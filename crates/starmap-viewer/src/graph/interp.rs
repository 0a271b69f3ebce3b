use std::time::{Duration, Instant};

use crate::graph::state::GraphState;

pub const INTERPOLATION_THRESHOLD: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameBlend {
    Snapped,
    Blended(f32),
    Empty,
}

/// Three distinct buffers: the previous target, the latest target and what
/// the renderer reads this frame.
#[derive(Debug, Clone, Default)]
pub struct InterpolationState {
    pub cached: Vec<f32>,
    pub target: Vec<f32>,
    pub current: Vec<f32>,
}

impl InterpolationState {
    pub fn is_primed(&self) -> bool {
        !self.target.is_empty()
    }

    pub fn prime(&mut self, snapshot: Vec<f32>) {
        self.cached.clone_from(&snapshot);
        self.current.clone_from(&snapshot);
        self.target = snapshot;
    }

    pub fn push_target(&mut self, snapshot: Vec<f32>) {
        if !self.is_primed() {
            self.prime(snapshot);
            return;
        }
        std::mem::swap(&mut self.cached, &mut self.target);
        self.target = snapshot;
    }

    pub fn at_target(&self) -> bool {
        self.current == self.target
    }

    pub fn snap(&mut self) -> FrameBlend {
        if self.target.is_empty() {
            return FrameBlend::Empty;
        }
        self.current.clone_from(&self.target);
        FrameBlend::Snapped
    }

    pub fn step(
        &mut self,
        node_count: usize,
        step_time: Duration,
        interval: Duration,
        ended: bool,
    ) -> FrameBlend {
        if self.target.is_empty() {
            return FrameBlend::Empty;
        }
        if node_count < INTERPOLATION_THRESHOLD {
            return self.snap();
        }
        if ended {
            return if self.at_target() {
                FrameBlend::Snapped
            } else {
                self.snap()
            };
        }
        if interval.is_zero() || self.cached.len() != self.target.len() {
            return self.snap();
        }

        let fraction = step_time.as_secs_f32() / interval.as_secs_f32();
        if fraction >= 1.0 {
            return self.snap();
        }
        blend_into(&mut self.current, &self.cached, &self.target, fraction);
        FrameBlend::Blended(fraction)
    }
}

pub fn blend_into(out: &mut Vec<f32>, cached: &[f32], target: &[f32], fraction: f32) {
    out.clear();
    out.extend(
        cached
            .iter()
            .zip(target)
            .map(|(&from, &to)| from + (to - from) * fraction),
    );
}

impl GraphState {
    pub fn advance_frame(&mut self, now: Instant) -> FrameBlend {
        let step_time = self
            .perf
            .last_tick_at
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        let interval = self.perf.tick_interval;
        let ended = self.channel.ended;
        self.interp
            .step(self.model.node_count(), step_time, interval, ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primed(cached: Vec<f32>, target: Vec<f32>) -> InterpolationState {
        let mut st = InterpolationState::default();
        st.prime(cached);
        st.push_target(target);
        st
    }

    const BIG: usize = INTERPOLATION_THRESHOLD;

    #[test]
    fn zero_step_yields_cached_exactly() {
        let mut st = primed(vec![0.1, -3.7, 12.25, 9.0], vec![5.3, 2.2, -4.4, 9.1]);
        let out = st.step(BIG, Duration::ZERO, Duration::from_millis(40), false);
        assert_eq!(out, FrameBlend::Blended(0.0));
        assert_eq!(st.current, vec![0.1, -3.7, 12.25, 9.0]);
    }

    #[test]
    fn full_step_yields_target_exactly() {
        let mut st = primed(vec![0.1, -3.7, 12.25, 9.0], vec![5.3, 2.2, -4.4, 9.1]);
        let interval = Duration::from_millis(40);
        let out = st.step(BIG, interval, interval, false);
        assert_eq!(out, FrameBlend::Snapped);
        assert_eq!(st.current, st.target);
    }

    #[test]
    fn halfway_blends_linearly_without_overshoot() {
        let mut st = primed(vec![0.0, 10.0], vec![10.0, 0.0]);
        st.step(BIG, Duration::from_millis(20), Duration::from_millis(40), false);
        assert_eq!(st.current, vec![5.0, 5.0]);

        st.step(BIG, Duration::from_millis(400), Duration::from_millis(40), false);
        assert_eq!(st.current, vec![10.0, 0.0]);
    }

    #[test]
    fn small_graphs_render_latest_target_directly() {
        let mut st = primed(vec![0.0, 0.0], vec![8.0, 8.0]);
        let out = st.step(10, Duration::ZERO, Duration::from_millis(40), false);
        assert_eq!(out, FrameBlend::Snapped);
        assert_eq!(st.current, vec![8.0, 8.0]);
    }

    #[test]
    fn zero_interval_snaps() {
        let mut st = primed(vec![1.0, 1.0], vec![2.0, 2.0]);
        let out = st.step(BIG, Duration::from_millis(5), Duration::ZERO, false);
        assert_eq!(out, FrameBlend::Snapped);
        assert_eq!(st.current, vec![2.0, 2.0]);
    }

    #[test]
    fn ended_simulation_snaps_to_final_target() {
        let mut st = primed(vec![0.0, 0.0], vec![4.0, 4.0]);
        st.step(BIG, Duration::from_millis(10), Duration::from_millis(40), false);
        assert_ne!(st.current, st.target);

        st.push_target(vec![6.0, 6.0]);
        let out = st.step(BIG, Duration::ZERO, Duration::from_millis(40), true);
        assert_eq!(out, FrameBlend::Snapped);
        assert_eq!(st.current, vec![6.0, 6.0]);
    }

    #[test]
    fn push_target_slides_previous_target_into_cache() {
        let mut st = InterpolationState::default();
        st.prime(vec![1.0, 1.0]);
        st.push_target(vec![2.0, 2.0]);
        st.push_target(vec![3.0, 3.0]);
        assert_eq!(st.cached, vec![2.0, 2.0]);
        assert_eq!(st.target, vec![3.0, 3.0]);
        assert_eq!(st.current, vec![1.0, 1.0]);
    }

    #[test]
    fn unprimed_state_renders_nothing() {
        let mut st = InterpolationState::default();
        assert_eq!(
            st.step(BIG, Duration::ZERO, Duration::ZERO, false),
            FrameBlend::Empty
        );
        assert!(st.current.is_empty());
    }
}
