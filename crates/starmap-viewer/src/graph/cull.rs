use starmap_core::TextureState;
use std::time::{Duration, Instant};

use crate::graph::state::{CameraState, GraphState, TextureRequest};

pub const VISIBILITY_COOLDOWN: Duration = Duration::from_secs(1);
pub const ZOOM_GATE_Z: f32 = 3000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl ViewportRect {
    /// Inclusive on every edge.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.bottom && y <= self.top
    }
}

pub fn viewport_rect(camera: &CameraState) -> ViewportRect {
    let half_height = camera.z * (camera.fov_degrees.to_radians() * 0.5).tan();
    let half_width = half_height * camera.aspect;
    ViewportRect {
        left: camera.x - half_width,
        right: camera.x + half_width,
        top: camera.y + half_height,
        bottom: camera.y - half_height,
    }
}

pub fn visible_nodes(rect: &ViewportRect, positions: &[f32]) -> Vec<usize> {
    positions
        .chunks_exact(2)
        .enumerate()
        .filter(|(_, p)| rect.contains(p[0], p[1]))
        .map(|(index, _)| index)
        .collect()
}

#[derive(Debug, Default)]
pub struct VisibilityThrottle {
    pending_until: Option<Instant>,
}

impl VisibilityThrottle {
    pub fn is_pending(&self) -> bool {
        self.pending_until.is_some()
    }

    pub fn request(&mut self, now: Instant) -> bool {
        if self.pending_until.is_some() {
            return false;
        }
        self.pending_until = Some(now + VISIBILITY_COOLDOWN);
        true
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending_until {
            Some(due) if now >= due => {
                self.pending_until = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityPass {
    ZoomGated,
    Ran {
        visible: usize,
        requested: usize,
        deferred: usize,
    },
}

impl GraphState {
    pub fn request_visibility(&mut self, now: Instant) -> bool {
        if !self.channel.interaction_armed {
            return false;
        }
        self.cull.throttle.request(now)
    }

    pub fn poll_visibility(&mut self, now: Instant) -> Option<VisibilityPass> {
        if !self.cull.throttle.poll(now) {
            return None;
        }
        Some(self.run_visibility_pass())
    }

    pub fn run_visibility_pass(&mut self) -> VisibilityPass {
        if self.camera.z > ZOOM_GATE_Z {
            tracing::trace!(z = self.camera.z, "visibility pass skipped by zoom gate");
            return VisibilityPass::ZoomGated;
        }

        let rect = viewport_rect(&self.camera);
        let indices = visible_nodes(&rect, &self.interp.target);
        self.cull.rect = Some(rect);
        self.cull.passes += 1;
        self.cull.visible.clear();

        let mut budget = self
            .cfg
            .max_concurrent_fetches
            .saturating_sub(self.fetch.in_flight);
        let mut requested = 0;
        let mut deferred = 0;

        for index in &indices {
            let Some(id) = self.model.id_at(*index) else {
                continue;
            };
            let id = id.clone();
            let Some(info) = self.model.info_mut(&id) else {
                continue;
            };
            if info.texture == TextureState::Unloaded {
                if budget == 0 {
                    deferred += 1;
                } else {
                    info.texture = TextureState::Loading;
                    budget -= 1;
                    requested += 1;
                    self.fetch.outbox.push(TextureRequest {
                        id: id.clone(),
                        image: info.image.clone(),
                    });
                }
            }
            self.cull.visible.push(id);
        }

        self.fetch.in_flight += requested;
        self.cull.deferred = deferred;
        tracing::debug!(
            visible = indices.len(),
            requested,
            deferred,
            in_flight = self.fetch.in_flight,
            "visibility pass"
        );
        VisibilityPass::Ran {
            visible: indices.len(),
            requested,
            deferred,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::state::test_support::with_images;
    use starmap_core::NodeId;

    fn camera(z: f32) -> CameraState {
        CameraState {
            x: 0.0,
            y: 0.0,
            z,
            fov_degrees: 90.0,
            aspect: 2.0,
        }
    }

    #[test]
    fn rect_follows_fov_formula() {
        let rect = viewport_rect(&camera(100.0));
        assert!((rect.top - 100.0).abs() < 1e-3);
        assert!((rect.bottom + 100.0).abs() < 1e-3);
        assert!((rect.right - 200.0).abs() < 1e-3);
        assert!((rect.left + 200.0).abs() < 1e-3);
    }

    #[test]
    fn bounds_are_inclusive_and_epsilon_outside_is_excluded() {
        let rect = ViewportRect {
            left: -10.0,
            right: 10.0,
            top: 5.0,
            bottom: -5.0,
        };
        let positions = [
            -10.0, 5.0, // corner
            10.0, -5.0, // opposite corner
            10.001, 0.0, // just right
            0.0, -5.001, // just below
            0.0, 0.0,
        ];
        assert_eq!(visible_nodes(&rect, &positions), vec![0, 1, 4]);
    }

    #[test]
    fn throttle_drops_requests_while_pending() {
        let t0 = Instant::now();
        let mut throttle = VisibilityThrottle::default();

        assert!(throttle.request(t0));
        assert!(!throttle.request(t0 + Duration::from_millis(200)));
        assert!(!throttle.poll(t0 + Duration::from_millis(999)));
        assert!(throttle.poll(t0 + VISIBILITY_COOLDOWN));
        assert!(!throttle.poll(t0 + Duration::from_secs(5)));

        assert!(throttle.request(t0 + Duration::from_secs(5)));
    }

    fn spread(st: &mut GraphState) {
        let positions: Vec<f32> = (0..st.model.node_count())
            .flat_map(|i| [i as f32, 0.0])
            .collect();
        st.interp.prime(positions);
        st.channel.interaction_armed = true;
    }

    #[test]
    fn zoom_gate_skips_pass() {
        let mut st = with_images(4);
        spread(&mut st);
        st.camera = camera(ZOOM_GATE_Z + 1.0);
        assert_eq!(st.run_visibility_pass(), VisibilityPass::ZoomGated);
        assert!(st.fetch.outbox.is_empty());

        st.camera = camera(ZOOM_GATE_Z);
        assert!(matches!(st.run_visibility_pass(), VisibilityPass::Ran { .. }));
    }

    #[test]
    fn pass_respects_fetch_budget_and_never_refetches() {
        let mut st = with_images(5);
        spread(&mut st);
        st.camera = camera(100.0);
        st.cfg.max_concurrent_fetches = 2;

        let first = st.run_visibility_pass();
        assert_eq!(
            first,
            VisibilityPass::Ran {
                visible: 5,
                requested: 2,
                deferred: 3
            }
        );
        assert_eq!(st.fetch.in_flight, 2);
        let ids: Vec<&NodeId> = st.fetch.outbox.iter().map(|r| &r.id).collect();
        assert_eq!(ids, vec![&NodeId::new("n0"), &NodeId::new("n1")]);
        assert_eq!(st.fetch.outbox[0].image.as_deref(), Some("n0.png"));

        let second = st.run_visibility_pass();
        assert_eq!(
            second,
            VisibilityPass::Ran {
                visible: 5,
                requested: 0,
                deferred: 3
            }
        );

        st.model.info_mut(&NodeId::new("n2")).expect("n2").texture = TextureState::Failed;
        st.fetch.in_flight = 0;
        st.fetch.outbox.clear();
        st.run_visibility_pass();
        let ids: Vec<&NodeId> = st.fetch.outbox.iter().map(|r| &r.id).collect();
        assert_eq!(ids, vec![&NodeId::new("n3"), &NodeId::new("n4")]);
    }

    #[test]
    fn pass_tests_target_positions_not_the_blended_frame() {
        let mut st = with_images(2);
        st.channel.interaction_armed = true;
        // n0 moves into view, n1 moves out of it
        st.interp.prime(vec![500.0, 0.0, 0.0, 0.0]);
        st.interp.push_target(vec![0.0, 0.0, 500.0, 0.0]);
        st.interp.current = vec![500.0, 0.0, 0.0, 0.0];
        st.camera = camera(10.0);

        let pass = st.run_visibility_pass();

        assert_eq!(
            pass,
            VisibilityPass::Ran {
                visible: 1,
                requested: 1,
                deferred: 0
            }
        );
        assert_eq!(st.cull.visible, vec![NodeId::new("n0")]);
        assert_eq!(st.fetch.outbox[0].id, NodeId::new("n0"));
        assert_eq!(st.cull.rect, Some(viewport_rect(&st.camera)));
        let info = st.model.info(&NodeId::new("n1")).expect("n1");
        assert_eq!(info.texture, TextureState::Unloaded);
    }

    #[test]
    fn offscreen_nodes_stay_unloaded() {
        let mut st = with_images(3);
        spread(&mut st);
        st.camera = CameraState {
            x: 500.0,
            ..camera(10.0)
        };
        st.run_visibility_pass();
        assert!(st.fetch.outbox.is_empty());
        assert!(st.cull.visible.is_empty());
        let info = st.model.info(&NodeId::new("n0")).expect("n0");
        assert_eq!(info.texture, TextureState::Unloaded);
    }

    #[test]
    fn requests_ignored_until_interaction_is_armed() {
        let mut st = with_images(1);
        let t0 = Instant::now();
        assert!(!st.request_visibility(t0));
        st.channel.interaction_armed = true;
        assert!(st.request_visibility(t0));
        assert!(st.poll_visibility(t0).is_none());
        assert!(st.poll_visibility(t0 + VISIBILITY_COOLDOWN).is_some());
    }
}
