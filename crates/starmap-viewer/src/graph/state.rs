use bevy::prelude::Resource;
use starmap_core::{curves, IndexedModel, NodeId, Rgba};
use std::time::Instant;

use crate::graph::arrows::Arrow;
use crate::graph::cull::{ViewportRect, VisibilityThrottle};
use crate::graph::highlight::HighlightSet;
use crate::graph::interp::InterpolationState;
use crate::graph::perf::PerfTracker;
use crate::graph::render_loop::RenderLoop;
use crate::util::config::ViewerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Layouting,
    Settling,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub fov_degrees: f32,
    pub aspect: f32,
}

impl CameraState {
    pub const DEFAULT_FOV_DEGREES: f32 = 45.0;

    pub fn for_node_count(node_count: usize, aspect: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: curves::camera_distance(node_count) as f32,
            fov_degrees: Self::DEFAULT_FOV_DEGREES,
            aspect,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PointerState {
    pub inside_chart: bool,
    pub over_panel: bool,
    pub hovered: Option<NodeId>,
}

impl PointerState {
    pub fn is_outside(&self) -> bool {
        !self.inside_chart && !self.over_panel
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChannelState {
    pub last_tick: u32,
    pub ended: bool,
    pub disconnected: bool,
    /// Hover highlight and visibility passes stay off until `end`.
    pub interaction_armed: bool,
    pub settle_at: Option<Instant>,
    pub idle_stop_at: Option<Instant>,
    pub dropped: u64,
}

#[derive(Debug, Default)]
pub struct CullState {
    pub throttle: VisibilityThrottle,
    pub rect: Option<ViewportRect>,
    pub visible: Vec<NodeId>,
    /// Visible nodes left `Unloaded` by the fetch budget on the last pass.
    pub deferred: usize,
    pub passes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRequest {
    pub id: NodeId,
    pub image: Option<String>,
}

#[derive(Debug, Default)]
pub struct FetchState {
    pub outbox: Vec<TextureRequest>,
    pub in_flight: usize,
    pub loaded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct CfgState {
    pub node_size: f32,
    pub line_width: f32,
    pub show_arrow: bool,
    pub highlight_color: Rgba,
    pub show_stat_table: bool,
    pub show_hud: bool,
    pub rounded_image: bool,
    pub max_concurrent_fetches: usize,
}

impl Default for CfgState {
    fn default() -> Self {
        let cfg = ViewerConfig::default();
        Self {
            node_size: cfg.node_size,
            line_width: cfg.line_width,
            show_arrow: cfg.show_arrow,
            highlight_color: cfg.highlight_color,
            show_stat_table: cfg.show_stat_table,
            show_hud: cfg.show_hud,
            rounded_image: cfg.rounded_image,
            max_concurrent_fetches: cfg.max_concurrent_fetches,
        }
    }
}

#[derive(Resource)]
pub struct GraphState {
    pub model: IndexedModel,
    pub phase: Phase,
    pub interp: InterpolationState,
    pub perf: PerfTracker,
    pub render: RenderLoop,
    pub camera: CameraState,
    pub pointer: PointerState,
    pub highlight: Option<HighlightSet>,
    pub channel: ChannelState,
    pub cull: CullState,
    pub fetch: FetchState,
    pub arrows: Vec<Arrow>,
    pub cfg: CfgState,
}

impl GraphState {
    pub fn new(model: IndexedModel) -> Self {
        let camera = CameraState::for_node_count(model.node_count(), 16.0 / 9.0);
        Self {
            model,
            phase: Phase::Idle,
            interp: InterpolationState::default(),
            perf: PerfTracker::default(),
            render: RenderLoop::default(),
            camera,
            pointer: PointerState::default(),
            highlight: None,
            channel: ChannelState::default(),
            cull: CullState::default(),
            fetch: FetchState::default(),
            arrows: Vec::new(),
            cfg: CfgState::default(),
        }
    }

    pub fn apply_viewer_config(&mut self, cfg: &ViewerConfig) {
        self.cfg.node_size = cfg.node_size;
        self.cfg.line_width = cfg.line_width;
        self.cfg.show_arrow = cfg.show_arrow;
        self.cfg.highlight_color = cfg.highlight_color;
        self.cfg.show_stat_table = cfg.show_stat_table;
        self.cfg.show_hud = cfg.show_hud;
        self.cfg.rounded_image = cfg.rounded_image;
        self.cfg.max_concurrent_fetches = cfg.max_concurrent_fetches.max(1);
        if cfg.height > 0.0 {
            self.camera.aspect = cfg.width / cfg.height;
        }
    }

    pub fn current_position(&self, index: usize) -> Option<(f32, f32)> {
        position_at(&self.interp.current, index)
    }

    pub fn target_position(&self, index: usize) -> Option<(f32, f32)> {
        position_at(&self.interp.target, index)
    }

    pub fn node_radius(&self, id: &NodeId) -> f32 {
        let scale = self.model.info(id).map(|info| info.scale).unwrap_or(1.0);
        self.cfg.node_size * scale * 0.5
    }
}

fn position_at(buffer: &[f32], index: usize) -> Option<(f32, f32)> {
    let x = *buffer.get(index * 2)?;
    let y = *buffer.get(index * 2 + 1)?;
    Some((x, y))
}


#[cfg(test)]
mod tests {
    use super::test_support::triangle;
    use super::*;

    #[test]
    fn camera_starts_at_calibrated_distance() {
        let st = triangle();
        let expected = curves::camera_distance(3) as f32;
        assert_eq!(st.camera.z, expected);
        assert_eq!((st.camera.x, st.camera.y), (0.0, 0.0));
        assert_eq!(st.phase, Phase::Idle);
    }

    #[test]
    fn viewer_config_flows_into_state() {
        let mut st = triangle();
        let cfg = ViewerConfig {
            width: 1000.0,
            height: 500.0,
            node_size: 12.0,
            show_arrow: true,
            max_concurrent_fetches: 0,
            ..ViewerConfig::default()
        };
        st.apply_viewer_config(&cfg);

        assert_eq!(st.cfg.node_size, 12.0);
        assert!(st.cfg.show_arrow);
        assert_eq!(st.cfg.max_concurrent_fetches, 1);
        assert_eq!(st.camera.aspect, 2.0);
    }

    #[test]
    fn positions_read_by_index() {
        let mut st = triangle();
        st.interp.prime(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(st.current_position(1), Some((3.0, 4.0)));
        assert_eq!(st.target_position(2), Some((5.0, 6.0)));
        assert_eq!(st.current_position(3), None);
    }
}
