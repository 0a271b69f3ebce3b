use bevy::prelude::{Res, ResMut, Time};
use bevy::winit::{UpdateMode, WinitSettings};
use std::time::{Duration, Instant};

use crate::graph::state::GraphState;

pub fn drive_frame(time: Res<Time>, mut st: ResMut<GraphState>) {
    let now = Instant::now();
    st.perf.record_frame(time.delta_seconds());

    let changes = st.tick_lifecycle(now);
    if changes.finished {
        tracing::info!(
            ticks = st.perf.ticks_received,
            arrows = st.arrows.len(),
            "layout settled"
        );
    }

    if st.render.take_pending().is_some() {
        st.advance_frame(now);
        st.render.schedule();
    }

    st.poll_visibility(now);
}

pub fn sync_update_mode(st: Res<GraphState>, mut winit: ResMut<WinitSettings>) {
    let wanted = if st.render.is_running() {
        UpdateMode::Continuous
    } else {
        UpdateMode::reactive_low_power(Duration::from_secs(1))
    };
    if winit.focused_mode != wanted {
        winit.focused_mode = wanted;
        winit.unfocused_mode = wanted;
    }
}
