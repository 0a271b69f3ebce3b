use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::graph::{GraphState, Phase};
use crate::ui::HUD_EDGE_PADDING;

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::Layouting => "layouting",
        Phase::Settling => "settling",
        Phase::Finished => "finished",
    }
}

pub fn hud_overlay(mut contexts: EguiContexts, st: Res<GraphState>) {
    if !st.cfg.show_hud {
        return;
    }
    let ctx = contexts.ctx_mut();
    let screen = ctx.screen_rect();

    egui::Area::new("hud".into())
        .order(egui::Order::Foreground)
        .fixed_pos(egui::pos2(
            screen.min.x + HUD_EDGE_PADDING,
            screen.min.y + HUD_EDGE_PADDING,
        ))
        .show(ctx, |ui| {
            ui.group(|ui| {
                ui.label(format!("FPS: {:.0}", st.perf.fps));
                ui.label(format!(
                    "Layout: {} ({:.0}%)",
                    phase_label(st.phase),
                    st.perf.progress * 100.0
                ));
                ui.label(format!(
                    "Tick {} every {:.1} ms",
                    st.perf.current_tick,
                    st.perf.tick_interval.as_secs_f64() * 1000.0
                ));
                ui.label(format!("Elapsed: {:.2} s", st.perf.elapsed.as_secs_f64()));
                ui.label(format!(
                    "Visible: {} / {} nodes",
                    st.cull.visible.len(),
                    st.model.node_count()
                ));
                if let Some(rect) = st.cull.rect {
                    ui.label(format!(
                        "Viewport: x {:.0}..{:.0}, y {:.0}..{:.0}",
                        rect.left, rect.right, rect.bottom, rect.top
                    ));
                }
                ui.label(format!(
                    "Avatars: {} loading, {} loaded, {} failed",
                    st.fetch.in_flight, st.fetch.loaded, st.fetch.failed
                ));
                ui.label(format!(
                    "Frames: {}, visibility passes: {}",
                    st.render.frames(),
                    st.cull.passes
                ));
                if !st.render.is_running() {
                    ui.label("Render loop idle");
                }
                if st.channel.disconnected && !st.channel.ended {
                    ui.colored_label(egui::Color32::YELLOW, "Layout worker stopped early");
                }
            });
        });
}
