use bevy::prelude::{Query, Res, With};
use bevy::window::{PrimaryWindow, Window};
use bevy_egui::{egui, EguiContexts};

use crate::graph::GraphState;

pub fn render_tooltip(
    ctx: &egui::Context,
    id: &str,
    pos: egui::Pos2,
    lines: impl IntoIterator<Item = String>,
) {
    egui::Area::new(egui::Id::new(id))
        .order(egui::Order::Tooltip)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            ui.group(|ui| {
                for line in lines {
                    ui.label(line);
                }
            });
        });
}

pub fn hover_tooltip(
    mut contexts: EguiContexts,
    windows: Query<&Window, With<PrimaryWindow>>,
    st: Res<GraphState>,
) {
    let Some(hovered) = st.pointer.hovered.as_ref() else {
        return;
    };
    let Some(cursor) = windows.get_single().ok().and_then(|w| w.cursor_position()) else {
        return;
    };
    let Some(info) = st.model.info(hovered) else {
        return;
    };

    let mut lines = vec![info.name.clone().unwrap_or_else(|| hovered.to_string())];
    if info.name.is_some() {
        lines.push(format!("id: {hovered}"));
    }
    if let Some(set) = st.highlight.as_ref().filter(|set| &set.center == hovered) {
        lines.push(format!(
            "{} neighbours, {} links",
            set.neighbors.len(),
            set.links.len()
        ));
    }

    let pos = egui::pos2(cursor.x + 14.0, cursor.y + 14.0);
    render_tooltip(contexts.ctx_mut(), "hover_tooltip", pos, lines);
}
