use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::graph::GraphState;
use crate::ui::PANEL_W;

pub fn stat_panel(mut contexts: EguiContexts, st: Res<GraphState>) {
    if !st.cfg.show_stat_table {
        return;
    }
    egui::SidePanel::right("stats")
        .exact_width(PANEL_W)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Starmap");
            ui.label(format!("nodes: {}", st.model.node_count()));
            ui.label(format!("links: {}", st.model.link_count()));
            ui.separator();

            ui.label("Top sources by outgoing links");
            egui::Grid::new("degree_ranking")
                .striped(true)
                .num_columns(3)
                .show(ui, |ui| {
                    for (rank, entry) in st.model.degree_ranking.iter().enumerate() {
                        let name = st
                            .model
                            .info(&entry.id)
                            .and_then(|info| info.name.as_deref())
                            .unwrap_or(entry.id.as_str());
                        let highlighted = st
                            .highlight
                            .as_ref()
                            .is_some_and(|set| set.contains_node(&entry.id));
                        ui.label(format!("{}", rank + 1));
                        if highlighted {
                            ui.strong(name);
                        } else {
                            ui.label(name);
                        }
                        ui.label(entry.out_degree.to_string());
                        ui.end_row();
                    }
                });
        });
}
