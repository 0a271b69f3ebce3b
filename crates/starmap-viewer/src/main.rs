mod app;
mod avatar;
mod graph;
mod render;
mod ui;
mod util;

use anyhow::{Context, Result};
use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_egui::EguiPlugin;
use clap::Parser;
use starmap_core::{GraphInput, IndexedModel};
use std::path::{Path, PathBuf};

use crate::app::resources::{AvatarLink, WorkerLink};
use crate::app::StarmapViewerPlugin;
use crate::avatar::AvatarSettings;
use crate::graph::GraphState;
use crate::util::config::{self, ViewerConfig};

#[derive(Debug, Parser)]
#[command(name = "starmap-viewer", version, about = "Force-directed graph viewer")]
struct Cli {
    /// Graph document: `{"nodes": [...], "links": [...]}`.
    graph: PathBuf,
    #[arg(long)]
    width: Option<f32>,
    #[arg(long)]
    height: Option<f32>,
    /// Hide the performance overlay.
    #[arg(long)]
    no_hud: bool,
    /// Draw arrow heads once layout settles.
    #[arg(long)]
    arrows: bool,
    /// Write the effective configuration back to the config file.
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn apply_to(&self, cfg: &mut ViewerConfig) {
        if let Some(width) = self.width {
            cfg.width = width;
        }
        if let Some(height) = self.height {
            cfg.height = height;
        }
        if self.no_hud {
            cfg.show_hud = false;
        }
        if self.arrows {
            cfg.show_arrow = true;
        }
    }
}

fn load_graph(path: &Path) -> Result<IndexedModel> {
    let bytes = std::fs::read(path).with_context(|| format!("read graph {}", path.display()))?;
    let input =
        GraphInput::from_json(&bytes).with_context(|| format!("parse graph {}", path.display()))?;
    input
        .index()
        .with_context(|| format!("index graph {}", path.display()))
}

fn avatar_settings(cfg: &ViewerConfig, graph: &Path) -> AvatarSettings {
    let avatar_dir = cfg.avatar_dir.clone().unwrap_or_else(|| {
        graph
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    AvatarSettings {
        avatar_dir,
        default_avatar: cfg.default_avatar.clone(),
        rounded: cfg.rounded_image,
        max_concurrent: cfg.max_concurrent_fetches.max(1),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load_or_default();
    cli.apply_to(&mut cfg);
    if cli.save_config {
        let path = config::save(&cfg)?;
        println!("saved viewer config to {}", path.display());
    }

    let model = load_graph(&cli.graph)?;
    let worker = starmap_sim::spawn_worker()?;
    let loader = avatar::spawn_loader(avatar_settings(&cfg, &cli.graph))?;

    let mut st = GraphState::new(model);
    st.apply_viewer_config(&cfg);

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Starmap".into(),
            resolution: WindowResolution::new(cfg.width, cfg.height),
            ..default()
        }),
        ..default()
    }))
    .add_plugins(EguiPlugin)
    .insert_resource(st)
    .insert_resource(WorkerLink(worker))
    .insert_resource(AvatarLink(loader))
    .add_plugins(StarmapViewerPlugin);
    let exit = app.run();
    tracing::info!(?exit, "viewer closed");
    Ok(())
}
