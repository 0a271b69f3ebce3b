use bevy::ecs::event::Events;
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use crossbeam_channel::{Receiver, TryRecvError};
use starmap_core::FromWorker;
use std::time::Instant;

use crate::app::resources::{AvatarLink, AvatarTextures, WorkerLink};
use crate::avatar::{AvatarJob, AvatarRaster, ImageLoadError};
use crate::graph::{GraphState, Phase};

pub mod resources;

/// Both links are shut down when `AppExit` is sent.
pub struct StarmapViewerPlugin;

impl Plugin for StarmapViewerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AvatarTextures>()
            .add_systems(
                Startup,
                (crate::render::setup_scene, start_layout).chain(),
            )
            .add_systems(
                Update,
                (
                    pump_worker,
                    collect_avatars,
                    crate::render::camera_controls,
                    crate::render::sync_camera_state,
                    crate::render::track_pointer,
                    crate::graph::drive_frame,
                    dispatch_avatars,
                    crate::render::draw_graph,
                    crate::render::sync_avatar_sprites,
                    crate::ui::hud_overlay,
                    crate::ui::stat_panel,
                    crate::ui::hover_tooltip,
                    crate::graph::sync_update_mode,
                )
                    .chain(),
            )
            .add_systems(Last, shutdown_on_exit);
    }
}

fn start_layout(mut st: ResMut<GraphState>, link: Option<Res<WorkerLink>>) {
    let Some(link) = link else {
        return;
    };
    if st.phase != Phase::Idle {
        return;
    }
    let start = st.start_simulation(Instant::now());
    if link.0.commands.send(start).is_err() {
        tracing::warn!("layout worker is gone before start");
        st.on_worker_disconnected();
    }
}

fn pump_worker(mut st: ResMut<GraphState>, link: Option<Res<WorkerLink>>) {
    if let Some(link) = link {
        drain_worker_events(&mut st, &link.0.events, Instant::now);
    }
}

// Each message is stamped when it is taken off the channel so that ticks
// drained in the same frame keep distinct arrival times.
fn drain_worker_events(
    st: &mut GraphState,
    events: &Receiver<FromWorker>,
    mut clock: impl FnMut() -> Instant,
) {
    loop {
        match events.try_recv() {
            Ok(msg) => {
                st.apply(msg, clock());
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                st.on_worker_disconnected();
                break;
            }
        }
    }
}

fn dispatch_avatars(mut st: ResMut<GraphState>, link: Option<Res<AvatarLink>>) {
    let Some(link) = link else {
        return;
    };
    dispatch_requests(&mut st, |job| link.0.submit(job), Instant::now());
}

fn dispatch_requests(
    st: &mut GraphState,
    mut submit: impl FnMut(AvatarJob) -> bool,
    now: Instant,
) {
    for request in st.drain_texture_requests() {
        let id = request.id.clone();
        let submitted = submit(AvatarJob {
            id: request.id,
            image: request.image,
        });
        if !submitted {
            tracing::warn!(%id, "avatar loader is gone");
            st.finish_texture(&id, Err(ImageLoadError::LoaderStopped), now);
        }
    }
}

fn collect_avatars(
    mut st: ResMut<GraphState>,
    link: Option<Res<AvatarLink>>,
    mut textures: ResMut<AvatarTextures>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(link) = link else {
        return;
    };
    let now = Instant::now();
    for result in link.0.results.try_iter() {
        match result.outcome {
            Ok(raster) => {
                let image = images.add(raster_image(raster));
                let material = materials.add(StandardMaterial {
                    base_color_texture: Some(image),
                    unlit: true,
                    alpha_mode: AlphaMode::Blend,
                    ..default()
                });
                textures.materials.insert(result.id.clone(), material);
                st.finish_texture(&result.id, Ok(()), now);
            }
            Err(err) => st.finish_texture(&result.id, Err(err), now),
        }
    }
}

fn shutdown_on_exit(world: &mut World) {
    let exiting = world
        .get_resource::<Events<AppExit>>()
        .is_some_and(|events| !events.is_empty());
    if exiting {
        shutdown_links(world);
    }
}

fn shutdown_links(world: &mut World) {
    if let Some(WorkerLink(worker)) = world.remove_resource::<WorkerLink>() {
        worker.shutdown();
        tracing::debug!("layout worker joined");
    }
    if let Some(AvatarLink(loader)) = world.remove_resource::<AvatarLink>() {
        loader.shutdown();
        tracing::debug!("avatar loader joined");
    }
}

fn raster_image(raster: AvatarRaster) -> Image {
    Image::new(
        Extent3d {
            width: raster.size,
            height: raster.size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        raster.pixels,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}
