use bevy::prelude::*;
use bevy::window::{CursorMoved, PrimaryWindow};
use bevy_egui::EguiContexts;
use starmap_core::{Rgba, TextureState};
use std::time::Instant;

use crate::app::resources::AvatarTextures;
use crate::graph::{GraphState, Phase};
use crate::render::camera::GraphCamera;

const LINK_COLOR: Rgba = [0.55, 0.6, 0.7, 0.35];
const NODE_COLOR: Rgba = [0.8, 0.85, 0.95, 0.9];
const DIM_ALPHA: f32 = 0.15;
const ARROW_LENGTH: f32 = 6.0;
const ARROW_HALF_WIDTH: f32 = 2.5;
/// Hover hit area never shrinks below this, in pixels.
const MIN_PICK_RADIUS_PX: f32 = 4.0;
const AVATAR_Z: f32 = 0.5;

#[derive(Component)]
pub struct AvatarSprite {
    pub index: usize,
}

fn color(rgba: Rgba) -> Color {
    Color::srgba(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn dimmed(rgba: Rgba) -> Color {
    Color::srgba(rgba[0], rgba[1], rgba[2], rgba[3] * DIM_ALPHA)
}

pub fn draw_graph(st: Res<GraphState>, mut gizmos: Gizmos) {
    if st.interp.current.is_empty() {
        return;
    }
    let highlight = st.highlight.as_ref();
    let accent = color(st.cfg.highlight_color);

    for (position, link) in st.model.links.iter().enumerate() {
        let (Some(source), Some(target)) = (
            st.model.index_of(&link.source),
            st.model.index_of(&link.target),
        ) else {
            continue;
        };
        let (Some(a), Some(b)) = (st.current_position(source), st.current_position(target)) else {
            continue;
        };
        let base = st
            .model
            .link_info
            .get(position)
            .and_then(|info| info.color)
            .unwrap_or(LINK_COLOR);
        let line_color = match highlight {
            Some(set) if set.contains_link(position) => accent,
            Some(_) => dimmed(base),
            None => color(base),
        };
        gizmos.line(Vec3::new(a.0, a.1, 0.0), Vec3::new(b.0, b.1, 0.0), line_color);
    }

    for node in &st.model.nodes {
        let Some((x, y)) = st.current_position(node.index) else {
            continue;
        };
        let node_color = match highlight {
            Some(set) if set.contains_node(&node.id) => accent,
            Some(_) => dimmed(NODE_COLOR),
            None => color(NODE_COLOR),
        };
        gizmos.circle(Vec3::new(x, y, 0.0), Dir3::Z, st.node_radius(&node.id), node_color);
    }

    if st.cfg.show_arrow && st.phase == Phase::Finished {
        for arrow in &st.arrows {
            let arrow_color = match highlight {
                Some(set) if set.contains_link(arrow.link) => accent,
                Some(_) => dimmed(LINK_COLOR),
                None => color(LINK_COLOR),
            };
            let back = arrow.tip - arrow.direction * ARROW_LENGTH;
            let side = arrow.direction.perp() * ARROW_HALF_WIDTH;
            let tip3 = arrow.tip.extend(0.0);
            gizmos.line(tip3, (back + side).extend(0.0), arrow_color);
            gizmos.line(tip3, (back - side).extend(0.0), arrow_color);
        }
    }
}

pub fn sync_avatar_sprites(
    mut commands: Commands,
    st: Res<GraphState>,
    mut textures: ResMut<AvatarTextures>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut sprites: Query<(&AvatarSprite, &mut Transform)>,
    mut quad: Local<Option<Handle<Mesh>>>,
) {
    let quad = quad
        .get_or_insert_with(|| meshes.add(Rectangle::new(1.0, 1.0)))
        .clone();

    let pending: Vec<_> = textures
        .materials
        .iter()
        .filter(|(id, _)| !textures.sprites.contains_key(*id))
        .map(|(id, material)| (id.clone(), material.clone()))
        .collect();
    for (id, material) in pending {
        let Some(info) = st.model.info(&id) else {
            continue;
        };
        if info.texture != TextureState::Loaded {
            continue;
        }
        let diameter = st.node_radius(&id) * 2.0;
        let (x, y) = st.current_position(info.index).unwrap_or_default();
        let entity = commands
            .spawn((
                PbrBundle {
                    mesh: quad.clone(),
                    material,
                    transform: Transform::from_xyz(x, y, AVATAR_Z)
                        .with_scale(Vec3::new(diameter, diameter, 1.0)),
                    ..default()
                },
                AvatarSprite { index: info.index },
            ))
            .id();
        textures.sprites.insert(id, entity);
    }

    if !st.render.is_running() {
        return;
    }
    for (sprite, mut tf) in &mut sprites {
        if let Some((x, y)) = st.current_position(sprite.index) {
            tf.translation.x = x;
            tf.translation.y = y;
        }
    }
}

pub fn track_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    cam_q: Query<(&Camera, &GlobalTransform), With<GraphCamera>>,
    mut moved: EventReader<CursorMoved>,
    mut contexts: EguiContexts,
    mut st: ResMut<GraphState>,
) {
    let now = Instant::now();
    let Ok(window) = windows.get_single() else {
        return;
    };
    let cursor = window.cursor_position();
    let over_panel = contexts.ctx_mut().is_pointer_over_area();
    let inside_chart = cursor.is_some() && !over_panel;
    st.set_pointer(inside_chart, over_panel, now);

    let cursor_moved = moved.read().count() > 0;
    let Some(cursor) = cursor.filter(|_| inside_chart) else {
        st.set_hovered(None);
        return;
    };
    if !cursor_moved || !st.channel.interaction_armed {
        return;
    }
    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };

    let half_fov = st.camera.fov_degrees.to_radians() * 0.5;
    let pixels_per_unit = window.height() / (2.0 * st.camera.z * half_fov.tan()).max(f32::EPSILON);

    let candidates = st.model.nodes.iter().filter_map(|node| {
        let (x, y) = st.current_position(node.index)?;
        let screen = camera.world_to_viewport(cam_tf, Vec3::new(x, y, 0.0))?;
        let radius = (st.node_radius(&node.id) * pixels_per_unit).max(MIN_PICK_RADIUS_PX);
        Some((node.index, screen, radius))
    });
    let picked = pick_nearest(candidates, cursor)
        .and_then(|index| st.model.id_at(index))
        .cloned();
    st.set_hovered(picked);
}

pub fn pick_nearest(
    candidates: impl IntoIterator<Item = (usize, Vec2, f32)>,
    cursor: Vec2,
) -> Option<usize> {
    candidates
        .into_iter()
        .filter_map(|(index, screen, radius)| {
            let distance = screen.distance(cursor);
            (distance <= radius).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
