use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;
use std::time::Instant;

use crate::graph::GraphState;

const FAR_PLANE: f32 = 100_000.0;
const MIN_Z: f32 = 10.0;
const MAX_Z: f32 = FAR_PLANE * 0.9;
const ZOOM_STEP: f32 = 1.15;

#[derive(Component)]
pub struct GraphCamera;

pub fn setup_scene(
    mut commands: Commands,
    st: Res<GraphState>,
    mut gizmo_store: ResMut<GizmoConfigStore>,
) {
    let (gizmos, _) = gizmo_store.config_mut::<DefaultGizmoConfigGroup>();
    gizmos.line_width = st.cfg.line_width.max(1.0);

    commands.spawn((
        Camera3dBundle {
            projection: PerspectiveProjection {
                fov: st.camera.fov_degrees.to_radians(),
                far: FAR_PLANE,
                ..default()
            }
            .into(),
            camera: Camera {
                clear_color: ClearColorConfig::Custom(Color::srgb(0.04, 0.05, 0.08)),
                ..default()
            },
            transform: Transform::from_xyz(st.camera.x, st.camera.y, st.camera.z),
            ..default()
        },
        GraphCamera,
    ));
}

#[allow(clippy::too_many_arguments)]
pub fn camera_controls(
    mut wheel: EventReader<MouseWheel>,
    mut motion: EventReader<MouseMotion>,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut contexts: EguiContexts,
    mut cam_q: Query<&mut Transform, With<GraphCamera>>,
    mut st: ResMut<GraphState>,
) {
    let over_ui = contexts.ctx_mut().is_pointer_over_area();
    let Ok(mut tf) = cam_q.get_single_mut() else {
        return;
    };
    let mut changed = false;

    for ev in wheel.read() {
        if over_ui {
            continue;
        }
        let lines = match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 40.0,
        };
        tf.translation.z = (tf.translation.z * ZOOM_STEP.powf(-lines)).clamp(MIN_Z, MAX_Z);
        changed = true;
    }

    let drag: Vec2 = motion.read().map(|ev| ev.delta).sum();
    if buttons.pressed(MouseButton::Left) && !over_ui && drag != Vec2::ZERO {
        if let Ok(window) = windows.get_single() {
            let half_fov = st.camera.fov_degrees.to_radians() * 0.5;
            let per_pixel = 2.0 * tf.translation.z * half_fov.tan() / window.height().max(1.0);
            tf.translation.x -= drag.x * per_pixel;
            tf.translation.y += drag.y * per_pixel;
            changed = true;
        }
    }

    if changed {
        let now = Instant::now();
        st.wake(now);
        st.request_visibility(now);
    }
}

pub fn sync_camera_state(
    windows: Query<&Window, With<PrimaryWindow>>,
    cam_q: Query<&Transform, With<GraphCamera>>,
    mut st: ResMut<GraphState>,
) {
    let Ok(tf) = cam_q.get_single() else {
        return;
    };
    let aspect = windows
        .get_single()
        .ok()
        .filter(|w| w.height() > 0.0)
        .map(|w| w.width() / w.height())
        .unwrap_or(st.camera.aspect);

    st.camera.x = tf.translation.x;
    st.camera.y = tf.translation.y;
    st.camera.z = tf.translation.z;
    st.camera.aspect = aspect;
}
