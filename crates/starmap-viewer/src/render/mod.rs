pub mod camera;
pub mod scene;

pub use camera::{camera_controls, setup_scene, sync_camera_state};
pub use scene::{draw_graph, sync_avatar_sprites, track_pointer};
