pub mod hud;
pub mod panel;
pub mod tooltips;

pub use hud::hud_overlay;
pub use panel::stat_panel;
pub use tooltips::hover_tooltip;

pub const PANEL_W: f32 = 240.0;
pub const HUD_EDGE_PADDING: f32 = 8.0;
