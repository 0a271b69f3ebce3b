pub mod arrows;
pub mod channel;
pub mod cull;
pub mod frame;
pub mod highlight;
pub mod interp;
pub mod perf;
pub mod render_loop;
pub mod state;
pub mod texture;

pub use frame::{drive_frame, sync_update_mode};
pub use state::{GraphState, Phase};
