pub mod layout;
mod quadtree;
pub mod worker;

pub use layout::{Layout, LayoutConfig};
pub use worker::{spawn_worker, WorkerHandle};
