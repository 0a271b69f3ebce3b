use bevy::prelude::{Entity, Handle, Resource, StandardMaterial};
use starmap_core::NodeId;
use starmap_sim::WorkerHandle;
use std::collections::HashMap;

use crate::avatar::AvatarLoader;

#[derive(Resource)]
pub struct WorkerLink(pub WorkerHandle);

#[derive(Resource)]
pub struct AvatarLink(pub AvatarLoader);

#[derive(Resource, Default)]
pub struct AvatarTextures {
    pub materials: HashMap<NodeId, Handle<StandardMaterial>>,
    pub sprites: HashMap<NodeId, Entity>,
}
