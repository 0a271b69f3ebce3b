use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::{NodeId, RawLink, RawNode, Rgba};

pub const DEGREE_RANKING_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("link #{position} ({from} -> {to}) references unknown source node {from}")]
    UnknownSource {
        position: usize,
        from: NodeId,
        to: NodeId,
    },
    #[error("link #{position} ({from} -> {to}) references unknown target node {to}")]
    UnknownTarget {
        position: usize,
        from: NodeId,
        to: NodeId,
    },
    #[error("graph has {0} nodes, more than a u32 link buffer can address")]
    TooManyNodes(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedNode {
    pub id: NodeId,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub index: usize,
    pub scale: f32,
    pub image: Option<String>,
    pub name: Option<String>,
    pub texture: TextureState,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexedLink {
    pub source: NodeId,
    pub target: NodeId,
}

impl IndexedLink {
    pub fn key(&self) -> String {
        link_key(&self.source, &self.target)
    }
}

// Dedup key. Ids containing `-` can collide; the first link with a key wins.
fn link_key(source: &NodeId, target: &NodeId) -> String {
    format!("{source}-{target}")
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinkInfo {
    pub color: Option<Rgba>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegreeEntry {
    pub id: NodeId,
    pub out_degree: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexedModel {
    pub nodes: Vec<IndexedNode>,
    pub node_info: HashMap<NodeId, NodeInfo>,
    pub links: Vec<IndexedLink>,
    pub link_info: Vec<LinkInfo>,
    pub links_buffer: Vec<u32>,
    pub degree_ranking: Vec<DegreeEntry>,
    adjacency: HashMap<NodeId, Vec<usize>>,
}

impl IndexedModel {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.node_info.get(id).map(|info| info.index)
    }

    pub fn id_at(&self, index: usize) -> Option<&NodeId> {
        self.nodes.get(index).map(|n| &n.id)
    }

    pub fn info(&self, id: &NodeId) -> Option<&NodeInfo> {
        self.node_info.get(id)
    }

    pub fn info_mut(&mut self, id: &NodeId) -> Option<&mut NodeInfo> {
        self.node_info.get_mut(id)
    }

    pub fn link_info_for(&self, source: &NodeId, target: &NodeId) -> Option<&LinkInfo> {
        self.links_for_node(source)
            .find(|(_, link)| &link.source == source && &link.target == target)
            .and_then(|(pos, _)| self.link_info.get(pos))
    }

    pub fn links_for_node<'a>(
        &'a self,
        id: &NodeId,
    ) -> impl Iterator<Item = (usize, &'a IndexedLink)> + 'a {
        self.adjacency
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&pos| (pos, &self.links[pos]))
    }

    pub fn take_links_buffer(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.links_buffer)
    }
}

/// Builds the dense model. Aborts on the first link naming an unknown node.
pub fn index(raw_nodes: &[RawNode], raw_links: &[RawLink]) -> Result<IndexedModel, IndexError> {
    let mut model = IndexedModel::default();

    for raw in raw_nodes {
        if model.node_info.contains_key(&raw.id) {
            continue;
        }
        let index = model.nodes.len();
        model.nodes.push(IndexedNode {
            id: raw.id.clone(),
            index,
        });
        model.node_info.insert(
            raw.id.clone(),
            NodeInfo {
                index,
                scale: raw.scale.unwrap_or(1.0),
                image: raw.image.clone(),
                name: raw.name.clone(),
                texture: TextureState::Unloaded,
            },
        );
    }

    if u32::try_from(model.nodes.len()).is_err() {
        return Err(IndexError::TooManyNodes(model.nodes.len()));
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut out_degree: HashMap<&NodeId, usize> = HashMap::new();
    let mut discovery: Vec<&NodeId> = Vec::new();

    for (position, raw) in raw_links.iter().enumerate() {
        let Some(source_index) = model.index_of(&raw.source) else {
            return Err(IndexError::UnknownSource {
                position,
                from: raw.source.clone(),
                to: raw.target.clone(),
            });
        };
        let Some(target_index) = model.index_of(&raw.target) else {
            return Err(IndexError::UnknownTarget {
                position,
                from: raw.source.clone(),
                to: raw.target.clone(),
            });
        };
        if !seen.insert(link_key(&raw.source, &raw.target)) {
            continue;
        }

        let pos = model.links.len();
        model.links.push(IndexedLink {
            source: raw.source.clone(),
            target: raw.target.clone(),
        });
        model.link_info.push(LinkInfo { color: raw.color });
        model.links_buffer.push(source_index as u32);
        model.links_buffer.push(target_index as u32);

        model
            .adjacency
            .entry(raw.source.clone())
            .or_default()
            .push(pos);
        if raw.target != raw.source {
            model
                .adjacency
                .entry(raw.target.clone())
                .or_default()
                .push(pos);
        }

        let count = out_degree.entry(&raw.source).or_insert(0);
        if *count == 0 {
            discovery.push(&raw.source);
        }
        *count += 1;
    }

    let mut ranking: Vec<DegreeEntry> = discovery
        .into_iter()
        .map(|id| DegreeEntry {
            id: id.clone(),
            out_degree: out_degree[id],
        })
        .collect();
    // stable: equal degrees keep discovery order
    ranking.sort_by(|a, b| b.out_degree.cmp(&a.out_degree));
    ranking.truncate(DEGREE_RANKING_LIMIT);
    model.degree_ranking = ranking;

    Ok(model)
}
