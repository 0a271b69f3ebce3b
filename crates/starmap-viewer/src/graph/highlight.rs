use starmap_core::{IndexedModel, NodeId};
use std::collections::HashSet;

use crate::graph::state::GraphState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSet {
    pub center: NodeId,
    pub neighbors: HashSet<NodeId>,
    pub links: Vec<usize>,
}

impl HighlightSet {
    pub fn contains_node(&self, id: &NodeId) -> bool {
        &self.center == id || self.neighbors.contains(id)
    }

    pub fn contains_link(&self, position: usize) -> bool {
        self.links.binary_search(&position).is_ok()
    }
}

pub fn extract(model: &IndexedModel, center: &NodeId) -> Option<HighlightSet> {
    model.info(center)?;
    let mut neighbors = HashSet::new();
    let mut links = Vec::new();
    for (position, link) in model.links_for_node(center) {
        links.push(position);
        let other = if &link.source == center {
            &link.target
        } else {
            &link.source
        };
        if other != center {
            neighbors.insert(other.clone());
        }
    }
    links.sort_unstable();
    links.dedup();
    Some(HighlightSet {
        center: center.clone(),
        neighbors,
        links,
    })
}

impl GraphState {
    pub fn highlight(&mut self, id: &NodeId) -> bool {
        if self
            .highlight
            .as_ref()
            .is_some_and(|set| &set.center == id)
        {
            return false;
        }
        match extract(&self.model, id) {
            Some(set) => {
                tracing::trace!(%id, neighbors = set.neighbors.len(), "highlight");
                self.highlight = Some(set);
                true
            }
            None => self.unhighlight(),
        }
    }

    pub fn unhighlight(&mut self) -> bool {
        self.highlight.take().is_some()
    }

    pub fn set_hovered(&mut self, id: Option<NodeId>) -> bool {
        if !self.channel.interaction_armed || self.pointer.hovered == id {
            return false;
        }
        self.pointer.hovered = id.clone();
        match id {
            Some(id) => self.highlight(&id),
            None => self.unhighlight(),
        }
    }
}
