use serde::{Deserialize, Serialize};
use std::fmt;

pub mod curves;
pub mod index;
pub mod protocol;

pub use curves::SimParams;
pub use index::{
    DegreeEntry, IndexError, IndexedLink, IndexedModel, IndexedNode, LinkInfo, NodeInfo,
    TextureState,
};
pub use protocol::{FromWorker, ToWorker};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type Rgba = [f32; 4];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawNode {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl RawNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
            name: None,
            scale: None,
            image: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawLink {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba>,
}

impl RawLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: NodeId::new(source),
            target: NodeId::new(target),
            color: None,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphInput {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub links: Vec<RawLink>,
}

impl GraphInput {
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn index(&self) -> Result<IndexedModel, IndexError> {
        index::index(&self.nodes, &self.links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_input_parses_optional_fields() {
        let json = br#"{
            "nodes": [
                {"id": "a", "name": "Alice", "scale": 1.5, "image": "a.png"},
                {"id": "b"}
            ],
            "links": [
                {"source": "a", "target": "b", "color": [1.0, 0.0, 0.0, 0.5]}
            ]
        }"#;

        let input = GraphInput::from_json(json).expect("parse graph");

        assert_eq!(input.nodes.len(), 2);
        assert_eq!(input.nodes[0].name.as_deref(), Some("Alice"));
        assert_eq!(input.nodes[0].scale, Some(1.5));
        assert_eq!(input.nodes[1].image, None);
        assert_eq!(input.links[0].color, Some([1.0, 0.0, 0.0, 0.5]));
    }

    #[test]
    fn graph_input_tolerates_missing_links() {
        let input = GraphInput::from_json(br#"{"nodes": [{"id": "solo"}]}"#).expect("parse");
        assert!(input.links.is_empty());
        assert_eq!(input.nodes[0].id, NodeId::new("solo"));
    }
}
