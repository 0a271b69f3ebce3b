use serde::{Deserialize, Serialize};

use crate::curves::SimParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToWorker {
    Start {
        nodes: u32,
        #[serde(rename = "DISTANCE")]
        distance: f32,
        #[serde(rename = "STRENGTH")]
        strength: f32,
        #[serde(rename = "COL")]
        col: f32,
        #[serde(rename = "linksBuffer")]
        links_buffer: Vec<u32>,
    },
}

impl ToWorker {
    pub fn start(nodes: u32, params: SimParams, links_buffer: Vec<u32>) -> Self {
        Self::Start {
            nodes,
            distance: params.distance as f32,
            strength: params.strength as f32,
            col: params.columns as f32,
            links_buffer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FromWorker {
    Tick {
        #[serde(rename = "currentTick")]
        current_tick: u32,
        progress: f32,
        /// `(x, y)` per node, by index.
        nodes: Vec<f32>,
    },
    End {
        nodes: Vec<f32>,
    },
}

impl FromWorker {
    pub fn snapshot(&self) -> &[f32] {
        match self {
            Self::Tick { nodes, .. } | Self::End { nodes } => nodes,
        }
    }
}
