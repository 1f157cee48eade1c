//! Read-side projections of the store.
//!
//! | format | shape |
//! |---|---|
//! | tree | [`MindMap`][crate::mindmap::MindMap] (see [`crate::mindmap`]) |
//! | graph | [`GraphView`]: one node per memory, one edge per connection |
//! | light | [`LightView`]: the encoder's raw symbolic fields |
//!
//! All projections are pure functions of the nodes passed in.

use lightmap_types::{Color, MemoryNode};
use serde::{Deserialize, Serialize};

/// Edge label for every connection.
pub const RELATES_TO: &str = "relates_to";

/// Characters of the serialized code shown in a graph node.
const CODE_PREVIEW_CHARS: usize = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Graph
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub category: String,
    pub importance: f64,
    pub code_preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub total_nodes: usize,
    pub total_edges: usize,
}

/// Project nodes into a node/edge graph.  Each connection becomes one
/// directed edge from the newer node to the older one.
pub fn graph(nodes: &[MemoryNode]) -> GraphView {
    let graph_nodes: Vec<GraphNode> = nodes
        .iter()
        .map(|n| GraphNode {
            id: n.id.clone(),
            label: n.topic.clone(),
            category: n.category.clone(),
            importance: n.importance,
            code_preview: format!(
                "{}...",
                n.serialized_code.chars().take(CODE_PREVIEW_CHARS).collect::<String>()
            ),
        })
        .collect();

    let edges: Vec<GraphEdge> = nodes
        .iter()
        .flat_map(|n| {
            n.connections.iter().map(move |target| GraphEdge {
                source: n.id.clone(),
                target: target.clone(),
                kind: RELATES_TO.to_string(),
            })
        })
        .collect();

    GraphView {
        total_nodes: graph_nodes.len(),
        total_edges: edges.len(),
        nodes: graph_nodes,
        edges,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Light
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightMemoryView {
    pub id: String,
    pub topic: String,
    pub serialized_code: String,
    pub colors: Vec<Color>,
    pub wavelengths: Vec<u32>,
    pub frequencies: Vec<u64>,
    pub meaning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightView {
    pub format: String,
    pub memories: Vec<LightMemoryView>,
    pub total: usize,
}

/// Project nodes into their raw encoder output.
pub fn light(nodes: &[MemoryNode]) -> LightView {
    let memories: Vec<LightMemoryView> = nodes
        .iter()
        .map(|n| {
            let seq = &n.encoded_payload.symbolic_sequence;
            LightMemoryView {
                id: n.id.clone(),
                topic: n.topic.clone(),
                serialized_code: n.serialized_code.clone(),
                colors: seq.colors.clone(),
                wavelengths: seq.wavelengths.clone(),
                frequencies: seq.frequencies.clone(),
                meaning: seq.meaning.clone(),
            }
        })
        .collect();

    LightView {
        format: "photonic".to_string(),
        total: memories.len(),
        memories,
    }
}
