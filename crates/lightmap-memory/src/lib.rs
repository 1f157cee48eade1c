//! `lightmap-memory` – The Memory Graph.
//!
//! Holds every ingested memory in an append-only store, links new memories to
//! lexically related older ones, and projects the store into the shapes the
//! outside world reads: a category tree, a node/edge graph, and the raw
//! light payloads.
//!
//! # Modules
//!
//! - [`store`] – [`MemoryStore`][store::MemoryStore]: the storage seam, with
//!   [`InMemoryStore`][store::InMemoryStore] as the default backend.
//! - [`connections`] – [`find_related`][connections::find_related]: token
//!   overlap between a new text and older nodes of the same category.
//! - [`mindmap`] – [`build_mind_map`][mindmap::build_mind_map]: groups nodes
//!   by category and renders the ASCII tree.
//! - [`query`] – [`find_connections`][query::find_connections]:
//!   case-insensitive substring lookup over topics and source text.
//! - [`serializers`] – graph and light projections of the store.
//! - [`service`] – [`MindMapService`][service::MindMapService]: ingestion and
//!   read façade that owns the store behind a lock.

pub mod connections;
pub mod mindmap;
pub mod query;
pub mod serializers;
pub mod service;
pub mod store;

pub use mindmap::{MindMap, MindMapRoot};
pub use service::{AddedMemory, MemorySummary, MindMapService, NewMemory};
pub use store::{InMemoryStore, MemoryStore};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use lightmap_types::{Color, EncodedMemory, MemoryNode, SymbolicSequence};

    /// Build a node directly, bypassing any encoder.  One Red token per word.
    pub fn node(id: &str, topic: &str, category: &str, text: &str) -> MemoryNode {
        node_with_links(id, topic, category, text, &[])
    }

    pub fn node_with_links(
        id: &str,
        topic: &str,
        category: &str,
        text: &str,
        links: &[&str],
    ) -> MemoryNode {
        let colors: Vec<Color> = text.split_whitespace().map(|_| Color::Red).collect();
        let ts = Utc::now();
        MemoryNode {
            id: id.to_string(),
            topic: topic.to_string(),
            category: category.to_string(),
            encoded_payload: EncodedMemory {
                id: id.to_string(),
                original_text: text.to_string(),
                symbolic_sequence: SymbolicSequence {
                    wavelengths: colors.iter().map(|_| 700).collect(),
                    frequencies: colors.iter().map(|_| 428_000_000_000_000).collect(),
                    colors,
                    meaning: "Foundation/Security/Survival".to_string(),
                    energy_level: 50.0,
                    coherence: 0.5,
                },
                emotional_resonance: "neutral".to_string(),
                category: category.to_string(),
                timestamp: ts,
            },
            serialized_code: format!("0x{:0>64}", id.len()),
            connections: links.iter().map(|s| s.to_string()).collect(),
            importance: 50.0,
            timestamp: ts,
        }
    }
}
