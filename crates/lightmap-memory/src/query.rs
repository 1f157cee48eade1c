//! Query Engine.
//!
//! Case-insensitive substring lookup over each node's topic and source text.
//! There is no ranking: matches come back in store order, unlimited.  An
//! empty query matches every node.

use lightmap_types::{Color, MemoryNode};
use serde::{Deserialize, Serialize};

/// Number of tokens included in a match preview.
const PREVIEW_TOKENS: usize = 10;

/// A node that matched a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionMatch {
    pub id: String,
    pub topic: String,
    pub category: String,
    pub symbolic_preview: Vec<Color>,
    pub importance: f64,
    pub connections: Vec<String>,
}

impl From<&MemoryNode> for ConnectionMatch {
    fn from(n: &MemoryNode) -> Self {
        Self {
            id: n.id.clone(),
            topic: n.topic.clone(),
            category: n.category.clone(),
            symbolic_preview: n.colors().iter().take(PREVIEW_TOKENS).copied().collect(),
            importance: n.importance,
            connections: n.connections.clone(),
        }
    }
}

/// Nodes whose topic or source text contains `query`, ignoring case.
pub fn find_connections(nodes: &[MemoryNode], query: &str) -> Vec<ConnectionMatch> {
    let needle = query.to_lowercase();
    nodes
        .iter()
        .filter(|n| {
            n.topic.to_lowercase().contains(&needle)
                || n.original_text().to_lowercase().contains(&needle)
        })
        .map(ConnectionMatch::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{node, node_with_links};

    fn sample() -> Vec<MemoryNode> {
        vec![
            node("1", "Quantum Computing", "technology", "qubits hold superposition"),
            node("2", "Gardening", "life", "tomatoes need quantum amounts of sun"),
            node_with_links("3", "Cooking", "life", "pasta water should be salty", &["2"]),
        ]
    }

    #[test]
    fn matches_topic_case_insensitively() {
        let m = find_connections(&sample(), "QUANTUM computing");
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].id, "1");
    }

    #[test]
    fn matches_source_text_in_store_order() {
        let m = find_connections(&sample(), "quantum");
        let ids: Vec<&str> = m.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn empty_query_matches_everything() {
        assert_eq!(find_connections(&sample(), "").len(), 3);
    }

    #[test]
    fn no_match_returns_empty() {
        assert!(find_connections(&sample(), "volcano").is_empty());
    }

    #[test]
    fn match_projects_connections_and_preview() {
        let m = find_connections(&sample(), "pasta");
        assert_eq!(m[0].connections, vec!["2".to_string()]);
        assert_eq!(m[0].symbolic_preview.len(), 5);
        assert_eq!(m[0].category, "life");
    }

    #[test]
    fn preview_is_capped_at_ten_tokens() {
        let n = node("1", "Long", "x", "a b c d e f g h i j k l");
        let m = find_connections(&[n], "long");
        assert_eq!(m[0].symbolic_preview.len(), 10);
    }
}
