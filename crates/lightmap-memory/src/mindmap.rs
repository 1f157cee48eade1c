//! Mind-Map Builder.
//!
//! A [`MindMap`] is never stored; it is recomputed from the current nodes on
//! every read.  Categories appear in first-seen order and every category
//! branch lists its memories in store order.
//!
//! The rendered tree looks like:
//!
//! ```text
//! 🧠 LUXBIN AI Memory Mind Map
//! ══════════════════════════════════════════════════
//!
//! ├── 📁 SCIENCE (2 memories)
//! │   ├── 💡 Photosynthesis
//! │       🌈 Green → Yellow → Blue
//! │       ⚡ Importance: 60.5% | 🔗 Links: 0
//! │   └── 💡 Mitosis
//! ...
//! └── 📁 TECHNOLOGY (1 memories)
//!     └── 💡 Rust
//!         🌈 Blue → Blue
//!         ⚡ Importance: 65.12% | 🔗 Links: 0
//! ```

use chrono::{DateTime, Utc};
use lightmap_types::MemoryNode;
use serde::{Deserialize, Serialize};

/// Label used for the synthetic root when none is configured.
pub const DEFAULT_ROOT_LABEL: &str = "LUXBIN AI Memory";

/// Number of tokens shown in a leaf preview.
const PREVIEW_TOKENS: usize = 5;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Display anchor at the top of the mind map.  Not a stored memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapRoot {
    pub id: String,
    pub topic: String,
    pub category: String,
    pub serialized_code: String,
    pub connections: Vec<String>,
    pub importance: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl MindMapRoot {
    pub fn new(label: &str) -> Self {
        Self {
            id: "root".to_string(),
            topic: label.to_string(),
            category: "root".to_string(),
            serialized_code: "0x0".to_string(),
            connections: Vec::new(),
            importance: 100.0,
            timestamp: Utc::now(),
        }
    }
}

/// Hierarchical summary of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMap {
    pub root: MindMapRoot,
    pub total_nodes: usize,
    pub categories: Vec<String>,
    pub visual_tree: String,
}

/// One memory as shown under its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryLeaf {
    pub id: String,
    pub topic: String,
    pub importance: f64,
    pub connection_count: usize,
    pub preview: String,
}

/// All memories of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBranch {
    pub category: String,
    pub count: usize,
    pub memories: Vec<MemoryLeaf>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Building
// ─────────────────────────────────────────────────────────────────────────────

/// Distinct categories of `nodes` in first-seen order.
pub fn categories(nodes: &[MemoryNode]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for n in nodes {
        if !seen.iter().any(|c| c == &n.category) {
            seen.push(n.category.clone());
        }
    }
    seen
}

/// First [`PREVIEW_TOKENS`] tokens of a node joined by arrows.
pub fn preview(node: &MemoryNode) -> String {
    node.colors()
        .iter()
        .take(PREVIEW_TOKENS)
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Group `nodes` into one branch per category.
pub fn branches(nodes: &[MemoryNode]) -> Vec<CategoryBranch> {
    categories(nodes)
        .into_iter()
        .map(|category| {
            let memories: Vec<MemoryLeaf> = nodes
                .iter()
                .filter(|n| n.category == category)
                .map(|n| MemoryLeaf {
                    id: n.id.clone(),
                    topic: n.topic.clone(),
                    importance: n.importance,
                    connection_count: n.connections.len(),
                    preview: preview(n),
                })
                .collect();
            CategoryBranch {
                category,
                count: memories.len(),
                memories,
            }
        })
        .collect()
}

/// Render branches as an ASCII tree under a `label` header.
pub fn render_tree(label: &str, branches: &[CategoryBranch]) -> String {
    let mut tree = format!("🧠 {label} Mind Map\n");
    tree.push_str(&"═".repeat(50));
    tree.push_str("\n\n");

    for (i, branch) in branches.iter().enumerate() {
        let last_branch = i + 1 == branches.len();
        let connector = if last_branch { "└──" } else { "├──" };
        let indent = if last_branch { "    " } else { "│   " };

        tree.push_str(&format!(
            "{connector} 📁 {} ({} memories)\n",
            branch.category.to_uppercase(),
            branch.count
        ));

        for (j, leaf) in branch.memories.iter().enumerate() {
            let leaf_connector = if j + 1 == branch.memories.len() { "└──" } else { "├──" };
            tree.push_str(&format!("{indent}{leaf_connector} 💡 {}\n", leaf.topic));
            tree.push_str(&format!("{indent}    🌈 {}\n", leaf.preview));
            tree.push_str(&format!(
                "{indent}    ⚡ Importance: {}% | 🔗 Links: {}\n",
                leaf.importance, leaf.connection_count
            ));
        }
        tree.push('\n');
    }

    tree
}

/// Build the mind map for `nodes`.
pub fn build_mind_map(nodes: &[MemoryNode], root_label: &str) -> MindMap {
    let branches = branches(nodes);
    MindMap {
        root: MindMapRoot::new(root_label),
        total_nodes: nodes.len(),
        categories: branches.iter().map(|b| b.category.clone()).collect(),
        visual_tree: render_tree(root_label, &branches),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
