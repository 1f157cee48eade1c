//! Memory Store.
//!
//! The single source of truth for ingested [`MemoryNode`]s.  The store is
//! append-only and ordered: position in the store is creation order, and
//! every read-side projection walks nodes oldest first.
//!
//! [`MemoryStore`] is the seam a persistent backend would plug into;
//! [`InMemoryStore`] keeps everything for the lifetime of the process.
//!
//! # Example
//!
//! ```rust
//! use lightmap_memory::store::{InMemoryStore, MemoryStore};
//!
//! let store = InMemoryStore::new();
//! assert!(store.is_empty());
//! assert_eq!(store.nodes().len(), 0);
//! ```

use lightmap_types::MemoryNode;

/// Ordered, append-only collection of memory nodes.
pub trait MemoryStore: Send + Sync {
    /// Append `node` after every existing node.
    fn append(&mut self, node: MemoryNode);

    /// All nodes in store order (oldest first).
    fn nodes(&self) -> &[MemoryNode];

    /// Drop every node.  Used to reset state between tests or when seeding.
    fn clear(&mut self);

    fn len(&self) -> usize {
        self.nodes().len()
    }

    fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    /// Whether a node with `id` has been stored.
    fn contains(&self, id: &str) -> bool {
        self.nodes().iter().any(|n| n.id == id)
    }
}

/// Process-lifetime store backed by a `Vec`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    nodes: Vec<MemoryNode>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with pre-built nodes, kept in the given order.
    pub fn with_nodes(nodes: Vec<MemoryNode>) -> Self {
        Self { nodes }
    }
}

impl MemoryStore for InMemoryStore {
    fn append(&mut self, node: MemoryNode) {
        self.nodes.push(node);
    }

    fn nodes(&self) -> &[MemoryNode] {
        &self.nodes
    }

    fn clear(&mut self) {
        self.nodes.clear();
    }
}
