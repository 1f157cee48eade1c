//! [`MindMapService`] – ingestion and read façade over a [`MemoryStore`].
//!
//! Ingesting a memory runs four steps:
//!
//! 1. encode the text with the injected [`Encoder`] (outside the lock);
//! 2. validate the payload;
//! 3. under the store's write lock, find related older nodes and append the
//!    new node;
//! 4. return a [`MemorySummary`] and the new store size.
//!
//! Step 3's lookup and append happen in a single critical section, so two
//! concurrent ingests always see each other in a consistent order and every
//! call grows the store by exactly one node.  If encoding or validation fails
//! nothing is appended.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lightmap_encoder::LightEncoder;
//! use lightmap_memory::{MindMapService, NewMemory};
//!
//! let service = MindMapService::in_memory(Arc::new(LightEncoder::new()));
//!
//! let a = service
//!     .add_memory(NewMemory::new("alpha beta gamma delta").topic("A").category("x"))
//!     .unwrap();
//! let b = service
//!     .add_memory(NewMemory::new("alpha beta gamma epsilon").topic("B").category("x"))
//!     .unwrap();
//!
//! assert_eq!(b.total_memories, 2);
//! let linked = service.node(&b.memory.id).unwrap().unwrap();
//! assert_eq!(linked.connections, vec![a.memory.id]);
//! ```

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use lightmap_encoder::Encoder;
use lightmap_types::{EncodedMemory, MemoryNode, MindMapError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::connections::find_related;
use crate::mindmap::{DEFAULT_ROOT_LABEL, MindMap, build_mind_map};
use crate::query::{ConnectionMatch, find_connections};
use crate::serializers::{GraphView, LightView, graph, light};
use crate::store::{InMemoryStore, MemoryStore};

pub const DEFAULT_TOPIC: &str = "Untitled Memory";
pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_RESONANCE: &str = "neutral";

// ─────────────────────────────────────────────────────────────────────────────
// Request / response types
// ─────────────────────────────────────────────────────────────────────────────

/// Input to [`MindMapService::add_memory`].
///
/// Absent or empty `topic`, `category` and `resonance` fall back to
/// [`DEFAULT_TOPIC`], [`DEFAULT_CATEGORY`] and [`DEFAULT_RESONANCE`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMemory {
    pub content: String,
    pub topic: Option<String>,
    pub category: Option<String>,
    pub resonance: Option<String>,
}

impl NewMemory {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn resonance(mut self, resonance: impl Into<String>) -> Self {
        self.resonance = Some(resonance.into());
        self
    }
}

fn or_default(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

/// What the caller learns about a freshly ingested memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySummary {
    pub id: String,
    pub topic: String,
    pub serialized_code: String,
    pub light_visualization: String,
    /// Number of connections discovered at ingest time.
    pub connections: usize,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedMemory {
    pub memory: MemorySummary,
    pub total_memories: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Payload validation
// ─────────────────────────────────────────────────────────────────────────────

/// Reject payloads the graph cannot store faithfully.
pub fn validate_payload(payload: &EncodedMemory) -> Result<(), MindMapError> {
    let seq = &payload.symbolic_sequence;
    if payload.id.is_empty() {
        return Err(MindMapError::MalformedPayload("empty id".to_string()));
    }
    if !seq.energy_level.is_finite() {
        return Err(MindMapError::MalformedPayload(format!(
            "energy level {} is not finite",
            seq.energy_level
        )));
    }
    if seq.wavelengths.len() != seq.colors.len() || seq.frequencies.len() != seq.colors.len() {
        return Err(MindMapError::MalformedPayload(format!(
            "sequence lengths differ: {} colors, {} wavelengths, {} frequencies",
            seq.colors.len(),
            seq.wavelengths.len(),
            seq.frequencies.len()
        )));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// MindMapService
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the memory store and the encoder used to ingest into it.
///
/// Cheap to share: wrap in an [`Arc`] and hand clones to every request
/// handler.
pub struct MindMapService<S: MemoryStore = InMemoryStore> {
    store: RwLock<S>,
    encoder: Arc<dyn Encoder>,
    root_label: String,
}

impl MindMapService<InMemoryStore> {
    /// Service over a fresh, empty in-memory store.
    pub fn in_memory(encoder: Arc<dyn Encoder>) -> Self {
        Self::new(InMemoryStore::new(), encoder)
    }
}

impl<S: MemoryStore> MindMapService<S> {
    pub fn new(store: S, encoder: Arc<dyn Encoder>) -> Self {
        Self {
            store: RwLock::new(store),
            encoder,
            root_label: DEFAULT_ROOT_LABEL.to_string(),
        }
    }

    /// Override the label of the synthetic mind-map root (builder-style).
    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    pub fn root_label(&self) -> &str {
        &self.root_label
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, S>, MindMapError> {
        self.store.read().map_err(|_| MindMapError::StorePoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, S>, MindMapError> {
        self.store.write().map_err(|_| MindMapError::StorePoisoned)
    }

    // ── ingestion ────────────────────────────────────────────────────────────

    /// Encode, link and append one memory.
    ///
    /// # Errors
    ///
    /// * [`MindMapError::Encoder`] – the encoder failed.
    /// * [`MindMapError::MalformedPayload`] – the encoder returned a payload
    ///   that fails [`validate_payload`] or reuses a stored id.
    /// * [`MindMapError::StorePoisoned`] – a previous writer panicked.
    ///
    /// The store is unchanged whenever an error is returned.
    ///
    /// Connections are looked up under the *defaulted* category, so memories
    /// ingested without a category still link to each other under
    /// [`DEFAULT_CATEGORY`]. The original service matched on the raw value and
    /// never linked uncategorised memories; this is a deliberate departure.
    pub fn add_memory(&self, request: NewMemory) -> Result<AddedMemory, MindMapError> {
        let topic = or_default(request.topic.as_deref(), DEFAULT_TOPIC);
        let category = or_default(request.category.as_deref(), DEFAULT_CATEGORY);
        let resonance = or_default(request.resonance.as_deref(), DEFAULT_RESONANCE);

        let payload = self
            .encoder
            .encode(&request.content, &category, &resonance)
            .inspect_err(|e| warn!(error = %e, "encoder rejected memory"))?;
        validate_payload(&payload)?;

        let serialized_code = self.encoder.compact_code(&payload.symbolic_sequence);
        let light_visualization = self.encoder.display(&payload);

        let mut store = self.write()?;
        if store.contains(&payload.id) {
            return Err(MindMapError::MalformedPayload(format!(
                "duplicate id {}",
                payload.id
            )));
        }

        let connections = find_related(store.nodes(), &request.content, &category);
        let now = Utc::now();
        // Keep timestamps non-decreasing in store order even if the wall clock
        // steps backwards.
        let timestamp = store
            .nodes()
            .last()
            .map_or(now, |last| last.timestamp.max(now));

        let node = MemoryNode {
            id: payload.id.clone(),
            topic,
            category,
            importance: payload.symbolic_sequence.energy_level,
            encoded_payload: payload,
            serialized_code,
            connections,
            timestamp,
        };

        info!(
            id = %node.id,
            topic = %node.topic,
            code = %node.serialized_code.chars().take(20).collect::<String>(),
            connections = node.connections.len(),
            "memory added to mind map"
        );

        let memory = MemorySummary {
            id: node.id.clone(),
            topic: node.topic.clone(),
            serialized_code: node.serialized_code.clone(),
            light_visualization,
            connections: node.connections.len(),
            importance: node.importance,
        };

        store.append(node);

        Ok(AddedMemory {
            memory,
            total_memories: store.len(),
        })
    }

    // ── reads ────────────────────────────────────────────────────────────────

    /// Category tree of the current store.
    pub fn mind_map(&self) -> Result<MindMap, MindMapError> {
        let store = self.read()?;
        debug!(nodes = store.len(), "building mind map");
        Ok(build_mind_map(store.nodes(), &self.root_label))
    }

    /// Nodes whose topic or text contains `query` (case-insensitive).
    pub fn find_connections(&self, query: &str) -> Result<Vec<ConnectionMatch>, MindMapError> {
        let store = self.read()?;
        let matches = find_connections(store.nodes(), query);
        debug!(query, matches = matches.len(), "connection query");
        Ok(matches)
    }

    pub fn graph(&self) -> Result<GraphView, MindMapError> {
        Ok(graph(self.read()?.nodes()))
    }

    pub fn light(&self) -> Result<LightView, MindMapError> {
        Ok(light(self.read()?.nodes()))
    }

    /// Snapshot of every stored node in store order.
    pub fn nodes(&self) -> Result<Vec<MemoryNode>, MindMapError> {
        Ok(self.read()?.nodes().to_vec())
    }

    /// Clone of the node with `id`, if stored.
    pub fn node(&self, id: &str) -> Result<Option<MemoryNode>, MindMapError> {
        Ok(self.read()?.nodes().iter().find(|n| n.id == id).cloned())
    }

    pub fn len(&self) -> Result<usize, MindMapError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, MindMapError> {
        Ok(self.read()?.is_empty())
    }

    /// Drop every stored node.
    pub fn reset(&self) -> Result<(), MindMapError> {
        self.write()?.clear();
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
