//! `lightmap-types` – shared data model for the Lightmap memory graph.
//!
//! Every other crate in the workspace speaks in terms of the types defined
//! here: the symbolic payload produced by an encoder ([`EncodedMemory`] and
//! its [`SymbolicSequence`]), the stored unit of knowledge ([`MemoryNode`]),
//! and the workspace-wide error type ([`MindMapError`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One symbolic token of an encoded memory.
///
/// The seven hues of the visible spectrum, ordered from the longest to the
/// shortest wavelength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Indigo,
    Violet,
}

impl Color {
    /// All colors in spectral order.
    pub const ALL: [Color; 7] = [
        Color::Red,
        Color::Orange,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Indigo,
        Color::Violet,
    ];

    /// Human-readable name, identical to the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Orange => "Orange",
            Color::Yellow => "Yellow",
            Color::Green => "Green",
            Color::Blue => "Blue",
            Color::Indigo => "Indigo",
            Color::Violet => "Violet",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The structured symbolic payload an encoder derives from a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolicSequence {
    /// Wavelength in nanometres for each token.
    pub wavelengths: Vec<u32>,
    /// The symbolic tokens, one per input word.
    pub colors: Vec<Color>,
    /// Frequency in Hz for each token.
    pub frequencies: Vec<u64>,
    /// Short textual interpretation of the dominant tokens.
    pub meaning: String,
    /// Importance in `[0, 100]`.
    pub energy_level: f64,
    /// Structural quality of the source text in `[0, 1]`.
    pub coherence: f64,
}

/// The full encoder output for one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedMemory {
    /// Unique identifier assigned by the encoder; becomes the node id.
    pub id: String,
    pub original_text: String,
    pub symbolic_sequence: SymbolicSequence,
    pub emotional_resonance: String,
    pub category: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// One stored unit of knowledge.
///
/// Nodes are append-only: nothing mutates a node once it has been stored.
/// `connections` only ever reference nodes that were stored before this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryNode {
    pub id: String,
    pub topic: String,
    pub category: String,
    pub encoded_payload: EncodedMemory,
    /// Compact hex rendering of the payload's symbolic sequence.
    pub serialized_code: String,
    /// Ids of related, older nodes in the same category (at most 5).
    pub connections: Vec<String>,
    /// Copied from the payload's energy level at creation time.
    pub importance: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl MemoryNode {
    /// The text the node was encoded from.
    pub fn original_text(&self) -> &str {
        &self.encoded_payload.original_text
    }

    /// The node's symbolic tokens.
    pub fn colors(&self) -> &[Color] {
        &self.encoded_payload.symbolic_sequence.colors
    }
}

/// Workspace-wide error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MindMapError {
    #[error("Encoder failure: {0}")]
    Encoder(String),

    #[error("Malformed encoder payload: {0}")]
    MalformedPayload(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A well-formed request that cannot be served as sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Memory store lock poisoned")]
    StorePoisoned,

    #[error("I/O error: {0}")]
    Io(String),
}

impl MindMapError {
    /// HTTP status code this error surfaces as.
    ///
    /// Unrecognised actions and invalid requests are client errors;
    /// everything else, including a missing ingest field, is a server-side
    /// failure.
    pub fn status(&self) -> u16 {
        match self {
            MindMapError::InvalidAction(_) | MindMapError::InvalidRequest(_) => 400,
            _ => 500,
        }
    }
}
