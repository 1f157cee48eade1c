//! `lightmap-encoder` – turns raw text into a symbolic payload.
//!
//! The memory graph never looks inside an encoder.  It only needs the
//! [`Encoder`] capability: produce an [`EncodedMemory`] for a piece of text,
//! render its sequence as a compact code, and render a human-readable
//! visualization.  Tests substitute a deterministic stub; production uses
//! [`LightEncoder`].
//!
//! # Modules
//!
//! - [`light`] – [`LightEncoder`][light::LightEncoder]: maps every word to
//!   one of seven spectral colors and derives energy, coherence and meaning
//!   from the text.

pub mod light;

pub use light::LightEncoder;

use lightmap_types::{EncodedMemory, MindMapError, SymbolicSequence};

/// Capability interface for text encoders.
///
/// # Contract
///
/// * `encode` – must return a payload whose `id` is unique for the lifetime
///   of the process and whose `energy_level` is finite.
/// * `compact_code` and `display` are pure functions of their input.
pub trait Encoder: Send + Sync {
    /// Encode `text` in the context of `category` and an emotional
    /// `resonance` label.
    fn encode(
        &self,
        text: &str,
        category: &str,
        resonance: &str,
    ) -> Result<EncodedMemory, MindMapError>;

    /// Compact, deterministic code for a symbolic sequence.
    fn compact_code(&self, sequence: &SymbolicSequence) -> String;

    /// Multi-line visualization of an encoded memory.
    fn display(&self, memory: &EncodedMemory) -> String;
}
