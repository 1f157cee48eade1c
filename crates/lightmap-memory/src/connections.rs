//! Connection Finder.
//!
//! Two memories are *related* when they share a category and their source
//! texts have at least [`RELATED_THRESHOLD`] distinct lower-cased
//! whitespace tokens in common.
//!
//! Relations are computed once, when a new memory is ingested, and point
//! from the new memory to older ones.  Older memories are never revisited, so
//! a connection `B → A` does not imply `A → B`.

use std::collections::HashSet;

use lightmap_types::MemoryNode;

/// Minimum number of shared tokens for two texts to be related.
pub const RELATED_THRESHOLD: usize = 3;

/// Maximum number of connections recorded per memory.
pub const MAX_CONNECTIONS: usize = 5;

/// Distinct lower-cased whitespace tokens of `text`.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Number of tokens shared by `a` and `b`.
pub fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> usize {
    a.intersection(b).count()
}

/// Ids of nodes in `nodes` related to `text` within `category`.
///
/// Results follow store order (oldest first) and are truncated to
/// [`MAX_CONNECTIONS`].
pub fn find_related(nodes: &[MemoryNode], text: &str, category: &str) -> Vec<String> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Vec::new();
    }

    nodes
        .iter()
        .filter(|n| n.category == category)
        .filter(|n| overlap(&tokens, &tokenize(n.original_text())) >= RELATED_THRESHOLD)
        .take(MAX_CONNECTIONS)
        .map(|n| n.id.clone())
        .collect()
}
