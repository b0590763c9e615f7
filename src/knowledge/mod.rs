//! The knowledge store: ranked retrieval, reinforce-or-create, supersession.
//!
//! All retrieval and deduplication is driven by one canonical keyword
//! pipeline ([`extract_keywords`]): tokenize, drop stop-words and short
//! tokens, dedupe, sort. The sorted set doubles as the input to the content
//! hash that backs the store's uniqueness constraint.

pub mod query;
pub mod stats;
pub mod store;
pub mod supersede;
pub mod types;

use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Tokens carrying no retrieval signal. Tokens shorter than three characters
/// are dropped before this list is consulted.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "has", "have",
    "her", "his", "him", "how", "its", "our", "out", "she", "that", "this", "was", "were", "will",
    "with", "what", "when", "where", "which", "who", "why", "your", "from", "they", "them",
    "then", "than", "been", "being", "would", "could", "should", "there", "their", "these",
    "those", "about", "into", "over", "just", "like", "some", "much", "very", "please", "want",
    "need", "does", "did", "get", "got",
];

/// Extract the canonical keyword set from free text.
///
/// Tokenizes on non-alphanumeric boundaries, lowercases, drops stop-words
/// and tokens shorter than 3 characters, dedupes, and returns the keywords
/// in sorted order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let set: BTreeSet<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3)
        .filter(|t| !STOP_WORDS.contains(t))
        .map(|t| t.to_string())
        .collect();
    set.into_iter().collect()
}

/// Canonical content hash over the sorted keyword set.
///
/// Two texts that reduce to the same keyword set hash identically, which is
/// exactly the equivalence the store's `(kind, content_hash)` uniqueness
/// index enforces for active entries.
pub fn content_hash(keywords: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(keywords.join(" ").as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
