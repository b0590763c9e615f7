//! Core knowledge type definitions.
//!
//! Defines [`KnowledgeKind`] (the knowledge-category taxonomy),
//! [`KnowledgeEntry`] (a full persisted record), and [`KnowledgeCandidate`]
//! (the write-path input), plus the priority ladder for entry sources.

use serde::{Deserialize, Serialize};

/// Priority for admin-authored corrections — always wins precedence.
pub const PRIORITY_CORRECTION: u8 = 100;
/// Priority for proactively taught rules.
pub const PRIORITY_RULE: u8 = 95;
/// Priority for taught response patterns.
pub const PRIORITY_PATTERN: u8 = 90;
/// Default priority for entries derived from user interactions.
pub const PRIORITY_INTERACTION: u8 = 80;

/// Knowledge-category taxonomy.
///
/// The `admin` kind holds supervised learnings and is excluded from
/// supersession so corrections can never suppress each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeKind {
    /// Facts about the product line.
    Product,
    /// Prices, plans, billing.
    Pricing,
    /// Known issues and their fixes.
    Troubleshooting,
    /// Ordering, shipping, returns.
    Orders,
    /// General support answers.
    Support,
    /// Reusable response patterns.
    Pattern,
    /// Anything that fits nowhere else.
    General,
    /// Admin-authored corrections and rules.
    Admin,
}

impl KnowledgeKind {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Pricing => "pricing",
            Self::Troubleshooting => "troubleshooting",
            Self::Orders => "orders",
            Self::Support => "support",
            Self::Pattern => "pattern",
            Self::General => "general",
            Self::Admin => "admin",
        }
    }

    /// All kinds, for stats zero-filling.
    pub const ALL: &'static [KnowledgeKind] = &[
        Self::Product,
        Self::Pricing,
        Self::Troubleshooting,
        Self::Orders,
        Self::Support,
        Self::Pattern,
        Self::General,
        Self::Admin,
    ];
}

impl std::fmt::Display for KnowledgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KnowledgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Self::Product),
            "pricing" => Ok(Self::Pricing),
            "troubleshooting" => Ok(Self::Troubleshooting),
            "orders" => Ok(Self::Orders),
            "support" => Ok(Self::Support),
            "pattern" => Ok(Self::Pattern),
            "general" => Ok(Self::General),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("unknown knowledge kind: {s}")),
        }
    }
}

/// A knowledge record, matching the `knowledge` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    pub kind: KnowledgeKind,
    pub title: String,
    pub content: String,
    /// Canonical keyword set, sorted and deduped.
    pub keywords: Vec<String>,
    /// SHA-256 of the joined keyword set; backs the dedup constraint.
    pub content_hash: String,
    /// Arbitrary JSON metadata (e.g. `{"training_type": "correction"}`).
    pub metadata: Option<serde_json::Value>,
    /// Times this entry has been reinforced or served.
    pub usage_count: u32,
    /// Blended success score in `[0, 100]`.
    pub success_rate: f64,
    /// Retrieval precedence in `[0, 100]`; higher ranks first.
    pub priority: u8,
    /// Inactive entries are invisible to retrieval.
    pub active: bool,
    /// Set only by correction-driven supersession.
    pub superseded_by: Option<String>,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// ISO 8601 last-modification timestamp.
    pub updated_at: String,
}

/// Input to the write path. The keyword set and hash are derived from
/// `content` by the store, never supplied by callers.
#[derive(Debug, Clone)]
pub struct KnowledgeCandidate {
    pub kind: KnowledgeKind,
    pub title: String,
    pub content: String,
    pub metadata: Option<serde_json::Value>,
    pub priority: u8,
}

impl KnowledgeCandidate {
    /// Candidate derived from a user interaction, at the interaction-source
    /// default priority.
    pub fn from_interaction(kind: KnowledgeKind, title: &str, content: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            content: content.to_string(),
            metadata: None,
            priority: PRIORITY_INTERACTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in KnowledgeKind::ALL {
            assert_eq!(kind.as_str().parse::<KnowledgeKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn priority_ladder_ordering() {
        assert!(PRIORITY_CORRECTION > PRIORITY_RULE);
        assert!(PRIORITY_RULE > PRIORITY_PATTERN);
        assert!(PRIORITY_PATTERN > PRIORITY_INTERACTION);
    }
}
