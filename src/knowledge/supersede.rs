//! Correction-driven supersession.
//!
//! Deactivates active entries that match a corrected "original" text and
//! links each to the admin-authored replacement via `superseded_by`. The
//! chain is append-only: history rows keep their content and keywords so an
//! audit can walk back through replacements.

use anyhow::Result;
use rusqlite::{params, Connection};
use std::collections::HashSet;

use super::query::fetch_active_entries;
use super::store::write_knowledge_log;
use super::types::KnowledgeKind;
use crate::knowledge::extract_keywords;

/// Deactivate active entries matching `original_text`, linking them to
/// `new_id`.
///
/// Matching is the store's usual heuristic (keyword overlap or substring
/// containment) and is best-effort by contract — it may over- or
/// under-match. Admin-kind entries are excluded so corrections can never
/// suppress each other. Returns the ids of the deactivated entries.
pub fn supersede_matching(
    conn: &mut Connection,
    original_text: &str,
    new_id: &str,
) -> Result<Vec<String>> {
    let original_keywords = extract_keywords(original_text);
    if original_keywords.is_empty() {
        return Ok(Vec::new());
    }
    let original_set: HashSet<&str> = original_keywords.iter().map(|s| s.as_str()).collect();
    let original_lower = original_text.to_lowercase();

    let tx = conn.transaction()?;

    let mut superseded = Vec::new();
    for entry in fetch_active_entries(&tx, None)? {
        if entry.kind == KnowledgeKind::Admin || entry.id == new_id {
            continue;
        }

        let overlap = entry
            .keywords
            .iter()
            .any(|kw| original_set.contains(kw.as_str()));
        let substring = !overlap
            && entry
                .keywords
                .iter()
                .any(|kw| original_lower.contains(kw.as_str()));
        if overlap || substring {
            superseded.push(entry.id);
        }
    }

    let now = chrono::Utc::now().to_rfc3339();
    for id in &superseded {
        tx.execute(
            "UPDATE knowledge SET active = 0, superseded_by = ?1, updated_at = ?2 WHERE id = ?3",
            params![new_id, now, id],
        )?;
        write_knowledge_log(
            &tx,
            "supersede",
            id,
            Some(&serde_json::json!({"superseded_by": new_id})),
        )?;
    }

    tx.commit()?;

    tracing::debug!(
        count = superseded.len(),
        superseded_by = new_id,
        "supersession pass complete"
    );
    Ok(superseded)
}
