//! Write path — reinforce-or-create and the knowledge audit log.
//!
//! [`reinforce_or_create`] is the single entry point for new knowledge. It
//! runs inside a transaction: search for an equivalent active entry of the
//! same kind, reinforce it in place if found, insert otherwise. The
//! `(kind, content_hash)` uniqueness index turns a concurrent duplicate
//! insert into a reinforcement instead of a second row.

use anyhow::Result;
use rusqlite::{params, Connection, Transaction};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::knowledge::query::fetch_active_entries;
use crate::knowledge::types::{KnowledgeCandidate, KnowledgeEntry, KnowledgeKind};
use crate::knowledge::{content_hash, extract_keywords};

/// Success score assigned on first sighting and blended in on reinforcement.
pub const REINFORCE_SCORE: f64 = 80.0;

/// Result returned from a reinforce-or-create operation.
#[derive(Debug, Serialize)]
pub struct ReinforceResult {
    /// UUID of the reinforced or newly created entry.
    pub id: String,
    /// `true` if an existing entry was reinforced instead of creating one.
    pub reinforced: bool,
}

/// Reinforce an equivalent active entry, or create a new one.
///
/// Equivalence is keyword-set overlap or substring containment against
/// active entries of the same kind. Reinforcement bumps `usage_count`,
/// blends `success_rate` toward [`REINFORCE_SCORE`], and shallow-merges
/// metadata (new keys win); it never touches `priority`.
pub fn reinforce_or_create(
    conn: &mut Connection,
    candidate: &KnowledgeCandidate,
) -> Result<ReinforceResult> {
    let keywords = extract_keywords(&candidate.content);
    let hash = content_hash(&keywords);

    let tx = conn.transaction()?;

    if let Some(existing) = find_reinforce_target(&tx, candidate, &keywords)? {
        reinforce(&tx, &existing, candidate)?;
        write_knowledge_log(
            &tx,
            "reinforce",
            &existing.id,
            Some(&serde_json::json!({"usage_count": existing.usage_count + 1})),
        )?;
        tx.commit()?;
        return Ok(ReinforceResult {
            id: existing.id,
            reinforced: true,
        });
    }

    let id = uuid::Uuid::now_v7().to_string();
    match insert_entry(&tx, &id, candidate, &keywords, &hash) {
        Ok(()) => {
            write_knowledge_log(&tx, "create", &id, None)?;
            tx.commit()?;
            Ok(ReinforceResult {
                id,
                reinforced: false,
            })
        }
        // A concurrent writer created an equivalent entry between our search
        // and insert; reinforce the row that won the race.
        Err(e) if is_unique_violation(&e) => {
            let existing = find_by_hash(&tx, candidate.kind, &hash)?.ok_or(e)?;
            reinforce(&tx, &existing, candidate)?;
            write_knowledge_log(
                &tx,
                "reinforce",
                &existing.id,
                Some(&serde_json::json!({"reason": "concurrent first sighting"})),
            )?;
            tx.commit()?;
            Ok(ReinforceResult {
                id: existing.id,
                reinforced: true,
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Find an active same-kind entry equivalent to the candidate.
///
/// Heuristic by contract: the candidate's keyword set overlaps the entry's,
/// or either side's content contains a keyword of the other.
fn find_reinforce_target(
    conn: &Connection,
    candidate: &KnowledgeCandidate,
    candidate_keywords: &[String],
) -> Result<Option<KnowledgeEntry>> {
    let candidate_set: HashSet<&str> = candidate_keywords.iter().map(|s| s.as_str()).collect();
    let candidate_content = candidate.content.to_lowercase();

    for entry in fetch_active_entries(conn, Some(candidate.kind))? {
        let overlap = entry
            .keywords
            .iter()
            .any(|kw| candidate_set.contains(kw.as_str()));
        if overlap {
            return Ok(Some(entry));
        }

        let entry_content = entry.content.to_lowercase();
        let substring = entry.keywords.iter().any(|kw| candidate_content.contains(kw.as_str()))
            || candidate_keywords.iter().any(|kw| entry_content.contains(kw.as_str()));
        if substring {
            return Ok(Some(entry));
        }
    }

    Ok(None)
}

/// Reinforce an entry in place. Priority is deliberately untouched.
fn reinforce(
    conn: &Connection,
    existing: &KnowledgeEntry,
    candidate: &KnowledgeCandidate,
) -> Result<()> {
    let success_rate = if existing.success_rate == 0.0 {
        REINFORCE_SCORE
    } else {
        (existing.success_rate + REINFORCE_SCORE) / 2.0
    };

    let metadata = merge_metadata(existing.metadata.clone(), candidate.metadata.clone());
    let metadata_json = metadata.map(|m| m.to_string());

    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE knowledge SET usage_count = usage_count + 1, success_rate = ?1, \
         metadata = ?2, updated_at = ?3 WHERE id = ?4",
        params![success_rate, metadata_json, now, existing.id],
    )?;
    Ok(())
}

/// Shallow-merge metadata maps; keys from `new` win on conflict.
fn merge_metadata(existing: Option<Value>, new: Option<Value>) -> Option<Value> {
    match (existing, new) {
        (Some(Value::Object(mut base)), Some(Value::Object(incoming))) => {
            for (k, v) in incoming {
                base.insert(k, v);
            }
            Some(Value::Object(base))
        }
        (existing, None) => existing,
        (_, incoming) => incoming,
    }
}

/// Insert a fresh entry with the optimistic first-sighting stats.
fn insert_entry(
    conn: &Transaction,
    id: &str,
    candidate: &KnowledgeCandidate,
    keywords: &[String],
    hash: &str,
) -> rusqlite::Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    let metadata_json = candidate.metadata.as_ref().map(|m| m.to_string());

    conn.execute(
        "INSERT INTO knowledge (id, kind, title, content, keywords, content_hash, metadata, \
         usage_count, success_rate, priority, active, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9, 1, ?10, ?10)",
        params![
            id,
            candidate.kind.as_str(),
            candidate.title,
            candidate.content,
            keywords.join(" "),
            hash,
            metadata_json,
            REINFORCE_SCORE,
            candidate.priority,
            now,
        ],
    )?;
    Ok(())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Look up the active entry holding a given content hash.
fn find_by_hash(
    conn: &Connection,
    kind: KnowledgeKind,
    hash: &str,
) -> Result<Option<KnowledgeEntry>> {
    let entries = fetch_active_entries(conn, Some(kind))?;
    Ok(entries.into_iter().find(|e| e.content_hash == hash))
}

/// Write an entry to the knowledge_log audit table.
pub(crate) fn write_knowledge_log(
    conn: &Connection,
    operation: &str,
    entry_id: &str,
    details: Option<&Value>,
) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    let details_json = details.map(|d| d.to_string());
    conn.execute(
        "INSERT INTO knowledge_log (operation, entry_id, details, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![operation, entry_id, details_json, now],
    )?;
    Ok(())
}
