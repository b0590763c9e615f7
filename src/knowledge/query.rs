//! Ranked retrieval over the knowledge store.
//!
//! Matching is two-tier: entries whose canonical keyword set overlaps the
//! query's set rank ahead of entries that only substring-match, then
//! priority, success rate, and usage break ties.

use anyhow::Result;
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;

use crate::knowledge::extract_keywords;
use crate::knowledge::types::{KnowledgeEntry, KnowledgeKind};

/// Result caps applied after ranking.
#[derive(Debug, Clone)]
pub struct QueryLimits {
    /// Cap for unscoped queries.
    pub max_results: usize,
    /// Cap for kind-scoped queries.
    pub scoped_max_results: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_results: 10,
            scoped_max_results: 5,
        }
    }
}

/// Query the knowledge store with free text.
///
/// Extracts the query's keyword set, filters active entries that overlap it
/// (or substring-match it in title/content), optionally narrows by kind, and
/// returns the ranked, capped result list. An empty keyword set matches
/// nothing.
pub fn query_knowledge(
    conn: &Connection,
    query: &str,
    kind: Option<KnowledgeKind>,
    limits: &QueryLimits,
) -> Result<Vec<KnowledgeEntry>> {
    let query_keywords = extract_keywords(query);
    if query_keywords.is_empty() {
        return Ok(Vec::new());
    }
    let query_set: HashSet<&str> = query_keywords.iter().map(|s| s.as_str()).collect();

    let candidates = fetch_active_entries(conn, kind)?;

    // Partition into overlap and substring-only matches; overlap ranks first.
    let mut matched: Vec<(bool, KnowledgeEntry)> = Vec::new();
    for entry in candidates {
        let overlap = entry.keywords.iter().any(|kw| query_set.contains(kw.as_str()));
        if overlap {
            matched.push((true, entry));
            continue;
        }
        let title = entry.title.to_lowercase();
        let content = entry.content.to_lowercase();
        let substring = query_keywords
            .iter()
            .any(|kw| title.contains(kw.as_str()) || content.contains(kw.as_str()));
        if substring {
            matched.push((false, entry));
        }
    }

    matched.sort_by(|(a_overlap, a), (b_overlap, b)| {
        b_overlap
            .cmp(a_overlap)
            .then(b.priority.cmp(&a.priority))
            .then(b.success_rate.total_cmp(&a.success_rate))
            .then(b.usage_count.cmp(&a.usage_count))
    });

    let cap = if kind.is_some() {
        limits.scoped_max_results
    } else {
        limits.max_results
    };
    matched.truncate(cap);

    Ok(matched.into_iter().map(|(_, e)| e).collect())
}

/// Fetch all active entries, optionally restricted to one kind.
///
/// Shared by the query, reinforcement, and supersession paths so they all
/// see the same candidate set.
pub(crate) fn fetch_active_entries(
    conn: &Connection,
    kind: Option<KnowledgeKind>,
) -> Result<Vec<KnowledgeEntry>> {
    const COLUMNS: &str = "id, kind, title, content, keywords, content_hash, metadata, \
                           usage_count, success_rate, priority, active, superseded_by, \
                           created_at, updated_at";

    let entries = if let Some(kind) = kind {
        let sql = format!("SELECT {COLUMNS} FROM knowledge WHERE active = 1 AND kind = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![kind.as_str()], row_to_entry)?;
        rows.collect::<Result<Vec<_>, _>>()?
    } else {
        let sql = format!("SELECT {COLUMNS} FROM knowledge WHERE active = 1");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_entry)?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    Ok(entries)
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<KnowledgeEntry> {
    let kind_str: String = row.get(1)?;
    let keywords_str: String = row.get(4)?;
    let metadata_str: Option<String> = row.get(6)?;
    let active: i64 = row.get(10)?;
    let priority: i64 = row.get(9)?;

    Ok(KnowledgeEntry {
        id: row.get(0)?,
        kind: kind_str.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?,
        title: row.get(2)?,
        content: row.get(3)?,
        keywords: keywords_str.split_whitespace().map(String::from).collect(),
        content_hash: row.get(5)?,
        metadata: metadata_str.and_then(|s| serde_json::from_str(&s).ok()),
        usage_count: row.get(7)?,
        success_rate: row.get(8)?,
        priority: priority as u8,
        active: active != 0,
        superseded_by: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::knowledge::{content_hash, extract_keywords};

    fn test_db() -> Connection {
        db::open_memory_database().unwrap()
    }

    /// Insert a row directly, bypassing reinforce-or-create, so fixtures with
    /// overlapping keyword sets stay distinct rows.
    fn insert(
        conn: &mut Connection,
        kind: KnowledgeKind,
        title: &str,
        content: &str,
        priority: u8,
    ) -> String {
        let id = uuid::Uuid::now_v7().to_string();
        let keywords = extract_keywords(content);
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO knowledge (id, kind, title, content, keywords, content_hash, \
             usage_count, success_rate, priority, active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, 80.0, ?7, 1, ?8, ?8)",
            params![
                id,
                kind.as_str(),
                title,
                content,
                keywords.join(" "),
                content_hash(&keywords),
                priority,
                now,
            ],
        )
        .unwrap();
        id
    }

    #[test]
    fn query_matches_keyword_overlap() {
        let mut conn = test_db();
        let id = insert(
            &mut conn,
            KnowledgeKind::Troubleshooting,
            "Flickering bulbs",
            "Flickering bulbs usually mean a firmware mismatch on the bridge",
            80,
        );
        let _other = insert(
            &mut conn,
            KnowledgeKind::Pricing,
            "Refund window",
            "Refunds are accepted within thirty days of purchase",
            80,
        );

        let results =
            query_knowledge(&conn, "my bulbs keep flickering", None, &QueryLimits::default())
                .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, id);
    }

    #[test]
    fn overlap_ranks_before_substring_only() {
        let mut conn = test_db();
        // "firmware" is a whole keyword here
        let overlap_id = insert(
            &mut conn,
            KnowledgeKind::Troubleshooting,
            "Firmware update",
            "Update the firmware from the companion app",
            50,
        );
        // "firmwares" only substring-matches the query keyword "firmware",
        // and carries a higher priority — overlap must still win.
        let substr_id = insert(
            &mut conn,
            KnowledgeKind::Troubleshooting,
            "Legacy firmwares",
            "Legacy firmwares are unsupported",
            99,
        );

        let results =
            query_knowledge(&conn, "firmware question", None, &QueryLimits::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, overlap_id);
        assert_eq!(results[1].id, substr_id);
    }

    #[test]
    fn priority_orders_within_tier() {
        let mut conn = test_db();
        let low = insert(
            &mut conn,
            KnowledgeKind::Support,
            "Contact hours",
            "Support answers dimmer questions on weekdays",
            60,
        );
        let high = insert(
            &mut conn,
            KnowledgeKind::Admin,
            "Dimmer rule",
            "Always mention the dimmer compatibility checker",
            100,
        );

        let results = query_knowledge(&conn, "dimmer", None, &QueryLimits::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, high);
        assert_eq!(results[1].id, low);
    }

    #[test]
    fn kind_scope_narrows_and_caps() {
        let mut conn = test_db();
        for i in 0..8 {
            insert(
                &mut conn,
                KnowledgeKind::Product,
                &format!("Bulb fact {i}"),
                &format!("Bulb generation gen{i} supports tunable white light"),
                80,
            );
        }
        insert(
            &mut conn,
            KnowledgeKind::Pricing,
            "Bulb pricing",
            "Bulb pricing starts at nineteen dollars",
            80,
        );

        let scoped = query_knowledge(
            &conn,
            "bulb",
            Some(KnowledgeKind::Product),
            &QueryLimits::default(),
        )
        .unwrap();
        assert_eq!(scoped.len(), 5); // scoped cap
        assert!(scoped.iter().all(|e| e.kind == KnowledgeKind::Product));
    }

    #[test]
    fn unscoped_cap_is_ten() {
        let mut conn = test_db();
        for i in 0..14 {
            insert(
                &mut conn,
                KnowledgeKind::General,
                &format!("Note {i}"),
                &format!("General sensor note number {i} zebra{i}"),
                80,
            );
        }

        let results = query_knowledge(&conn, "sensor", None, &QueryLimits::default()).unwrap();
        assert_eq!(results.len(), 10);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let mut conn = test_db();
        insert(
            &mut conn,
            KnowledgeKind::General,
            "Something",
            "Some sensor content",
            80,
        );
        let results = query_knowledge(&conn, "the a an", None, &QueryLimits::default()).unwrap();
        assert!(results.is_empty());
    }
}
