use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

use super::types::KnowledgeKind;

/// Aggregated knowledge store statistics.
#[derive(Debug, Serialize)]
pub struct KnowledgeStats {
    pub total_entries: u64,
    pub active_entries: u64,
    pub superseded_entries: u64,
    /// Active entry counts per kind, zero-filled for absent kinds.
    pub by_kind: HashMap<String, u64>,
    /// Number of kinds with at least one active entry.
    pub distinct_kinds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_entry: Option<String>,
}

/// Compute knowledge store statistics.
pub fn knowledge_stats(conn: &Connection) -> Result<KnowledgeStats> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM knowledge", [], |row| row.get(0))?;
    let active: i64 = conn.query_row(
        "SELECT COUNT(*) FROM knowledge WHERE active = 1",
        [],
        |row| row.get(0),
    )?;

    let mut by_kind = HashMap::new();
    for kind in KnowledgeKind::ALL {
        by_kind.insert(kind.as_str().to_string(), 0u64);
    }
    let mut stmt =
        conn.prepare("SELECT kind, COUNT(*) FROM knowledge WHERE active = 1 GROUP BY kind")?;
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    let distinct_kinds = rows.len() as u64;
    for (kind, count) in rows {
        by_kind.insert(kind, count as u64);
    }

    let (oldest, newest): (Option<String>, Option<String>) = conn.query_row(
        "SELECT MIN(created_at), MAX(created_at) FROM knowledge",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(KnowledgeStats {
        total_entries: total as u64,
        active_entries: active as u64,
        superseded_entries: (total - active) as u64,
        by_kind,
        distinct_kinds,
        oldest_entry: oldest,
        newest_entry: newest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::knowledge::store::reinforce_or_create;
    use crate::knowledge::supersede::supersede_matching;
    use crate::knowledge::types::{KnowledgeCandidate, PRIORITY_INTERACTION};

    fn test_db() -> Connection {
        db::open_memory_database().unwrap()
    }

    fn insert(conn: &mut Connection, kind: KnowledgeKind, content: &str) -> String {
        let candidate = KnowledgeCandidate {
            kind,
            title: "entry".into(),
            content: content.into(),
            metadata: None,
            priority: PRIORITY_INTERACTION,
        };
        reinforce_or_create(conn, &candidate).unwrap().id
    }

    #[test]
    fn empty_store_stats() {
        let conn = test_db();
        let stats = knowledge_stats(&conn).unwrap();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.active_entries, 0);
        assert_eq!(stats.superseded_entries, 0);
        assert_eq!(stats.distinct_kinds, 0);
        assert_eq!(stats.by_kind["product"], 0);
        assert!(stats.oldest_entry.is_none());
    }

    #[test]
    fn counts_by_kind_and_distinct_kinds() {
        let mut conn = test_db();
        insert(&mut conn, KnowledgeKind::Product, "Bulbs dim to one percent");
        insert(&mut conn, KnowledgeKind::Pricing, "Starter kits cost less");
        insert(&mut conn, KnowledgeKind::Pricing, "Renewals bill annually");

        let stats = knowledge_stats(&conn).unwrap();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.active_entries, 3);
        assert_eq!(stats.by_kind["product"], 1);
        assert_eq!(stats.by_kind["pricing"], 2);
        assert_eq!(stats.by_kind["admin"], 0);
        assert_eq!(stats.distinct_kinds, 2);
    }

    #[test]
    fn superseded_entries_counted_separately() {
        let mut conn = test_db();
        insert(&mut conn, KnowledgeKind::Support, "Old sensor pairing advice");
        let replacement = insert(&mut conn, KnowledgeKind::Admin, "New sensor pairing advice");
        supersede_matching(&mut conn, "Old sensor pairing advice", &replacement).unwrap();

        let stats = knowledge_stats(&conn).unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.active_entries, 1);
        assert_eq!(stats.superseded_entries, 1);
    }

    #[test]
    fn timestamps_present_when_entries_exist() {
        let mut conn = test_db();
        insert(&mut conn, KnowledgeKind::General, "Bridges hold fifty devices");

        let stats = knowledge_stats(&conn).unwrap();
        assert!(stats.oldest_entry.is_some());
        assert!(stats.newest_entry.is_some());
    }
}
