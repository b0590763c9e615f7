#![allow(dead_code)]

use axon::knowledge::store::reinforce_or_create;
use axon::knowledge::types::{KnowledgeCandidate, KnowledgeKind, PRIORITY_INTERACTION};
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    axon::db::open_memory_database().unwrap()
}

/// Insert a knowledge entry through the regular write path. Returns its id.
pub fn insert_knowledge(conn: &mut Connection, kind: KnowledgeKind, content: &str) -> String {
    let candidate = KnowledgeCandidate {
        kind,
        title: content.split_whitespace().take(4).collect::<Vec<_>>().join(" "),
        content: content.to_string(),
        metadata: None,
        priority: PRIORITY_INTERACTION,
    };
    reinforce_or_create(conn, &candidate).unwrap().id
}

/// Count rows in a table.
pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
