//! SQL DDL for all Axon tables.
//!
//! Defines the `knowledge`, `corrections`, `conversations`,
//! `maturity_snapshots`, `knowledge_log`, and `schema_meta` tables. All DDL
//! uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// All schema DDL statements for Axon's core tables.
const SCHEMA_SQL: &str = r#"
-- Knowledge store
CREATE TABLE IF NOT EXISTS knowledge (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL CHECK(kind IN ('product','pricing','troubleshooting','orders','support','pattern','general','admin')),
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    keywords TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    metadata TEXT,
    usage_count INTEGER NOT NULL DEFAULT 0,
    success_rate REAL NOT NULL DEFAULT 0.0 CHECK(success_rate >= 0.0 AND success_rate <= 100.0),
    priority INTEGER NOT NULL DEFAULT 70 CHECK(priority >= 0 AND priority <= 100),
    active INTEGER NOT NULL DEFAULT 1,
    superseded_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_knowledge_kind ON knowledge(kind);
CREATE INDEX IF NOT EXISTS idx_knowledge_active ON knowledge(active);
CREATE INDEX IF NOT EXISTS idx_knowledge_priority ON knowledge(priority);
CREATE INDEX IF NOT EXISTS idx_knowledge_superseded ON knowledge(superseded_by);

-- Uniqueness backstop for reinforce-or-create: two concurrent first
-- sightings of equivalent content collide here instead of duplicating.
CREATE UNIQUE INDEX IF NOT EXISTS idx_knowledge_hash
    ON knowledge(kind, content_hash) WHERE active = 1;

-- Supervised corrections (append-only)
CREATE TABLE IF NOT EXISTS corrections (
    id TEXT PRIMARY KEY,
    conversation_id TEXT,
    original_response TEXT NOT NULL,
    corrected_response TEXT NOT NULL,
    admin_id TEXT NOT NULL,
    reason TEXT,
    priority TEXT NOT NULL CHECK(priority IN ('low','medium','high','critical')),
    status TEXT NOT NULL DEFAULT 'applied',
    applied_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_corrections_conversation ON corrections(conversation_id);

-- Conversation audit trail
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    message TEXT NOT NULL,
    response TEXT NOT NULL,
    intent TEXT NOT NULL,
    confidence REAL NOT NULL CHECK(confidence >= 0.0 AND confidence <= 1.0),
    role TEXT,
    module TEXT,
    feedback TEXT CHECK(feedback IN ('positive','negative')),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_conversations_created ON conversations(created_at);

-- Maturity snapshots (insert-only)
CREATE TABLE IF NOT EXISTS maturity_snapshots (
    id TEXT PRIMARY KEY,
    level TEXT NOT NULL CHECK(level IN ('beginner','intermediate','advanced','expert')),
    score INTEGER NOT NULL CHECK(score >= 0 AND score <= 100),
    report TEXT NOT NULL,
    analyzed_by TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Audit log for knowledge mutations
CREATE TABLE IF NOT EXISTS knowledge_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation TEXT NOT NULL CHECK(operation IN ('create','reinforce','supersede','correction','rule','pattern')),
    entry_id TEXT NOT NULL,
    details TEXT,
    created_at TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
