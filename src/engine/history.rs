//! Conversation audit trail and feedback.
//!
//! Every successful route writes one conversation row (best-effort, from the
//! engine's fire-and-forget task). Feedback lands on the same row later and
//! feeds the maturity engine's positive/negative counts, as does the
//! trailing confidence average used as a success proxy.

use anyhow::{bail, Result};
use rusqlite::{params, Connection};

use crate::classify::Intent;

/// One conversation audit row, id supplied by the caller so the engine can
/// return it before the asynchronous write lands.
#[derive(Debug, Clone)]
pub struct ConversationWrite {
    pub id: String,
    pub message: String,
    pub response: String,
    pub intent: Intent,
    pub confidence: f64,
    pub role: Option<String>,
    pub module: Option<String>,
}

/// Insert a conversation audit row.
pub fn write_conversation(conn: &Connection, record: &ConversationWrite) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO conversations (id, message, response, intent, confidence, role, module, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.id,
            record.message,
            record.response,
            record.intent.as_str(),
            record.confidence,
            record.role,
            record.module,
            now,
        ],
    )?;
    Ok(())
}

/// Record positive or negative feedback on a past conversation.
pub fn record_feedback(conn: &Connection, conversation_id: &str, positive: bool) -> Result<()> {
    let feedback = if positive { "positive" } else { "negative" };
    let rows = conn.execute(
        "UPDATE conversations SET feedback = ?1 WHERE id = ?2",
        params![feedback, conversation_id],
    )?;
    if rows == 0 {
        bail!("conversation not found: {conversation_id}");
    }
    Ok(())
}

/// Mean confidence over the trailing window, or `None` with no conversations.
pub fn trailing_confidence(conn: &Connection, days: i64) -> Result<Option<f64>> {
    let cutoff = (chrono::Utc::now() - chrono::Duration::days(days)).to_rfc3339();
    let avg: Option<f64> = conn.query_row(
        "SELECT AVG(confidence) FROM conversations WHERE created_at >= ?1",
        params![cutoff],
        |row| row.get(0),
    )?;
    Ok(avg)
}

/// Positive and negative feedback counts.
pub fn feedback_counts(conn: &Connection) -> Result<(u64, u64)> {
    let positive: i64 = conn.query_row(
        "SELECT COUNT(*) FROM conversations WHERE feedback = 'positive'",
        [],
        |row| row.get(0),
    )?;
    let negative: i64 = conn.query_row(
        "SELECT COUNT(*) FROM conversations WHERE feedback = 'negative'",
        [],
        |row| row.get(0),
    )?;
    Ok((positive as u64, negative as u64))
}
