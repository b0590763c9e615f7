//! Supervised training subsystem.
//!
//! Three admin-only entry points feed the knowledge store:
//! [`apply_correction`] reacts to a bad response (and may suppress the
//! knowledge that produced it), while [`insert_rule`] and [`save_pattern`]
//! teach proactively with no suppression. Unlike the routing path, failures
//! here propagate to the caller — silently dropping an explicit admin action
//! would itself be a defect.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::knowledge::store::{reinforce_or_create, write_knowledge_log};
use crate::knowledge::supersede::supersede_matching;
use crate::knowledge::types::{
    KnowledgeCandidate, KnowledgeKind, PRIORITY_CORRECTION, PRIORITY_PATTERN, PRIORITY_RULE,
};

/// Correction precedence. High and critical corrections additionally
/// suppress the knowledge that produced the original response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl CorrectionPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Whether this priority also supersedes conflicting entries.
    pub fn triggers_suppression(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl std::fmt::Display for CorrectionPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CorrectionPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("unknown correction priority: {s}")),
        }
    }
}

/// One supervised correction from an admin.
#[derive(Debug, Clone)]
pub struct Correction {
    pub conversation_id: Option<String>,
    pub original_response: String,
    pub corrected_response: String,
    pub admin_id: String,
    pub reason: Option<String>,
    pub priority: CorrectionPriority,
}

/// Result of applying a correction.
#[derive(Debug, Serialize)]
pub struct CorrectionOutcome {
    /// Id of the appended correction record.
    pub correction_id: String,
    /// Id of the admin knowledge entry created or reinforced from the
    /// corrected response.
    pub entry_id: String,
    /// Ids of the entries deactivated by the suppression pass.
    pub superseded: Vec<String>,
}

/// Apply a supervised correction.
///
/// The correction record is persisted immediately with status `applied` —
/// there is no pending state; the admin gate already restricted who can
/// reach this path. The corrected response lands in the store as an
/// admin-kind entry at top priority, and high/critical corrections then
/// suppress entries matching the original response.
pub fn apply_correction(
    conn: &mut Connection,
    correction: &Correction,
) -> Result<CorrectionOutcome> {
    let correction_id = uuid::Uuid::now_v7().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO corrections (id, conversation_id, original_response, corrected_response, \
         admin_id, reason, priority, status, applied_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'applied', ?8)",
        params![
            correction_id,
            correction.conversation_id,
            correction.original_response,
            correction.corrected_response,
            correction.admin_id,
            correction.reason,
            correction.priority.as_str(),
            now,
        ],
    )
    .context("failed to persist correction record")?;

    let candidate = KnowledgeCandidate {
        kind: KnowledgeKind::Admin,
        title: derive_title(&correction.corrected_response),
        content: correction.corrected_response.clone(),
        metadata: Some(serde_json::json!({
            "training_type": "correction",
            "admin_id": correction.admin_id,
            "correction_id": correction_id,
        })),
        priority: PRIORITY_CORRECTION,
    };
    let entry = reinforce_or_create(conn, &candidate)
        .context("failed to store corrected response")?;

    write_knowledge_log(
        conn,
        "correction",
        &entry.id,
        Some(&serde_json::json!({
            "correction_id": correction_id,
            "priority": correction.priority.as_str(),
        })),
    )?;

    let superseded = if correction.priority.triggers_suppression() {
        supersede_matching(conn, &correction.original_response, &entry.id)
            .context("suppression pass failed")?
    } else {
        Vec::new()
    };

    tracing::info!(
        correction_id = %correction_id,
        entry_id = %entry.id,
        priority = %correction.priority,
        superseded = superseded.len(),
        "correction applied"
    );

    Ok(CorrectionOutcome {
        correction_id,
        entry_id: entry.id,
        superseded,
    })
}

/// Teach a rule proactively. No correction record, no suppression.
pub fn insert_rule(
    conn: &mut Connection,
    title: &str,
    content: &str,
    admin_id: &str,
) -> Result<String> {
    let candidate = KnowledgeCandidate {
        kind: KnowledgeKind::Admin,
        title: title.to_string(),
        content: content.to_string(),
        metadata: Some(serde_json::json!({
            "training_type": "rule",
            "admin_id": admin_id,
        })),
        priority: PRIORITY_RULE,
    };
    let entry = reinforce_or_create(conn, &candidate).context("failed to store rule")?;
    write_knowledge_log(conn, "rule", &entry.id, None)?;
    Ok(entry.id)
}

/// Teach a response pattern. Parallel to [`insert_rule`], stored under the
/// pattern kind so retrieval can scope to it.
pub fn save_pattern(
    conn: &mut Connection,
    title: &str,
    content: &str,
    admin_id: &str,
) -> Result<String> {
    let candidate = KnowledgeCandidate {
        kind: KnowledgeKind::Pattern,
        title: title.to_string(),
        content: content.to_string(),
        metadata: Some(serde_json::json!({
            "training_type": "pattern",
            "admin_id": admin_id,
        })),
        priority: PRIORITY_PATTERN,
    };
    let entry = reinforce_or_create(conn, &candidate).context("failed to store pattern")?;
    write_knowledge_log(conn, "pattern", &entry.id, None)?;
    Ok(entry.id)
}

/// First words of the content, capped, for use as an entry title.
fn derive_title(content: &str) -> String {
    let mut title: String = content.split_whitespace().take(8).collect::<Vec<_>>().join(" ");
    if title.len() > 60 {
        title.truncate(
            title
                .char_indices()
                .take_while(|(i, _)| *i < 60)
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(60),
        );
    }
    title
}
