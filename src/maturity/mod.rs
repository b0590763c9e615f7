//! Maturity self-assessment.
//!
//! A read-path over aggregated statistics: four weighted factors, each
//! capped at 25, sum to a 0–100 score that maps onto a maturity level. The
//! scoring itself ([`score_maturity`]) is a pure function so it can be
//! exercised without a store; [`analyze_maturity`] gathers the live stats,
//! scores them, and persists the snapshot immutably.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::engine::history;

/// Factor cap; four factors sum to at most 100.
const FACTOR_CAP: f64 = 25.0;

/// Entries at which the memory factor saturates.
const MEMORY_SATURATION: f64 = 100.0;
/// Training events at which the training factor saturates.
const TRAINING_SATURATION: f64 = 50.0;
/// Distinct categories at which the diversity factor saturates.
const DIVERSITY_SATURATION: f64 = 10.0;

/// Maturity levels, thresholded on the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl MaturityLevel {
    /// Fixed thresholds: ≥75 expert, ≥50 advanced, ≥25 intermediate.
    pub fn for_score(score: u32) -> Self {
        match score {
            75.. => Self::Expert,
            50..=74 => Self::Advanced,
            25..=49 => Self::Intermediate,
            _ => Self::Beginner,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

impl std::fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated inputs to the scoring function.
#[derive(Debug, Clone, Serialize)]
pub struct MaturityStats {
    /// Active knowledge entries.
    pub memory_size: u64,
    /// Trailing-30-day mean conversation confidence, scaled to `[0, 100]`.
    pub avg_success: f64,
    /// Supervised training events (corrections, rules, patterns).
    pub training_count: u64,
    /// Knowledge kinds with at least one active entry.
    pub category_count: u64,
    pub positive_feedback: u64,
    pub negative_feedback: u64,
}

/// One scored factor.
#[derive(Debug, Clone, Serialize)]
pub struct Factor {
    pub name: &'static str,
    /// Capped at 25.
    pub score: f64,
}

/// A weakness, optionally flagged for a fix recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct Weakness {
    pub description: String,
    pub high_priority: bool,
}

/// A point-in-time scored self-assessment. Immutable once written.
#[derive(Debug, Serialize)]
pub struct MaturitySnapshot {
    pub id: String,
    pub level: MaturityLevel,
    pub score: u32,
    pub factors: Vec<Factor>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<Weakness>,
    pub recommendations: Vec<String>,
    pub stats: MaturityStats,
    pub analyzed_by: String,
    pub created_at: String,
}

/// Pure scoring: four capped factors summed into a level.
pub fn score_maturity(stats: &MaturityStats) -> (u32, MaturityLevel, Vec<Factor>) {
    let factors = vec![
        Factor {
            name: "memory",
            score: (stats.memory_size as f64 / MEMORY_SATURATION * FACTOR_CAP).min(FACTOR_CAP),
        },
        Factor {
            name: "success",
            score: (stats.avg_success / 100.0 * FACTOR_CAP).min(FACTOR_CAP),
        },
        Factor {
            name: "training",
            score: (stats.training_count as f64 / TRAINING_SATURATION * FACTOR_CAP)
                .min(FACTOR_CAP),
        },
        Factor {
            name: "diversity",
            score: (stats.category_count as f64 / DIVERSITY_SATURATION * FACTOR_CAP)
                .min(FACTOR_CAP),
        },
    ];

    let score = factors
        .iter()
        .map(|f| f.score)
        .sum::<f64>()
        .round()
        .clamp(0.0, 100.0) as u32;

    (score, MaturityLevel::for_score(score), factors)
}

/// Independent per-stat strength and weakness thresholds.
fn assess(stats: &MaturityStats) -> (Vec<String>, Vec<Weakness>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if stats.memory_size > 100 {
        strengths.push("broad knowledge base".to_string());
    } else if stats.memory_size < 50 {
        weaknesses.push(Weakness {
            description: "knowledge base is thin".into(),
            high_priority: true,
        });
    }

    if stats.avg_success > 80.0 {
        strengths.push("high answer confidence".to_string());
    } else if stats.avg_success < 60.0 {
        weaknesses.push(Weakness {
            description: "answer confidence is low".into(),
            high_priority: true,
        });
    }

    if stats.training_count > 20 {
        strengths.push("well trained".to_string());
    } else if stats.training_count < 10 {
        weaknesses.push(Weakness {
            description: "little supervised training".into(),
            high_priority: false,
        });
    }

    if stats.category_count > 8 {
        strengths.push("diverse knowledge categories".to_string());
    } else if stats.category_count < 3 {
        weaknesses.push(Weakness {
            description: "narrow category coverage".into(),
            high_priority: false,
        });
    }

    if stats.positive_feedback > 50 {
        strengths.push("strong positive feedback".to_string());
    }
    if stats.negative_feedback > 10 {
        weaknesses.push(Weakness {
            description: "accumulating negative feedback".into(),
            high_priority: false,
        });
    }

    // The strengths list is never empty: early stores get a default entry.
    if strengths.is_empty() {
        strengths.push("early development stage".to_string());
    }

    (strengths, weaknesses)
}

/// One tiered recommendation per level, plus one fix per high-priority
/// weakness.
fn recommend(level: MaturityLevel, weaknesses: &[Weakness]) -> Vec<String> {
    let tiered = match level {
        MaturityLevel::Beginner => {
            "Seed core product knowledge and start applying supervised corrections."
        }
        MaturityLevel::Intermediate => {
            "Broaden category coverage and review low-confidence conversations."
        }
        MaturityLevel::Advanced => {
            "Tune handler confidence and retire stale entries to lift the success rate."
        }
        MaturityLevel::Expert => {
            "Maintain cadence: audit supersession chains and correction quality periodically."
        }
    };

    let mut recommendations = vec![tiered.to_string()];
    for weakness in weaknesses.iter().filter(|w| w.high_priority) {
        recommendations.push(format!("Fix: {}", weakness.description));
    }
    recommendations
}

/// Gather live statistics, score them, persist the snapshot, return it.
pub fn analyze_maturity(conn: &mut Connection, analyzed_by: &str) -> Result<MaturitySnapshot> {
    let stats = gather_stats(conn)?;
    let (score, level, factors) = score_maturity(&stats);
    let (strengths, weaknesses) = assess(&stats);
    let recommendations = recommend(level, &weaknesses);

    let snapshot = MaturitySnapshot {
        id: uuid::Uuid::now_v7().to_string(),
        level,
        score,
        factors,
        strengths,
        weaknesses,
        recommendations,
        stats,
        analyzed_by: analyzed_by.to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    let report = serde_json::to_string(&snapshot).context("failed to serialize snapshot")?;
    conn.execute(
        "INSERT INTO maturity_snapshots (id, level, score, report, analyzed_by, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            snapshot.id,
            snapshot.level.as_str(),
            snapshot.score,
            report,
            snapshot.analyzed_by,
            snapshot.created_at,
        ],
    )
    .context("failed to persist maturity snapshot")?;

    tracing::info!(score = snapshot.score, level = %snapshot.level, "maturity analyzed");
    Ok(snapshot)
}

/// Aggregate the live inputs for one analysis run.
fn gather_stats(conn: &Connection) -> Result<MaturityStats> {
    let knowledge = crate::knowledge::stats::knowledge_stats(conn)?;

    let avg_success = history::trailing_confidence(conn, 30)?
        .map(|avg| avg * 100.0)
        .unwrap_or(0.0);

    let training_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM knowledge_log WHERE operation IN ('correction','rule','pattern')",
        [],
        |row| row.get(0),
    )?;

    let (positive_feedback, negative_feedback) = history::feedback_counts(conn)?;

    Ok(MaturityStats {
        memory_size: knowledge.active_entries,
        avg_success,
        training_count: training_count as u64,
        category_count: knowledge.distinct_kinds,
        positive_feedback,
        negative_feedback,
    })
}
