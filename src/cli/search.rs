use anyhow::Result;

use axon::config::AxonConfig;
use axon::knowledge::query::{query_knowledge, QueryLimits};
use axon::knowledge::types::KnowledgeKind;

/// Search the knowledge store and print the ranked results.
pub fn search(config: &AxonConfig, query: &str, kind: Option<&str>) -> Result<()> {
    let kind = kind
        .map(|k| k.parse::<KnowledgeKind>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let conn = axon::db::open_database(config.resolved_db_path())?;
    let limits = QueryLimits {
        max_results: config.retrieval.max_results,
        scoped_max_results: config.retrieval.scoped_max_results,
    };
    let results = query_knowledge(&conn, query, kind, &limits)?;

    if results.is_empty() {
        println!("No matching knowledge.");
        return Ok(());
    }

    for entry in &results {
        println!(
            "[{:<15}] p{:>3} s{:>5.1} u{:>3}  {}",
            entry.kind, entry.priority, entry.success_rate, entry.usage_count, entry.title
        );
        println!("    {}", entry.content);
        println!("    id: {}", entry.id);
    }
    println!();
    println!("{} result(s)", results.len());

    Ok(())
}
