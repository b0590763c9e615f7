use anyhow::Result;

use axon::config::AxonConfig;
use axon::engine::history;
use axon::knowledge::types::KnowledgeKind;

/// Display knowledge store statistics in the terminal.
pub fn stats(config: &AxonConfig) -> Result<()> {
    let conn = axon::db::open_database(config.resolved_db_path())?;

    let response = axon::knowledge::stats::knowledge_stats(&conn)?;
    let (positive, negative) = history::feedback_counts(&conn)?;

    println!("Knowledge Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total entries:       {}", response.total_entries);
    println!("  Active:              {}", response.active_entries);
    println!("  Superseded:          {}", response.superseded_entries);
    println!();

    println!("Active by kind:");
    for kind in KnowledgeKind::ALL {
        let count = response.by_kind.get(kind.as_str()).copied().unwrap_or(0);
        println!("  {:<16} {}", kind.as_str(), count);
    }
    println!();

    println!("Distinct kinds:        {}", response.distinct_kinds);
    println!("Feedback:              +{positive} / -{negative}");

    if let Some(ref oldest) = response.oldest_entry {
        println!("Oldest entry:          {oldest}");
    }
    if let Some(ref newest) = response.newest_entry {
        println!("Newest entry:          {newest}");
    }

    Ok(())
}
