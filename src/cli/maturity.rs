use anyhow::Result;

use axon::config::AxonConfig;

/// Run a maturity analysis, persist the snapshot, and print it.
pub fn maturity(config: &AxonConfig, analyzed_by: &str, json: bool) -> Result<()> {
    let mut conn = axon::db::open_database(config.resolved_db_path())?;
    let snapshot = axon::maturity::analyze_maturity(&mut conn, analyzed_by)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Maturity Assessment");
    println!("{}", "=".repeat(40));
    println!("  Level:  {}", snapshot.level);
    println!("  Score:  {}/100", snapshot.score);
    println!();

    println!("Factors:");
    for factor in &snapshot.factors {
        println!("  {:<10} {:>5.1}/25", factor.name, factor.score);
    }
    println!();

    println!("Strengths:");
    for s in &snapshot.strengths {
        println!("  + {s}");
    }

    if !snapshot.weaknesses.is_empty() {
        println!("Weaknesses:");
        for w in &snapshot.weaknesses {
            let marker = if w.high_priority { "!" } else { "-" };
            println!("  {marker} {}", w.description);
        }
    }

    println!("Recommendations:");
    for r in &snapshot.recommendations {
        println!("  * {r}");
    }

    Ok(())
}
