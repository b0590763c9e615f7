use anyhow::Result;

use axon::config::AxonConfig;

/// Check database health and print a report.
pub fn doctor(config: &AxonConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = axon::db::open_database(&db_path)?;
    let report = axon::db::check_database_health(&conn)?;

    println!("Database Health");
    println!("{}", "=".repeat(40));
    println!("  Path:             {}", db_path.display());
    println!("  Integrity:        {}", if report.integrity_ok { "ok" } else { "FAILED" });
    println!("  Schema version:   {}", report.schema_version);
    println!(
        "  Ruleset version:  {}",
        report.ruleset_version.as_deref().unwrap_or("unset")
    );
    println!("  Knowledge rows:   {} ({} active)", report.knowledge_count, report.active_knowledge_count);
    println!("  Corrections:      {}", report.correction_count);
    println!("  Conversations:    {}", report.conversation_count);
    println!("  Audit log rows:   {}", report.log_count);

    if let Some(stored) = &report.ruleset_version {
        if stored != axon::classify::keywords::RULESET_VERSION {
            println!();
            println!(
                "Warning: database was written with ruleset {stored}, binary compiles {}",
                axon::classify::keywords::RULESET_VERSION
            );
        }
    }

    Ok(())
}
