use anyhow::Result;

use axon::config::AxonConfig;

/// Teach a rule (or a response pattern) directly into the knowledge store.
pub fn teach(config: &AxonConfig, title: &str, content: &str, pattern: bool) -> Result<()> {
    let mut conn = axon::db::open_database(config.resolved_db_path())?;

    let id = if pattern {
        axon::training::save_pattern(&mut conn, title, content, "cli-admin")?
    } else {
        axon::training::insert_rule(&mut conn, title, content, "cli-admin")?
    };

    let what = if pattern { "pattern" } else { "rule" };
    println!("Stored {what} {id}");
    Ok(())
}
