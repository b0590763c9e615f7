use anyhow::Result;

use axon::config::AxonConfig;

/// Record feedback on a past conversation.
pub fn feedback(config: &AxonConfig, conversation_id: &str, negative: bool) -> Result<()> {
    let conn = axon::db::open_database(config.resolved_db_path())?;
    axon::engine::history::record_feedback(&conn, conversation_id, !negative)?;

    let polarity = if negative { "negative" } else { "positive" };
    println!("Recorded {polarity} feedback on {conversation_id}");
    Ok(())
}
