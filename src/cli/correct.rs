use anyhow::Result;

use axon::config::AxonConfig;
use axon::training::{apply_correction, Correction, CorrectionPriority};

/// Apply a supervised correction from the command line.
pub fn correct(
    config: &AxonConfig,
    original: &str,
    corrected: &str,
    priority: &str,
    admin_id: &str,
    reason: Option<&str>,
) -> Result<()> {
    let priority: CorrectionPriority = priority.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let mut conn = axon::db::open_database(config.resolved_db_path())?;
    let outcome = apply_correction(
        &mut conn,
        &Correction {
            conversation_id: None,
            original_response: original.to_string(),
            corrected_response: corrected.to_string(),
            admin_id: admin_id.to_string(),
            reason: reason.map(String::from),
            priority,
        },
    )?;

    println!("Correction {} applied", outcome.correction_id);
    println!("  knowledge entry: {}", outcome.entry_id);
    if outcome.superseded.is_empty() {
        println!("  superseded:      none");
    } else {
        for id in &outcome.superseded {
            println!("  superseded:      {id}");
        }
    }
    Ok(())
}
