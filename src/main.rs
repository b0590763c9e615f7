mod cli;

use anyhow::Result;
use axon::config::AxonConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "axon", version, about = "Dialogue routing engine with a self-reinforcing knowledge memory")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Route a single message through the engine and print the response
    Ask {
        /// The message to route
        message: String,
        /// Caller role (e.g. user, admin, owner)
        #[arg(long, default_value = "user")]
        role: String,
    },
    /// Search the knowledge store
    Search {
        /// Free-text query
        query: String,
        /// Restrict to a knowledge kind (product, pricing, troubleshooting,
        /// orders, support, pattern, general, admin)
        #[arg(long)]
        kind: Option<String>,
    },
    /// Show knowledge store statistics
    Stats,
    /// Run a maturity self-assessment and persist the snapshot
    Maturity {
        /// Identifier recorded as the analyst
        #[arg(long, default_value = "cli")]
        analyzed_by: String,
        /// Print the full snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Teach a rule (or pattern) directly into the knowledge store
    Teach {
        /// Short title for the entry
        title: String,
        /// The knowledge content
        content: String,
        /// Store as a response pattern instead of an admin rule
        #[arg(long)]
        pattern: bool,
    },
    /// Apply a supervised correction
    Correct {
        /// The response text being corrected
        original: String,
        /// The corrected response
        corrected: String,
        /// Correction priority: low, medium, high, critical
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Admin identifier recorded on the correction
        #[arg(long, default_value = "cli-admin")]
        admin_id: String,
        /// Optional reason for the correction
        #[arg(long)]
        reason: Option<String>,
    },
    /// Record feedback on a past conversation
    Feedback {
        /// Conversation id (printed by `ask`)
        conversation_id: String,
        /// Record negative feedback instead of positive
        #[arg(long)]
        negative: bool,
    },
    /// Check database health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = AxonConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for piped output.
    let filter = EnvFilter::try_new(&config.logging.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Ask { message, role } => {
            cli::ask::ask(&config, &message, &role).await?;
        }
        Command::Search { query, kind } => {
            cli::search::search(&config, &query, kind.as_deref())?;
        }
        Command::Stats => {
            cli::stats::stats(&config)?;
        }
        Command::Maturity { analyzed_by, json } => {
            cli::maturity::maturity(&config, &analyzed_by, json)?;
        }
        Command::Teach {
            title,
            content,
            pattern,
        } => {
            cli::teach::teach(&config, &title, &content, pattern)?;
        }
        Command::Correct {
            original,
            corrected,
            priority,
            admin_id,
            reason,
        } => {
            cli::correct::correct(
                &config,
                &original,
                &corrected,
                &priority,
                &admin_id,
                reason.as_deref(),
            )?;
        }
        Command::Feedback {
            conversation_id,
            negative,
        } => {
            cli::feedback::feedback(&config, &conversation_id, negative)?;
        }
        Command::Doctor => {
            cli::doctor::doctor(&config)?;
        }
    }

    Ok(())
}
