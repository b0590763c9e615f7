//! Request orchestration.
//!
//! [`Engine::route`] runs the full pipeline for one inbound message:
//! persona prompt → classification → admin gate → knowledge query → handler
//! dispatch → confidence blend → fire-and-forget conversation audit. The
//! call never fails across the module boundary: storage problems degrade to
//! empty results, and anything else is converted to an `error`-intent
//! outcome at the single top-level catch.

pub mod handlers;
pub mod history;
pub mod persona;

use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

use crate::classify::{classify, is_admin_role, Intent};
use crate::config::AxonConfig;
use crate::knowledge::query::{query_knowledge, QueryLimits};
use crate::knowledge::types::KnowledgeEntry;
use handlers::{HandlerInput, HandlerRegistry, RequestContext};
use history::ConversationWrite;
use persona::{persona_prompt, PersonaContext};

/// Substituted when a handler omits its own confidence.
pub const DEFAULT_HANDLER_CONFIDENCE: f64 = 0.7;

/// Ceiling on the blended confidence reported to callers.
pub const MAX_BLENDED_CONFIDENCE: f64 = 0.95;

/// Internal orchestration failures. Callers never see these as errors —
/// [`Engine::route`] converts them to an `error`-intent outcome.
#[derive(Debug, Error)]
pub enum RouteFailure {
    #[error("no handler registered for intent {0}")]
    MissingHandler(Intent),
    #[error("handler failed: {0}")]
    Handler(String),
}

/// Result metadata attached to every outcome.
#[derive(Debug, Clone, Serialize)]
pub struct RouteMetadata {
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    pub knowledge_used: Vec<String>,
    pub memory_results: usize,
    pub was_redirected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Unified result of routing one message.
#[derive(Debug, Clone, Serialize)]
pub struct RouteOutcome {
    pub response: String,
    pub intent: Intent,
    pub confidence: f64,
    /// Audit row id, available immediately even though the write is
    /// asynchronous. `None` for forbidden and error outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub metadata: RouteMetadata,
}

/// The orchestrator. Cheap to share: all state lives behind `Arc`s.
#[derive(Clone)]
pub struct Engine {
    db: Arc<Mutex<Connection>>,
    registry: Arc<HandlerRegistry>,
    config: Arc<AxonConfig>,
}

impl Engine {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        registry: HandlerRegistry,
        config: Arc<AxonConfig>,
    ) -> Self {
        // Surface a keyword-table drift warning once at startup, like a
        // schema mismatch: old entries were extracted with old tables.
        if let Ok(conn) = db.lock() {
            if let Ok(Some(stored)) = crate::db::migrations::get_ruleset_version(&conn) {
                if stored != crate::classify::keywords::RULESET_VERSION {
                    tracing::warn!(
                        stored = %stored,
                        compiled = %crate::classify::keywords::RULESET_VERSION,
                        "classifier ruleset changed since this database was written"
                    );
                }
            }
        }

        Self {
            db,
            registry: Arc::new(registry),
            config,
        }
    }

    /// Route one message. Never fails: every failure mode is data.
    pub async fn route(&self, message: &str, context: &RequestContext) -> RouteOutcome {
        match self.route_inner(message, context).await {
            Ok(outcome) => outcome,
            Err(failure) => {
                tracing::error!(error = %failure, "route failed");
                RouteOutcome {
                    response: "Something went wrong while handling that message.".into(),
                    intent: Intent::Error,
                    confidence: 0.0,
                    conversation_id: None,
                    metadata: RouteMetadata {
                        reasoning: "orchestration failure".into(),
                        module: None,
                        knowledge_used: Vec::new(),
                        memory_results: 0,
                        was_redirected: false,
                        error: Some(failure.to_string()),
                    },
                }
            }
        }
    }

    async fn route_inner(
        &self,
        message: &str,
        context: &RequestContext,
    ) -> Result<RouteOutcome, RouteFailure> {
        let prompt = persona_prompt(&PersonaContext {
            assistant_name: &self.config.persona.assistant_name,
            brand: &self.config.persona.brand,
            role: context.role.as_deref(),
            history: &context.history,
        });

        let classification = classify(message);
        tracing::debug!(
            intent = %classification.intent,
            confidence = classification.confidence,
            "message classified"
        );

        // Admin gate: restricted intents stop here for non-admin roles,
        // before any store I/O.
        if classification.intent.is_admin_restricted()
            && !is_admin_role(context.role.as_deref())
        {
            tracing::info!(
                intent = %classification.intent,
                role = context.role.as_deref().unwrap_or("none"),
                "admin-restricted intent denied"
            );
            return Ok(RouteOutcome {
                response: "That operation is restricted to administrator roles.".into(),
                intent: Intent::Forbidden,
                confidence: 1.0,
                conversation_id: None,
                metadata: RouteMetadata {
                    reasoning: format!(
                        "admin-restricted intent {} requested without an admin role",
                        classification.intent
                    ),
                    module: None,
                    knowledge_used: Vec::new(),
                    memory_results: 0,
                    was_redirected: true,
                    error: None,
                },
            });
        }

        let memory_results = self.query_memory_degraded(message).await;

        let handler = self
            .registry
            .get(classification.intent)
            .ok_or(RouteFailure::MissingHandler(classification.intent))?;

        let input = HandlerInput {
            message,
            context,
            persona_prompt: &prompt,
            memory_results: &memory_results,
        };
        let reply = handler
            .handle(&input)
            .await
            .map_err(|e| RouteFailure::Handler(e.to_string()))?;

        let handler_confidence = reply.confidence.unwrap_or(DEFAULT_HANDLER_CONFIDENCE);
        let confidence = ((classification.confidence + handler_confidence) / 2.0)
            .min(MAX_BLENDED_CONFIDENCE);

        let conversation_id = uuid::Uuid::now_v7().to_string();
        self.spawn_audit_write(ConversationWrite {
            id: conversation_id.clone(),
            message: message.to_string(),
            response: reply.response.clone(),
            intent: classification.intent,
            confidence,
            role: context.role.clone(),
            module: Some(reply.module.clone()),
        });

        Ok(RouteOutcome {
            response: reply.response,
            intent: classification.intent,
            confidence,
            conversation_id: Some(conversation_id),
            metadata: RouteMetadata {
                reasoning: classification.reasoning,
                module: Some(reply.module),
                knowledge_used: reply.knowledge_used,
                memory_results: memory_results.len(),
                was_redirected: classification.fallback,
                error: None,
            },
        })
    }

    /// Query the knowledge store with the raw message, degrading to an empty
    /// result set on storage failure or timeout.
    async fn query_memory_degraded(&self, message: &str) -> Vec<KnowledgeEntry> {
        let db = Arc::clone(&self.db);
        let query = message.to_string();
        let limits = QueryLimits {
            max_results: self.config.retrieval.max_results,
            scoped_max_results: self.config.retrieval.scoped_max_results,
        };
        let timeout = Duration::from_millis(self.config.retrieval.query_timeout_ms);

        let task = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<KnowledgeEntry>> {
            let conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            query_knowledge(&conn, &query, None, &limits)
        });

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(results))) => results,
            Ok(Ok(Err(e))) => {
                tracing::warn!(error = %e, "knowledge query failed; degrading to empty results");
                Vec::new()
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "knowledge query task failed; degrading to empty results");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("knowledge query timed out; degrading to empty results");
                Vec::new()
            }
        }
    }

    /// Fire-and-forget conversation audit write. Failures are logged and
    /// discarded — they must never surface into the routing result.
    fn spawn_audit_write(&self, record: ConversationWrite) {
        let db = Arc::clone(&self.db);
        let timeout = Duration::from_millis(self.config.retrieval.audit_timeout_ms);

        tokio::spawn(async move {
            let write = tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
                let conn = db
                    .lock()
                    .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
                history::write_conversation(&conn, &record)
            });
            match tokio::time::timeout(timeout, write).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => tracing::warn!(error = %e, "conversation audit write failed"),
                Ok(Err(e)) => tracing::warn!(error = %e, "conversation audit task failed"),
                Err(_) => tracing::warn!("conversation audit write timed out"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::engine::handlers::StaticReply;

    fn test_engine(registry: HandlerRegistry) -> Engine {
        let conn = db::open_memory_database().unwrap();
        Engine::new(
            Arc::new(Mutex::new(conn)),
            registry,
            Arc::new(AxonConfig::default()),
        )
    }

    fn support_registry() -> HandlerRegistry {
        HandlerRegistry::new().register(
            Intent::Support,
            StaticReply::new("helpdesk", "How can I help?", 0.9),
        )
    }

    #[tokio::test]
    async fn admin_intent_without_admin_role_is_forbidden() {
        let engine = test_engine(HandlerRegistry::new());
        let context = RequestContext {
            role: Some("user".into()),
            ..Default::default()
        };

        let outcome = engine.route("teach and train the assistant", &context).await;
        assert_eq!(outcome.intent, Intent::Forbidden);
        assert_eq!(outcome.confidence, 1.0);
        assert!(outcome.conversation_id.is_none());
        assert_eq!(outcome.metadata.memory_results, 0);
    }

    #[tokio::test]
    async fn admin_role_passes_the_gate() {
        let registry = HandlerRegistry::new().register(
            Intent::Training,
            StaticReply::new("trainer", "Ready to learn.", 0.9),
        );
        let engine = test_engine(registry);
        let context = RequestContext {
            role: Some("admin".into()),
            ..Default::default()
        };

        let outcome = engine.route("teach and train the assistant", &context).await;
        assert_eq!(outcome.intent, Intent::Training);
        assert_eq!(outcome.metadata.module.as_deref(), Some("trainer"));
    }

    #[tokio::test]
    async fn missing_handler_becomes_error_outcome() {
        let engine = test_engine(HandlerRegistry::new());
        let outcome = engine
            .route("help with my support question", &RequestContext::default())
            .await;

        assert_eq!(outcome.intent, Intent::Error);
        assert_eq!(outcome.confidence, 0.0);
        assert!(outcome.metadata.error.is_some());
    }

    #[tokio::test]
    async fn confidence_blends_and_caps() {
        let engine = test_engine(support_registry());
        // Six support keywords saturate the classifier at 1.0; blended with
        // the handler's 0.9 and capped at 0.95.
        let outcome = engine
            .route(
                "help support question assist contact agent",
                &RequestContext::default(),
            )
            .await;
        assert_eq!(outcome.intent, Intent::Support);
        assert_eq!(outcome.confidence, 0.95);
    }

    #[tokio::test]
    async fn omitted_handler_confidence_defaults() {
        struct NoConfidence;

        #[async_trait::async_trait]
        impl handlers::ResponseHandler for NoConfidence {
            async fn handle(
                &self,
                _input: &HandlerInput<'_>,
            ) -> anyhow::Result<handlers::HandlerReply> {
                Ok(handlers::HandlerReply {
                    response: "ok".into(),
                    confidence: None,
                    module: "shrug".into(),
                    knowledge_used: Vec::new(),
                })
            }
        }

        let registry = HandlerRegistry::new().register(Intent::Support, NoConfidence);
        let engine = test_engine(registry);

        // Four support hits score 0.8; blended with the 0.7 default = 0.75.
        let outcome = engine
            .route("help support question assist", &RequestContext::default())
            .await;
        assert!((outcome.confidence - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn handler_error_becomes_error_outcome() {
        struct Exploder;

        #[async_trait::async_trait]
        impl handlers::ResponseHandler for Exploder {
            async fn handle(
                &self,
                _input: &HandlerInput<'_>,
            ) -> anyhow::Result<handlers::HandlerReply> {
                anyhow::bail!("boom")
            }
        }

        let registry = HandlerRegistry::new().register(Intent::Support, Exploder);
        let engine = test_engine(registry);

        let outcome = engine
            .route("help support question", &RequestContext::default())
            .await;
        assert_eq!(outcome.intent, Intent::Error);
        assert!(outcome.metadata.error.as_deref().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn audit_write_eventually_lands() {
        let engine = test_engine(support_registry());
        let outcome = engine
            .route("help support question", &RequestContext::default())
            .await;
        let id = outcome.conversation_id.clone().unwrap();

        let mut found = false;
        for _ in 0..40 {
            {
                let conn = engine.db.lock().unwrap();
                let count: i64 = conn
                    .query_row(
                        "SELECT COUNT(*) FROM conversations WHERE id = ?1",
                        rusqlite::params![id],
                        |row| row.get(0),
                    )
                    .unwrap();
                if count == 1 {
                    found = true;
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        assert!(found, "audit row never appeared");
    }

    #[tokio::test]
    async fn storage_outage_degrades_instead_of_failing() {
        let engine = test_engine(support_registry());
        // Simulate an outage on the read path
        {
            let conn = engine.db.lock().unwrap();
            conn.execute_batch("DROP TABLE knowledge").unwrap();
        }

        let outcome = engine
            .route("help support question", &RequestContext::default())
            .await;
        // Degraded, not failed: the handler still answered with no memory.
        assert_eq!(outcome.intent, Intent::Support);
        assert_eq!(outcome.metadata.memory_results, 0);
        assert!(outcome.metadata.error.is_none());
    }
}
