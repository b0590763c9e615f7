//! Per-intent response handlers.
//!
//! Handlers are external collaborators sharing one contract: the engine
//! hands them the message, caller context, persona prompt, and retrieved
//! knowledge, and gets back a [`HandlerReply`]. Dispatch goes through a
//! [`HandlerRegistry`] keyed by intent — one capability interface, no
//! type-switch sprawl.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::classify::Intent;
use crate::knowledge::types::KnowledgeEntry;

/// Caller-supplied request context.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub role: Option<String>,
    pub user_id: Option<String>,
    pub history: Vec<String>,
}

/// Everything a handler sees for one dispatch.
pub struct HandlerInput<'a> {
    pub message: &'a str,
    pub context: &'a RequestContext,
    pub persona_prompt: &'a str,
    pub memory_results: &'a [KnowledgeEntry],
}

/// A handler's answer.
#[derive(Debug, Clone)]
pub struct HandlerReply {
    pub response: String,
    /// Handler self-confidence; the engine substitutes 0.7 when omitted.
    pub confidence: Option<f64>,
    /// Name of the responding module, surfaced in result metadata.
    pub module: String,
    /// Ids of knowledge entries the handler actually used.
    pub knowledge_used: Vec<String>,
}

/// One response handler per intent. Consumers implement this.
#[async_trait]
pub trait ResponseHandler: Send + Sync {
    async fn handle(&self, input: &HandlerInput<'_>) -> anyhow::Result<HandlerReply>;
}

/// Registry mapping intents to their handlers.
pub struct HandlerRegistry {
    handlers: HashMap<Intent, Arc<dyn ResponseHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for an intent. Later registrations replace earlier
    /// ones.
    pub fn register(mut self, intent: Intent, handler: impl ResponseHandler + 'static) -> Self {
        self.handlers.insert(intent, Arc::new(handler));
        self
    }

    /// Look up the handler for an intent.
    pub fn get(&self, intent: Intent) -> Option<Arc<dyn ResponseHandler>> {
        self.handlers.get(&intent).cloned()
    }

    pub fn intents(&self) -> Vec<Intent> {
        self.handlers.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal template handler.
///
/// Replies with a fixed template, quoting the top retrieved knowledge entry
/// when one exists. Enough for demos and tests; real deployments register
/// their own generators.
pub struct StaticReply {
    pub module: String,
    pub template: String,
    pub confidence: f64,
}

impl StaticReply {
    pub fn new(module: &str, template: &str, confidence: f64) -> Self {
        Self {
            module: module.to_string(),
            template: template.to_string(),
            confidence,
        }
    }
}

#[async_trait]
impl ResponseHandler for StaticReply {
    async fn handle(&self, input: &HandlerInput<'_>) -> anyhow::Result<HandlerReply> {
        let (response, knowledge_used) = match input.memory_results.first() {
            Some(top) => (
                format!("{}\n\n{}", self.template, top.content),
                vec![top.id.clone()],
            ),
            None => (self.template.clone(), Vec::new()),
        };

        Ok(HandlerReply {
            response,
            confidence: Some(self.confidence),
            module: self.module.clone(),
            knowledge_used,
        })
    }
}
