use anyhow::Result;
use std::sync::{Arc, Mutex};

use axon::classify::Intent;
use axon::config::AxonConfig;
use axon::engine::handlers::{HandlerRegistry, RequestContext, StaticReply};
use axon::engine::Engine;

/// Route one message through the engine with the built-in demo handlers and
/// print the outcome.
pub async fn ask(config: &AxonConfig, message: &str, role: &str) -> Result<()> {
    let conn = axon::db::open_database(config.resolved_db_path())?;
    let engine = Engine::new(
        Arc::new(Mutex::new(conn)),
        demo_registry(),
        Arc::new(config.clone()),
    );

    let context = RequestContext {
        role: Some(role.to_string()),
        user_id: None,
        history: Vec::new(),
    };
    let outcome = engine.route(message, &context).await;

    println!("{}", outcome.response);
    println!();
    println!("  intent:      {}", outcome.intent);
    println!("  confidence:  {:.2}", outcome.confidence);
    println!("  reasoning:   {}", outcome.metadata.reasoning);
    if let Some(module) = &outcome.metadata.module {
        println!("  module:      {module}");
    }
    println!("  knowledge:   {} result(s)", outcome.metadata.memory_results);
    if let Some(id) = &outcome.conversation_id {
        println!("  conversation: {id}");
    }

    Ok(())
}

/// One template handler per public intent. Real deployments register their
/// own generators; these keep the CLI self-contained.
fn demo_registry() -> HandlerRegistry {
    HandlerRegistry::new()
        .register(
            Intent::Greeting,
            StaticReply::new("greeter", "Hi! I'm the Lumina assistant.", 0.9),
        )
        .register(
            Intent::ProductInfo,
            StaticReply::new("product", "Here's what I know about Lumina products:", 0.8),
        )
        .register(
            Intent::Pricing,
            StaticReply::new("pricing", "Here's the pricing information I have:", 0.8),
        )
        .register(
            Intent::Troubleshooting,
            StaticReply::new("troubleshooter", "Let's get that fixed.", 0.8),
        )
        .register(
            Intent::OrderStatus,
            StaticReply::new("orders", "Here's what I can tell you about orders:", 0.8),
        )
        .register(
            Intent::Support,
            StaticReply::new("helpdesk", "Happy to help.", 0.7),
        )
        .register(
            Intent::Training,
            StaticReply::new("trainer", "Use `axon teach` or `axon correct` to train me.", 0.9),
        )
        .register(
            Intent::Analytics,
            StaticReply::new("analytics", "Run `axon maturity` or `axon stats` for reports.", 0.9),
        )
        .register(
            Intent::OutOfScope,
            StaticReply::new(
                "redirect",
                "I can only help with Lumina products, orders, and support.",
                0.9,
            ),
        )
}
