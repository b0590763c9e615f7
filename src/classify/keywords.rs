//! Keyword tables driving the intent classifier.
//!
//! The table order in [`CATEGORIES`] is part of the public contract: when two
//! categories score the same hit count, the one declared earlier wins.

use super::Intent;

/// Version stamp for the compiled keyword tables, stored in `schema_meta`
/// so a database written by older tables can be flagged at startup.
pub const RULESET_VERSION: &str = "2026-06";

/// Scored categories in tie-break order.
pub const CATEGORIES: &[(Intent, &[&str])] = &[
    (
        Intent::Greeting,
        &[
            "hello",
            "hi there",
            "hey",
            "good morning",
            "good afternoon",
            "good evening",
            "thanks",
            "thank you",
            "goodbye",
            "bye",
        ],
    ),
    (
        Intent::ProductInfo,
        &[
            "product",
            "feature",
            "spec",
            "model",
            "version",
            "compatible",
            "compatibility",
            "warranty",
            "manual",
            "bulb",
            "bridge",
            "dimmer",
            "sensor",
        ],
    ),
    (
        Intent::Pricing,
        &[
            "price",
            "cost",
            "discount",
            "quote",
            "subscription",
            "plan",
            "billing",
            "invoice",
            "refund",
            "payment",
        ],
    ),
    (
        Intent::Troubleshooting,
        &[
            "error",
            "broken",
            "crash",
            "fails",
            "failing",
            "fix",
            "issue",
            "problem",
            "not working",
            "won't connect",
            "unresponsive",
            "flickering",
            "restart",
            "reset",
        ],
    ),
    (
        Intent::OrderStatus,
        &[
            "order",
            "shipping",
            "shipment",
            "delivery",
            "tracking",
            "track my",
            "return",
            "exchange",
            "cancel",
        ],
    ),
    (
        Intent::Support,
        &[
            "help",
            "support",
            "question",
            "how do i",
            "assist",
            "contact",
            "agent",
        ],
    ),
    (
        Intent::Training,
        &[
            "train",
            "teach",
            "correction",
            "remember this",
            "learn this",
        ],
    ),
    (
        Intent::Analytics,
        &[
            "analytics",
            "report",
            "metrics",
            "maturity",
            "statistics",
            "dashboard",
        ],
    ),
];

/// Keywords that pull a message out of the assistant's domain entirely.
pub const OUT_OF_SCOPE_KEYWORDS: &[&str] = &[
    "weather",
    "news",
    "politics",
    "election",
    "sports",
    "recipe",
    "joke",
    "horoscope",
    "stock market",
    "lottery",
];

/// Brand tokens that override an out-of-scope match — a message mentioning
/// the brand stays in-domain even if it also mentions an excluded topic.
pub const BRAND_TOKENS: &[&str] = &["lumina"];

/// Leading words that mark a message as interrogative.
pub const INTERROGATIVE_WORDS: &[&str] = &[
    "what", "how", "why", "when", "where", "who", "which", "can", "could", "do", "does", "is",
    "are", "will", "should",
];
