//! Rule-based intent classification.
//!
//! [`classify`] scores a message against the keyword tables in [`keywords`]
//! and returns an [`Intent`] with a confidence in `[0, 1]`. The function is
//! pure, performs no I/O, and cannot fail: malformed input collapses into an
//! out-of-scope classification instead of an error.

pub mod keywords;

use serde::{Deserialize, Serialize};

use keywords::{BRAND_TOKENS, CATEGORIES, INTERROGATIVE_WORDS, OUT_OF_SCOPE_KEYWORDS};

/// Discrete message-purpose categories.
///
/// `Forbidden` and `Error` are result-only intents produced by the
/// orchestrator; the classifier never returns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Small talk, openings, and closings.
    Greeting,
    /// Questions about the product line itself.
    ProductInfo,
    /// Prices, plans, billing, refunds.
    Pricing,
    /// Something is broken and needs fixing.
    Troubleshooting,
    /// Orders, shipping, returns.
    OrderStatus,
    /// Generic support requests — also the low-confidence fallback.
    Support,
    /// Supervised-training operations. Admin-restricted.
    Training,
    /// Store statistics and maturity reports. Admin-restricted.
    Analytics,
    /// Outside the assistant's domain.
    OutOfScope,
    /// Result-only: admin-gated intent reached without an admin role.
    Forbidden,
    /// Result-only: the orchestrator caught an internal failure.
    Error,
}

impl Intent {
    /// SQL- and wire-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::ProductInfo => "product_info",
            Self::Pricing => "pricing",
            Self::Troubleshooting => "troubleshooting",
            Self::OrderStatus => "order_status",
            Self::Support => "support",
            Self::Training => "training",
            Self::Analytics => "analytics",
            Self::OutOfScope => "out_of_scope",
            Self::Forbidden => "forbidden",
            Self::Error => "error",
        }
    }

    /// Whether this intent may only be routed for admin roles.
    pub fn is_admin_restricted(&self) -> bool {
        matches!(self, Self::Training | Self::Analytics)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greeting" => Ok(Self::Greeting),
            "product_info" => Ok(Self::ProductInfo),
            "pricing" => Ok(Self::Pricing),
            "troubleshooting" => Ok(Self::Troubleshooting),
            "order_status" => Ok(Self::OrderStatus),
            "support" => Ok(Self::Support),
            "training" => Ok(Self::Training),
            "analytics" => Ok(Self::Analytics),
            "out_of_scope" => Ok(Self::OutOfScope),
            "forbidden" => Ok(Self::Forbidden),
            "error" => Ok(Self::Error),
            _ => Err(format!("unknown intent: {s}")),
        }
    }
}

/// Roles allowed through the admin gate.
pub const ADMIN_ROLES: &[&str] = &["admin", "owner"];

/// Whether a caller role passes the admin gate.
pub fn is_admin_role(role: Option<&str>) -> bool {
    role.is_some_and(|r| ADMIN_ROLES.contains(&r.to_lowercase().as_str()))
}

/// Outcome of classifying a single message. Transient — never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    /// Always in `[0, 1]`; never below 0.5 for classified results.
    pub confidence: f64,
    pub reasoning: String,
    pub matched_keywords: Vec<String>,
    /// True when a fallback or redirect path produced the result.
    pub fallback: bool,
}

/// Number of keyword hits at which confidence saturates to 1.0.
const SATURATION_HITS: f64 = 5.0;

/// Confidence below which a scored result downgrades to generic support.
const DOWNGRADE_THRESHOLD: f64 = 0.3;

/// Classify a message into an intent with confidence and reasoning.
///
/// Deterministic keyword scoring; see the module docs for the full rule
/// sequence. Ties between categories break by declaration order in
/// [`keywords::CATEGORIES`].
pub fn classify(message: &str) -> ClassificationResult {
    let normalized = message.trim().to_lowercase();

    if normalized.is_empty() {
        return ClassificationResult {
            intent: Intent::OutOfScope,
            confidence: 1.0,
            reasoning: "empty or malformed message".into(),
            matched_keywords: Vec::new(),
            fallback: true,
        };
    }

    // Out-of-scope gate: excluded topic with no brand override ends
    // classification immediately.
    let oos_hits: Vec<String> = OUT_OF_SCOPE_KEYWORDS
        .iter()
        .filter(|kw| normalized.contains(*kw))
        .map(|kw| kw.to_string())
        .collect();
    let brand_mentioned = BRAND_TOKENS.iter().any(|t| normalized.contains(t));
    if !oos_hits.is_empty() && !brand_mentioned {
        return ClassificationResult {
            intent: Intent::OutOfScope,
            confidence: 0.9,
            reasoning: format!("out-of-scope topic: {}", oos_hits.join(", ")),
            matched_keywords: oos_hits,
            fallback: true,
        };
    }

    // Score every category independently; a keyword may count for more than
    // one category. Highest hit count wins, ties break by table order.
    let mut selected: Option<(Intent, Vec<String>)> = None;
    for (intent, kws) in CATEGORIES {
        let hits: Vec<String> = kws
            .iter()
            .filter(|kw| normalized.contains(*kw))
            .map(|kw| kw.to_string())
            .collect();
        let best_count = selected.as_ref().map_or(0, |(_, h)| h.len());
        if !hits.is_empty() && hits.len() > best_count {
            selected = Some((*intent, hits));
        }
    }

    let (intent, matched, confidence, mut reasoning, mut fallback) = match selected {
        Some((intent, hits)) => {
            let confidence = (hits.len() as f64 / SATURATION_HITS).min(1.0);
            let reasoning = format!("{} keyword hit(s) for {intent}", hits.len());
            (intent, hits, confidence, reasoning, false)
        }
        None if brand_mentioned => (
            Intent::ProductInfo,
            BRAND_TOKENS
                .iter()
                .filter(|t| normalized.contains(*t))
                .map(|t| t.to_string())
                .collect(),
            0.7,
            "no category hits; brand mention".into(),
            true,
        ),
        None if is_interrogative(&normalized) => (
            Intent::Support,
            Vec::new(),
            0.6,
            "no category hits; interrogative form".into(),
            true,
        ),
        None => (
            Intent::Support,
            Vec::new(),
            0.0,
            "no category hits".into(),
            true,
        ),
    };

    // Low-confidence downgrade, then the reporting floor.
    let (intent, confidence) = if confidence < DOWNGRADE_THRESHOLD && intent != Intent::OutOfScope
    {
        reasoning.push_str("; downgraded to support at fixed confidence");
        fallback = true;
        (Intent::Support, 0.5)
    } else {
        (intent, confidence.max(0.5))
    };

    ClassificationResult {
        intent,
        confidence,
        reasoning,
        matched_keywords: matched,
        fallback,
    }
}

/// A message is interrogative if it contains "?" or opens with an
/// interrogative word.
fn is_interrogative(normalized: &str) -> bool {
    if normalized.contains('?') {
        return true;
    }
    normalized
        .split_whitespace()
        .next()
        .is_some_and(|first| INTERROGATIVE_WORDS.contains(&first))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_is_out_of_scope_at_full_confidence() {
        for msg in ["", "   ", "\t\n"] {
            let result = classify(msg);
            assert_eq!(result.intent, Intent::OutOfScope);
            assert_eq!(result.confidence, 1.0);
            assert!(result.fallback);
        }
    }

    #[test]
    fn confidence_always_in_range() {
        let samples = [
            "",
            "hello",
            "what is the weather",
            "my lumina bridge is broken and the error won't stop",
            "price cost discount refund billing invoice plan",
            "xyzzy",
            "?",
        ];
        for msg in samples {
            let result = classify(msg);
            assert!(
                (0.0..=1.0).contains(&result.confidence),
                "confidence out of range for {msg:?}: {}",
                result.confidence
            );
        }
    }

    #[test]
    fn five_hits_saturate_confidence() {
        // Five distinct troubleshooting keywords, nothing from other tables
        let result = classify("flickering unresponsive broken, restart gave an error");
        assert_eq!(result.intent, Intent::Troubleshooting);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.matched_keywords.len(), 5);
        assert!(!result.fallback);
    }

    #[test]
    fn single_hit_reports_floor_confidence() {
        // One pricing hit scores 0.2, which downgrades to support at 0.5
        let result = classify("refund please");
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.intent, Intent::Support);
        assert!(result.fallback);
    }

    #[test]
    fn two_hits_keep_intent_at_floor() {
        // Two hits score 0.4 — above the downgrade threshold, floored to 0.5
        let result = classify("refund on this invoice");
        assert_eq!(result.intent, Intent::Pricing);
        assert_eq!(result.confidence, 0.5);
        assert!(!result.fallback);
    }

    #[test]
    fn out_of_scope_keyword_redirects() {
        let result = classify("tell me about the weather");
        assert_eq!(result.intent, Intent::OutOfScope);
        assert_eq!(result.confidence, 0.9);
        assert!(result.fallback);
    }

    #[test]
    fn brand_token_overrides_out_of_scope() {
        let result = classify("does weather affect my lumina sensor outdoors");
        assert_ne!(result.intent, Intent::OutOfScope);
    }

    #[test]
    fn tie_breaks_by_declaration_order() {
        // One hit each for pricing ("cost") and order_status ("shipping");
        // pricing is declared earlier so it wins the tie, then the 0.2 score
        // downgrades to support. Use three-a-side to stay above threshold.
        let result = classify("cost of the plan and refund for my order shipping and delivery");
        assert_eq!(result.intent, Intent::Pricing);
    }

    #[test]
    fn brand_mention_falls_back_to_product_info() {
        let result = classify("lumina!");
        assert_eq!(result.intent, Intent::ProductInfo);
        assert_eq!(result.confidence, 0.7);
        assert!(result.fallback);
    }

    #[test]
    fn interrogative_falls_back_to_support() {
        let result = classify("why though");
        assert_eq!(result.intent, Intent::Support);
        assert_eq!(result.confidence, 0.6);
        assert!(result.fallback);

        let result = classify("anyone there?");
        assert_eq!(result.intent, Intent::Support);
        assert_eq!(result.confidence, 0.6);
    }

    #[test]
    fn gibberish_downgrades_to_support() {
        let result = classify("xyzzy plugh");
        assert_eq!(result.intent, Intent::Support);
        assert_eq!(result.confidence, 0.5);
        assert!(result.fallback);
    }

    #[test]
    fn admin_restricted_set() {
        assert!(Intent::Training.is_admin_restricted());
        assert!(Intent::Analytics.is_admin_restricted());
        assert!(!Intent::Support.is_admin_restricted());
        assert!(!Intent::OutOfScope.is_admin_restricted());
    }

    #[test]
    fn admin_role_check() {
        assert!(is_admin_role(Some("admin")));
        assert!(is_admin_role(Some("OWNER")));
        assert!(!is_admin_role(Some("user")));
        assert!(!is_admin_role(None));
    }

    #[test]
    fn intent_round_trips_through_str() {
        for intent in [
            Intent::Greeting,
            Intent::ProductInfo,
            Intent::Pricing,
            Intent::Troubleshooting,
            Intent::OrderStatus,
            Intent::Support,
            Intent::Training,
            Intent::Analytics,
            Intent::OutOfScope,
            Intent::Forbidden,
            Intent::Error,
        ] {
            assert_eq!(intent.as_str().parse::<Intent>().unwrap(), intent);
        }
    }
}
