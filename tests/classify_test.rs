use axon::classify::{classify, Intent};

#[test]
fn malformed_input_is_out_of_scope_at_full_confidence() {
    for message in ["", "   ", "\n\t"] {
        let result = classify(message);
        assert_eq!(result.intent, Intent::OutOfScope);
        assert_eq!(result.confidence, 1.0);
    }
}

#[test]
fn confidence_is_always_in_unit_range() {
    let messages = [
        "hello there",
        "what does the starter kit cost?",
        "my bridge crashed with an error and the bulbs are flickering",
        "weather news politics",
        "lumina",
        "zzz",
    ];
    for message in messages {
        let confidence = classify(message).confidence;
        assert!(
            (0.0..=1.0).contains(&confidence),
            "{message:?} produced {confidence}"
        );
    }
}

#[test]
fn saturating_hits_reach_full_confidence() {
    // Five distinct troubleshooting keywords and nothing else
    let result = classify("flickering unresponsive broken, restart gave an error");
    assert_eq!(result.intent, Intent::Troubleshooting);
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn single_hit_is_reported_at_the_floor() {
    let result = classify("refund please");
    assert_eq!(result.confidence, 0.5);
}

#[test]
fn brand_override_keeps_out_of_scope_topics_in_domain() {
    let with_brand = classify("does weather affect my lumina sensor outdoors");
    assert_ne!(with_brand.intent, Intent::OutOfScope);

    let without_brand = classify("does weather affect outdoor sensors");
    assert_eq!(without_brand.intent, Intent::OutOfScope);
    assert_eq!(without_brand.confidence, 0.9);
}

#[test]
fn classification_is_deterministic() {
    let message = "my order shipping is late and I want a refund";
    let first = classify(message);
    for _ in 0..10 {
        let again = classify(message);
        assert_eq!(again.intent, first.intent);
        assert_eq!(again.confidence, first.confidence);
        assert_eq!(again.matched_keywords, first.matched_keywords);
    }
}
