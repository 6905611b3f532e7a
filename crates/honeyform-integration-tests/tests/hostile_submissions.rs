//! Integration test: oversized and malformed submissions.
//!
//! Bots do not stick to the shape of the rendered form. These tests pin
//! down what happens with submissions that are very wide, very deep, or
//! nested where the form declares no nesting:
//! 1. Tens of thousands of undeclared keys
//! 2. Keys nested past the parameter depth limit
//! 3. Nesting under plain names and inside declared groups

use honeyform_core::{CaptchaOptions, FieldSpec, NegativeCaptcha, Node, Params, RejectionKind};
use honeyform_types::MAX_PARAM_DEPTH;

const RENDER_TIME: i64 = 1_700_000_000;

const SECRET: &str = "integration secret";

fn address_spec() -> FieldSpec {
    FieldSpec::builder()
        .leaf("name")
        .group("address", |g| g.leaf("city"))
        .build()
        .expect("spec")
}

fn render(spec: &FieldSpec) -> NegativeCaptcha {
    NegativeCaptcha::new(
        CaptchaOptions::new(spec.clone())
            .secret(SECRET)
            .timestamp(RENDER_TIME),
    )
    .expect("render")
}

/// Browser-style pairs for `rendered`, followed by `extra`.
fn submission(rendered: &NegativeCaptcha, extra: Vec<(String, String)>) -> Params {
    let name = rendered.key_for_field("name").expect("name token");
    let city = rendered.key_for_field("address[city]").expect("city token");
    let mut pairs = vec![
        ("timestamp".to_string(), rendered.timestamp().to_string()),
        ("spinner".to_string(), rendered.spinner().to_string()),
        (name.to_string(), "Ada".to_string()),
        (format!("address[{city}]"), "London".to_string()),
    ];
    pairs.extend(extra);
    Params::from_pairs(pairs)
}

fn submit(spec: &FieldSpec, params: Params) -> NegativeCaptcha {
    NegativeCaptcha::new(
        CaptchaOptions::new(spec.clone())
            .secret(SECRET)
            .params(params)
            .now(RENDER_TIME + 10),
    )
    .expect("submit")
}

fn rejection(captcha: &NegativeCaptcha) -> Option<RejectionKind> {
    captcha.error().map(|e| e.kind)
}

#[test]
fn many_undeclared_keys_still_validate() {
    let spec = address_spec();
    let rendered = render(&spec);
    let junk = (0..50_000)
        .map(|i| (format!("junk{i}"), "v".to_string()))
        .collect();
    let params = submission(&rendered, junk);
    assert_eq!(params.len(), 50_004);

    let filled = submit(&spec, params);
    assert!(filled.is_valid(), "{}", filled.error_message());
    assert_eq!(
        filled.value_for_field("name").and_then(Node::as_str),
        Some("Ada")
    );
    assert_eq!(filled.values().len(), 2);
}

#[test]
fn over_nested_key_is_dropped() {
    let spec = address_spec();
    let rendered = render(&spec);
    let hostile = format!("name{}", "[a]".repeat(20_000));
    let params = submission(&rendered, vec![(hostile, "x".to_string())]);
    assert!(!params.contains("name"));

    let filled = submit(&spec, params);
    assert!(filled.is_valid(), "{}", filled.error_message());
}

#[test]
fn over_nested_json_is_dropped() {
    let spec = address_spec();
    let rendered = render(&spec);
    let mut nested = serde_json::json!("x");
    for _ in 0..MAX_PARAM_DEPTH {
        nested = serde_json::json!({ "a": nested });
    }
    let name = rendered.key_for_field("name").expect("name token");
    let mut body = serde_json::json!({
        "timestamp": RENDER_TIME,
        "spinner": rendered.spinner(),
        "name": nested,
    });
    body[name] = serde_json::json!("Ada");
    let params: Params = serde_json::from_value(body).expect("params");

    // The string sits one level past the limit, leaving only empty groups.
    let filled = submit(&spec, params);
    assert!(filled.is_valid(), "{}", filled.error_message());
}

#[test]
fn nesting_under_plain_leaf_name_trips_honeypot() {
    let spec = address_spec();
    let rendered = render(&spec);
    let deep = format!("name{}", "[a]".repeat(MAX_PARAM_DEPTH - 1));
    let params = submission(&rendered, vec![(deep, "bot".to_string())]);

    let filled = submit(&spec, params);
    assert_eq!(rejection(&filled), Some(RejectionKind::InvalidFields));
    assert!(filled.values().is_empty());
}

#[test]
fn nesting_under_declared_group_leaf_trips_honeypot() {
    let spec = address_spec();
    let rendered = render(&spec);
    let params = submission(
        &rendered,
        vec![("address[city][line][1]".to_string(), "bot".to_string())],
    );

    let filled = submit(&spec, params);
    assert_eq!(rejection(&filled), Some(RejectionKind::InvalidFields));
}

#[test]
fn undeclared_nesting_inside_group_is_not_extracted() {
    let spec = address_spec();
    let rendered = render(&spec);
    let params = submission(
        &rendered,
        vec![
            ("address[zip][extra]".to_string(), "junk".to_string()),
            ("address[country]".to_string(), "junk".to_string()),
        ],
    );

    let filled = submit(&spec, params);
    assert!(filled.is_valid(), "{}", filled.error_message());
    let address = filled
        .values()
        .get("address")
        .and_then(Node::as_group)
        .expect("address group");
    assert_eq!(address.names().collect::<Vec<_>>(), vec!["city"]);
    assert!(filled.value_for_field("address[zip][extra]").is_none());
}
