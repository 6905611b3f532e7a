//! Test vector generator for honeyform token derivation.
//!
//! Generates `tests/fixtures/test_vectors.json` with the spinner, field
//! token and fallback secret outputs for fixed inputs. Any change to the
//! derivation shows up as a diff in that file.
//!
//! Usage:
//!   honeyform-testvec              # Generate test_vectors.json
//!   honeyform-testvec --verify     # Verify test vectors match expected values

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use honeyform_core::{CaptchaOptions, FieldSpec, NegativeCaptcha, Secret};
use honeyform_crypto::KeyedHasher;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

const VECTORS_PATH: &str = "tests/fixtures/test_vectors.json";
const TEST_SECRET: &str = "honeyform test secret";
const TEST_TIMESTAMP: i64 = 1_700_000_000;

#[derive(Serialize, Deserialize)]
struct TestVectors {
    version: String,
    generated_by: String,
    vectors: BTreeMap<String, TestVector>,
}

#[derive(Serialize, Deserialize)]
struct TestVector {
    description: String,
    inputs: BTreeMap<String, String>,
    outputs: BTreeMap<String, String>,
}

fn generate_hasher_vectors() -> BTreeMap<String, TestVector> {
    let mut vectors = BTreeMap::new();

    let token = KeyedHasher::field_token(TEST_SECRET.as_bytes()).hash(&["name", "spinner"]);
    vectors.insert(
        "keyed_field_token".to_string(),
        TestVector {
            description: "KeyedHasher(field-token, secret).hash([\"name\", \"spinner\"])"
                .to_string(),
            inputs: BTreeMap::from([
                ("secret".to_string(), TEST_SECRET.to_string()),
                ("parts".to_string(), "name,spinner".to_string()),
            ]),
            outputs: BTreeMap::from([("token".to_string(), token)]),
        },
    );

    vectors.insert(
        "fallback_secret".to_string(),
        TestVector {
            description: "hex(BLAKE3::hash(b\"this_is_a_secret_key\"))".to_string(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::from([(
                "secret".to_string(),
                Secret::fallback().expose().to_string(),
            )]),
        },
    );

    vectors
}

fn generate_captcha_vectors() -> anyhow::Result<BTreeMap<String, TestVector>> {
    let mut vectors = BTreeMap::new();

    let spec = FieldSpec::builder()
        .leaf("name")
        .group("address", |g| g.leaf("city").leaf("zip"))
        .build()?;

    for (key, context) in [("captcha_plain", vec![]), ("captcha_context", vec!["session-1"])] {
        let captcha = NegativeCaptcha::new(
            CaptchaOptions::new(spec.clone())
                .secret(TEST_SECRET)
                .timestamp(TEST_TIMESTAMP)
                .spinner_context(context.iter().copied()),
        )?;
        vectors.insert(
            key.to_string(),
            TestVector {
                description: format!("Spinner and token tree for context {context:?}"),
                inputs: BTreeMap::from([
                    ("secret".to_string(), TEST_SECRET.to_string()),
                    ("timestamp".to_string(), TEST_TIMESTAMP.to_string()),
                    ("spinner_context".to_string(), context.join(",")),
                    ("fields".to_string(), serde_json::to_string(&spec)?),
                ]),
                outputs: BTreeMap::from([
                    ("spinner".to_string(), captcha.spinner().to_string()),
                    (
                        "tokens".to_string(),
                        serde_json::to_string(captcha.fields())?,
                    ),
                ]),
            },
        );
    }

    Ok(vectors)
}

fn generate_all_vectors() -> anyhow::Result<TestVectors> {
    let mut all_vectors = BTreeMap::new();

    all_vectors.extend(generate_hasher_vectors());
    all_vectors.extend(generate_captcha_vectors()?);

    Ok(TestVectors {
        version: "1.0".to_string(),
        generated_by: "honeyform-testvec".to_string(),
        vectors: all_vectors,
    })
}

fn verify_vectors(vectors: &TestVectors) -> anyhow::Result<bool> {
    let regenerated = generate_all_vectors()?;
    let mut all_pass = true;

    for (name, expected) in &vectors.vectors {
        match regenerated.vectors.get(name) {
            Some(actual) if actual.outputs == expected.outputs => info!("PASS: {name}"),
            Some(actual) => {
                error!(expected = ?expected.outputs, actual = ?actual.outputs, "FAIL: {name}");
                all_pass = false;
            }
            None => {
                error!("MISSING: {name}");
                all_pass = false;
            }
        }
    }

    Ok(all_pass)
}

fn write_vectors(vectors: &TestVectors) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(VECTORS_PATH).parent() {
        std::fs::create_dir_all(parent).context("create fixture directory")?;
    }
    let json = serde_json::to_string_pretty(vectors)?;
    std::fs::write(VECTORS_PATH, json).with_context(|| format!("write {VECTORS_PATH}"))?;
    info!("Generated {} test vectors to {VECTORS_PATH}", vectors.vectors.len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("honeyform=info".parse()?),
        )
        .init();

    let verify = std::env::args().any(|a| a == "--verify");

    let vectors = if verify && Path::new(VECTORS_PATH).exists() {
        let content = std::fs::read_to_string(VECTORS_PATH)?;
        serde_json::from_str(&content).context("parse test vectors")?
    } else {
        if verify {
            info!("No existing test vectors found at {VECTORS_PATH}. Generating...");
        }
        let vectors = generate_all_vectors()?;
        write_vectors(&vectors)?;
        vectors
    };

    if verify_vectors(&vectors)? {
        info!("All test vectors verified successfully.");
        Ok(())
    } else {
        anyhow::bail!("test vector verification failed")
    }
}
