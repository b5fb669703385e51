//! End-to-end generation from descriptors to values
//!
//! Run with: cargo test -p apistub-gen --test scenarios

use apistub_core::{GenerationOptions, GeneratorConfig, Mode, Parameter, Schema, StubError};
use apistub_gen::{EntropySource, Generator, text};
use regex::Regex;
use serde_json::{Value, json};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn generator() -> Generator {
    init_tracing();
    Generator::new(GeneratorConfig {
        seed: Some(20240601),
        ..GeneratorConfig::default()
    })
    .unwrap()
}

fn schema(value: Value) -> Schema {
    serde_json::from_value(value).unwrap()
}

fn has_two_decimals(v: f64) -> bool {
    ((v * 100.0).round() / 100.0 - v).abs() < 1e-6
}

#[test]
fn amount_without_constraints() {
    let g = generator();
    let mut entropy = g.entropy();

    let hinted = schema(json!({"type": "number", "x-datagen": "amount"}));
    let by_field_name = Schema::default();
    for _ in 0..200 {
        for (key, s) in [("price", &hinted), ("amount", &by_field_name)] {
            let v = g.gen_schema(key, s, &mut entropy).unwrap().as_f64().unwrap();
            assert!((100.0..=1_000_000.0).contains(&v), "{v}");
            assert!(has_two_decimals(v), "{v}");
        }
    }
}

#[test]
fn uuid_format() {
    let g = generator();
    let mut entropy = g.entropy();
    let s = schema(json!({"type": "string", "format": "uuid"}));

    let mut opts = GenerationOptions::for_schema("id", true, &s).unwrap();
    opts.infer();
    let key = g.registry().resolve(&opts).map(|(key, _)| key);
    assert_eq!(key.as_deref(), Some("uuid"));

    let re = Regex::new(text::UUID).unwrap();
    for _ in 0..50 {
        let v = g.gen_schema("id", &s, &mut entropy).unwrap();
        assert!(re.is_match(v.as_str().unwrap()), "{v}");
    }
}

#[test]
fn invalid_maximum() {
    let g = generator();
    let mut entropy = g.entropy();
    let mode = Mode::INVALID_MAXIMUM.bits();

    let s = schema(json!({
        "type": "number",
        "minimum": 10,
        "maximum": 20,
        "x-datagen": {"mode": mode}
    }));
    for _ in 0..100 {
        let v = g.gen_schema("ratio", &s, &mut entropy).unwrap().as_f64().unwrap();
        assert!(v > 20.0, "{v}");
    }

    let undeclared = schema(json!({
        "type": "number",
        "minimum": 10,
        "x-datagen": {"mode": mode}
    }));
    let err = g.gen_schema("ratio", &undeclared, &mut entropy).unwrap_err();
    assert!(matches!(err, StubError::ImpossibleInvalid(_)), "{err}");
}

#[test]
fn multiple_of_within_bounds() {
    let g = generator();
    let mut entropy = g.entropy();
    for type_name in ["integer", "number"] {
        let s = schema(json!({
            "type": type_name,
            "minimum": 0,
            "maximum": 100,
            "multipleOf": 5
        }));
        for _ in 0..200 {
            let v = g.gen_schema("step", &s, &mut entropy).unwrap().as_f64().unwrap();
            assert!((0.0..=100.0).contains(&v), "{v}");
            assert_eq!(v % 5.0, 0.0, "{v}");
        }
    }
}

#[test]
fn email_from_description() {
    let g = generator();
    let mut entropy = g.entropy();
    let p: Parameter = serde_json::from_value(json!({
        "name": "user_email",
        "in": "query",
        "type": "string",
        "description": "Contact email address"
    }))
    .unwrap();

    let mut opts = GenerationOptions::for_parameter("", &p).unwrap();
    opts.infer();
    assert_eq!(opts.name, "email");

    let v = g.gen_parameter("", &p, &mut entropy).unwrap();
    assert!(v.as_str().unwrap().contains('@'), "{v}");
}

#[test]
fn seeded_generation_repeats() {
    let g = generator();
    let s = schema(json!({
        "type": "object",
        "required": ["id", "name"],
        "properties": {
            "id": {"type": "integer", "format": "int32"},
            "name": {"type": "string", "maxLength": 12},
            "tags": {"type": "array", "items": {"type": "string", "format": "hostname"}}
        }
    }));
    let a = g.gen_schema("pet", &s, &mut EntropySource::from_seed(3)).unwrap();
    let b = g.gen_schema("pet", &s, &mut EntropySource::from_seed(3)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_multiple_of() {
    let g = generator();
    let mut entropy = g.entropy();
    let s = schema(json!({
        "type": "integer",
        "minimum": 0,
        "maximum": 100,
        "multipleOf": 5,
        "x-datagen": {"mode": Mode::INVALID_MULTIPLE_OF.bits()}
    }));
    for _ in 0..50 {
        let v = g.gen_schema("step", &s, &mut entropy).unwrap().as_i64().unwrap();
        assert!((0..=100).contains(&v), "{v}");
        assert_ne!(v % 5, 0, "{v}");
    }
}

#[test]
fn zero_multiple_of_is_zero() {
    let g = generator();
    let s = schema(json!({"type": "number", "minimum": 1, "maximum": 9, "multipleOf": 0}));
    let v = g.gen_schema("n", &s, &mut g.entropy()).unwrap();
    assert_eq!(v.as_f64(), Some(0.0));
}

#[test]
fn no_multiple_in_range() {
    let g = generator();
    let s = schema(json!({"type": "integer", "minimum": 11, "maximum": 14, "multipleOf": 5}));
    let err = g.gen_schema("n", &s, &mut g.entropy()).unwrap_err();
    assert!(matches!(err, StubError::ImpossibleValid(_)), "{err}");
}

#[test]
fn locales_produce_values() {
    for locale in ["en", "fr_fr", "pt_br"] {
        let g = Generator::new(GeneratorConfig {
            locale: locale.to_string(),
            ..GeneratorConfig::default()
        })
        .unwrap();
        let s = schema(json!({"type": "string", "x-datagen": "city"}));
        let v = g.gen_schema("city", &s, &mut EntropySource::from_seed(1)).unwrap();
        assert!(!v.as_str().unwrap().is_empty(), "{locale}");
    }
}
