//! Generator registry
//!
//! Maps each canonical key of [`apistub_core::aliases::GENERATOR_KEYS`] to a
//! value generator. Lookups go through the alias table first, then fall back
//! to the command-cased field name.

use std::collections::HashMap;
use std::fmt::{self, Write as _};

use apistub_core::{GenerationOptions, GeneratorConfig, StubError, canonicalize, command_case};
use chrono::{SecondsFormat, TimeDelta, Utc};
use serde_json::{Value, json};

use crate::entropy::EntropySource;
use crate::faker::{FakeKind, Faker};
use crate::numeric;
use crate::text;

const AMOUNT_RANGE: (f64, f64) = (100.0, 1_000_000.0);
const SMALL_AMOUNT_RANGE: (f64, f64) = (10.0, 1000.0);
const DATE_SPREAD_DAYS: i64 = 10_000;
const SENTENCE_COUNT: usize = 3;
const PARAGRAPH_SENTENCES: usize = 5;
const PARAGRAPH_COUNT: usize = 3;

/// Everything a generator may draw from.
pub struct GenContext<'a> {
    pub entropy: &'a mut EntropySource,
    pub faker: &'a Faker,
    pub config: &'a GeneratorConfig,
}

pub type ValueGenerator =
    Box<dyn Fn(&GenerationOptions, &mut GenContext<'_>) -> Result<Value, StubError> + Send + Sync>;

/// Box a closure as a [`ValueGenerator`].
pub fn boxed<F>(f: F) -> ValueGenerator
where
    F: Fn(&GenerationOptions, &mut GenContext<'_>) -> Result<Value, StubError> + Send + Sync + 'static,
{
    Box::new(f)
}

pub struct Registry {
    generators: HashMap<&'static str, ValueGenerator>,
}

impl Registry {
    /// Registry holding every built-in generator.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtins();
        registry
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Add or replace the generator for `key`.
    pub fn register(&mut self, key: &'static str, generator: ValueGenerator) {
        self.generators.insert(key, generator);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ValueGenerator> {
        self.generators.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.generators.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.generators.keys().copied()
    }

    /// Generator for `opts`: the canonical form of `name`, else the
    /// canonical form of the command-cased field name.
    #[must_use]
    pub fn resolve(&self, opts: &GenerationOptions) -> Option<(String, &ValueGenerator)> {
        if !opts.name.is_empty() {
            let key = canonicalize(&opts.name);
            if let Some(generator) = self.generators.get(key.as_str()) {
                return Some((key, generator));
            }
        }
        let key = canonicalize(&command_case(&opts.field_name));
        self.generators.get(key.as_str()).map(|g| (key, g))
    }

    fn register_builtins(&mut self) {
        self.register("int32", integer::<i32>());
        self.register("int64", integer::<i64>());
        self.register("uint32", integer::<u32>());
        self.register("uint64", integer::<u64>());
        self.register("float", float::<f32>());
        self.register("double", float::<f64>());
        self.register("number", float::<f64>());
        self.register("amount", amount(AMOUNT_RANGE));
        self.register("small-amount", amount(SMALL_AMOUNT_RANGE));
        self.register("latitude", coordinate(90.0));
        self.register("longitude", coordinate(180.0));
        self.register("bool", boxed(|_, ctx| Ok(Value::Bool(ctx.entropy.uniform_bool()))));

        for (key, kind) in [
            ("city", FakeKind::City),
            ("city-prefix", FakeKind::CityPrefix),
            ("city-suffix", FakeKind::CitySuffix),
            ("company", FakeKind::Company),
            ("company-bs", FakeKind::CompanyBs),
            ("company-slogan", FakeKind::CompanySlogan),
            ("company-suffix", FakeKind::CompanySuffix),
            ("country", FakeKind::Country),
            ("domain-suffix", FakeKind::DomainSuffix),
            ("email", FakeKind::Email),
            ("free-email", FakeKind::Email),
            ("safe-email", FakeKind::SafeEmail),
            ("first-name", FakeKind::FirstName),
            ("last-name", FakeKind::LastName),
            ("name", FakeKind::Name),
            ("name-prefix", FakeKind::NamePrefix),
            ("name-suffix", FakeKind::NameSuffix),
            ("ipv4", FakeKind::Ipv4),
            ("ipv6", FakeKind::Ipv6),
            ("job-title", FakeKind::JobTitle),
            ("landline", FakeKind::Landline),
            ("mobile", FakeKind::Mobile),
            ("mac-address", FakeKind::MacAddress),
            ("postcode", FakeKind::Postcode),
            ("secondary-address", FakeKind::SecondaryAddress),
            ("state", FakeKind::State),
            ("state-name", FakeKind::StateName),
            ("street-name", FakeKind::StreetName),
            ("street-suffix", FakeKind::StreetSuffix),
            ("user-name", FakeKind::UserName),
            ("word", FakeKind::Word),
            ("adjective", FakeKind::Word),
            ("noun", FakeKind::Word),
        ] {
            self.register(key, fake(kind));
        }
        self.register(
            "street-address",
            boxed(|_, ctx| Ok(Value::String(ctx.faker.street_address(ctx.entropy.rng())))),
        );
        self.register(
            "silly-name",
            boxed(|_, ctx| {
                let first = ctx.faker.text(FakeKind::Word, ctx.entropy.rng());
                let second = ctx.faker.text(FakeKind::Word, ctx.entropy.rng());
                Ok(Value::String(format!("{}{}", capitalize(&first), capitalize(&second))))
            }),
        );
        self.register(
            "characters",
            boxed(|opts, ctx| {
                Ok(Value::String(ctx.entropy.alphanumeric(opts.args.string_length())))
            }),
        );
        self.register(
            "words",
            boxed(|opts, ctx| {
                Ok(Value::String(ctx.faker.words(opts.args.word_count(), ctx.entropy.rng())))
            }),
        );
        self.register(
            "sentence",
            boxed(|opts, ctx| {
                Ok(Value::String(ctx.faker.sentence(opts.args.word_count(), ctx.entropy.rng())))
            }),
        );
        self.register(
            "sentences",
            boxed(|_, ctx| Ok(Value::String(ctx.faker.sentences(SENTENCE_COUNT, ctx.entropy.rng())))),
        );
        self.register(
            "paragraph",
            boxed(|_, ctx| {
                Ok(Value::String(ctx.faker.paragraph(PARAGRAPH_SENTENCES, ctx.entropy.rng())))
            }),
        );
        self.register(
            "paragraphs",
            boxed(|_, ctx| {
                Ok(Value::String(ctx.faker.paragraphs(PARAGRAPH_COUNT, ctx.entropy.rng())))
            }),
        );
        self.register(
            "domain",
            boxed(|_, ctx| {
                let word = ctx.faker.text(FakeKind::Word, ctx.entropy.rng()).to_lowercase();
                let suffix = ctx.faker.text(FakeKind::DomainSuffix, ctx.entropy.rng());
                Ok(Value::String(format!("{word}.{suffix}")))
            }),
        );
        self.register(
            "hostname",
            boxed(|_, ctx| {
                Ok(Value::String(ctx.faker.text(FakeKind::Word, ctx.entropy.rng()).to_lowercase()))
            }),
        );

        self.register("date", boxed(|_, ctx| Ok(Value::String(date(ctx.entropy)))));
        self.register("datetime", boxed(|_, ctx| Ok(Value::String(datetime(ctx.entropy)))));
        self.register(
            "duration",
            boxed(|_, ctx| {
                let nanos = ctx.entropy.uniform_int(1u64, i64::MAX as u64 >> 1);
                Ok(Value::String(go_duration(nanos)))
            }),
        );

        self.register("pattern", pattern(None));
        self.register("credit-card", pattern(Some(text::CREDIT_CARD)));
        self.register("hexcolor", pattern(Some(text::HEXCOLOR)));
        self.register("rgbcolor", pattern(Some(text::RGBCOLOR)));
        self.register("ssn", pattern(Some(text::SSN)));
        self.register("isbn10", pattern(Some(text::ISBN10)));
        self.register("isbn13", pattern(Some(text::ISBN13)));
        self.register("uuid", pattern(Some(text::UUID)));
        self.register("uuid3", pattern(Some(text::UUID3)));
        self.register("uuid4", pattern(Some(text::UUID4)));
        self.register("uuid5", pattern(Some(text::UUID5)));

        self.register("ip", alternate(vec![fake(FakeKind::Ipv4), fake(FakeKind::Ipv6)]));
        self.register(
            "isbn",
            alternate(vec![pattern(Some(text::ISBN10)), pattern(Some(text::ISBN13))]),
        );
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Registry").field("keys", &keys).finish()
    }
}

fn integer<T: numeric::IntKind + 'static>() -> ValueGenerator {
    boxed(|opts, ctx| {
        numeric::integer_value::<T>(
            &opts.constraints,
            &opts.args,
            opts.mode,
            ctx.entropy,
            ctx.config.invalid_retry_limit,
        )
    })
}

fn float<T: numeric::FloatKind + 'static>() -> ValueGenerator {
    boxed(|opts, ctx| {
        numeric::float_value::<T>(
            &opts.constraints,
            &opts.args,
            opts.mode,
            ctx.entropy,
            ctx.config.invalid_retry_limit,
        )
    })
}

fn amount(range: (f64, f64)) -> ValueGenerator {
    boxed(move |opts, ctx| {
        numeric::amount(
            &opts.constraints,
            &opts.args,
            opts.mode,
            ctx.entropy,
            ctx.config.invalid_retry_limit,
            range,
        )
    })
}

fn coordinate(limit: f64) -> ValueGenerator {
    boxed(move |_, ctx| Ok(json!(ctx.entropy.uniform_float(-limit, limit))))
}

fn fake(kind: FakeKind) -> ValueGenerator {
    boxed(move |_, ctx| Ok(Value::String(ctx.faker.text(kind, ctx.entropy.rng()))))
}

/// Sample `builtin`, or the descriptor's own pattern when `None`.
fn pattern(builtin: Option<&'static str>) -> ValueGenerator {
    boxed(move |opts, ctx| {
        let pattern = builtin.or(opts.pattern.as_deref()).unwrap_or_default();
        text::from_pattern(
            pattern,
            &opts.constraints,
            ctx.entropy,
            ctx.config.max_repeat,
            ctx.config.invalid_retry_limit,
        )
        .map(Value::String)
    })
}

fn alternate(choices: Vec<ValueGenerator>) -> ValueGenerator {
    boxed(move |opts, ctx| {
        let pick = ctx.entropy.index(choices.len());
        choices[pick](opts, ctx)
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `YYYY-MM-DD` within `DATE_SPREAD_DAYS` of today.
fn date(entropy: &mut EntropySource) -> String {
    let offset = entropy.uniform_int(-DATE_SPREAD_DAYS, DATE_SPREAD_DAYS);
    let day = Utc::now().date_naive() + TimeDelta::days(offset);
    day.format("%Y-%m-%d").to_string()
}

/// RFC 3339 UTC timestamp with millisecond precision.
fn datetime(entropy: &mut EntropySource) -> String {
    let days = entropy.uniform_int(-DATE_SPREAD_DAYS, DATE_SPREAD_DAYS);
    let millis = entropy.uniform_int(0i64, 86_400_000 - 1);
    let at = Utc::now() + TimeDelta::days(days) + TimeDelta::milliseconds(millis);
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `72h3m0.5s` style rendering of a nanosecond count.
fn go_duration(nanos: u64) -> String {
    const NANOS_PER_SEC: u64 = 1_000_000_000;
    if nanos == 0 {
        return "0s".to_string();
    }
    let secs = nanos / NANOS_PER_SEC;
    let frac = nanos % NANOS_PER_SEC;
    let (hours, minutes, seconds) = (secs / 3600, (secs / 60) % 60, secs % 60);

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(out, "{seconds}");
    if frac > 0 {
        let digits = format!("{frac:09}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out.push('s');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use apistub_core::aliases::GENERATOR_KEYS;
    use chrono::{DateTime, NaiveDate};
    use regex::Regex;

    fn run(key: &str) -> Value {
        let registry = Registry::new();
        let opts = GenerationOptions {
            name: key.to_string(),
            ..GenerationOptions::default()
        };
        let mut entropy = EntropySource::from_seed(7);
        let config = GeneratorConfig::default();
        let faker = Faker::default();
        let mut ctx = GenContext {
            entropy: &mut entropy,
            faker: &faker,
            config: &config,
        };
        let (_, generator) = registry.resolve(&opts).unwrap();
        generator(&opts, &mut ctx).unwrap()
    }

    #[test]
    fn every_key_is_registered() {
        let registry = Registry::new();
        for key in GENERATOR_KEYS {
            assert!(registry.contains(key), "missing generator {key}");
        }
        assert_eq!(registry.len(), GENERATOR_KEYS.len());
    }

    #[test]
    fn every_key_produces_a_value() {
        for key in GENERATOR_KEYS {
            if *key == "pattern" {
                continue;
            }
            let value = run(key);
            assert!(!value.is_null(), "{key}");
        }
    }

    #[test]
    fn resolve_through_aliases() {
        let registry = Registry::new();
        let opts = GenerationOptions {
            name: "Phone".to_string(),
            ..GenerationOptions::default()
        };
        assert_eq!(registry.resolve(&opts).unwrap().0, "landline");
    }

    #[test]
    fn resolve_falls_back_to_field_name() {
        let registry = Registry::new();
        let opts = GenerationOptions {
            name: "no-such-generator".to_string(),
            field_name: "zipCode".to_string(),
            ..GenerationOptions::default()
        };
        assert_eq!(registry.resolve(&opts).unwrap().0, "postcode");

        let opts = GenerationOptions {
            field_name: "favouriteThing".to_string(),
            ..GenerationOptions::default()
        };
        assert!(registry.resolve(&opts).is_none());
    }

    #[test]
    fn uuid_shape() {
        let re = Regex::new(text::UUID).unwrap();
        let value = run("uuid");
        assert!(re.is_match(value.as_str().unwrap()), "{value}");
    }

    #[test]
    fn date_formats() {
        let date = run("date");
        assert!(NaiveDate::parse_from_str(date.as_str().unwrap(), "%Y-%m-%d").is_ok());
        let at = run("datetime");
        let at = at.as_str().unwrap();
        assert!(at.ends_with('Z'), "{at}");
        assert!(DateTime::parse_from_rfc3339(at).is_ok(), "{at}");
    }

    #[test]
    fn coordinates_in_range() {
        let lat = run("latitude").as_f64().unwrap();
        assert!((-90.0..=90.0).contains(&lat));
        let lon = run("longitude").as_f64().unwrap();
        assert!((-180.0..=180.0).contains(&lon));
    }

    #[test]
    fn characters_use_length_arg() {
        let registry = Registry::new();
        let mut opts = GenerationOptions {
            name: "characters".to_string(),
            ..GenerationOptions::default()
        };
        opts.args.length = 12;
        let mut entropy = EntropySource::from_seed(1);
        let config = GeneratorConfig::default();
        let faker = Faker::default();
        let mut ctx = GenContext {
            entropy: &mut entropy,
            faker: &faker,
            config: &config,
        };
        let value = registry.get("characters").unwrap()(&opts, &mut ctx).unwrap();
        assert_eq!(value.as_str().unwrap().len(), 12);
    }

    #[test]
    fn duration_rendering() {
        assert_eq!(go_duration(0), "0s");
        assert_eq!(go_duration(1_500_000_000), "1.5s");
        assert_eq!(go_duration(61_000_000_000), "1m1s");
        assert_eq!(go_duration(3_600_000_000_000), "1h0m0s");
    }

    #[test]
    fn custom_generator_overrides_builtin() {
        let mut registry = Registry::new();
        registry.register("email", boxed(|_, _| Ok(json!("fixed@example.com"))));
        let opts = GenerationOptions {
            name: "email".to_string(),
            ..GenerationOptions::default()
        };
        let mut entropy = EntropySource::from_seed(1);
        let config = GeneratorConfig::default();
        let faker = Faker::default();
        let mut ctx = GenContext {
            entropy: &mut entropy,
            faker: &faker,
            config: &config,
        };
        let (_, generator) = registry.resolve(&opts).unwrap();
        assert_eq!(generator(&opts, &mut ctx).unwrap(), json!("fixed@example.com"));
    }
}
