//! Descriptor dispatcher
//!
//! [`Generator`] turns any [`Descriptor`] into a stub value:
//!
//! 1. build [`GenerationOptions`] and run the rule chain
//! 2. objects recurse into their properties
//! 3. required, enum and collection policies
//! 4. registry lookup and the generator itself
//! 5. pattern and length policies on string results

use apistub_core::{
    Descriptor, FieldDescriptor, GenerationOptions, GeneratorConfig, Header, Mode, Parameter,
    Response, Schema, StubError,
};
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use crate::collection;
use crate::entropy::EntropySource;
use crate::faker::{Faker, Locale};
use crate::registry::{GenContext, Registry};
use crate::text;

/// Returned by `INVALID_ENUM` when no generated candidate escapes the enum.
pub const INVALID_ENUM_SENTINEL: &str = "__INVALID_ENUM_VALUE__";

/// Maximum nesting of objects and arrays.
const MAX_DEPTH: u32 = 20;

#[derive(Debug)]
pub struct Generator {
    registry: Registry,
    faker: Faker,
    config: GeneratorConfig,
}

impl Generator {
    /// # Errors
    ///
    /// [`StubError::UnsupportedLocale`] when `config.locale` is unknown.
    pub fn new(config: GeneratorConfig) -> Result<Self, StubError> {
        let locale = Locale::parse(&config.locale)?;
        Ok(Self {
            registry: Registry::new(),
            faker: Faker::new(locale),
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registry access for custom generators.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Entropy source seeded as configured.
    #[must_use]
    pub fn entropy(&self) -> EntropySource {
        EntropySource::from_config(&self.config)
    }

    /// Stub value for `descriptor`; `key` names the field and may be empty.
    ///
    /// # Errors
    ///
    /// Any [`StubError`]; failures are scoped to this field.
    pub fn generate(
        &self,
        key: &str,
        descriptor: Descriptor<'_>,
        entropy: &mut EntropySource,
    ) -> Result<Value, StubError> {
        match descriptor {
            Descriptor::Parameter(p) => self.gen_parameter(key, p, entropy),
            Descriptor::Header(h) => self.gen_header(key, h, entropy),
            Descriptor::Schema(s) => self.gen_schema(key, s, entropy),
            Descriptor::Response(r) => self.gen_response(key, r, entropy),
        }
    }

    /// # Errors
    ///
    /// See [`Self::generate`].
    pub fn gen_parameter(
        &self,
        key: &str,
        param: &Parameter,
        entropy: &mut EntropySource,
    ) -> Result<Value, StubError> {
        if let Some(schema) = param.schema.as_deref() {
            let field = if key.is_empty() { &param.name } else { key };
            return self.schema_value("parameter", field, param.required, schema, entropy, 0);
        }
        let opts = GenerationOptions::for_parameter(key, param)?;
        self.field_value("parameter", opts, param.items(), entropy, 0)
    }

    /// # Errors
    ///
    /// See [`Self::generate`].
    pub fn gen_header(
        &self,
        key: &str,
        header: &Header,
        entropy: &mut EntropySource,
    ) -> Result<Value, StubError> {
        let opts = GenerationOptions::for_header(key, header)?;
        self.field_value("header", opts, header.items(), entropy, 0)
    }

    /// # Errors
    ///
    /// See [`Self::generate`].
    pub fn gen_schema(
        &self,
        key: &str,
        schema: &Schema,
        entropy: &mut EntropySource,
    ) -> Result<Value, StubError> {
        self.schema_value("schema", key, true, schema, entropy, 0)
    }

    /// # Errors
    ///
    /// [`StubError::UnsupportedDescriptor`] for a response without schema,
    /// otherwise see [`Self::generate`].
    pub fn gen_response(
        &self,
        key: &str,
        response: &Response,
        entropy: &mut EntropySource,
    ) -> Result<Value, StubError> {
        let schema = response.schema.as_deref().ok_or_else(|| {
            StubError::UnsupportedDescriptor(format!("response {key:?} declares no schema"))
        })?;
        self.schema_value("response", key, true, schema, entropy, 0)
    }

    fn schema_value(
        &self,
        kind: &'static str,
        key: &str,
        required: bool,
        schema: &Schema,
        entropy: &mut EntropySource,
        depth: u32,
    ) -> Result<Value, StubError> {
        let opts = GenerationOptions::for_schema(key, required, schema)?;
        if schema.is_object() && opts.name.is_empty() {
            return self.object(kind, opts, schema, entropy, depth);
        }
        self.field_value(kind, opts, schema.items(), entropy, depth)
    }

    fn object(
        &self,
        kind: &'static str,
        opts: GenerationOptions,
        schema: &Schema,
        entropy: &mut EntropySource,
        depth: u32,
    ) -> Result<Value, StubError> {
        check_depth(&opts, depth)?;
        let mode = opts.mode;
        let omitted = if mode.has(Mode::INVALID_REQUIRED) || mode.has(Mode::INVALID) {
            let name = schema.required_properties.first().ok_or_else(|| {
                StubError::ImpossibleInvalid(format!(
                    "object {} has no required property",
                    opts.field_name
                ))
            })?;
            Some(name.as_str())
        } else if mode.is_valid() {
            None
        } else {
            return Err(StubError::ImpossibleInvalid(format!("{mode} does not apply to objects")));
        };

        let mut out = Map::new();
        for (name, property) in &schema.properties {
            if omitted == Some(name.as_str()) {
                continue;
            }
            let required = schema.required_properties.contains(name);
            if !required && !entropy.uniform_bool() {
                continue;
            }
            let value = self.schema_value(kind, name, required, property, entropy, depth + 1)?;
            out.insert(name.clone(), value);
        }
        trace!(field = %opts.field_name, properties = out.len(), "generated object");
        Ok(Value::Object(out))
    }

    fn field_value(
        &self,
        kind: &'static str,
        mut opts: GenerationOptions,
        items: Option<&dyn FieldDescriptor>,
        entropy: &mut EntropySource,
        depth: u32,
    ) -> Result<Value, StubError> {
        check_depth(&opts, depth)?;
        opts.infer();
        opts.mode = effective_mode(&opts)?;
        let mode = opts.mode;
        debug!(field = %opts.field_name, name = %opts.name, %mode, "generating");

        if mode.has(Mode::INVALID_REQUIRED) {
            return if opts.constraints.required {
                Ok(Value::Null)
            } else {
                Err(StubError::ImpossibleInvalid(format!(
                    "{} is optional",
                    opts.field_name
                )))
            };
        }
        if mode.has(Mode::INVALID_ENUM) {
            return self.outside_enum(kind, &opts, items, entropy, depth);
        }
        if let Some(values) = opts.constraints.enum_values.as_ref().filter(|v| !v.is_empty()) {
            if mode.is_valid() {
                return Ok(values[entropy.index(values.len())].clone());
            }
        }
        if opts.is_array() {
            return self.array(kind, &opts, items, entropy, depth);
        }
        if mode.has(Mode::ITEMS) {
            return Err(StubError::ImpossibleInvalid(format!(
                "{} is not an array",
                opts.field_name
            )));
        }

        let value = self.leaf(kind, &opts, entropy)?;
        self.post_process(value, &opts, entropy)
    }

    fn leaf(
        &self,
        kind: &'static str,
        opts: &GenerationOptions,
        entropy: &mut EntropySource,
    ) -> Result<Value, StubError> {
        let Some((key, generator)) = self.registry.resolve(opts) else {
            return Err(StubError::NoGeneratorFound {
                kind,
                field: opts.field_name.clone(),
            });
        };
        trace!(field = %opts.field_name, %key, "resolved generator");
        let mut ctx = GenContext {
            entropy,
            faker: &self.faker,
            config: &self.config,
        };
        generator(opts, &mut ctx)
    }

    // Flags for another value kind are ignored as long as one requested
    // flag applies to this one.
    fn post_process(
        &self,
        value: Value,
        opts: &GenerationOptions,
        entropy: &mut EntropySource,
    ) -> Result<Value, StubError> {
        let mode = opts.mode;
        let numeric = mode.has(Mode::NUMERIC);
        let textual = mode.has(Mode::TEXT);
        match value {
            Value::String(s) => {
                if numeric && !textual {
                    return Err(StubError::ImpossibleInvalid(format!(
                        "{} is not numeric",
                        opts.field_name
                    )));
                }
                let s = if mode.has(Mode::INVALID_PATTERN) {
                    text::violate_pattern(
                        opts.pattern.as_deref(),
                        s,
                        entropy,
                        self.config.invalid_retry_limit,
                    )?
                } else {
                    s
                };
                text::fit_length(s, &opts.constraints, mode, entropy).map(Value::String)
            }
            other => {
                let applies = numeric && other.is_number();
                if (numeric || textual) && !applies {
                    let expected = if numeric { "numeric" } else { "a string" };
                    return Err(StubError::ImpossibleInvalid(format!(
                        "{} is not {expected}",
                        opts.field_name
                    )));
                }
                Ok(other)
            }
        }
    }

    fn array(
        &self,
        kind: &'static str,
        opts: &GenerationOptions,
        items: Option<&dyn FieldDescriptor>,
        entropy: &mut EntropySource,
        depth: u32,
    ) -> Result<Value, StubError> {
        let foreign = Mode::from_bits(opts.mode.bits() & !Mode::ITEMS.bits());
        if !foreign.is_valid() {
            return Err(StubError::ImpossibleInvalid(format!(
                "{foreign} does not apply to arrays"
            )));
        }
        let items = items.ok_or_else(|| {
            StubError::UnsupportedDescriptor(format!("array {} declares no items", opts.field_name))
        })?;
        let mut element = GenerationOptions::for_items(&opts.field_name, items)?;
        if element.name.is_empty() && !element.is_array() {
            element.name.clone_from(&opts.name);
        }
        let values = collection::build(
            &opts.constraints,
            opts.mode,
            entropy,
            self.config.invalid_retry_limit,
            |entropy| self.field_value(kind, element.clone(), items.items(), entropy, depth + 1),
        )?;
        Ok(Value::Array(values))
    }

    fn outside_enum(
        &self,
        kind: &'static str,
        opts: &GenerationOptions,
        items: Option<&dyn FieldDescriptor>,
        entropy: &mut EntropySource,
        depth: u32,
    ) -> Result<Value, StubError> {
        let Some(values) = opts.constraints.enum_values.as_ref().filter(|v| !v.is_empty()) else {
            return Err(StubError::ImpossibleInvalid(format!(
                "{} declares no enum",
                opts.field_name
            )));
        };
        let mut free = opts.clone();
        free.mode = Mode::VALID;
        free.constraints.enum_values = None;
        for _ in 0..self.config.invalid_retry_limit {
            match self.field_value(kind, free.clone(), items, entropy, depth) {
                Ok(candidate) if !values.contains(&candidate) => return Ok(candidate),
                Ok(_) => {}
                Err(e) => {
                    trace!(field = %opts.field_name, error = %e, "no free candidate");
                    break;
                }
            }
        }
        let sentinel = json!(INVALID_ENUM_SENTINEL);
        if values.contains(&sentinel) {
            return Err(StubError::ImpossibleInvalid(format!(
                "every candidate for {} is an enum member",
                opts.field_name
            )));
        }
        Ok(sentinel)
    }
}

fn check_depth(opts: &GenerationOptions, depth: u32) -> Result<(), StubError> {
    if depth > MAX_DEPTH {
        return Err(StubError::UnsupportedDescriptor(format!(
            "{} nests deeper than {MAX_DEPTH} levels",
            opts.field_name
        )));
    }
    Ok(())
}

/// Narrow a bare `INVALID` to the first constraint the field declares.
fn effective_mode(opts: &GenerationOptions) -> Result<Mode, StubError> {
    let mode = opts.mode;
    if !mode.has(Mode::INVALID) {
        return Ok(mode);
    }
    let specific = Mode::from_bits(mode.bits() & !Mode::INVALID.bits());
    if !specific.is_valid() {
        return Ok(specific);
    }
    let c = &opts.constraints;
    let declared = [
        (c.enum_values.as_ref().is_some_and(|v| !v.is_empty()), Mode::INVALID_ENUM),
        (c.maximum.is_some(), Mode::INVALID_MAXIMUM),
        (c.minimum.is_some(), Mode::INVALID_MINIMUM),
        (c.multiple_of.is_some_and(|m| m != 0.0), Mode::INVALID_MULTIPLE_OF),
        (c.max_length.is_some(), Mode::INVALID_MAX_LENGTH),
        (c.min_length.is_some_and(|m| m > 0), Mode::INVALID_MIN_LENGTH),
        (opts.pattern.as_deref().is_some_and(|p| !p.is_empty()), Mode::INVALID_PATTERN),
        (c.max_items.is_some(), Mode::INVALID_MAX_ITEMS),
        (c.min_items.is_some_and(|m| m > 0), Mode::INVALID_MIN_ITEMS),
        (c.unique_items, Mode::INVALID_UNIQUE_ITEMS),
        (c.required, Mode::INVALID_REQUIRED),
    ];
    declared
        .into_iter()
        .find_map(|(present, flag)| present.then_some(flag))
        .ok_or_else(|| {
            StubError::ImpossibleInvalid(format!("{} declares no constraint", opts.field_name))
        })
}
