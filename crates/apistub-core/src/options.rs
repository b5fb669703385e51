//! Per-field generation options
//!
//! Built once from a descriptor, then handed to the generator. When the
//! descriptor carries an `x-datagen` name the rule chain is skipped entirely.

use serde_json::Value;
use tracing::debug;

use crate::descriptor::{Bound, FieldDescriptor, Header, Parameter, Schema};
use crate::error::StubError;
use crate::hint::{GenArgs, GenTag};
use crate::mode::Mode;
use crate::rules::{self, Ruler};

/// Validations read by the generators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub maximum: Option<Bound>,
    pub minimum: Option<Bound>,
    pub multiple_of: Option<f64>,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_items: Option<usize>,
    pub min_items: Option<usize>,
    pub unique_items: bool,
    pub enum_values: Option<Vec<Value>>,
    pub required: bool,
}

fn non_negative(v: Option<i64>) -> Option<usize> {
    v.map(|n| usize::try_from(n).unwrap_or(0))
}

impl Constraints {
    #[must_use]
    pub fn from_descriptor(d: &dyn FieldDescriptor) -> Self {
        Self {
            maximum: d.maximum(),
            minimum: d.minimum(),
            multiple_of: d.multiple_of(),
            max_length: non_negative(d.max_length()),
            min_length: non_negative(d.min_length()),
            max_items: non_negative(d.max_items()),
            min_items: non_negative(d.min_items()),
            unique_items: d.unique_items(),
            enum_values: d.enum_values().map(<[Value]>::to_vec),
            required: d.required(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    /// Canonical generator key; empty until resolved
    pub name: String,
    pub field_name: String,
    pub type_name: String,
    pub format: String,
    pub pattern: Option<String>,
    pub constraints: Constraints,
    pub args: GenArgs,
    pub mode: Mode,
    pub rules: Vec<Ruler>,
}

impl GenerationOptions {
    fn base(field_name: &str, d: &dyn FieldDescriptor) -> Result<(Self, bool), StubError> {
        let mut opts = Self {
            field_name: field_name.to_string(),
            type_name: d.type_name().to_string(),
            format: d.format().to_string(),
            pattern: d.pattern().map(str::to_string),
            constraints: Constraints::from_descriptor(d),
            ..Self::default()
        };
        let overridden = match d.hint()? {
            Some(tag) => opts.apply_hint(tag),
            None => false,
        };
        Ok((opts, overridden))
    }

    /// Copy args, mode and name from a decoded hint. Returns true when the
    /// hint names a generator.
    pub fn apply_hint(&mut self, tag: GenTag) -> bool {
        self.args = tag.args;
        self.mode = tag.mode;
        if tag.name.is_empty() {
            return false;
        }
        self.name = tag.name;
        true
    }

    /// Resolve `name` from the rules unless it is already set.
    pub fn infer(&mut self) {
        if !self.name.is_empty() {
            return;
        }
        if let Some(name) = rules::infer(&self.rules) {
            debug!(field = %self.field_name, %name, "inferred generator");
            self.name = name;
        }
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.type_name == "array"
    }

    fn push_rule(&mut self, rule: Option<Ruler>) {
        if let Some(rule) = rule {
            self.rules.push(rule);
        }
    }

    // Type, Fuzzy (strings only), Format, Pattern, Items.
    fn add_rules(&mut self, d: &dyn FieldDescriptor, type_rule: Option<Ruler>) {
        self.push_rule(type_rule);
        if d.type_name() == "string" {
            self.push_rule(Ruler::for_fuzzy(d.title(), d.description()));
        }
        self.push_rule(Ruler::for_format(d.format()));
        self.push_rule(Ruler::for_pattern(d.pattern()));
        self.push_rule(Ruler::for_items(d.items()));
    }

    /// Options for a non-body parameter.
    ///
    /// # Errors
    ///
    /// Body parameters must go through [`Self::for_schema`];
    /// a parameter with neither type nor schema is unsupported.
    pub fn for_parameter(key: &str, param: &Parameter) -> Result<Self, StubError> {
        if let Some(schema) = param.schema.as_deref() {
            let field = if key.is_empty() { &param.name } else { key };
            return Self::for_schema(field, param.required, schema);
        }
        if param.type_name.is_empty() {
            return Err(StubError::UnsupportedDescriptor(format!(
                "parameter {} declares neither type nor schema",
                param.name
            )));
        }
        let field = if key.is_empty() { &param.name } else { key };
        let (mut opts, overridden) = Self::base(field, param)?;
        if !overridden {
            opts.add_rules(param, Ruler::for_type(&param.type_name));
        }
        debug!(field = %opts.field_name, rules = opts.rules.len(), "parameter options");
        Ok(opts)
    }

    /// # Errors
    ///
    /// Returns [`StubError::Hint`] for a malformed `x-datagen` extension.
    pub fn for_header(key: &str, header: &Header) -> Result<Self, StubError> {
        let field = if key.is_empty() { "header" } else { key };
        let (mut opts, overridden) = Self::base(field, header)?;
        if !overridden {
            opts.add_rules(header, Ruler::for_type(&header.type_name));
        }
        debug!(field = %opts.field_name, rules = opts.rules.len(), "header options");
        Ok(opts)
    }

    /// Options for a schema; `required` comes from the enclosing object or parameter.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Hint`] for a malformed `x-datagen` extension.
    pub fn for_schema(key: &str, required: bool, schema: &Schema) -> Result<Self, StubError> {
        let (mut opts, overridden) = Self::base(key, schema)?;
        opts.constraints.required = required;
        if !overridden {
            let type_name = schema.type_name();
            let type_rule = match type_name {
                "object" | "array" => None,
                _ => Ruler::for_type(type_name),
            };
            opts.add_rules(schema, type_rule);
        }
        debug!(field = %opts.field_name, rules = opts.rules.len(), "schema options");
        Ok(opts)
    }

    /// Options for the elements of a collection.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Hint`] for a malformed `x-datagen` extension.
    pub fn for_items(key: &str, items: &dyn FieldDescriptor) -> Result<Self, StubError> {
        let field = format!("{key}.items");
        let (mut opts, overridden) = Self::base(&field, items)?;
        opts.constraints.required = true;
        if !overridden {
            let type_rule = match items.type_name() {
                "array" => None,
                other => Ruler::for_type(other),
            };
            opts.add_rules(items, type_rule);
        }
        Ok(opts)
    }
}
