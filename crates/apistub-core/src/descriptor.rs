//! Swagger 2.0 field descriptors
//!
//! Only what value generation reads is modelled: type metadata, the common
//! validations and `x-` extensions. `$ref` is not resolved.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StubError;
use crate::hint::GenTag;

/// A numeric limit and whether the limit itself is excluded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub exclusive: bool,
}

impl Bound {
    #[must_use]
    pub const fn inclusive(value: f64) -> Self {
        Self {
            value,
            exclusive: false,
        }
    }

    #[must_use]
    pub const fn exclusive(value: f64) -> Self {
        Self {
            value,
            exclusive: true,
        }
    }
}

/// Validations shared by parameters, headers, items and schemas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonValidations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    pub exclusive_maximum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    pub exclusive_minimum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<i64>,
    pub unique_items: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
}

/// Read-only accessor contract consumed by the options builders.
///
/// Implementors supply type metadata, validations and extensions; the
/// constraint accessors are derived from [`CommonValidations`].
pub trait FieldDescriptor {
    fn type_name(&self) -> &str;
    fn format(&self) -> &str;
    fn validations(&self) -> &CommonValidations;
    fn extensions(&self) -> &BTreeMap<String, Value>;
    fn items(&self) -> Option<&dyn FieldDescriptor>;

    fn field_name(&self) -> &str {
        ""
    }

    fn title(&self) -> &str {
        ""
    }

    fn description(&self) -> &str {
        ""
    }

    fn required(&self) -> bool {
        true
    }

    fn pattern(&self) -> Option<&str> {
        self.validations()
            .pattern
            .as_deref()
            .filter(|p| !p.is_empty())
    }

    fn maximum(&self) -> Option<Bound> {
        let v = self.validations();
        v.maximum.map(|value| Bound {
            value,
            exclusive: v.exclusive_maximum,
        })
    }

    fn minimum(&self) -> Option<Bound> {
        let v = self.validations();
        v.minimum.map(|value| Bound {
            value,
            exclusive: v.exclusive_minimum,
        })
    }

    fn max_length(&self) -> Option<i64> {
        self.validations().max_length
    }

    fn min_length(&self) -> Option<i64> {
        self.validations().min_length
    }

    fn max_items(&self) -> Option<i64> {
        self.validations().max_items
    }

    fn min_items(&self) -> Option<i64> {
        self.validations().min_items
    }

    fn unique_items(&self) -> bool {
        self.validations().unique_items
    }

    fn multiple_of(&self) -> Option<f64> {
        self.validations().multiple_of
    }

    fn enum_values(&self) -> Option<&[Value]> {
        let values = &self.validations().enum_values;
        (!values.is_empty()).then_some(values.as_slice())
    }

    /// Decoded `x-datagen` hint, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Hint`] when the extension is malformed.
    fn hint(&self) -> Result<Option<GenTag>, StubError> {
        GenTag::from_extensions(self.extensions())
    }
}

/// Element descriptor of an array-typed parameter or header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Items {
    #[serde(rename = "type")]
    pub type_name: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Items>>,
    pub collection_format: String,
    #[serde(flatten)]
    pub validations: CommonValidations,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub description: String,
    pub required: bool,
    /// Body parameters carry a schema instead of a type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Box<Schema>>,
    #[serde(rename = "type")]
    pub type_name: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Items>>,
    #[serde(flatten)]
    pub validations: CommonValidations,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// Response header. Headers are always treated as required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Header {
    pub description: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Items>>,
    #[serde(flatten)]
    pub validations: CommonValidations,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

/// `type` of a schema: a single name or a list (the first entry is used).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Many(Vec<String>),
}

impl SchemaType {
    #[must_use]
    pub fn first(&self) -> &str {
        match self {
            Self::Single(name) => name,
            Self::Many(names) => names.first().map_or("", String::as_str),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    pub format: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    /// Names of required properties
    #[serde(rename = "required", skip_serializing_if = "Vec::is_empty")]
    pub required_properties: Vec<String>,
    #[serde(flatten)]
    pub validations: CommonValidations,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Schema {
    /// True for explicit `type: object` or a schema declaring properties.
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.type_name() == "object" || !self.properties.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Header>,
}

impl FieldDescriptor for Items {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn format(&self) -> &str {
        &self.format
    }

    fn validations(&self) -> &CommonValidations {
        &self.validations
    }

    fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    fn items(&self) -> Option<&dyn FieldDescriptor> {
        self.items.as_deref().map(|i| i as &dyn FieldDescriptor)
    }
}

impl FieldDescriptor for Parameter {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn format(&self) -> &str {
        &self.format
    }

    fn validations(&self) -> &CommonValidations {
        &self.validations
    }

    fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    fn items(&self) -> Option<&dyn FieldDescriptor> {
        self.items.as_deref().map(|i| i as &dyn FieldDescriptor)
    }

    fn field_name(&self) -> &str {
        &self.name
    }

    // The parameter name doubles as its title for fuzzy matching.
    fn title(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn required(&self) -> bool {
        self.required
    }
}

impl FieldDescriptor for Header {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn format(&self) -> &str {
        &self.format
    }

    fn validations(&self) -> &CommonValidations {
        &self.validations
    }

    fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    fn items(&self) -> Option<&dyn FieldDescriptor> {
        self.items.as_deref().map(|i| i as &dyn FieldDescriptor)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl FieldDescriptor for Schema {
    fn type_name(&self) -> &str {
        self.schema_type.as_ref().map_or("", SchemaType::first)
    }

    fn format(&self) -> &str {
        &self.format
    }

    fn validations(&self) -> &CommonValidations {
        &self.validations
    }

    fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    fn items(&self) -> Option<&dyn FieldDescriptor> {
        self.items.as_deref().map(|i| i as &dyn FieldDescriptor)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Everything a stub can be generated for.
#[derive(Debug, Clone, Copy)]
pub enum Descriptor<'a> {
    Parameter(&'a Parameter),
    Header(&'a Header),
    Schema(&'a Schema),
    Response(&'a Response),
}

impl Descriptor<'_> {
    /// Short label used in errors and logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Parameter(_) => "parameter",
            Self::Header(_) => "header",
            Self::Schema(_) => "schema",
            Self::Response(_) => "response",
        }
    }
}

impl<'a> From<&'a Parameter> for Descriptor<'a> {
    fn from(p: &'a Parameter) -> Self {
        Self::Parameter(p)
    }
}

impl<'a> From<&'a Header> for Descriptor<'a> {
    fn from(h: &'a Header) -> Self {
        Self::Header(h)
    }
}

impl<'a> From<&'a Schema> for Descriptor<'a> {
    fn from(s: &'a Schema) -> Self {
        Self::Schema(s)
    }
}

impl<'a> From<&'a Response> for Descriptor<'a> {
    fn from(r: &'a Response) -> Self {
        Self::Response(r)
    }
}
