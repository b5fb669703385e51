//! `x-datagen` extension hint
//!
//! A descriptor may carry an explicit generation hint:
//!
//! ```yaml
//! x-datagen:
//!   name: amount
//!   args: { min: 5, max: 50 }
//!   mode: 4
//! ```
//!
//! A non-empty `name` bypasses rule inference. The bare string form
//! (`x-datagen: amount`) is shorthand for `{name: amount}`.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StubError;
use crate::mode::Mode;

/// Extension key carrying the hint.
pub const XDATAGEN: &str = "x-datagen";

pub const DEFAULT_WORD_COUNT: usize = 10;
pub const DEFAULT_STRING_LENGTH: usize = 30;

/// Decoded `x-datagen` value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GenTag {
    /// Generator name or alias; empty means "infer from the descriptor"
    pub name: String,
    pub args: GenArgs,
    /// Integer bitmask, see [`Mode`]
    pub mode: Mode,
}

/// Generator arguments.
///
/// Bounds given here act as defaults and are only narrowed by the
/// descriptor's own validations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GenArgs {
    /// Target string length for `characters` (0 = default)
    pub length: usize,
    /// Word count for `words`/`sentence` style generators (0 = default)
    pub words: usize,
    /// Decoded but not used: each locale has a single word list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplemental: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    /// Decimal places kept on floating point output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

impl GenArgs {
    #[must_use]
    pub fn word_count(&self) -> usize {
        if self.words == 0 {
            DEFAULT_WORD_COUNT
        } else {
            self.words
        }
    }

    #[must_use]
    pub fn string_length(&self) -> usize {
        if self.length == 0 {
            DEFAULT_STRING_LENGTH
        } else {
            self.length
        }
    }
}

impl GenTag {
    /// Decode the hint from a descriptor's extension map.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Hint`] when the extension is present but malformed.
    pub fn from_extensions(extensions: &BTreeMap<String, Value>) -> Result<Option<Self>, StubError> {
        let Some(raw) = extensions.get(XDATAGEN) else {
            return Ok(None);
        };
        match raw {
            Value::Null => Ok(None),
            Value::String(name) => Ok(Some(Self {
                name: name.clone(),
                ..Self::default()
            })),
            Value::Object(_) => serde_json::from_value(raw.clone())
                .map(Some)
                .map_err(|e| StubError::Hint(e.to_string())),
            other => Err(StubError::Hint(format!(
                "expected an object or a generator name, got {other}"
            ))),
        }
    }
}

/// Generate JSON Schema for the `x-datagen` hint.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(GenTag);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
