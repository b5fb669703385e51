//! apistub-core: generation options and name inference for API stub values
//!
//! This crate turns Swagger field descriptors into [`GenerationOptions`]:
//! the constraints, the requested [`Mode`] and the rules that pick a
//! generator when the descriptor carries no explicit `x-datagen` hint.

pub mod aliases;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod hint;
pub mod mode;
pub mod options;
pub mod rules;

pub use aliases::{canonicalize, command_case};
pub use config::{ConfigError, GeneratorConfig};
pub use descriptor::{
    Bound, CommonValidations, Descriptor, FieldDescriptor, Header, Items, Parameter, Response,
    Schema, SchemaType,
};
pub use error::StubError;
pub use hint::{GenArgs, GenTag, XDATAGEN};
pub use mode::Mode;
pub use options::{Constraints, GenerationOptions};
pub use rules::{Decision, Ruler};
