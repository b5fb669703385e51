//! apistub-gen: stub values for Swagger fields
//!
//! [`Generator`] resolves a descriptor to a generator through the
//! [`Registry`] and applies the requested [`apistub_core::Mode`]: valid
//! values by default, or values that break exactly the constraints named
//! by the invalidity flags.

pub mod collection;
pub mod entropy;
pub mod faker;
pub mod generator;
pub mod numeric;
pub mod registry;
pub mod text;

pub use entropy::EntropySource;
pub use faker::{FakeKind, Faker, Locale};
pub use generator::{Generator, INVALID_ENUM_SENTINEL};
pub use registry::{GenContext, Registry, ValueGenerator, boxed};
