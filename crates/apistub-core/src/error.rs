//! Generation failures
//!
//! Every failure is scoped to the single field being generated; callers
//! decide whether to skip the field or abort the whole fixture.

/// Error raised while resolving or running a value generator.
#[derive(Debug, thiserror::Error)]
pub enum StubError {
    /// Neither the explicit/inferred name nor the field name maps to a generator.
    #[error("no generator found for {kind} [{field}]")]
    NoGeneratorFound { kind: &'static str, field: String },

    /// The requested invalidity axis cannot be violated (constraint missing,
    /// range exhausted, or retries spent).
    #[error("no invalid value could be generated: {0}")]
    ImpossibleInvalid(String),

    /// No value inside the declared bounds satisfies every constraint.
    #[error("no valid value could be generated: {0}")]
    ImpossibleValid(String),

    #[error("invalid pattern {pattern:?}: {reason}")]
    PatternCompilation { pattern: String, reason: String },

    /// Malformed `x-datagen` extension.
    #[error("invalid x-datagen hint: {0}")]
    Hint(String),

    #[error("unsupported faker locale: {0}")]
    UnsupportedLocale(String),

    #[error("unsupported descriptor: {0}")]
    UnsupportedDescriptor(String),
}

impl StubError {
    /// True for the two "no value exists" outcomes, as opposed to setup errors.
    #[must_use]
    pub const fn is_impossible(&self) -> bool {
        matches!(self, Self::ImpossibleInvalid(_) | Self::ImpossibleValid(_))
    }
}
