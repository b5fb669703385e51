//! Generation mode bitmask
//!
//! `VALID` (zero) asks for a value satisfying every declared constraint; each
//! other flag asks for a value violating that one constraint. Bit positions are
//! stable so integer masks written in `x-datagen` hints keep their meaning.

use std::ops::{BitOr, BitOrAssign};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Set of requested invalidity axes
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Mode(u64);

impl Mode {
    pub const VALID: Self = Self(0);
    pub const INVALID: Self = Self(1 << 0);
    pub const INVALID_REQUIRED: Self = Self(1 << 1);
    pub const INVALID_MAXIMUM: Self = Self(1 << 2);
    pub const INVALID_MINIMUM: Self = Self(1 << 3);
    pub const INVALID_MAX_LENGTH: Self = Self(1 << 4);
    pub const INVALID_MIN_LENGTH: Self = Self(1 << 5);
    pub const INVALID_PATTERN: Self = Self(1 << 6);
    pub const INVALID_MAX_ITEMS: Self = Self(1 << 7);
    pub const INVALID_MIN_ITEMS: Self = Self(1 << 8);
    pub const INVALID_UNIQUE_ITEMS: Self = Self(1 << 9);
    pub const INVALID_MULTIPLE_OF: Self = Self(1 << 10);
    pub const INVALID_ENUM: Self = Self(1 << 11);

    /// Flags honored by the numeric generators.
    pub const NUMERIC: Self =
        Self(Self::INVALID_MINIMUM.0 | Self::INVALID_MAXIMUM.0 | Self::INVALID_MULTIPLE_OF.0);
    /// Flags honored by string post-processing.
    pub const TEXT: Self =
        Self(Self::INVALID_MAX_LENGTH.0 | Self::INVALID_MIN_LENGTH.0 | Self::INVALID_PATTERN.0);
    /// Flags honored by collections.
    pub const ITEMS: Self =
        Self(Self::INVALID_MAX_ITEMS.0 | Self::INVALID_MIN_ITEMS.0 | Self::INVALID_UNIQUE_ITEMS.0);

    const NAMED: [(Self, &'static str); 12] = [
        (Self::INVALID, "invalid"),
        (Self::INVALID_REQUIRED, "invalid-required"),
        (Self::INVALID_MAXIMUM, "invalid-maximum"),
        (Self::INVALID_MINIMUM, "invalid-minimum"),
        (Self::INVALID_MAX_LENGTH, "invalid-max-length"),
        (Self::INVALID_MIN_LENGTH, "invalid-min-length"),
        (Self::INVALID_PATTERN, "invalid-pattern"),
        (Self::INVALID_MAX_ITEMS, "invalid-max-items"),
        (Self::INVALID_MIN_ITEMS, "invalid-min-items"),
        (Self::INVALID_UNIQUE_ITEMS, "invalid-unique-items"),
        (Self::INVALID_MULTIPLE_OF, "invalid-multiple-of"),
        (Self::INVALID_ENUM, "invalid-enum"),
    ];

    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// True when any bit of `flag` is set
    #[must_use]
    pub const fn has(self, flag: Self) -> bool {
        self.0 & flag.0 != 0
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Names of the set flags, lowest bit first.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(flag, _)| self.has(*flag))
            .map(|(_, name)| name)
    }
}

impl BitOr for Mode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Mode {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            return f.write_str("valid");
        }
        let names: Vec<&str> = self.names().collect();
        if names.is_empty() {
            return write!(f, "{:#x}", self.0);
        }
        f.write_str(&names.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_is_zero() {
        assert_eq!(Mode::default(), Mode::VALID);
        assert!(Mode::VALID.is_valid());
        assert!(!Mode::VALID.has(Mode::INVALID_MAXIMUM));
    }

    #[test]
    fn bit_positions_are_stable() {
        assert_eq!(Mode::INVALID.bits(), 1);
        assert_eq!(Mode::INVALID_MAXIMUM.bits(), 4);
        assert_eq!(Mode::INVALID_MINIMUM.bits(), 8);
        assert_eq!(Mode::INVALID_MULTIPLE_OF.bits(), 1024);
        assert_eq!(Mode::INVALID_ENUM.bits(), 2048);
    }

    #[test]
    fn union_and_has() {
        let mode = Mode::INVALID_MAXIMUM | Mode::INVALID_PATTERN;
        assert!(mode.has(Mode::INVALID_MAXIMUM));
        assert!(mode.has(Mode::INVALID_PATTERN));
        assert!(!mode.has(Mode::INVALID_MINIMUM));
        assert!(mode.has(Mode::NUMERIC));
        assert!(mode.has(Mode::TEXT));
        assert!(!mode.has(Mode::ITEMS));
    }

    #[test]
    fn display() {
        insta::assert_snapshot!(Mode::VALID.to_string(), @"valid");
        insta::assert_snapshot!(
            (Mode::INVALID_MINIMUM | Mode::INVALID_REQUIRED).to_string(),
            @"invalid-required|invalid-minimum"
        );
        insta::assert_snapshot!(Mode::from_bits(1 << 40).to_string(), @"0x10000000000");
    }

    #[test]
    fn serializes_as_integer() {
        let json = serde_json::to_string(&Mode::INVALID_MAXIMUM).unwrap();
        assert_eq!(json, "4");
        let mode: Mode = serde_json::from_str("1028").unwrap();
        assert_eq!(mode, Mode::INVALID_MAXIMUM | Mode::INVALID_MULTIPLE_OF);
    }
}
