//! Bounded random draws
//!
//! Degenerate ranges never touch the RNG: `min == max` returns the bound,
//! `min > max` returns zero and `0, 0` means "anything in the type's wide
//! default range".

use std::time::{SystemTime, UNIX_EPOCH};

use apistub_core::GeneratorConfig;
use rand::distr::uniform::SampleUniform;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Integer types drawable by [`EntropySource::uniform_int`].
pub trait IntSample: Copy + PartialOrd + Default + SampleUniform {
    const WIDE_MIN: Self;
    const WIDE_MAX: Self;
}

/// Float types drawable by [`EntropySource::uniform_float`].
pub trait FloatSample: Copy + PartialOrd + Default {
    const WIDE_MIN: Self;
    const WIDE_MAX: Self;

    /// Point at fraction `u` in `[0, 1)` between `min` and `max`.
    fn lerp(min: Self, max: Self, u: f64) -> Self;
}

macro_rules! signed_wide {
    ($($t:ty),*) => {$(
        impl IntSample for $t {
            const WIDE_MIN: Self = -(<$t>::MAX >> 1);
            const WIDE_MAX: Self = (<$t>::MAX >> 1) - 1;
        }
    )*};
}

macro_rules! unsigned_wide {
    ($($t:ty),*) => {$(
        impl IntSample for $t {
            const WIDE_MIN: Self = 0;
            const WIDE_MAX: Self = (<$t>::MAX >> 1) - 1;
        }
    )*};
}

signed_wide!(i32, i64, i128);
unsigned_wide!(u32, u64, usize);

impl FloatSample for f64 {
    const WIDE_MIN: Self = -f64::MAX / 2.0;
    const WIDE_MAX: Self = f64::MAX / 2.0;

    fn lerp(min: Self, max: Self, u: f64) -> Self {
        // Convex combination; `max - min` would overflow on wide ranges.
        (min * (1.0 - u) + max * u).clamp(min, max)
    }
}

impl FloatSample for f32 {
    const WIDE_MIN: Self = -f32::MAX / 2.0;
    const WIDE_MAX: Self = f32::MAX / 2.0;

    fn lerp(min: Self, max: Self, u: f64) -> Self {
        let u = u as f32;
        (min * (1.0 - u) + max * u).clamp(min, max)
    }
}

/// Caller-owned source of randomness.
#[derive(Debug, Clone)]
pub struct EntropySource {
    rng: SmallRng,
    autoseed: bool,
}

impl EntropySource {
    /// Reproducible source
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            autoseed: false,
        }
    }

    /// Source seeded from OS entropy
    #[must_use]
    pub fn from_os() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
            autoseed: false,
        }
    }

    #[must_use]
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let mut source = match config.seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_os(),
        };
        source.autoseed = config.autoseed;
        source
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// When on, the RNG is reseeded from the wall clock before each draw.
    pub fn set_autoseed(&mut self, on: bool) {
        self.autoseed = on;
    }

    #[must_use]
    pub const fn autoseed(&self) -> bool {
        self.autoseed
    }

    fn reseed_if_needed(&mut self) {
        if self.autoseed {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_nanos() as u64);
            self.rng = SmallRng::seed_from_u64(nanos);
        }
    }

    /// Raw RNG for collaborators (faker, regex sampling).
    pub fn rng(&mut self) -> &mut SmallRng {
        self.reseed_if_needed();
        &mut self.rng
    }

    /// Inclusive draw in `[min, max]`.
    pub fn uniform_int<T: IntSample>(&mut self, min: T, max: T) -> T {
        let zero = T::default();
        if min > max {
            return zero;
        }
        let (min, max) = if min == zero && max == zero {
            (T::WIDE_MIN, T::WIDE_MAX)
        } else if min == max {
            return min;
        } else {
            (min, max)
        };
        self.reseed_if_needed();
        self.rng.random_range(min..=max)
    }

    /// Inclusive draw in `[min, max]`.
    pub fn uniform_float<T: FloatSample>(&mut self, min: T, max: T) -> T {
        let zero = T::default();
        // Also catches NaN bounds.
        if min.partial_cmp(&max).is_none_or(|o| o.is_gt()) {
            return zero;
        }
        let (min, max) = if min == zero && max == zero {
            (T::WIDE_MIN, T::WIDE_MAX)
        } else if min == max {
            return min;
        } else {
            (min, max)
        };
        self.reseed_if_needed();
        let u: f64 = self.rng.random();
        T::lerp(min, max, u)
    }

    pub fn uniform_bool(&mut self) -> bool {
        self.reseed_if_needed();
        self.rng.random_bool(0.5)
    }

    /// Index in `[0, len)`; `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.uniform_int(0, len - 1)
    }

    /// Random alphanumeric string of `len` characters
    pub fn alphanumeric(&mut self, len: usize) -> String {
        self.reseed_if_needed();
        (0..len)
            .map(|_| CHARS[self.rng.random_range(0..CHARS.len())] as char)
            .collect()
    }
}

impl Default for EntropySource {
    fn default() -> Self {
        Self::from_os()
    }
}
