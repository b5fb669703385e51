//! Constraint-driven numeric generation
//!
//! Bounds are resolved in three layers: the type's wide envelope, the
//! hint's `min`/`max`, then the descriptor's `minimum`/`maximum`, which can
//! only tighten. A numeric call honors one invalidity axis, picked in the
//! order minimum, maximum, multipleOf.

use apistub_core::{Bound, Constraints, GenArgs, Mode, StubError};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::entropy::{EntropySource, FloatSample, IntSample};

/// Floating point family
pub trait FloatKind: FloatSample {
    const ZERO: Self;
    /// Nearest representable value
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
    fn up(self) -> Self;
    fn down(self) -> Self;
    fn into_value(self) -> Value;

    /// Smallest value `>= v`
    fn at_least(v: f64) -> Self {
        let c = Self::from_f64(v);
        if c.to_f64() < v { c.up() } else { c }
    }

    /// Largest value `<= v`
    fn at_most(v: f64) -> Self {
        let c = Self::from_f64(v);
        if c.to_f64() > v { c.down() } else { c }
    }

    /// Smallest value `> v`
    fn above(v: f64) -> Self {
        let c = Self::at_least(v);
        if c.to_f64() > v { c } else { c.up() }
    }

    /// Largest value `< v`
    fn below(v: f64) -> Self {
        let c = Self::at_most(v);
        if c.to_f64() < v { c } else { c.down() }
    }
}

impl FloatKind for f64 {
    const ZERO: Self = 0.0;

    fn from_f64(v: f64) -> Self {
        v
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn up(self) -> Self {
        self.next_up()
    }

    fn down(self) -> Self {
        self.next_down()
    }

    fn into_value(self) -> Value {
        json!(self)
    }
}

impl FloatKind for f32 {
    const ZERO: Self = 0.0;

    fn from_f64(v: f64) -> Self {
        v as f32
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn up(self) -> Self {
        self.next_up()
    }

    fn down(self) -> Self {
        self.next_down()
    }

    fn into_value(self) -> Value {
        json!(self)
    }
}

/// Integer family; arithmetic happens in `i128`.
pub trait IntKind: IntSample + Into<i128> + TryFrom<i128> {
    const LOWEST: i128;
    const HIGHEST: i128;
    fn into_value(self) -> Value;
}

macro_rules! int_kind {
    ($($t:ty),*) => {$(
        impl IntKind for $t {
            const LOWEST: i128 = <$t>::MIN as i128;
            const HIGHEST: i128 = <$t>::MAX as i128;

            fn into_value(self) -> Value {
                json!(self)
            }
        }
    )*};
}

int_kind!(i32, i64, u32, u64);

/// True when `value / divisor` is integral (only 0 divides by 0).
#[must_use]
pub fn is_multiple_of(value: f64, divisor: f64) -> bool {
    if divisor == 0.0 {
        return value == 0.0;
    }
    let q = value / divisor;
    q.is_finite() && q == q.trunc()
}

/// Truncate toward zero to `precision` decimals.
#[must_use]
pub fn truncate_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision.min(15) as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.trunc() / scale
}

enum Axis {
    Minimum(Bound),
    Maximum(Bound),
    MultipleOf(f64),
}

fn invalid_axis(c: &Constraints, mode: Mode) -> Result<Option<Axis>, StubError> {
    if mode.has(Mode::INVALID_MINIMUM) {
        let min = c.minimum.ok_or_else(|| {
            StubError::ImpossibleInvalid("minimum is not declared".to_string())
        })?;
        return Ok(Some(Axis::Minimum(min)));
    }
    if mode.has(Mode::INVALID_MAXIMUM) {
        let max = c.maximum.ok_or_else(|| {
            StubError::ImpossibleInvalid("maximum is not declared".to_string())
        })?;
        return Ok(Some(Axis::Maximum(max)));
    }
    if mode.has(Mode::INVALID_MULTIPLE_OF) {
        let m = c.multiple_of.ok_or_else(|| {
            StubError::ImpossibleInvalid("multipleOf is not declared".to_string())
        })?;
        return Ok(Some(Axis::MultipleOf(m)));
    }
    Ok(None)
}

/// Draw a float honoring `constraints` and `args` under `mode`.
///
/// # Errors
///
/// [`StubError::ImpossibleInvalid`] when the targeted constraint is missing
/// or cannot be violated inside the envelope, [`StubError::ImpossibleValid`]
/// when no multiple of the divisor lies within the bounds.
pub fn float<T: FloatKind>(
    constraints: &Constraints,
    args: &GenArgs,
    mode: Mode,
    entropy: &mut EntropySource,
    retry_limit: u32,
) -> Result<T, StubError> {
    let outer_lo = args.min.map_or(T::WIDE_MIN, T::at_least);
    let outer_hi = args.max.map_or(T::WIDE_MAX, T::at_most);

    let mut lo = outer_lo;
    let mut hi = outer_hi;
    if let Some(min) = constraints.minimum {
        let b = if min.exclusive { T::above(min.value) } else { T::at_least(min.value) };
        if b > lo {
            lo = b;
        }
    }
    if let Some(max) = constraints.maximum {
        let b = if max.exclusive { T::below(max.value) } else { T::at_most(max.value) };
        if b < hi {
            hi = b;
        }
    }
    let multiple = constraints.multiple_of.or(args.multiple_of);
    debug!(lo = lo.to_f64(), hi = hi.to_f64(), ?multiple, %mode, "float bounds");

    match invalid_axis(constraints, mode)? {
        Some(Axis::Minimum(min)) => {
            let upper = if min.exclusive { T::at_most(min.value) } else { T::below(min.value) };
            draw_float_in(outer_lo, upper, multiple, args.precision, entropy)
                .ok_or_else(|| StubError::ImpossibleInvalid(format!("nothing below minimum {}", min.value)))
        }
        Some(Axis::Maximum(max)) => {
            let lower = if max.exclusive { T::at_least(max.value) } else { T::above(max.value) };
            draw_float_in(lower, outer_hi, multiple, args.precision, entropy)
                .ok_or_else(|| StubError::ImpossibleInvalid(format!("nothing above maximum {}", max.value)))
        }
        Some(Axis::MultipleOf(m)) => {
            if lo > hi {
                return Err(StubError::ImpossibleInvalid("bounds are inverted".to_string()));
            }
            for _ in 0..retry_limit.max(1) {
                let v = draw_float(lo, hi, entropy);
                if !is_multiple_of(v.to_f64(), m) {
                    return Ok(v);
                }
                if lo == hi {
                    break;
                }
            }
            warn!(multiple_of = m, "retries exhausted looking for a non-multiple");
            Err(StubError::ImpossibleInvalid(format!("every candidate is a multiple of {m}")))
        }
        None => valid_float(lo, hi, multiple, args.precision, entropy),
    }
}

fn valid_float<T: FloatKind>(
    lo: T,
    hi: T,
    multiple: Option<f64>,
    precision: Option<u32>,
    entropy: &mut EntropySource,
) -> Result<T, StubError> {
    if lo > hi {
        return Ok(T::ZERO);
    }
    if lo == hi {
        return Ok(lo);
    }
    if multiple == Some(0.0) {
        return Ok(T::ZERO);
    }
    draw_float_in(lo, hi, multiple, precision, entropy).ok_or_else(|| {
        StubError::ImpossibleValid(format!(
            "no multiple of {} between {} and {}",
            multiple.unwrap_or_default(),
            lo.to_f64(),
            hi.to_f64()
        ))
    })
}

// Uniform draw in [lo, hi]; with a divisor, a uniformly drawn multiple.
// None when the range holds no candidate.
fn draw_float_in<T: FloatKind>(
    lo: T,
    hi: T,
    multiple: Option<f64>,
    precision: Option<u32>,
    entropy: &mut EntropySource,
) -> Option<T> {
    if lo > hi {
        return None;
    }
    match multiple {
        Some(m) if m != 0.0 => {
            let (a, b) = (lo.to_f64() / m, hi.to_f64() / m);
            let (kmin, kmax) = if a <= b { (a.ceil(), b.floor()) } else { (b.ceil(), a.floor()) };
            // Small divisors overflow the quotient of a wide bound; any finite
            // k still lands inside the range then.
            let (kmin, kmax) = (kmin.max(-f64::MAX), kmax.min(f64::MAX));
            if !(kmin <= kmax) {
                return None;
            }
            let k = if kmin == kmax {
                kmin
            } else {
                entropy.uniform_float(kmin, kmax).round().clamp(kmin, kmax)
            };
            let v = T::from_f64(k * m);
            v.to_f64().is_finite().then_some(v)
        }
        Some(_) => (lo <= T::ZERO && T::ZERO <= hi).then_some(T::ZERO),
        None => {
            let v = draw_float(lo, hi, entropy);
            Some(apply_precision(v, lo, hi, precision))
        }
    }
}

fn draw_float<T: FloatKind>(lo: T, hi: T, entropy: &mut EntropySource) -> T {
    if lo == hi {
        return lo;
    }
    entropy.uniform_float(lo, hi)
}

fn apply_precision<T: FloatKind>(v: T, lo: T, hi: T, precision: Option<u32>) -> T {
    let Some(p) = precision else {
        return v;
    };
    let t = T::from_f64(truncate_to(v.to_f64(), p));
    if lo <= t && t <= hi { t } else { v }
}

fn int_lower(b: Bound) -> i128 {
    let c = b.value.ceil();
    let v = c as i128;
    if b.exclusive && c == b.value { v.saturating_add(1) } else { v }
}

fn int_upper(b: Bound) -> i128 {
    let f = b.value.floor();
    let v = f as i128;
    if b.exclusive && f == b.value { v.saturating_sub(1) } else { v }
}

// Smallest integral multiple of `m`, for fractional divisors such as 0.5.
fn integer_step(m: f64) -> Option<i128> {
    let m = m.abs();
    if m < 1.0 {
        // 1 is a multiple of m when 1/m is integral.
        let inv = 1.0 / m;
        if inv.is_finite() && (inv - inv.round()).abs() < 1e-9 * inv.max(1.0) {
            return Some(1);
        }
    }
    (1..=1000u32).find_map(|n| {
        let s = m * f64::from(n);
        ((s - s.round()).abs() < 1e-9 && s.round() >= 1.0).then(|| s.round() as i128)
    })
}

/// Draw an integer honoring `constraints` and `args` under `mode`.
///
/// # Errors
///
/// Same failure modes as [`float`].
pub fn integer<T: IntKind>(
    constraints: &Constraints,
    args: &GenArgs,
    mode: Mode,
    entropy: &mut EntropySource,
    retry_limit: u32,
) -> Result<T, StubError> {
    let clamp = |v: i128| v.clamp(T::LOWEST, T::HIGHEST);
    let outer_lo = clamp(args.min.map_or(T::WIDE_MIN.into(), |v| v.ceil() as i128));
    let outer_hi = clamp(args.max.map_or(T::WIDE_MAX.into(), |v| v.floor() as i128));

    let mut lo = outer_lo;
    let mut hi = outer_hi;
    if let Some(min) = constraints.minimum {
        lo = lo.max(clamp(int_lower(min)));
    }
    if let Some(max) = constraints.maximum {
        hi = hi.min(clamp(int_upper(max)));
    }
    let multiple = constraints.multiple_of.or(args.multiple_of);
    debug!(lo, hi, ?multiple, %mode, "integer bounds");

    let value = match invalid_axis(constraints, mode)? {
        Some(Axis::Minimum(min)) => {
            let upper = if min.exclusive {
                int_upper(Bound::inclusive(min.value))
            } else {
                int_upper(Bound::exclusive(min.value))
            };
            let upper = upper.min(T::HIGHEST);
            draw_int_in(outer_lo, upper, multiple, entropy)?
                .ok_or_else(|| StubError::ImpossibleInvalid(format!("nothing below minimum {}", min.value)))?
        }
        Some(Axis::Maximum(max)) => {
            let lower = if max.exclusive {
                int_lower(Bound::inclusive(max.value))
            } else {
                int_lower(Bound::exclusive(max.value))
            };
            let lower = lower.max(T::LOWEST);
            draw_int_in(lower, outer_hi, multiple, entropy)?
                .ok_or_else(|| StubError::ImpossibleInvalid(format!("nothing above maximum {}", max.value)))?
        }
        Some(Axis::MultipleOf(m)) => {
            if lo > hi {
                return Err(StubError::ImpossibleInvalid("bounds are inverted".to_string()));
            }
            let mut found = None;
            for _ in 0..retry_limit.max(1) {
                let v = draw_int(lo, hi, entropy);
                if !is_multiple_of(v as f64, m) {
                    found = Some(v);
                    break;
                }
                if lo == hi {
                    break;
                }
            }
            found.ok_or_else(|| {
                warn!(multiple_of = m, "retries exhausted looking for a non-multiple");
                StubError::ImpossibleInvalid(format!("every candidate is a multiple of {m}"))
            })?
        }
        None => {
            if lo > hi {
                0
            } else if lo == hi {
                lo
            } else if multiple == Some(0.0) {
                0
            } else {
                draw_int_in(lo, hi, multiple, entropy)?.ok_or_else(|| {
                    StubError::ImpossibleValid(format!(
                        "no multiple of {} between {lo} and {hi}",
                        multiple.unwrap_or_default()
                    ))
                })?
            }
        }
    };
    T::try_from(value).map_err(|_| StubError::ImpossibleValid(format!("{value} is out of range")))
}

fn draw_int_in(
    lo: i128,
    hi: i128,
    multiple: Option<f64>,
    entropy: &mut EntropySource,
) -> Result<Option<i128>, StubError> {
    if lo > hi {
        return Ok(None);
    }
    match multiple {
        Some(m) if m != 0.0 => {
            let step = integer_step(m).ok_or_else(|| {
                StubError::ImpossibleValid(format!("{m} has no integral multiple"))
            })?;
            let kmin = lo.div_euclid(step) + i128::from(lo.rem_euclid(step) != 0);
            let kmax = hi.div_euclid(step);
            if kmin > kmax {
                return Ok(None);
            }
            Ok(Some(draw_int(kmin, kmax, entropy) * step))
        }
        Some(_) => Ok((lo <= 0 && 0 <= hi).then_some(0)),
        None => Ok(Some(draw_int(lo, hi, entropy))),
    }
}

fn draw_int(lo: i128, hi: i128, entropy: &mut EntropySource) -> i128 {
    if lo == hi {
        return lo;
    }
    entropy.uniform_int(lo, hi)
}

/// JSON value of a float draw.
pub fn float_value<T: FloatKind>(
    constraints: &Constraints,
    args: &GenArgs,
    mode: Mode,
    entropy: &mut EntropySource,
    retry_limit: u32,
) -> Result<Value, StubError> {
    float::<T>(constraints, args, mode, entropy, retry_limit).map(FloatKind::into_value)
}

/// JSON value of an integer draw.
pub fn integer_value<T: IntKind>(
    constraints: &Constraints,
    args: &GenArgs,
    mode: Mode,
    entropy: &mut EntropySource,
    retry_limit: u32,
) -> Result<Value, StubError> {
    integer::<T>(constraints, args, mode, entropy, retry_limit).map(IntKind::into_value)
}

/// Currency style amount: `[min, max]` defaults, two decimals.
pub fn amount(
    constraints: &Constraints,
    args: &GenArgs,
    mode: Mode,
    entropy: &mut EntropySource,
    retry_limit: u32,
    (default_min, default_max): (f64, f64),
) -> Result<Value, StubError> {
    let mut args = args.clone();
    if args.min.is_none_or(|v| v < 0.0) {
        args.min = Some(default_min);
    }
    args.max.get_or_insert(default_max);
    args.precision.get_or_insert(2);
    float_value::<f64>(constraints, &args, mode, entropy, retry_limit)
}
