//! Deterministic 16.16 Fixed-Point Mathematics
//!
//! Integer-only arithmetic for targets without a floating-point unit. Every
//! operation is bit-exact on any platform.
//!
//! # Types
//!
//! - `Fix32` (Q16.16): signed 32-bit fixed-point, 16 integer bits, 16 fractional bits
//! - `Vec2Fix`: 2D vector using `Fix32` components
//!
//! # Overflow
//!
//! Products are widened to 64 bits before shifting back down, and vector
//! lengths are computed from a 64-bit sum of squares. Addition, subtraction
//! and negation wrap like the 32-bit registers they model; they never panic.
//!
//! - Range: -32768.0 to +32767.99998
//! - Precision: 1/65536 ≈ 0.000015

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};

// ============================================================================
// Fix32 (Q16.16) - 32-bit Fixed-Point Number
// ============================================================================

/// Number of fractional bits.
pub const FRAC_BITS: u32 = 16;

/// 32-bit fixed-point number (16 integer bits, 16 fractional bits).
///
/// Internal representation: `value = raw / 2^16`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Fix32(pub i32);

impl Fix32 {
    /// Zero constant
    pub const ZERO: Self = Self(0);

    /// One constant (1.0)
    pub const ONE: Self = Self(1 << FRAC_BITS);

    /// One half (0.5)
    pub const HALF: Self = Self(1 << (FRAC_BITS - 1));

    /// Negative one (-1.0)
    pub const NEG_ONE: Self = Self(-(1 << FRAC_BITS));

    /// Largest representable value, also the saturation value of
    /// [`Vec2Fix::len_sqr`].
    pub const MAX: Self = Self(i32::MAX);

    /// Smallest representable value
    pub const MIN: Self = Self(i32::MIN);

    /// Smallest positive value (one unit of least precision)
    pub const EPSILON: Self = Self(1);

    /// Create from integer. Values outside ±32767 wrap.
    #[inline]
    #[must_use]
    pub const fn from_int(n: i32) -> Self {
        Self(n << FRAC_BITS)
    }

    /// Create from the raw 16.16 bit pattern
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw 16.16 bit pattern
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Integer part, rounded toward negative infinity
    #[inline]
    #[must_use]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRAC_BITS
    }

    /// Create from fraction (numerator / denominator). A zero denominator
    /// yields zero.
    #[must_use]
    pub const fn from_ratio(num: i32, denom: i32) -> Self {
        if denom == 0 {
            return Self::ZERO;
        }
        Self((((num as i64) << FRAC_BITS) / denom as i64) as i32)
    }

    /// Create from f32 (scene setup only; never call from the step path)
    #[must_use]
    pub fn from_f32(f: f32) -> Self {
        Self((f * (1u32 << FRAC_BITS) as f32) as i32)
    }

    /// Convert to f32 (for debugging and display only)
    #[must_use]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1u32 << FRAC_BITS) as f32
    }

    /// Absolute value. `MIN.abs()` wraps to `MIN`.
    #[inline]
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.wrapping_abs())
    }

    /// Check if zero
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Check if negative
    #[inline]
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Check if strictly positive
    #[inline]
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Square root of a 16.16 value.
    ///
    /// Runs the digit-by-digit integer square root over the raw bit pattern.
    /// `sqrt(raw)` is scaled by 2^8, so the root is shifted left by 8 to land
    /// back in 16.16. The result therefore resolves to 2^-8.
    ///
    /// Zero and negative inputs return zero.
    #[must_use]
    pub const fn sqrt(self) -> Self {
        if self.0 <= 0 {
            return Self::ZERO;
        }
        Self((isqrt_u64(self.0 as u64) << 8) as i32)
    }

    /// Square root of a 64-bit value carrying 2^32 scale (a sum of squared
    /// raw 16.16 values), returned directly in 16.16.
    ///
    /// Zero and negative inputs return zero; roots beyond the 16.16 range
    /// saturate at [`Fix32::MAX`].
    #[must_use]
    pub const fn sqrt_wide(value: i64) -> Self {
        if value <= 0 {
            return Self::ZERO;
        }
        let root = isqrt_u64(value as u64);
        if root > i32::MAX as u64 {
            Self::MAX
        } else {
            Self(root as i32)
        }
    }

    /// `self * self`, computed in 64 bits and saturated at [`Fix32::MAX`].
    ///
    /// Plain multiplication wraps once the magnitude reaches about 181.
    #[inline]
    #[must_use]
    pub const fn saturating_square(self) -> Self {
        let wide = (self.0 as i64 * self.0 as i64) >> FRAC_BITS;
        if wide > i32::MAX as i64 {
            Self::MAX
        } else {
            Self(wide as i32)
        }
    }
}

/// Digit-by-digit integer square root: `floor(sqrt(value))`.
const fn isqrt_u64(value: u64) -> u64 {
    let mut rem = value;
    let mut root = 0u64;
    let mut place = 1u64 << 62;

    while place > rem {
        place >>= 2;
    }

    while place != 0 {
        if rem >= root + place {
            rem -= root + place;
            root += place << 1;
        }
        root >>= 1;
        place >>= 2;
    }

    root
}

impl Add for Fix32 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Fix32 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Fix32 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Fix32 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for Fix32 {
    type Output = Self;

    /// Widen both operands to 64 bits, multiply, arithmetic shift right by 16.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(((self.0 as i64 * rhs.0 as i64) >> FRAC_BITS) as i32)
    }
}

impl Div for Fix32 {
    type Output = Self;

    /// Widen the numerator and shift left by 16 before dividing by the raw
    /// denominator. Division by zero yields zero.
    #[inline]
    fn div(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            return Self::ZERO;
        }
        Self((((self.0 as i64) << FRAC_BITS) / rhs.0 as i64) as i32)
    }
}

impl Neg for Fix32 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }
}

// ============================================================================
// Vec2Fix - 2D Vector
// ============================================================================

/// Component magnitude above which [`Vec2Fix::len_sqr`] saturates
/// (raw 16.16 units, about 76.3).
pub const LEN_SQR_LIMIT: i32 = 5_000_000;

/// 2D vector using [`Fix32`] components. Plain value type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vec2Fix {
    /// X component
    pub x: Fix32,
    /// Y component
    pub y: Fix32,
}

impl Vec2Fix {
    /// Zero vector (0, 0)
    pub const ZERO: Self = Self {
        x: Fix32::ZERO,
        y: Fix32::ZERO,
    };

    /// Unit X vector (1, 0)
    pub const UNIT_X: Self = Self {
        x: Fix32::ONE,
        y: Fix32::ZERO,
    };

    /// Unit Y vector (0, 1)
    pub const UNIT_Y: Self = Self {
        x: Fix32::ZERO,
        y: Fix32::ONE,
    };

    /// Create a new 2D vector.
    #[inline]
    #[must_use]
    pub const fn new(x: Fix32, y: Fix32) -> Self {
        Self { x, y }
    }

    /// Create from integer components.
    #[inline]
    #[must_use]
    pub const fn from_int(x: i32, y: i32) -> Self {
        Self {
            x: Fix32::from_int(x),
            y: Fix32::from_int(y),
        }
    }

    /// Scale by a scalar.
    #[inline]
    #[must_use]
    pub fn scale(self, s: Fix32) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
        }
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(self, rhs: Self) -> Fix32 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Squared length in 16.16.
    ///
    /// If either component magnitude exceeds [`LEN_SQR_LIMIT`] the square
    /// would not fit, and the result saturates at [`Fix32::MAX`].
    #[inline]
    #[must_use]
    pub fn len_sqr(self) -> Fix32 {
        let (x, y) = (self.x.0, self.y.0);
        if x > LEN_SQR_LIMIT || x < -LEN_SQR_LIMIT || y > LEN_SQR_LIMIT || y < -LEN_SQR_LIMIT {
            return Fix32::MAX;
        }
        self.dot(self)
    }

    /// Length, from the 64-bit sum of squares.
    ///
    /// Unlike `len_sqr().sqrt()`, this stays meaningful for vectors well past
    /// the `len_sqr` saturation threshold.
    #[must_use]
    pub fn len(self) -> Fix32 {
        let x = self.x.0 as i64;
        let y = self.y.0 as i64;
        Fix32::sqrt_wide((x * x).saturating_add(y * y))
    }

    /// Distance to another point.
    #[inline]
    #[must_use]
    pub fn distance_to(self, other: Self) -> Fix32 {
        (other - self).len()
    }
}

impl Add for Vec2Fix {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vec2Fix {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2Fix {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl SubAssign for Vec2Fix {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<Fix32> for Vec2Fix {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Fix32) -> Self {
        self.scale(rhs)
    }
}

impl Neg for Vec2Fix {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
