//! Fixed-point money type
//!
//! # Motivation
//!
//! All money amounts in this system use a 1e-2 (cents) fixed-point
//! representation stored as `i64`.  Using raw `i64` for money is error-prone:
//! it allows accidental arithmetic with unrelated integers (quantities, IDs)
//! without any compile-time signal, and floats are ruled out entirely for
//! billing math.
//!
//! `Cents` wraps the raw `i64` so the type system prevents:
//! - Implicit construction from raw `i64` (no `From<i64>` impl).
//! - Mixing `Cents` with unrelated `i64` values in arithmetic.
//!
//! # Scale
//!
//! 1 USD = 100 Cents.  All monetary values (prices, fees, tax, tips, totals)
//! use this scale.  Non-monetary quantities (item counts, basis points)
//! remain plain integers and are never implicitly convertible.
//!
//! # Wire form
//!
//! Serde is transparent: a `Cents` value crosses JSON and database
//! boundaries as a bare integer at cent scale (`2500` = $25.00).

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

// ---------------------------------------------------------------------------
// Cents newtype
// ---------------------------------------------------------------------------

/// A fixed-point monetary amount at 1e-2 scale (cents).
///
/// 1 USD = `Cents(100)`.
///
/// # Construction
///
/// Use [`Cents::new`] for explicit construction.  There is intentionally
/// no `From<i64>` implementation — callers must be deliberate about when a
/// raw integer represents a monetary amount.
///
/// # Retrieval
///
/// Use [`Cents::raw`] to extract the underlying `i64` when crossing
/// crate or layer boundaries that require raw integers.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    /// Zero monetary amount.
    pub const ZERO: Cents = Cents(0);

    /// Maximum representable value.
    pub const MAX: Cents = Cents(i64::MAX);

    /// Construct a `Cents` from a raw `i64`.
    ///
    /// Use only when the raw integer is known to represent a monetary
    /// amount at cent scale.
    #[inline]
    pub const fn new(raw: i64) -> Self {
        Cents(raw)
    }

    /// Extract the underlying raw `i64`.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Checked addition.  Returns `None` on overflow.
    #[inline]
    pub fn checked_add(self, rhs: Cents) -> Option<Cents> {
        self.0.checked_add(rhs.0).map(Cents)
    }

    /// Saturating addition — clamps at [`Cents::MAX`] on overflow.
    #[inline]
    pub fn saturating_add(self, rhs: Cents) -> Cents {
        Cents(self.0.saturating_add(rhs.0))
    }

    /// `true` if this amount is non-negative.
    #[inline]
    pub fn is_non_negative(self) -> bool {
        self.0 >= 0
    }

    /// `true` if this amount is strictly negative.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Multiply a per-unit price by an integer item quantity.
    ///
    /// Returns `None` if the multiplication overflows `i64`.  Callers MUST
    /// handle `None` explicitly; overflow in a billing calculation is a
    /// hard error, not a routine saturation.
    ///
    /// `qty` is a plain item count (not a Cents value).
    #[inline]
    pub fn checked_mul_qty(self, qty: i64) -> Option<Cents> {
        self.0.checked_mul(qty).map(Cents)
    }
}

// ---------------------------------------------------------------------------
// Arithmetic operators (closed over Cents)
// ---------------------------------------------------------------------------

impl Add for Cents {
    type Output = Cents;
    #[inline]
    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl Sub for Cents {
    type Output = Cents;
    #[inline]
    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0 - rhs.0)
    }
}

impl AddAssign for Cents {
    #[inline]
    fn add_assign(&mut self, rhs: Cents) {
        self.0 += rhs.0;
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dollars = self.0 / 100;
        let frac = (self.0 % 100).abs();
        // When |value| < $1 and value is negative, dollars truncates to 0,
        // losing the sign.  Emit "-0" explicitly in that case.
        if self.0 < 0 && dollars == 0 {
            write!(f, "-{dollars}.{frac:02}")
        } else {
            write!(f, "{dollars}.{frac:02}")
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
