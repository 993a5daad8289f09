//! Fixed-point money.
//!
//! Amounts are held as integer cents so that tax and delivery arithmetic is
//! exact. JSON carries them as decimal numbers of major units (`345.0`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;

const CENTS_PER_UNIT: i64 = 100;
const BPS_SCALE: i64 = 10_000;

/// A monetary amount in cents.
///
/// There is no `From<i64>`: use [`Money::from_cents`] or
/// [`Money::from_major`] so the scale is always explicit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount, rounding to the nearest cent.
    /// Returns `None` for NaN, infinities and values outside the `i64` range.
    pub fn from_major(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * CENTS_PER_UNIT as f64).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn as_major(self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Unit price times quantity, `None` on overflow.
    pub fn checked_mul_qty(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    pub fn checked_add(self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Applies a rate in basis points, rounding half away from zero to the cent.
    pub fn checked_apply_bps(self, bps: u32) -> Option<Self> {
        let scaled = self.0.checked_mul(i64::from(bps))?;
        let half = BPS_SCALE / 2;
        let rounded = if scaled >= 0 {
            scaled.checked_add(half)? / BPS_SCALE
        } else {
            scaled.checked_sub(half)? / BPS_SCALE
        };
        Some(Money(rounded))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_major(amount)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {}", amount)))
    }
}
