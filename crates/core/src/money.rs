//! Currency amounts and percentages.
//!
//! Amounts are decimal (never binary floating point) so that tax and discount
//! arithmetic is exact until the explicit whole-unit rounding step. On the wire
//! they are plain JSON numbers, matching what the backend stores.
//!
//! Entered amounts are bounded by [`Money::MAX_UNITS`] and percentages by
//! [`Percent::MAX`]; within those bounds draft totals cannot overflow `Decimal`.

use core::iter::Sum;
use core::ops::{Add, AddAssign, Neg, Sub};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A signed currency amount in major units (e.g. rupees, with fractional paise).
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Largest magnitude, in whole units, an entered amount may have.
    pub const MAX_UNITS: i64 = 1_000_000_000_000;

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole-unit amount.
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Reject amounts whose magnitude exceeds [`Money::MAX_UNITS`].
    pub fn ensure_within_limit(self) -> DomainResult<Money> {
        if self.0.abs() > Decimal::from(Self::MAX_UNITS) {
            return Err(DomainError::validation("amount is too large"));
        }
        Ok(self)
    }

    /// `self * percent / 100`, unrounded.
    pub fn mul_percent(self, percent: Percent) -> Money {
        Money(self.0 * percent.value() / Decimal::ONE_HUNDRED)
    }

    /// Largest multiple of `step` that is `<= self`.
    pub fn floor_to(self, step: u32) -> Money {
        let step = Decimal::from(step);
        Money((self.0 / step).floor() * step)
    }

    /// Smallest multiple of `step` that is `>= self`.
    pub fn ceil_to(self, step: u32) -> Money {
        let step = Decimal::from(step);
        Money((self.0 / step).ceil() * step)
    }

    /// Round to a whole unit, halves going up (`floor(x + 0.5)`).
    pub fn round_whole(self) -> Money {
        Money((self.0 + Decimal::new(5, 1)).floor())
    }
}

impl ValueObject for Money {}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0.normalize(), f)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Money)
            .map_err(|e| DomainError::validation(format!("'{s}' is not a valid amount: {e}")))?
            .ensure_within_limit()
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self::from_major(value)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// A non-negative percentage (`5` means 5%).
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percent(Decimal);

impl Percent {
    pub const ZERO: Percent = Percent(Decimal::ZERO);

    /// Upper bound accepted by [`Percent::new`].
    pub const MAX: u32 = 1000;

    pub fn new(value: Decimal) -> DomainResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::validation("percentage cannot be negative"));
        }
        if value > Decimal::from(Self::MAX) {
            return Err(DomainError::validation("percentage is too large"));
        }
        Ok(Self(value))
    }

    pub fn from_integer(value: u32) -> Self {
        Self(Decimal::from(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl ValueObject for Percent {}

impl TryFrom<Decimal> for Percent {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Percent::new(value)
    }
}

impl From<Percent> for Decimal {
    fn from(value: Percent) -> Self {
        value.0
    }
}

impl core::fmt::Display for Percent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}
