//! Decimal money amounts.
//!
//! Prices are stored as `NUMERIC(10,2)` and never pass through floating point.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-currency-tagged money amount (the shop trades in a single currency).
///
/// ```
/// use aoeyaeng_core::Price;
/// use rust_decimal::Decimal;
///
/// let shirt = Price::new(Decimal::new(39950, 2)); // 399.50
/// assert_eq!(shirt.line_total(3).to_string(), "1198.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Unit price multiplied by a quantity.
    #[must_use]
    pub fn line_total(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Price {
    /// Always two decimal places, e.g. `12.50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_to_two_places() {
        assert_eq!(Price::new(Decimal::new(5, 0)).to_string(), "5.00");
        assert_eq!(Price::new(Decimal::new(125, 1)).to_string(), "12.50");
        assert_eq!(Price::ZERO.to_string(), "0.00");
    }

    #[test]
    fn line_total_multiplies_exactly() {
        // 0.10 * 3 must be exactly 0.30, which f64 cannot represent
        let dime = Price::new(Decimal::new(10, 2));
        assert_eq!(dime.line_total(3), Price::new(Decimal::new(30, 2)));
        assert_eq!(dime.line_total(0), Price::ZERO);
    }

    #[test]
    fn sums_line_totals() {
        let total: Price = [Decimal::new(19900, 2), Decimal::new(4950, 2)]
            .into_iter()
            .map(Price::new)
            .sum();
        assert_eq!(total.to_string(), "248.50");
    }

    #[test]
    fn negative_detection() {
        assert!(Price::new(Decimal::new(-1, 2)).is_negative());
        assert!(!Price::ZERO.is_negative());
    }
}
