use crate::error::TypesError;
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

const MAX_FRACTIONAL_DIGITS: u32 = 18;

macro_rules! decimal_amount {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize,
        )]
        pub struct $name(Decimal);

        impl $name {
            pub const ZERO: Self = Self(Decimal::ZERO);

            /// Build from an already-validated [`Decimal`], e.g. the output of pool math.
            pub fn from_decimal(value: Decimal) -> Self {
                Self(value)
            }

            pub fn as_decimal(&self) -> Decimal {
                self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.is_zero()
            }

            /// Parse a positive fixed-point amount with at most 18 fractional digits,
            /// per the Trade Executor's intent validation (spec §4.C step 1).
            pub fn parse_positive(s: &str) -> Result<Self, TypesError> {
                let value = Decimal::from_str(s).map_err(|_| TypesError::BadAmount(s.to_string()))?;
                if value <= Decimal::ZERO || value.scale() > MAX_FRACTIONAL_DIGITS {
                    return Err(TypesError::BadAmount(s.to_string()));
                }
                Ok(Self(value))
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::ZERO, Add::add)
            }
        }

        impl From<Decimal> for $name {
            fn from(value: Decimal) -> Self {
                Self(value)
            }
        }
    };
}

decimal_amount!(EthAmount, "An amount of ETH, always non-negative in practice.");
decimal_amount!(TokenAmount, "An amount of a launchpad token, always non-negative in practice.");
