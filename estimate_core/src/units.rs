//! # Unit Types
//!
//! Lightweight newtype wrappers for the quantities an estimate moves around.
//! They keep hours, squares and dollars from being mixed up in stage results
//! while serializing as bare JSON numbers.
//!
//! - Area proxy: squares (derived from outline corner counts)
//! - Labor: hours
//! - Money: dollars, dollars per hour
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::units::{DollarsPerHour, Hours};
//!
//! let hours = Hours(10.0);
//! let fee = hours * DollarsPerHour(150.0);
//! assert_eq!(fee.0, 1500.0);
//! ```

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, Mul};

// ============================================================================
// Geometry Units
// ============================================================================

/// Unit-area proxy derived from an outline's corner count
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Squares(pub f64);

// ============================================================================
// Labor and Money Units
// ============================================================================

/// Labor in hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hours(pub f64);

/// Money in US dollars
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dollars(pub f64);

/// Billing rate in dollars per hour
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DollarsPerHour(pub f64);

impl Mul<DollarsPerHour> for Hours {
    type Output = Dollars;
    fn mul(self, rate: DollarsPerHour) -> Dollars {
        Dollars(self.0 * rate.0)
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_additive {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self(0.0), |acc, x| acc + x)
            }
        }
    };
}

impl_additive!(Squares);
impl_additive!(Hours);

/// Scaling by the liability multiplier
impl Mul<f64> for Hours {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}
