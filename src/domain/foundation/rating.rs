//! Customer-satisfaction rating value object (1 to 5 stars).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// CSAT star rating collected at the end of a support session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CsatRating(u8);

impl CsatRating {
    /// Lowest accepted star count.
    pub const MIN: u8 = 1;
    /// Highest accepted star count.
    pub const MAX: u8 = 5;

    /// Creates a rating, returning error if outside 1..=5.
    pub fn new(stars: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(ValidationError::out_of_range(
                "rating",
                Self::MIN as i32,
                Self::MAX as i32,
                stars as i32,
            ))
        }
    }

    /// Returns the star count.
    pub fn stars(&self) -> u8 {
        self.0
    }

    /// A single star is treated as a request to escalate.
    pub fn is_lowest(&self) -> bool {
        self.0 == Self::MIN
    }
}

impl TryFrom<u8> for CsatRating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CsatRating> for u8 {
    fn from(rating: CsatRating) -> Self {
        rating.0
    }
}

impl fmt::Display for CsatRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
