//! Review rating type.

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum RatingError {
    /// The input could not be parsed as an integer.
    #[error("rating must be a whole number")]
    NotAnInteger,
    /// The value is outside the allowed range.
    #[error("rating must be between {min} and {max}", min = Rating::MIN, max = Rating::MAX)]
    OutOfRange,
}

/// A review rating: an integer from 1 to 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(i32);

impl Rating {
    /// Lowest allowed rating.
    pub const MIN: i32 = 1;
    /// Highest allowed rating.
    pub const MAX: i32 = 5;

    /// Create a rating from an integer value.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] if the value is not in `[1, 5]`.
    pub const fn new(value: i32) -> Result<Self, RatingError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(RatingError::OutOfRange);
        }
        Ok(Self(value))
    }

    /// Parse a rating from form input.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::NotAnInteger`] for unparseable input and
    /// [`RatingError::OutOfRange`] for values outside `[1, 5]`.
    pub fn parse(s: &str) -> Result<Self, RatingError> {
        let value: i32 = s.trim().parse().map_err(|_| RatingError::NotAnInteger)?;
        Self::new(value)
    }

    /// The underlying integer value.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Rating {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Rating {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let v = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are constrained to [1, 5] by a CHECK
        Ok(Self(v))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Rating {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        for value in 1..=5 {
            assert_eq!(Rating::new(value).unwrap().as_i32(), value);
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(Rating::new(0), Err(RatingError::OutOfRange)));
        assert!(matches!(Rating::new(6), Err(RatingError::OutOfRange)));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Rating::parse(" 4 ").unwrap().as_i32(), 4);
        assert!(matches!(
            Rating::parse("four"),
            Err(RatingError::NotAnInteger)
        ));
    }
}
