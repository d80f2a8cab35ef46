//! Product review ratings.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::pricing::round_cents;

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingError {
    #[error("rating must be between 1 and 5, got {0}")]
    OutOfRange(i64),
}

/// A star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] unless `1 <= value <= 5`.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError::OutOfRange(value))
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i16> for Rating {
    type Error = RatingError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Rating> for i16 {
    fn from(rating: Rating) -> Self {
        Self::from(rating.0)
    }
}

/// Aggregate of a product's published ratings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Mean rating rounded to two decimals, zero when there are no reviews.
    pub average: Decimal,
    pub count: u64,
    /// Number of reviews per star value; always has keys 1 through 5.
    pub distribution: BTreeMap<u8, u64>,
}

impl RatingSummary {
    /// Summary of a product nobody has reviewed yet.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            average: Decimal::ZERO,
            count: 0,
            distribution: (Rating::MIN..=Rating::MAX).map(|r| (r, 0)).collect(),
        }
    }

    /// Build a summary from `(star value, number of reviews)` pairs.
    ///
    /// Pairs with a star value outside 1..=5 are ignored.
    #[must_use]
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (i64, u64)>,
    {
        let mut summary = Self::empty();
        let mut weighted_sum: u64 = 0;

        for (stars, n) in counts {
            let Ok(rating) = Rating::new(stars) else {
                continue;
            };
            *summary.distribution.entry(rating.value()).or_insert(0) += n;
            summary.count += n;
            weighted_sum += u64::from(rating.value()) * n;
        }

        if summary.count > 0 {
            summary.average =
                round_cents(Decimal::from(weighted_sum) / Decimal::from(summary.count));
        }
        summary
    }
}

impl Default for RatingSummary {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert_eq!(Rating::new(0), Err(RatingError::OutOfRange(0)));
        assert_eq!(Rating::new(6), Err(RatingError::OutOfRange(6)));
        assert_eq!(Rating::new(-3), Err(RatingError::OutOfRange(-3)));
    }

    #[test]
    fn test_rating_deserialize_validates() {
        let rating: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(rating.value(), 4);
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_empty_summary_has_all_buckets() {
        let summary = RatingSummary::empty();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, Decimal::ZERO);
        assert_eq!(summary.distribution.len(), 5);
        assert!(summary.distribution.values().all(|n| *n == 0));
    }

    #[test]
    fn test_summary_from_counts() {
        let summary = RatingSummary::from_counts([(5, 2), (4, 1), (2, 1)]);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.average, Decimal::from_str("4.00").unwrap());
        assert_eq!(summary.distribution.get(&5), Some(&2));
        assert_eq!(summary.distribution.get(&3), Some(&0));
    }

    #[test]
    fn test_summary_average_rounds() {
        let summary = RatingSummary::from_counts([(5, 1), (4, 1), (4, 1)]);
        // 13 / 3 = 4.333..
        assert_eq!(summary.average, Decimal::from_str("4.33").unwrap());
    }

    #[test]
    fn test_summary_ignores_out_of_range_buckets() {
        let summary = RatingSummary::from_counts([(0, 3), (5, 1)]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.distribution.len(), 5);
    }

    #[test]
    fn test_distribution_serializes_string_keys() {
        let json = serde_json::to_value(RatingSummary::from_counts([(3, 2)])).unwrap();
        assert_eq!(json["distribution"]["3"], 2);
        assert_eq!(json["distribution"]["1"], 0);
    }
}
