//! Product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use abamade_core::{ProductId, Rating, ReviewId, UserId};

use super::catalog::MAX_PAGE_SIZE;

/// A published review with the reviewer's display name.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub reviewer_name: String,
    pub rating: Rating,
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSort {
    #[default]
    Newest,
    Highest,
    Lowest,
}

impl ReviewSort {
    /// `ORDER BY` clause for the `review` table aliased as `r`.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "r.created_at DESC",
            Self::Highest => "r.rating DESC, r.created_at DESC",
            Self::Lowest => "r.rating ASC, r.created_at DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReviewQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default, alias = "sort_by", alias = "sortBy")]
    pub sort: ReviewSort,
}

impl ReviewQuery {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// A review submitted by a signed-in customer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub rating: Rating,
    pub title: Option<String>,
    pub content: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_review_rejects_bad_rating() {
        assert!(serde_json::from_str::<NewReview>(r#"{"rating": 0}"#).is_err());
        let review: NewReview =
            serde_json::from_str(r#"{"rating": 5, "title": "Comfy"}"#).unwrap();
        assert_eq!(review.rating.value(), 5);
    }

    #[test]
    fn test_query_defaults() {
        let query = ReviewQuery::default();
        assert_eq!(query.limit(), 10);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.sort, ReviewSort::Newest);
    }
}
