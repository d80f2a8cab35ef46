//! Review repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use abamade_core::{ProductId, Rating, RatingSummary, ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;
use crate::models::review::{NewReview, ReviewQuery};

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    user_id: UserId,
    reviewer_name: String,
    rating: i16,
    title: Option<String>,
    content: Option<String>,
    is_verified_purchase: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = Rating::new(i64::from(row.rating)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid rating in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            reviewer_name: row.reviewer_name,
            rating,
            title: row.title,
            content: row.content,
            is_verified_purchase: row.is_verified_purchase,
            created_at: row.created_at,
        })
    }
}

const REVIEW_SELECT: &str = r"
    SELECT r.id, r.product_id, r.user_id,
           COALESCE(NULLIF(TRIM(CONCAT_WS(' ', u.first_name, u.last_name)), ''),
                    split_part(u.email, '@', 1)) AS reviewer_name,
           r.rating, r.title, r.content, r.is_verified_purchase, r.created_at
    FROM storefront.review r
    JOIN storefront.user u ON u.id = r.user_id
";

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Published reviews of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
        query: ReviewQuery,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "{REVIEW_SELECT} WHERE r.product_id = $1 AND r.is_published \
             ORDER BY {} LIMIT $2 OFFSET $3",
            query.sort.order_by()
        ))
        .bind(product_id)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    /// Average, count and star distribution of published reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn rating_summary(
        &self,
        product_id: ProductId,
    ) -> Result<RatingSummary, RepositoryError> {
        let counts: Vec<(i16, i64)> = sqlx::query_as(
            r"
            SELECT rating, COUNT(*)
            FROM storefront.review
            WHERE product_id = $1 AND is_published
            GROUP BY rating
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(RatingSummary::from_counts(counts.into_iter().map(
            |(stars, n)| (i64::from(stars), u64::try_from(n).unwrap_or(0)),
        )))
    }

    /// Create a review. The verified-purchase flag is derived from the
    /// user's non-cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the product.
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn create(
        &self,
        user_id: UserId,
        product_id: ProductId,
        review: &NewReview,
    ) -> Result<Review, RepositoryError> {
        let id: ReviewId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.review
                (product_id, user_id, rating, title, content, is_verified_purchase)
            VALUES ($1, $2, $3, $4, $5, EXISTS (
                SELECT 1
                FROM storefront.order_item oi
                JOIN storefront.customer_order o ON o.id = oi.order_id
                WHERE o.user_id = $2
                  AND oi.product_id = $1
                  AND o.status NOT IN ('cancelled', 'refunded')
            ))
            RETURNING id
            ",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(i16::from(review.rating.value()))
        .bind(review.title.as_deref().map(str::trim).filter(|t| !t.is_empty()))
        .bind(review.content.as_deref().map(str::trim).filter(|c| !c.is_empty()))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::unique_or(e, "you have already reviewed this product")
        })?;

        let row = sqlx::query_as::<_, ReviewRow>(&format!("{REVIEW_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Review::try_from(row)
    }
}
