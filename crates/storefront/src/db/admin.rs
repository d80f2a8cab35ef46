//! Back-office aggregates and listings.

use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::admin::{
    CustomerSummary, DailySales, DashboardStats, RecentOrder, TopProduct, UserQuery,
};

/// Days covered by the dashboard sales chart.
const SALES_WINDOW_DAYS: i32 = 30;

pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Everything the dashboard shows, read in one transaction so the
    /// numbers agree with each other.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let (total_sales, order_count): (Decimal, i64) = sqlx::query_as(
            r"
            SELECT COALESCE(SUM(total) FILTER (WHERE status = 'completed'), 0),
                   COUNT(*)
            FROM storefront.customer_order
            ",
        )
        .fetch_one(&mut *tx)
        .await?;

        let customer_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM storefront.user WHERE role = 'customer'")
                .fetch_one(&mut *tx)
                .await?;

        let product_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM storefront.product")
            .fetch_one(&mut *tx)
            .await?;

        let recent_orders = sqlx::query_as::<_, RecentOrder>(
            r"
            SELECT o.id, u.email AS customer_email, o.status, o.total, o.created_at
            FROM storefront.customer_order o
            LEFT JOIN storefront.user u ON u.id = o.user_id
            ORDER BY o.created_at DESC
            LIMIT 5
            ",
        )
        .fetch_all(&mut *tx)
        .await?;

        let top_products = sqlx::query_as::<_, TopProduct>(
            r"
            SELECT oi.product_id, p.name AS product_name,
                   SUM(oi.quantity)::bigint AS units_sold,
                   SUM(oi.quantity * oi.unit_price) AS revenue
            FROM storefront.order_item oi
            JOIN storefront.customer_order o ON o.id = oi.order_id
            JOIN storefront.product p ON p.id = oi.product_id
            WHERE o.status NOT IN ('cancelled', 'refunded')
            GROUP BY oi.product_id, p.name
            ORDER BY units_sold DESC, revenue DESC
            LIMIT 5
            ",
        )
        .fetch_all(&mut *tx)
        .await?;

        let daily_sales = sqlx::query_as::<_, DailySales>(
            r"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day,
                   COUNT(*) AS order_count,
                   COALESCE(SUM(total), 0) AS revenue
            FROM storefront.customer_order
            WHERE created_at >= NOW() - make_interval(days => $1)
              AND status NOT IN ('cancelled', 'refunded')
            GROUP BY day
            ORDER BY day
            ",
        )
        .bind(SALES_WINDOW_DAYS)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardStats {
            total_sales,
            order_count,
            customer_count,
            product_count,
            recent_orders,
            top_products,
            daily_sales,
        })
    }

    /// Accounts with lifetime order stats, filtered by role and search text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_users(&self, query: &UserQuery) -> Result<Vec<CustomerSummary>, RepositoryError> {
        let users = sqlx::query_as::<_, CustomerSummary>(
            r"
            SELECT u.id, u.email, u.first_name, u.last_name, u.role,
                   COUNT(o.id) AS order_count,
                   COALESCE(SUM(o.total) FILTER (WHERE o.status = 'completed'), 0) AS total_spent,
                   u.created_at
            FROM storefront.user u
            LEFT JOIN storefront.customer_order o ON o.user_id = u.id
            WHERE ($1::storefront.user_role IS NULL OR u.role = $1)
              AND ($2::text IS NULL
                   OR u.email ILIKE $2
                   OR u.first_name ILIKE $2
                   OR u.last_name ILIKE $2)
            GROUP BY u.id
            ORDER BY u.created_at DESC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(query.role)
        .bind(query.pattern())
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }
}
