//! Back-office views and query parameters.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use abamade_core::{OrderId, OrderStatus, ProductId, UserRole};

use super::catalog::MAX_PAGE_SIZE;

const DEFAULT_ADMIN_PAGE: i64 = 20;

/// Numbers shown on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// Sum of totals over completed orders.
    pub total_sales: Decimal,
    pub order_count: i64,
    pub customer_count: i64,
    pub product_count: i64,
    pub recent_orders: Vec<RecentOrder>,
    pub top_products: Vec<TopProduct>,
    pub daily_sales: Vec<DailySales>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RecentOrder {
    pub id: OrderId,
    pub customer_email: Option<String>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub units_sold: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailySales {
    pub day: NaiveDate,
    pub order_count: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSort {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
}

impl OrderSort {
    /// `ORDER BY` clause for `customer_order` aliased as `o`.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "o.created_at DESC",
            Self::Oldest => "o.created_at ASC",
            Self::Highest => "o.total DESC, o.created_at DESC",
            Self::Lowest => "o.total ASC, o.created_at DESC",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminOrderQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub sort: OrderSort,
}

impl AdminOrderQuery {
    #[must_use]
    pub fn limit(&self) -> i64 {
        page_limit(self.limit)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<UserRole>,
    #[serde(alias = "search")]
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl UserQuery {
    /// `ILIKE` pattern for the search term, if any.
    #[must_use]
    pub fn pattern(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q.replace('%', "\\%").replace('_', "\\_")))
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        page_limit(self.limit)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Row for the customer list, with lifetime order stats.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerSummary {
    pub id: abamade_core::UserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub order_count: i64,
    pub total_spent: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Body of `PATCH /admin/orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    /// Payment reference recorded when the order is settled.
    pub payment_intent_id: Option<String>,
}

/// Body of `PATCH /admin/users/{id}/role`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdate {
    pub role: UserRole,
}

fn page_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_ADMIN_PAGE).clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_query_pattern_escapes_wildcards() {
        let query = UserQuery {
            q: Some(" 50%_off ".to_string()),
            ..UserQuery::default()
        };
        assert_eq!(query.pattern().as_deref(), Some("%50\\%\\_off%"));

        let blank = UserQuery {
            q: Some("   ".to_string()),
            ..UserQuery::default()
        };
        assert!(blank.pattern().is_none());
    }

    #[test]
    fn test_order_query_parses_status() {
        let query: AdminOrderQuery =
            serde_json::from_str(r#"{"status": "shipped", "sort": "highest"}"#).unwrap();
        assert_eq!(query.status, Some(OrderStatus::Shipped));
        assert_eq!(query.sort, OrderSort::Highest);
        assert_eq!(query.limit(), 20);
    }
}
