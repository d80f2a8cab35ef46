//! Cart repository.
//!
//! Every statement is scoped to a [`CartOwner`]: either a signed-in user or
//! an anonymous cart session. The partial unique indexes on `cart_item`
//! guarantee at most one line per (owner, product, variant); adds are upserts
//! against those indexes so concurrent adds sum instead of duplicating.

use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use abamade_core::{
    CartItemId, CartOwner, CartSessionId, ProductId, UserId, VariantId, effective_unit_price,
};

use super::RepositoryError;
use crate::models::CartLine;

/// Largest quantity a single line may hold. Upserts clamp to it.
pub const MAX_LINE_QUANTITY: i32 = 99;

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: CartItemId,
    product_id: ProductId,
    product_name: String,
    product_slug: String,
    image_url: Option<String>,
    variant_id: Option<VariantId>,
    variant_name: Option<String>,
    price: Decimal,
    sale_price: Option<Decimal>,
    variant_price: Option<Decimal>,
    variant_sale_price: Option<Decimal>,
    quantity: i32,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        let unit_price = effective_unit_price(
            row.price,
            row.sale_price,
            row.variant_price,
            row.variant_sale_price,
        );
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            product_slug: row.product_slug,
            image_url: row.image_url,
            variant_id: row.variant_id,
            variant_name: row.variant_name,
            unit_price,
            quantity: row.quantity,
            line_total: unit_price * Decimal::from(row.quantity),
        }
    }
}

/// Split an owner into the two nullable owner columns.
const fn owner_columns(owner: CartOwner) -> (Option<UserId>, Option<CartSessionId>) {
    (owner.user_id(), owner.session_id())
}

/// Load the lines of a cart. Usable inside a transaction.
pub(crate) async fn load_lines<'e, E>(
    executor: E,
    owner: CartOwner,
) -> Result<Vec<CartLine>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let (user_id, session_id) = owner_columns(owner);
    let rows = sqlx::query_as::<_, CartLineRow>(
        r"
        SELECT c.id, c.product_id, p.name AS product_name, p.slug AS product_slug,
               (SELECT i.url FROM storefront.product_image i
                WHERE i.product_id = p.id
                ORDER BY i.is_primary DESC, i.sort_order
                LIMIT 1) AS image_url,
               c.variant_id, v.name AS variant_name,
               p.price, p.sale_price,
               v.price AS variant_price, v.sale_price AS variant_sale_price,
               c.quantity
        FROM storefront.cart_item c
        JOIN storefront.product p ON p.id = c.product_id
        LEFT JOIN storefront.product_variant v ON v.id = c.variant_id
        WHERE ($1::uuid IS NOT NULL AND c.user_id = $1)
           OR ($2::uuid IS NOT NULL AND c.session_id = $2)
        ORDER BY c.created_at, c.id
        ",
    )
    .bind(user_id)
    .bind(session_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(CartLine::from).collect())
}

/// Remove every line of a cart. Usable inside a transaction.
pub(crate) async fn clear_lines<'e, E>(executor: E, owner: CartOwner) -> Result<u64, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let (user_id, session_id) = owner_columns(owner);
    let result = sqlx::query(
        r"
        DELETE FROM storefront.cart_item
        WHERE ($1::uuid IS NOT NULL AND user_id = $1)
           OR ($2::uuid IS NOT NULL AND session_id = $2)
        ",
    )
    .bind(user_id)
    .bind(session_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lines of a cart with product and variant details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, owner: CartOwner) -> Result<Vec<CartLine>, RepositoryError> {
        load_lines(self.pool, owner).await
    }

    /// Total quantity across all lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, owner: CartOwner) -> Result<i64, RepositoryError> {
        let (user_id, session_id) = owner_columns(owner);
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(quantity), 0)::bigint
            FROM storefront.cart_item
            WHERE ($1::uuid IS NOT NULL AND user_id = $1)
               OR ($2::uuid IS NOT NULL AND session_id = $2)
            ",
        )
        .bind(user_id)
        .bind(session_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Add a quantity of a product (and optional variant) to the cart.
    ///
    /// An existing line for the same product and variant is incremented in
    /// the same statement, up to [`MAX_LINE_QUANTITY`]. Returns the line ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn add(
        &self,
        owner: CartOwner,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i32,
    ) -> Result<CartItemId, RepositoryError> {
        let id: CartItemId = match owner {
            CartOwner::User(user_id) => {
                sqlx::query_scalar(
                    r"
                    INSERT INTO storefront.cart_item (user_id, product_id, variant_id, quantity)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (user_id, product_id, variant_key) WHERE user_id IS NOT NULL
                    DO UPDATE SET quantity = LEAST(cart_item.quantity + EXCLUDED.quantity, $5),
                                  updated_at = NOW()
                    RETURNING id
                    ",
                )
                .bind(user_id)
                .bind(product_id)
                .bind(variant_id)
                .bind(quantity)
                .bind(MAX_LINE_QUANTITY)
                .fetch_one(self.pool)
                .await?
            }
            CartOwner::Session(session_id) => {
                sqlx::query_scalar(
                    r"
                    INSERT INTO storefront.cart_item (session_id, product_id, variant_id, quantity)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (session_id, product_id, variant_key) WHERE session_id IS NOT NULL
                    DO UPDATE SET quantity = LEAST(cart_item.quantity + EXCLUDED.quantity, $5),
                                  updated_at = NOW()
                    RETURNING id
                    ",
                )
                .bind(session_id)
                .bind(product_id)
                .bind(variant_id)
                .bind(quantity)
                .bind(MAX_LINE_QUANTITY)
                .fetch_one(self.pool)
                .await?
            }
        };
        Ok(id)
    }

    /// Set the quantity of one of the owner's lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not belong to the owner.
    pub async fn set_quantity(
        &self,
        owner: CartOwner,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let (user_id, session_id) = owner_columns(owner);
        let result = sqlx::query(
            r"
            UPDATE storefront.cart_item
            SET quantity = $3, updated_at = NOW()
            WHERE id = $4
              AND (($1::uuid IS NOT NULL AND user_id = $1)
                OR ($2::uuid IS NOT NULL AND session_id = $2))
            ",
        )
        .bind(user_id)
        .bind(session_id)
        .bind(quantity)
        .bind(item_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove one of the owner's lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not belong to the owner.
    pub async fn remove(&self, owner: CartOwner, item_id: CartItemId) -> Result<(), RepositoryError> {
        let (user_id, session_id) = owner_columns(owner);
        let result = sqlx::query(
            r"
            DELETE FROM storefront.cart_item
            WHERE id = $3
              AND (($1::uuid IS NOT NULL AND user_id = $1)
                OR ($2::uuid IS NOT NULL AND session_id = $2))
            ",
        )
        .bind(user_id)
        .bind(session_id)
        .bind(item_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn clear(&self, owner: CartOwner) -> Result<u64, RepositoryError> {
        clear_lines(self.pool, owner).await
    }

    /// Delete anonymous cart lines untouched for `older_than_days` days.
    ///
    /// Anonymous lines are only reachable through the session cookie, so a
    /// window at least as long as the session expiry only removes carts
    /// whose sessions are gone. Returns the number of lines deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn delete_stale_session_lines(
        &self,
        older_than_days: i32,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM storefront.cart_item
            WHERE session_id IS NOT NULL
              AND updated_at < NOW() - make_interval(days => $1)
            ",
        )
        .bind(older_than_days)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Move every line of an anonymous cart into a user's cart.
    ///
    /// Runs as one statement: the session lines are deleted and upserted
    /// into the user's cart, summing quantities where the user already has
    /// the same product and variant and clamping each line to
    /// [`MAX_LINE_QUANTITY`]. Returns the number of lines moved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails; nothing
    /// is moved in that case.
    pub async fn merge_session_into_user(
        &self,
        session_id: CartSessionId,
        user_id: UserId,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            WITH moved AS (
                DELETE FROM storefront.cart_item
                WHERE session_id = $2
                RETURNING product_id, variant_id, quantity
            )
            INSERT INTO storefront.cart_item (user_id, product_id, variant_id, quantity)
            SELECT $1, product_id, variant_id, LEAST(quantity, $3) FROM moved
            ON CONFLICT (user_id, product_id, variant_key) WHERE user_id IS NOT NULL
            DO UPDATE SET quantity = LEAST(cart_item.quantity + EXCLUDED.quantity, $3),
                          updated_at = NOW()
            ",
        )
        .bind(user_id)
        .bind(session_id)
        .bind(MAX_LINE_QUANTITY)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
