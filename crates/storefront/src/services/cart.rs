//! Cart operations.
//!
//! Validates input against the catalog before touching `cart_item` and
//! returns the recomputed [`CartView`] after every mutation so totals never
//! drift from the lines they summarize.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use abamade_core::{CartItemId, CartOwner, CartSessionId, PricingPolicy, ProductId, UserId, VariantId};

pub use crate::db::cart::MAX_LINE_QUANTITY;
use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::models::CartView;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("quantity must be between 1 and {MAX_LINE_QUANTITY}")]
    InvalidQuantity,

    #[error("product not found")]
    ProductNotFound,

    #[error("product is not available")]
    ProductUnavailable,

    #[error("variant does not belong to this product")]
    VariantMismatch,

    #[error("cart item not found")]
    ItemNotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct CartService<'a> {
    pool: &'a PgPool,
    policy: &'a PricingPolicy,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, policy: &'a PricingPolicy) -> Self {
        Self { pool, policy }
    }

    fn repo(&self) -> CartRepository<'a> {
        CartRepository::new(self.pool)
    }

    /// The owner's cart with totals.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the cart cannot be read.
    pub async fn view(&self, owner: CartOwner) -> Result<CartView, CartError> {
        let lines = self.repo().lines(owner).await?;
        Ok(CartView::new(lines, self.policy))
    }

    /// Total number of units in the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the cart cannot be read.
    pub async fn count(&self, owner: CartOwner) -> Result<i64, CartError> {
        Ok(self.repo().count(owner).await?)
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for quantities outside 1..=99,
    /// `CartError::ProductNotFound` / `ProductUnavailable` when the product
    /// does not exist or is unpublished, and `CartError::VariantMismatch`
    /// when the variant belongs to another product.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        owner: CartOwner,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i32,
    ) -> Result<CartView, CartError> {
        if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
            return Err(CartError::InvalidQuantity);
        }

        let products = ProductRepository::new(self.pool);
        let product = products
            .get(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;
        if !product.is_published {
            return Err(CartError::ProductUnavailable);
        }
        if let Some(variant_id) = variant_id {
            let variants = products.variants(product_id).await?;
            if !variants.iter().any(|v| v.id == variant_id) {
                return Err(CartError::VariantMismatch);
            }
        }

        self.repo()
            .add(owner, product_id, variant_id, quantity)
            .await?;
        self.view(owner).await
    }

    /// Set a line's quantity; anything below 1 removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line is not in the owner's cart.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        owner: CartOwner,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<CartView, CartError> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::InvalidQuantity);
        }

        let result = if quantity < 1 {
            self.repo().remove(owner, item_id).await
        } else {
            self.repo().set_quantity(owner, item_id, quantity).await
        };
        result.map_err(not_found_as_item)?;
        self.view(owner).await
    }

    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line is not in the owner's cart.
    pub async fn remove(&self, owner: CartOwner, item_id: CartItemId) -> Result<CartView, CartError> {
        self.repo()
            .remove(owner, item_id)
            .await
            .map_err(not_found_as_item)?;
        self.view(owner).await
    }

    /// # Errors
    ///
    /// Returns `CartError::Repository` if the cart cannot be cleared.
    pub async fn clear(&self, owner: CartOwner) -> Result<CartView, CartError> {
        self.repo().clear(owner).await?;
        Ok(CartView::empty())
    }

    /// Fold an anonymous cart into the user's cart after sign-in.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the merge fails; the anonymous
    /// cart is left untouched in that case.
    #[instrument(skip(self))]
    pub async fn merge(&self, session_id: CartSessionId, user_id: UserId) -> Result<u64, CartError> {
        let moved = self
            .repo()
            .merge_session_into_user(session_id, user_id)
            .await?;
        if moved > 0 {
            info!(moved, "Merged anonymous cart into user cart");
        }
        Ok(moved)
    }
}

fn not_found_as_item(e: RepositoryError) -> CartError {
    match e {
        RepositoryError::NotFound => CartError::ItemNotFound,
        other => CartError::Repository(other),
    }
}
