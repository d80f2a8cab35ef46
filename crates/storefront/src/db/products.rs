//! Product repository: listings, product pages and back-office edits.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use abamade_core::{CategoryId, ImageId, ProductId, Slug, VariantId};

use super::{CategoryRepository, RepositoryError, ReviewRepository};
use crate::models::{
    Product, ProductDetail, ProductImage, ProductListing, ProductQuery, ProductSort,
    ProductVariant, VariantOption,
};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.slug, p.description, p.price, p.sale_price, \
                               p.sku, p.stock_quantity, p.is_featured, p.is_new, \
                               p.is_published, p.category_id, p.created_at, p.updated_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    slug: String,
    description: Option<String>,
    price: Decimal,
    sale_price: Option<Decimal>,
    sku: String,
    stock_quantity: i32,
    is_featured: bool,
    is_new: bool,
    is_published: bool,
    category_id: Option<CategoryId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid product slug in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            slug,
            description: row.description,
            price: row.price,
            sale_price: row.sale_price,
            sku: row.sku,
            stock_quantity: row.stock_quantity,
            is_featured: row.is_featured,
            is_new: row.is_new,
            is_published: row.is_published,
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VariantRow {
    id: VariantId,
    product_id: ProductId,
    name: String,
    sku: String,
    price: Option<Decimal>,
    sale_price: Option<Decimal>,
    stock_quantity: i32,
}

/// Fields for creating a product from the back-office.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub slug: Option<Slug>,
    pub description: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub sku: String,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default = "default_published")]
    pub is_published: bool,
    pub category_id: Option<CategoryId>,
}

const fn default_published() -> bool {
    true
}

/// Partial product update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<Slug>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    /// Remove the sale price. Takes precedence over `sale_price`.
    #[serde(default)]
    pub clear_sale_price: bool,
    pub sku: Option<String>,
    pub stock_quantity: Option<i32>,
    pub is_featured: Option<bool>,
    pub is_new: Option<bool>,
    pub is_published: Option<bool>,
    pub category_id: Option<CategoryId>,
}

/// An image to attach to a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewImage {
    pub url: String,
    pub alt: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Published products matching the query, with their images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<ProductListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM storefront.product p
            WHERE p.is_published
              AND ($1::uuid IS NULL OR p.category_id = $1)
              AND ($2::boolean IS NULL OR p.is_featured = $2)
              AND ($3::boolean IS NULL OR p.is_new = $3)
              AND ($4::text IS NULL OR strpos(lower(p.name), lower($4)) > 0)
              AND ($5::numeric IS NULL OR COALESCE(p.sale_price, p.price) >= $5)
              AND ($6::numeric IS NULL OR COALESCE(p.sale_price, p.price) <= $6)
            ORDER BY {}
            LIMIT $7 OFFSET $8
            ",
            query.sort.order_by()
        ))
        .bind(query.category)
        .bind(query.featured)
        .bind(query.new)
        .bind(query.search())
        .bind(query.min_price)
        .bind(query.max_price)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(self.pool)
        .await?;

        self.with_images(rows).await
    }

    /// Featured products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<ProductListing>, RepositoryError> {
        self.list(&ProductQuery {
            featured: Some(true),
            limit: Some(limit),
            sort: ProductSort::Newest,
            ..ProductQuery::default()
        })
        .await
    }

    /// Products flagged as new, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn new_arrivals(&self, limit: i64) -> Result<Vec<ProductListing>, RepositoryError> {
        self.list(&ProductQuery {
            new: Some(true),
            limit: Some(limit),
            sort: ProductSort::Newest,
            ..ProductQuery::default()
        })
        .await
    }

    /// Case-insensitive name search.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, q: &str, limit: i64) -> Result<Vec<ProductListing>, RepositoryError> {
        self.list(&ProductQuery {
            q: Some(q.to_owned()),
            limit: Some(limit),
            ..ProductQuery::default()
        })
        .await
    }

    /// Other published products in the same category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related(
        &self,
        product_id: ProductId,
        category_id: Option<CategoryId>,
        limit: i64,
    ) -> Result<Vec<ProductListing>, RepositoryError> {
        let Some(category_id) = category_id else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM storefront.product p
            WHERE p.is_published AND p.category_id = $1 AND p.id <> $2
            ORDER BY p.created_at DESC
            LIMIT $3
            "
        ))
        .bind(category_id)
        .bind(product_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        self.with_images(rows).await
    }

    /// Every product including unpublished ones, for the back-office.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProductListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM storefront.product p
            ORDER BY p.created_at DESC
            LIMIT $1 OFFSET $2
            "
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        self.with_images(rows).await
    }

    /// Get a product by ID regardless of publication state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Product::try_from)
        .transpose()
    }

    /// Product page data for a published product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn detail_by_id(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product p WHERE p.id = $1 AND p.is_published"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => self.detail(Product::try_from(row)?).await.map(Some),
            None => Ok(None),
        }
    }

    /// Product page data for a published product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn detail_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product p \
             WHERE p.slug = $1 AND p.is_published"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => self.detail(Product::try_from(row)?).await.map(Some),
            None => Ok(None),
        }
    }

    async fn detail(&self, product: Product) -> Result<ProductDetail, RepositoryError> {
        let category = match product.category_id {
            Some(id) => CategoryRepository::new(self.pool).get_by_id(id).await?,
            None => None,
        };
        let images = self.images(product.id).await?;
        let variants = self.variants(product.id).await?;
        let rating = ReviewRepository::new(self.pool)
            .rating_summary(product.id)
            .await?;

        Ok(ProductDetail {
            product,
            category,
            images,
            variants,
            rating,
        })
    }

    /// Images of one product, primary first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images(&self, product_id: ProductId) -> Result<Vec<ProductImage>, RepositoryError> {
        let images = sqlx::query_as::<_, ProductImage>(
            r"
            SELECT id, product_id, url, alt, is_primary, sort_order
            FROM storefront.product_image
            WHERE product_id = $1
            ORDER BY is_primary DESC, sort_order, created_at
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(images)
    }

    /// Variants of one product with their options.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn variants(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductVariant>, RepositoryError> {
        let rows = sqlx::query_as::<_, VariantRow>(
            r"
            SELECT id, product_id, name, sku, price, sale_price, stock_quantity
            FROM storefront.product_variant
            WHERE product_id = $1
            ORDER BY created_at, name
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        let options = sqlx::query_as::<_, VariantOption>(
            r"
            SELECT o.id, o.variant_id, o.name, o.value
            FROM storefront.variant_option o
            JOIN storefront.product_variant v ON v.id = o.variant_id
            WHERE v.product_id = $1
            ORDER BY o.name
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        let mut by_variant: HashMap<VariantId, Vec<VariantOption>> = HashMap::new();
        for option in options {
            by_variant.entry(option.variant_id).or_default().push(option);
        }

        Ok(rows
            .into_iter()
            .map(|row| ProductVariant {
                options: by_variant.remove(&row.id).unwrap_or_default(),
                id: row.id,
                product_id: row.product_id,
                name: row.name,
                sku: row.sku,
                price: row.price,
                sale_price: row.sale_price,
                stock_quantity: row.stock_quantity,
            })
            .collect())
    }

    /// Attach images to a page of products with a single extra query.
    async fn with_images(
        &self,
        rows: Vec<ProductRow>,
    ) -> Result<Vec<ProductListing>, RepositoryError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id.as_uuid()).collect();
        let images = sqlx::query_as::<_, ProductImage>(
            r"
            SELECT id, product_id, url, alt, is_primary, sort_order
            FROM storefront.product_image
            WHERE product_id = ANY($1)
            ORDER BY is_primary DESC, sort_order, created_at
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_product: HashMap<ProductId, Vec<ProductImage>> = HashMap::new();
        for image in images {
            by_product.entry(image.product_id).or_default().push(image);
        }

        rows.into_iter()
            .map(|row| {
                let images = by_product.remove(&row.id).unwrap_or_default();
                Ok(ProductListing {
                    product: Product::try_from(row)?,
                    images,
                })
            })
            .collect()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug or SKU is taken.
    pub async fn create(&self, input: &NewProduct, slug: &Slug) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO storefront.product AS p
                (name, slug, description, price, sale_price, sku, stock_quantity,
                 is_featured, is_new, is_published, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(input.name.trim())
        .bind(slug.as_str())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.sale_price)
        .bind(input.sku.trim())
        .bind(input.stock_quantity)
        .bind(input.is_featured)
        .bind(input.is_new)
        .bind(input.is_published)
        .bind(input.category_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or(e, "product slug or SKU already exists"))?;

        Product::try_from(row)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the new slug or SKU is taken.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE storefront.product AS p
            SET name           = COALESCE($2, p.name),
                slug           = COALESCE($3, p.slug),
                description    = COALESCE($4, p.description),
                price          = COALESCE($5, p.price),
                sale_price     = CASE WHEN $6 THEN NULL ELSE COALESCE($7, p.sale_price) END,
                sku            = COALESCE($8, p.sku),
                stock_quantity = COALESCE($9, p.stock_quantity),
                is_featured    = COALESCE($10, p.is_featured),
                is_new         = COALESCE($11, p.is_new),
                is_published   = COALESCE($12, p.is_published),
                category_id    = COALESCE($13, p.category_id),
                updated_at     = NOW()
            WHERE p.id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.slug.as_ref().map(Slug::as_str))
        .bind(&patch.description)
        .bind(patch.price)
        .bind(patch.clear_sale_price)
        .bind(patch.sale_price)
        .bind(patch.sku.as_deref().map(str::trim))
        .bind(patch.stock_quantity)
        .bind(patch.is_featured)
        .bind(patch.is_new)
        .bind(patch.is_published)
        .bind(patch.category_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or(e, "product slug or SKU already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Product::try_from(row)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if orders reference it.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "product appears in orders; unpublish it instead".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Attach an image. A new primary image demotes the previous one in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        image: &NewImage,
    ) -> Result<ProductImage, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if image.is_primary {
            sqlx::query(
                "UPDATE storefront.product_image SET is_primary = FALSE \
                 WHERE product_id = $1 AND is_primary",
            )
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        }

        let created = sqlx::query_as::<_, ProductImage>(
            r"
            INSERT INTO storefront.product_image (product_id, url, alt, is_primary, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, url, alt, is_primary, sort_order
            ",
        )
        .bind(product_id)
        .bind(image.url.trim())
        .bind(&image.alt)
        .bind(image.is_primary)
        .bind(image.sort_order)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        tx.commit().await?;
        Ok(created)
    }

    /// Remove an image from a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such image belongs to the product.
    pub async fn delete_image(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM storefront.product_image WHERE id = $1 AND product_id = $2")
                .bind(image_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
