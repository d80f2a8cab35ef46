//! Demo catalog.
//!
//! The same data backs the database seed and the in-memory fallback catalog
//! served when catalog queries fail.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use abamade_core::{CategoryId, CouponRules, DiscountType, Gender, ProductId, VariantId};

use super::{CouponRepository, RepositoryError};

pub(crate) struct SeedCategory {
    pub name: &'static str,
    pub slug: &'static str,
    pub description: &'static str,
    pub gender: Gender,
}

pub(crate) struct SeedProduct {
    pub name: &'static str,
    pub slug: &'static str,
    pub description: &'static str,
    /// Price in cents.
    pub price_cents: i64,
    pub sku: &'static str,
    pub stock_quantity: i32,
    pub is_featured: bool,
    pub is_new: bool,
    /// Slug of the category in [`CATEGORIES`].
    pub category: &'static str,
}

impl SeedProduct {
    pub fn price(&self) -> Decimal {
        Decimal::new(self.price_cents, 2)
    }
}

pub(crate) const CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        name: "Heels",
        slug: "heels",
        description: "Elegant heels for any occasion",
        gender: Gender::Women,
    },
    SeedCategory {
        name: "Flats",
        slug: "flats",
        description: "Comfortable flats for everyday wear",
        gender: Gender::Women,
    },
    SeedCategory {
        name: "Sandals",
        slug: "sandals",
        description: "Stylish sandals for warm weather",
        gender: Gender::Women,
    },
    SeedCategory {
        name: "Boots",
        slug: "boots",
        description: "Fashionable boots for cooler weather",
        gender: Gender::Women,
    },
    SeedCategory {
        name: "Sneakers",
        slug: "sneakers",
        description: "Trendy sneakers for casual wear",
        gender: Gender::Women,
    },
];

pub(crate) const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Elegant Stiletto Heels",
        slug: "elegant-stiletto-heels",
        description: "Classic stiletto heels perfect for formal occasions. Features a 4-inch \
                      heel and cushioned insole for comfort.",
        price_cents: 12999,
        sku: "HEEL-STL-001",
        stock_quantity: 25,
        is_featured: true,
        is_new: true,
        category: "heels",
    },
    SeedProduct {
        name: "Comfortable Ballet Flats",
        slug: "comfortable-ballet-flats",
        description: "Soft leather ballet flats with memory foam insoles for all-day comfort.",
        price_cents: 7999,
        sku: "FLAT-BLT-001",
        stock_quantity: 40,
        is_featured: true,
        is_new: false,
        category: "flats",
    },
    SeedProduct {
        name: "Summer Strappy Sandals",
        slug: "summer-strappy-sandals",
        description: "Lightweight sandals with adjustable straps, perfect for summer days.",
        price_cents: 8999,
        sku: "SNDL-STP-001",
        stock_quantity: 30,
        is_featured: false,
        is_new: true,
        category: "sandals",
    },
    SeedProduct {
        name: "Ankle Leather Boots",
        slug: "ankle-leather-boots",
        description: "Stylish ankle boots made from genuine leather with a comfortable block heel.",
        price_cents: 14999,
        sku: "BOOT-ANK-001",
        stock_quantity: 20,
        is_featured: true,
        is_new: false,
        category: "boots",
    },
    SeedProduct {
        name: "Casual Canvas Sneakers",
        slug: "casual-canvas-sneakers",
        description: "Lightweight canvas sneakers perfect for casual everyday wear.",
        price_cents: 5999,
        sku: "SNKR-CNV-001",
        stock_quantity: 50,
        is_featured: false,
        is_new: true,
        category: "sneakers",
    },
];

/// Shoe sizes every seeded product comes in.
pub(crate) const SIZES: &[&str] = &["5", "6", "7", "8", "9", "10"];

/// Category image URL.
pub(crate) fn category_image(name: &str) -> String {
    format!("/placeholder.svg?height=400&width=400&text={}", urlencoding::encode(name))
}

/// Product image URL for an optional view suffix such as `"Side"`.
pub(crate) fn product_image(name: &str, view: Option<&str>) -> String {
    let text = match view {
        Some(view) => format!("{name} - {view}"),
        None => name.to_owned(),
    };
    format!("/placeholder.svg?height=600&width=600&text={}", urlencoding::encode(&text))
}

/// Stock for a size variant; varies a little from size to size.
pub(crate) fn variant_stock(size_index: usize) -> i32 {
    let offset = i32::try_from(size_index * 3 % 10).unwrap_or(0);
    5 + offset
}

/// What a seed run inserted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub categories: usize,
    pub products: usize,
    pub images: usize,
    pub variants: usize,
    pub coupons: usize,
}

/// Insert the demo catalog unless categories already exist.
///
/// Returns `None` when the database already had data.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if an insert fails; the whole seed is
/// rolled back in that case.
pub async fn seed(pool: &PgPool) -> Result<Option<SeedReport>, RepositoryError> {
    let mut tx = pool.begin().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM storefront.category")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        info!(existing, "Catalog already seeded, skipping");
        return Ok(None);
    }

    let mut report = SeedReport::default();
    let mut category_ids: Vec<(&str, CategoryId)> = Vec::with_capacity(CATEGORIES.len());

    for category in CATEGORIES {
        let id: CategoryId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.category (name, slug, description, gender, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(category.name)
        .bind(category.slug)
        .bind(category.description)
        .bind(category.gender)
        .bind(category_image(category.name))
        .fetch_one(&mut *tx)
        .await?;
        category_ids.push((category.slug, id));
        report.categories += 1;
    }

    for product in PRODUCTS {
        let category_id = category_ids
            .iter()
            .find(|(slug, _)| *slug == product.category)
            .map(|(_, id)| *id);

        let product_id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.product
                (name, slug, description, price, sku, stock_quantity, is_featured, is_new,
                 category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(product.name)
        .bind(product.slug)
        .bind(product.description)
        .bind(product.price())
        .bind(product.sku)
        .bind(product.stock_quantity)
        .bind(product.is_featured)
        .bind(product.is_new)
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await?;
        report.products += 1;

        let views = [
            (None, product.name.to_owned(), true),
            (Some("Side"), format!("{} - Side View", product.name), false),
            (Some("Back"), format!("{} - Back View", product.name), false),
        ];
        for (sort_order, (view, alt, is_primary)) in (0_i32..).zip(views) {
            sqlx::query(
                r"
                INSERT INTO storefront.product_image (product_id, url, alt, is_primary, sort_order)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(product_id)
            .bind(product_image(product.name, view))
            .bind(alt)
            .bind(is_primary)
            .bind(sort_order)
            .execute(&mut *tx)
            .await?;
            report.images += 1;
        }

        for (index, size) in SIZES.iter().enumerate() {
            let variant_id: VariantId = sqlx::query_scalar(
                r"
                INSERT INTO storefront.product_variant (product_id, name, sku, stock_quantity)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                ",
            )
            .bind(product_id)
            .bind(format!("Size {size}"))
            .bind(format!("{}-SZ{size}", product.sku))
            .bind(variant_stock(index))
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO storefront.variant_option (variant_id, name, value) \
                 VALUES ($1, 'Size', $2)",
            )
            .bind(variant_id)
            .bind(*size)
            .execute(&mut *tx)
            .await?;
            report.variants += 1;
        }
    }

    tx.commit().await?;

    let welcome = CouponRules {
        discount_type: DiscountType::Percentage,
        discount_value: Decimal::TEN,
        min_purchase: Some(Decimal::new(5000, 2)),
        max_discount: Some(Decimal::new(2500, 2)),
        starts_at: None,
        ends_at: None,
        is_active: true,
        usage_limit: None,
        usage_count: 0,
    };
    match CouponRepository::new(pool)
        .create("WELCOME10", Some("10% off orders over $50"), &welcome)
        .await
    {
        Ok(_) => report.coupons += 1,
        Err(RepositoryError::Conflict(_)) => {}
        Err(e) => return Err(e),
    }

    info!(
        categories = report.categories,
        products = report.products,
        variants = report.variants,
        "Seeded demo catalog"
    );
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_product_has_a_category() {
        for product in PRODUCTS {
            assert!(
                CATEGORIES.iter().any(|c| c.slug == product.category),
                "{} has unknown category {}",
                product.name,
                product.category
            );
        }
    }

    #[test]
    fn test_seed_prices() {
        assert_eq!(PRODUCTS[0].price().to_string(), "129.99");
        assert_eq!(PRODUCTS[4].price().to_string(), "59.99");
    }

    #[test]
    fn test_image_urls_are_encoded() {
        assert_eq!(
            product_image("Ankle Leather Boots", Some("Side")),
            "/placeholder.svg?height=600&width=600&text=Ankle%20Leather%20Boots%20-%20Side"
        );
        assert_eq!(
            category_image("Heels"),
            "/placeholder.svg?height=400&width=400&text=Heels"
        );
    }

    #[test]
    fn test_variant_stock_in_range() {
        for index in 0..SIZES.len() {
            let stock = variant_stock(index);
            assert!((5..15).contains(&stock));
        }
    }
}
