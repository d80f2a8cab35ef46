//! Built-in catalog served when the database cannot be read.
//!
//! Built from the demo seed data with fixed IDs so product links stay stable
//! between requests.

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use abamade_core::{CategoryId, ImageId, ProductId, RatingSummary, Slug};

use crate::db::seed::{CATEGORIES, PRODUCTS, category_image, product_image};
use crate::models::{
    Category, CategoryFilter, Product, ProductDetail, ProductImage, ProductListing, ProductQuery,
    ProductSort,
};

const CATEGORY_BASE: u128 = 0x1000;
const PRODUCT_BASE: u128 = 0x2000;
const IMAGE_BASE: u128 = 0x3000;

struct FallbackCatalog {
    categories: Vec<Category>,
    products: Vec<ProductListing>,
}

static CATALOG: LazyLock<FallbackCatalog> = LazyLock::new(build);

fn fixed_id(base: u128, index: usize) -> Uuid {
    Uuid::from_u128(base + index as u128)
}

fn build() -> FallbackCatalog {
    let epoch = DateTime::<Utc>::UNIX_EPOCH;

    let categories: Vec<Category> = CATEGORIES
        .iter()
        .enumerate()
        .filter_map(|(i, c)| {
            Some(Category {
                id: CategoryId::new(fixed_id(CATEGORY_BASE, i)),
                name: c.name.to_owned(),
                slug: Slug::parse(c.slug).ok()?,
                description: Some(c.description.to_owned()),
                image_url: Some(category_image(c.name)),
                parent_id: None,
                gender: Some(c.gender),
                created_at: epoch,
                updated_at: epoch,
            })
        })
        .collect();

    let products = PRODUCTS
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            let id = ProductId::new(fixed_id(PRODUCT_BASE, i));
            let category_id = categories
                .iter()
                .find(|c| c.slug.as_str() == p.category)
                .map(|c| c.id);
            Some(ProductListing {
                product: Product {
                    id,
                    name: p.name.to_owned(),
                    slug: Slug::parse(p.slug).ok()?,
                    description: Some(p.description.to_owned()),
                    price: p.price(),
                    sale_price: None,
                    sku: p.sku.to_owned(),
                    stock_quantity: p.stock_quantity,
                    is_featured: p.is_featured,
                    is_new: p.is_new,
                    is_published: true,
                    category_id,
                    created_at: epoch,
                    updated_at: epoch,
                },
                images: vec![ProductImage {
                    id: ImageId::new(fixed_id(IMAGE_BASE, i)),
                    product_id: id,
                    url: product_image(p.name, None),
                    alt: Some(p.name.to_owned()),
                    is_primary: true,
                    sort_order: 0,
                }],
            })
        })
        .collect();

    FallbackCatalog {
        categories,
        products,
    }
}

fn compare(sort: ProductSort, a: &Product, b: &Product) -> Ordering {
    match sort {
        ProductSort::PriceAsc => a.effective_price().cmp(&b.effective_price()),
        ProductSort::PriceDesc => b.effective_price().cmp(&a.effective_price()),
        ProductSort::Featured => b.is_featured.cmp(&a.is_featured),
        ProductSort::Newest => b.created_at.cmp(&a.created_at),
    }
}

/// Products passing the query, sorted and paged.
pub fn products(query: &ProductQuery) -> Vec<ProductListing> {
    let mut matching: Vec<&ProductListing> = CATALOG
        .products
        .iter()
        .filter(|l| query.matches(&l.product))
        .collect();
    matching.sort_by(|a, b| compare(query.sort, &a.product, &b.product));

    matching
        .into_iter()
        .skip(usize::try_from(query.offset()).unwrap_or(0))
        .take(usize::try_from(query.limit()).unwrap_or(0))
        .cloned()
        .collect()
}

pub fn related(
    product_id: ProductId,
    category_id: Option<CategoryId>,
    limit: usize,
) -> Vec<ProductListing> {
    let Some(category_id) = category_id else {
        return Vec::new();
    };
    CATALOG
        .products
        .iter()
        .filter(|l| l.product.id != product_id && l.product.category_id == Some(category_id))
        .take(limit)
        .cloned()
        .collect()
}

fn detail(listing: &ProductListing) -> ProductDetail {
    ProductDetail {
        product: listing.product.clone(),
        category: listing
            .product
            .category_id
            .and_then(|id| CATALOG.categories.iter().find(|c| c.id == id).cloned()),
        images: listing.images.clone(),
        variants: Vec::new(),
        rating: RatingSummary::empty(),
    }
}

pub fn product_by_id(id: ProductId) -> Option<ProductDetail> {
    CATALOG
        .products
        .iter()
        .find(|l| l.product.id == id)
        .map(detail)
}

pub fn product_by_slug(slug: &str) -> Option<ProductDetail> {
    CATALOG
        .products
        .iter()
        .find(|l| l.product.slug.as_str() == slug)
        .map(detail)
}

/// Categories passing the filter, ordered by name.
pub fn categories(filter: CategoryFilter) -> Vec<Category> {
    let mut matching: Vec<Category> = CATALOG
        .categories
        .iter()
        .filter(|c| filter.matches(c))
        .cloned()
        .collect();
    matching.sort_by(|a, b| a.name.cmp(&b.name));
    matching
}

pub fn category_by_slug(slug: &str) -> Option<Category> {
    CATALOG
        .categories
        .iter()
        .find(|c| c.slug.as_str() == slug)
        .cloned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use abamade_core::Gender;

    use super::*;
    use crate::models::ParentFilter;

    #[test]
    fn test_fallback_has_demo_catalog() {
        assert_eq!(categories(CategoryFilter::default()).len(), 5);
        let all = products(&ProductQuery {
            limit: Some(100),
            ..ProductQuery::default()
        });
        assert_eq!(all.len(), 5);
        assert!(all.iter().all(|l| l.images.len() == 1));
    }

    #[test]
    fn test_fallback_filters_and_sorts() {
        let featured = products(&ProductQuery {
            featured: Some(true),
            sort: ProductSort::PriceAsc,
            ..ProductQuery::default()
        });
        let names: Vec<&str> = featured.iter().map(|l| l.product.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Comfortable Ballet Flats",
                "Elegant Stiletto Heels",
                "Ankle Leather Boots"
            ]
        );
    }

    #[test]
    fn test_fallback_paging() {
        let page = products(&ProductQuery {
            limit: Some(2),
            offset: Some(4),
            ..ProductQuery::default()
        });
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn test_fallback_lookup_by_slug_and_id() {
        let detail = product_by_slug("ankle-leather-boots").unwrap();
        assert_eq!(detail.category.as_ref().unwrap().name, "Boots");
        assert_eq!(product_by_id(detail.product.id).unwrap().product.sku, "BOOT-ANK-001");
        assert!(product_by_slug("missing").is_none());
    }

    #[test]
    fn test_fallback_category_filters() {
        let top = categories(CategoryFilter {
            parent: Some(ParentFilter::TopLevel),
            gender: Some(Gender::Women),
        });
        assert_eq!(top.first().unwrap().name, "Boots");
        assert!(
            categories(CategoryFilter {
                parent: None,
                gender: Some(Gender::Men),
            })
            .is_empty()
        );
        assert_eq!(category_by_slug("flats").unwrap().name, "Flats");
    }

    #[test]
    fn test_related_excludes_self() {
        let heels = product_by_slug("elegant-stiletto-heels").unwrap();
        assert!(related(heels.product.id, heels.product.category_id, 4).is_empty());
    }
}
