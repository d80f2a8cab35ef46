//! Catalog domain types: categories, products, images and variants.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use abamade_core::{
    CategoryId, Gender, ImageId, ProductId, RatingSummary, Slug, VariantId, VariantOptionId,
    effective_unit_price,
};

/// Largest page a listing endpoint will return.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A product category. Categories nest through `parent_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub gender: Option<Gender>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which level of the category tree to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ParentFilter {
    /// Only categories without a parent (`?parent=root`).
    TopLevel,
    /// Only direct children of the given category.
    ChildrenOf(CategoryId),
}

impl FromStr for ParentFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" | "none" | "null" => Ok(Self::TopLevel),
            other => other
                .parse::<CategoryId>()
                .map(Self::ChildrenOf)
                .map_err(|_| format!("invalid parent filter: {other}")),
        }
    }
}

impl TryFrom<String> for ParentFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Category listing filters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CategoryFilter {
    pub parent: Option<ParentFilter>,
    pub gender: Option<Gender>,
}

impl CategoryFilter {
    /// Whether a category passes this filter.
    #[must_use]
    pub fn matches(&self, category: &Category) -> bool {
        let parent_ok = match self.parent {
            None => true,
            Some(ParentFilter::TopLevel) => category.parent_id.is_none(),
            Some(ParentFilter::ChildrenOf(id)) => category.parent_id == Some(id),
        };
        let gender_ok = self.gender.is_none_or(|g| category.gender == Some(g));
        parent_ok && gender_ok
    }
}

/// A product as stored in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub sku: String,
    pub stock_quantity: i32,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_published: bool,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price charged for the product itself (no variant).
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        effective_unit_price(self.price, self.sale_price, None, None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductImage {
    pub id: ImageId,
    pub product_id: ProductId,
    pub url: String,
    pub alt: Option<String>,
    pub is_primary: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VariantOption {
    pub id: VariantOptionId,
    pub variant_id: VariantId,
    pub name: String,
    pub value: String,
}

/// A purchasable variant of a product, e.g. one shoe size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    pub sku: String,
    pub price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub options: Vec<VariantOption>,
}

/// A product with its images, as shown in grids and search results.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
}

/// Everything the product page needs.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub images: Vec<ProductImage>,
    pub variants: Vec<ProductVariant>,
    pub rating: RatingSummary,
}

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    Featured,
    #[default]
    Newest,
}

impl ProductSort {
    /// `ORDER BY` clause for the `product` table aliased as `p`.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::PriceAsc => "COALESCE(p.sale_price, p.price) ASC, p.created_at DESC",
            Self::PriceDesc => "COALESCE(p.sale_price, p.price) DESC, p.created_at DESC",
            Self::Featured => "p.is_featured DESC, p.created_at DESC",
            Self::Newest => "p.created_at DESC",
        }
    }
}

/// Product listing filters and paging, read from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(alias = "category_id")]
    pub category: Option<CategoryId>,
    pub featured: Option<bool>,
    #[serde(alias = "is_new")]
    pub new: Option<bool>,
    #[serde(alias = "search")]
    pub q: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort: ProductSort,
}

impl ProductQuery {
    pub const DEFAULT_LIMIT: i64 = 10;

    /// Page size, clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, MAX_PAGE_SIZE)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Trimmed search text, `None` when blank.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Whether a product passes every filter (published-only included).
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let price = product.effective_price();
        product.is_published
            && self.category.is_none_or(|c| product.category_id == Some(c))
            && self.featured.is_none_or(|f| product.is_featured == f)
            && self.new.is_none_or(|n| product.is_new == n)
            && self.min_price.is_none_or(|min| price >= min)
            && self.max_price.is_none_or(|max| price <= max)
            && self.search().is_none_or(|q| {
                product.name.to_lowercase().contains(&q.to_lowercase())
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(name: &str, price: &str) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_owned(),
            slug: Slug::from_name(name).unwrap(),
            description: None,
            price: price.parse().unwrap(),
            sale_price: None,
            sku: "SKU".to_owned(),
            stock_quantity: 5,
            is_featured: false,
            is_new: false,
            is_published: true,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parent_filter_parse() {
        assert_eq!("root".parse::<ParentFilter>().unwrap(), ParentFilter::TopLevel);
        let id = CategoryId::generate();
        assert_eq!(
            id.to_string().parse::<ParentFilter>().unwrap(),
            ParentFilter::ChildrenOf(id)
        );
        assert!("shoes".parse::<ParentFilter>().is_err());
    }

    #[test]
    fn test_query_limit_clamped() {
        let mut query = ProductQuery::default();
        assert_eq!(query.limit(), 10);
        query.limit = Some(1_000);
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
        query.limit = Some(0);
        assert_eq!(query.limit(), 1);
        query.offset = Some(-5);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_query_matches_price_range_on_sale_price() {
        let mut p = product("Strappy Sandals", "100.00");
        p.sale_price = Some("60.00".parse().unwrap());
        let query = ProductQuery {
            max_price: Some("70.00".parse().unwrap()),
            ..ProductQuery::default()
        };
        assert!(query.matches(&p));
    }

    #[test]
    fn test_query_search_is_case_insensitive() {
        let p = product("Elegant Stiletto Heels", "129.99");
        let query = ProductQuery {
            q: Some("  stiletto ".to_owned()),
            ..ProductQuery::default()
        };
        assert!(query.matches(&p));
    }

    #[test]
    fn test_query_excludes_unpublished() {
        let mut p = product("Draft Boot", "10.00");
        p.is_published = false;
        assert!(!ProductQuery::default().matches(&p));
    }

    #[test]
    fn test_sort_deserialize() {
        let sort: ProductSort = serde_json::from_str("\"price_desc\"").unwrap();
        assert_eq!(sort, ProductSort::PriceDesc);
    }
}
