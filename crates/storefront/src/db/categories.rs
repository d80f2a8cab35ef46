//! Category repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use abamade_core::{CategoryId, Gender, Slug};

use super::RepositoryError;
use crate::models::{Category, CategoryFilter, ParentFilter};

const CATEGORY_COLUMNS: &str = "id, name, slug, description, image_url, parent_id, gender, \
                                created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    slug: String,
    description: Option<String>,
    image_url: Option<String>,
    parent_id: Option<CategoryId>,
    gender: Option<Gender>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category slug in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            slug,
            description: row.description,
            image_url: row.image_url,
            parent_id: row.parent_id,
            gender: row.gender,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields for creating or replacing a category from the back-office.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub slug: Option<Slug>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub gender: Option<Gender>,
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: CategoryFilter) -> Result<Vec<Category>, RepositoryError> {
        let (top_level, parent_id) = match filter.parent {
            None => (false, None),
            Some(ParentFilter::TopLevel) => (true, None),
            Some(ParentFilter::ChildrenOf(id)) => (false, Some(id)),
        };

        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            r"
            SELECT {CATEGORY_COLUMNS}
            FROM storefront.category
            WHERE (NOT $1 OR parent_id IS NULL)
              AND ($2::uuid IS NULL OR parent_id = $2)
              AND ($3::storefront.gender IS NULL OR gender = $3)
            ORDER BY name
            "
        ))
        .bind(top_level)
        .bind(parent_id)
        .bind(filter.gender)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    /// Top-level categories, optionally for one gender.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn main_categories(
        &self,
        gender: Option<Gender>,
    ) -> Result<Vec<Category>, RepositoryError> {
        self.list(CategoryFilter {
            parent: Some(ParentFilter::TopLevel),
            gender,
        })
        .await
    }

    /// Direct children of a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn subcategories(&self, parent: CategoryId) -> Result<Vec<Category>, RepositoryError> {
        self.list(CategoryFilter {
            parent: Some(ParentFilter::ChildrenOf(parent)),
            gender: None,
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn women_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        self.main_categories(Some(Gender::Women)).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn men_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        self.main_categories(Some(Gender::Men)).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM storefront.category WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Category::try_from)
        .transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM storefront.category WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .map(Category::try_from)
        .transpose()
    }

    /// Create a category. The slug defaults to one derived from the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let slug = resolve_slug(input)?;
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r"
            INSERT INTO storefront.category (name, slug, description, image_url, parent_id, gender)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(input.name.trim())
        .bind(slug.as_str())
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.parent_id)
        .bind(input.gender)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or(e, "category slug already exists"))?;

        Category::try_from(row)
    }

    /// Replace a category's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let slug = resolve_slug(input)?;
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r"
            UPDATE storefront.category
            SET name = $2, slug = $3, description = $4, image_url = $5,
                parent_id = $6, gender = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(slug.as_str())
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.parent_id)
        .bind(input.gender)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or(e, "category slug already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Category::try_from(row)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if products still reference it.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "category still has products".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn resolve_slug(input: &CategoryInput) -> Result<Slug, RepositoryError> {
    match &input.slug {
        Some(slug) => Ok(slug.clone()),
        None => Slug::from_name(&input.name)
            .map_err(|e| RepositoryError::Conflict(format!("cannot derive slug: {e}"))),
    }
}
