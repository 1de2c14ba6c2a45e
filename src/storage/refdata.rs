use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::domain::{CategoryId, ExpenseCategory, Tag, TagId};

/// Repository for globally shared reference data (tags and expense
/// categories). Reference data is managed administratively and is not owned
/// by any account, so this sits outside the hierarchy repository and is not
/// gated by the ownership resolver.
#[derive(Clone)]
pub struct RefDataRepository {
    pool: SqlitePool,
}

impl RefDataRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================
    // Tag operations
    // ========================

    /// Create a tag. Tag names are unique.
    pub async fn create_tag(&self, name: &str) -> Result<Tag> {
        let row = sqlx::query("INSERT INTO tags (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .context("Failed to create tag (names must be unique)")?;

        Ok(Tag {
            id: row.get("id"),
            name: name.to_string(),
        })
    }

    /// List all tags, ordered by name.
    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tags")?;

        Ok(rows.iter().map(Self::row_to_tag).collect())
    }

    /// Fetch the tags for the given ids, in id order. Ids that do not exist
    /// are simply absent from the result; callers compare lengths to detect
    /// a dangling reference.
    pub async fn get_tags(&self, ids: &[TagId]) -> Result<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // sqlite has no array binds; build the placeholder list by hand.
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name FROM tags WHERE id IN ({}) ORDER BY id",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch tags")?;

        Ok(rows.iter().map(Self::row_to_tag).collect())
    }

    fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Tag {
        Tag {
            id: row.get("id"),
            name: row.get("name"),
        }
    }

    // ========================
    // Category operations
    // ========================

    /// Create an expense category.
    pub async fn create_category(&self, name: &str) -> Result<ExpenseCategory> {
        let row = sqlx::query("INSERT INTO expense_categories (name) VALUES (?) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .context("Failed to create category")?;

        Ok(ExpenseCategory {
            id: row.get("id"),
            name: name.to_string(),
        })
    }

    /// Get a category by id.
    pub async fn get_category(&self, id: CategoryId) -> Result<Option<ExpenseCategory>> {
        let row = sqlx::query("SELECT id, name FROM expense_categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch category")?;

        Ok(row.map(|row| ExpenseCategory {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    /// List all categories, ordered by name.
    pub async fn list_categories(&self) -> Result<Vec<ExpenseCategory>> {
        let rows = sqlx::query("SELECT id, name FROM expense_categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list categories")?;

        Ok(rows
            .iter()
            .map(|row| ExpenseCategory {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }
}
