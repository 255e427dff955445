//! Checklist data provider
//!
//! `ChecklistProvider` is the backend boundary of the system: taxonomy
//! queries and administration, inspection writes, and issue status updates.
//! The session state machine and the HTTP handlers only ever talk to this
//! trait, so tests can substitute an in-memory fake for `SqliteProvider`.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::icons::Icon;
use crate::models::{
    Category, CategoryCreate, CategoryUpdate, ChecklistItem, InspectionCategory, InspectionRecord,
    ItemCreate, SubmissionPayload,
};
use crate::models::slugify;
use crate::{Error, Result};

#[async_trait]
pub trait ChecklistProvider: Send + Sync {
    /// Categories ordered by `sort_order`, each with its items ordered by
    /// `sort_order`
    async fn fetch_taxonomy(&self) -> Result<Vec<Category>>;

    async fn create_category(&self, create: CategoryCreate) -> Result<Category>;
    async fn update_category(&self, id: &str, update: CategoryUpdate) -> Result<Category>;

    /// Cascades: deletes the category's items first, then the category
    async fn delete_category(&self, id: &str) -> Result<()>;

    async fn create_item(&self, category_id: &str, create: ItemCreate) -> Result<ChecklistItem>;
    async fn update_item_description(
        &self,
        item_id: &str,
        description: &str,
    ) -> Result<ChecklistItem>;
    async fn delete_item(&self, item_id: &str) -> Result<()>;

    /// One durable write; returns the generated inspection id
    async fn submit_inspection(&self, payload: &SubmissionPayload) -> Result<String>;

    async fn get_inspection(&self, id: &str) -> Result<InspectionRecord>;

    /// Most recent first, bounded by `limit`
    async fn list_recent_inspections(&self, limit: i64) -> Result<Vec<InspectionRecord>>;

    /// Flip one nested item's `fixed` flag inside a submitted inspection.
    /// The rewrite is guarded by the record's version; a stale write fails
    /// with a conflict instead of silently discarding a concurrent update.
    async fn update_issue_status(
        &self,
        inspection_id: &str,
        category_id: &str,
        item_id: &str,
        fixed: bool,
    ) -> Result<InspectionRecord>;
}

/// SQLite-backed provider
#[derive(Clone)]
pub struct SqliteProvider {
    pool: SqlitePool,
}

impl SqliteProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_items(&self, category_id: &str) -> Result<Vec<ChecklistItem>> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
            "SELECT id, category_id, description, sort_order FROM items \
             WHERE category_id = ? ORDER BY sort_order ASC",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, category_id, description, sort_order)| ChecklistItem {
                id,
                category_id,
                description,
                sort_order,
            })
            .collect())
    }

    async fn fetch_category(&self, id: &str) -> Result<Category> {
        let row: Option<(String, String, String, i64)> = sqlx::query_as(
            "SELECT id, title, icon, sort_order FROM categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let (id, title, icon, sort_order) =
            row.ok_or_else(|| Error::NotFound(format!("category '{}'", id)))?;
        let items = self.fetch_items(&id).await?;

        Ok(Category {
            id,
            title,
            icon: Icon::resolve(&icon),
            sort_order,
            items,
        })
    }

    fn record_from_row(
        row: (String, String, String, String, String, String, String, i64, String),
    ) -> Result<InspectionRecord> {
        let (
            id,
            store_number,
            inspected_by,
            client_date,
            inspection_date,
            submitted_at,
            last_updated,
            version,
            categories_blob,
        ) = row;
        let categories: Vec<InspectionCategory> = serde_json::from_str(&categories_blob)?;

        Ok(InspectionRecord {
            id,
            store_number,
            inspected_by,
            client_date,
            inspection_date,
            submitted_at,
            last_updated,
            version,
            categories,
        })
    }
}

const INSPECTION_COLUMNS: &str = "id, store_number, inspected_by, client_date, \
     inspection_date, submitted_at, last_updated, version, categories";

#[async_trait]
impl ChecklistProvider for SqliteProvider {
    async fn fetch_taxonomy(&self) -> Result<Vec<Category>> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
            "SELECT id, title, icon, sort_order FROM categories ORDER BY sort_order ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut categories = Vec::with_capacity(rows.len());
        for (id, title, icon, sort_order) in rows {
            let items = self.fetch_items(&id).await?;
            categories.push(Category {
                id,
                title,
                icon: Icon::resolve(&icon),
                sort_order,
                items,
            });
        }

        Ok(categories)
    }

    async fn create_category(&self, create: CategoryCreate) -> Result<Category> {
        let title = create.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::InvalidInput("category title is required".to_string()));
        }

        let slug = slugify(&title);
        if slug.is_empty() {
            return Err(Error::InvalidInput(format!(
                "category title '{}' does not yield a usable id",
                title
            )));
        }

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = ?")
            .bind(&slug)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Err(Error::InvalidInput(format!(
                "category '{}' already exists",
                slug
            )));
        }

        // New entries go to the end; order values are never compacted
        let sort_order: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        let icon = create.icon.as_deref().map(Icon::resolve).unwrap_or_default();

        sqlx::query("INSERT INTO categories (id, title, icon, sort_order) VALUES (?, ?, ?, ?)")
            .bind(&slug)
            .bind(&title)
            .bind(icon.name())
            .bind(sort_order)
            .execute(&self.pool)
            .await?;

        Ok(Category {
            id: slug,
            title,
            icon,
            sort_order,
            items: Vec::new(),
        })
    }

    async fn update_category(&self, id: &str, update: CategoryUpdate) -> Result<Category> {
        let current = self.fetch_category(id).await?;

        let title = match update.title {
            Some(title) => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(Error::InvalidInput("category title is required".to_string()));
                }
                title
            }
            None => current.title,
        };
        let icon = update
            .icon
            .as_deref()
            .map(Icon::resolve)
            .unwrap_or(current.icon);

        sqlx::query(
            "UPDATE categories SET title = ?, icon = ?, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?",
        )
        .bind(&title)
        .bind(icon.name())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Category {
            id: current.id,
            title,
            icon,
            sort_order: current.sort_order,
            items: current.items,
        })
    }

    async fn delete_category(&self, id: &str) -> Result<()> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if existing == 0 {
            return Err(Error::NotFound(format!("category '{}'", id)));
        }

        // Items first so the category row never dangles references.
        // Sequential, not a transaction; a failure between the two deletes
        // leaves the category intact with fewer items.
        sqlx::query("DELETE FROM items WHERE category_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_item(&self, category_id: &str, create: ItemCreate) -> Result<ChecklistItem> {
        let description = create.description.trim().to_string();
        if description.is_empty() {
            return Err(Error::InvalidInput("item description is required".to_string()));
        }

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;
        if existing == 0 {
            return Err(Error::NotFound(format!("category '{}'", category_id)));
        }

        let sort_order: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE category_id = ?")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO items (id, category_id, description, sort_order) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(category_id)
        .bind(&description)
        .bind(sort_order)
        .execute(&self.pool)
        .await?;

        Ok(ChecklistItem {
            id,
            category_id: category_id.to_string(),
            description,
            sort_order,
        })
    }

    async fn update_item_description(
        &self,
        item_id: &str,
        description: &str,
    ) -> Result<ChecklistItem> {
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(Error::InvalidInput("item description is required".to_string()));
        }

        let row: Option<(String, String, i64)> =
            sqlx::query_as("SELECT id, category_id, sort_order FROM items WHERE id = ?")
                .bind(item_id)
                .fetch_optional(&self.pool)
                .await?;
        let (id, category_id, sort_order) =
            row.ok_or_else(|| Error::NotFound(format!("item '{}'", item_id)))?;

        sqlx::query(
            "UPDATE items SET description = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(&description)
        .bind(&id)
        .execute(&self.pool)
        .await?;

        Ok(ChecklistItem {
            id,
            category_id,
            description,
            sort_order,
        })
    }

    async fn delete_item(&self, item_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("item '{}'", item_id)));
        }
        Ok(())
    }

    async fn submit_inspection(&self, payload: &SubmissionPayload) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let categories_blob = serde_json::to_string(&payload.categories)?;

        sqlx::query(
            "INSERT INTO inspections (id, store_number, inspected_by, client_date, categories) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&payload.store_number)
        .bind(&payload.inspected_by)
        .bind(&payload.client_date)
        .bind(&categories_blob)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_inspection(&self, id: &str) -> Result<InspectionRecord> {
        let row: Option<(String, String, String, String, String, String, String, i64, String)> =
            sqlx::query_as(&format!(
                "SELECT {} FROM inspections WHERE id = ?",
                INSPECTION_COLUMNS
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| Error::NotFound(format!("inspection '{}'", id)))?;
        Self::record_from_row(row)
    }

    async fn list_recent_inspections(&self, limit: i64) -> Result<Vec<InspectionRecord>> {
        let rows: Vec<(String, String, String, String, String, String, String, i64, String)> =
            sqlx::query_as(&format!(
                "SELECT {} FROM inspections ORDER BY submitted_at DESC, rowid DESC LIMIT ?",
                INSPECTION_COLUMNS
            ))
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::record_from_row).collect()
    }

    async fn update_issue_status(
        &self,
        inspection_id: &str,
        category_id: &str,
        item_id: &str,
        fixed: bool,
    ) -> Result<InspectionRecord> {
        let record = self.get_inspection(inspection_id).await?;

        let mut categories = record.categories;
        let item = categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .and_then(|c| c.items.iter_mut().find(|i| i.id == item_id))
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "item '{}' in category '{}' of inspection '{}'",
                    item_id, category_id, inspection_id
                ))
            })?;
        item.fixed = fixed;

        let categories_blob = serde_json::to_string(&categories)?;

        // Versioned write: a concurrent rewrite since our read makes this
        // match zero rows, surfacing a conflict instead of losing the other
        // writer's change
        let result = sqlx::query(
            "UPDATE inspections \
             SET categories = ?, version = version + 1, last_updated = CURRENT_TIMESTAMP \
             WHERE id = ? AND version = ?",
        )
        .bind(&categories_blob)
        .bind(inspection_id)
        .bind(record.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict(format!(
                "inspection '{}' was modified concurrently",
                inspection_id
            )));
        }

        self.get_inspection(inspection_id).await
    }
}
