//! # Category Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use teknoroma_core::{Category, Visibility};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a category, stamping `created_at`.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - an active category has this name
    pub async fn insert(&self, category: &Category) -> DbResult<Category> {
        debug!(id = %category.id, name = %category.name, "Inserting category");

        let mut category = category.clone();
        category.created_at = Utc::now();
        category.modified_at = None;

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, is_deleted, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.is_deleted)
        .bind(category.created_at)
        .bind(category.modified_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &category.name),
            other => other,
        })?;

        Ok(category)
    }

    pub async fn get_by_id(&self, id: &str, visibility: Visibility) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = ? AND (? OR is_deleted = 0)",
        )
        .bind(id)
        .bind(visibility.includes_deleted())
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Finds the active category with this exact name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE name = ? AND is_deleted = 0",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn list(&self, visibility: Visibility) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE (? OR is_deleted = 0) ORDER BY name",
        )
        .bind(visibility.includes_deleted())
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Updates name and description of an active category.
    pub async fn update(&self, category: &Category) -> DbResult<Category> {
        debug!(id = %category.id, "Updating category");

        let result = sqlx::query(
            r#"
            UPDATE categories SET name = ?, description = ?, modified_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(Utc::now())
        .bind(&category.id)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &category.name),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", &category.id));
        }

        self.get_by_id(&category.id, Visibility::Active)
            .await?
            .ok_or_else(|| DbError::not_found("Category", &category.id))
    }

    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "categories", "Category", id, true).await
    }

    pub async fn restore(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "categories", "Category", id, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::new_id;

    fn category(name: &str) -> Category {
        Category {
            id: new_id(),
            name: name.to_string(),
            description: None,
            is_deleted: false,
            created_at: Utc::now(),
            modified_at: None,
        }
    }

    #[tokio::test]
    async fn test_soft_delete_visibility() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let laptops = repo.insert(&category("Laptops")).await.unwrap();
        repo.insert(&category("Phones")).await.unwrap();
        repo.soft_delete(&laptops.id).await.unwrap();

        let active = repo.list(Visibility::Active).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Phones");

        let all = repo.list(Visibility::IncludeDeleted).await.unwrap();
        assert_eq!(all.len(), 2);

        assert!(repo.get_by_id(&laptops.id, Visibility::Active).await.unwrap().is_none());
        let deleted = repo
            .get_by_id(&laptops.id, Visibility::IncludeDeleted)
            .await
            .unwrap()
            .unwrap();
        assert!(deleted.is_deleted);
        assert!(deleted.modified_at.is_some());

        repo.restore(&laptops.id).await.unwrap();
        assert_eq!(repo.list(Visibility::Active).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_name_among_active() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let first = repo.insert(&category("Tablets")).await.unwrap();
        let err = repo.insert(&category("Tablets")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // A deleted row no longer reserves the name.
        repo.soft_delete(&first.id).await.unwrap();
        assert!(repo.insert(&category("Tablets")).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let c = repo.insert(&category("Audio")).await.unwrap();
        repo.soft_delete(&c.id).await.unwrap();
        assert!(matches!(
            repo.soft_delete(&c.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
