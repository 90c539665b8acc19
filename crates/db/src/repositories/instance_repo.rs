//! Repository for the `instances` table.

use flowboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::instance::{CreateInstance, Instance, UpdateInstance};

/// Column list for `instances` queries.
const COLUMNS: &str = "id, name, url, api_key, is_active, created_at, updated_at";

/// Provides CRUD operations for connected workflow-automation instances.
pub struct InstanceRepo;

impl InstanceRepo {
    /// Register a new instance.
    pub async fn create(pool: &PgPool, input: &CreateInstance) -> Result<Instance, sqlx::Error> {
        let query = format!(
            "INSERT INTO instances (name, url, api_key) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Instance>(&query)
            .bind(&input.name)
            .bind(&input.url)
            .bind(&input.api_key)
            .fetch_one(pool)
            .await
    }

    /// Find an instance by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Instance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM instances WHERE id = $1");
        sqlx::query_as::<_, Instance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active instances, newest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Instance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM instances \
             WHERE is_active = TRUE ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Instance>(&query).fetch_all(pool).await
    }

    /// Update an instance's connection settings.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInstance,
    ) -> Result<Option<Instance>, sqlx::Error> {
        let query = format!(
            "UPDATE instances SET \
                name = COALESCE($2, name), \
                url = COALESCE($3, url), \
                api_key = COALESCE($4, api_key), \
                is_active = COALESCE($5, is_active), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Instance>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.url.as_deref())
            .bind(input.api_key.as_deref())
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an instance by marking it inactive. Returns true if a
    /// row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE instances SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
