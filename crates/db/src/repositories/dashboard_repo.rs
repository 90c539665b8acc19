//! Repository for the `dashboards` and `dashboard_fields` tables.

use flowboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::{
    CreateDashboard, Dashboard, DashboardField, DashboardWithFields,
};

/// Column list for `dashboards` queries.
const COLUMNS: &str = "\
    id, name, description, workflow_id, instance_id, theme_color, \
    created_at, updated_at";

/// Column list for `dashboard_fields` queries.
const FIELD_COLUMNS: &str = "\
    id, dashboard_id, position, key, kind, label, required, \
    default_value, description, constraints";

/// Provides CRUD operations for dashboards and their field definitions.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Create a dashboard and its field definitions in one transaction.
    /// Field positions follow the order of the request.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDashboard,
    ) -> Result<DashboardWithFields, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO dashboards (name, description, workflow_id, instance_id, theme_color) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let dashboard = sqlx::query_as::<_, Dashboard>(&query)
            .bind(&input.name)
            .bind(input.description.as_deref())
            .bind(&input.workflow_id)
            .bind(input.instance_id)
            .bind(&input.theme_color)
            .fetch_one(&mut *tx)
            .await?;

        let field_query = format!(
            "INSERT INTO dashboard_fields (\
                dashboard_id, position, key, kind, label, required, \
                default_value, description, constraints\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {FIELD_COLUMNS}"
        );
        let mut fields = Vec::with_capacity(input.fields.len());
        for (position, field) in input.fields.iter().enumerate() {
            let row = sqlx::query_as::<_, DashboardField>(&field_query)
                .bind(dashboard.id)
                .bind(position as i32)
                .bind(&field.key)
                .bind(&field.kind)
                .bind(&field.label)
                .bind(field.required)
                .bind(field.default_value.as_ref())
                .bind(field.description.as_deref())
                .bind(field.constraints.as_ref())
                .fetch_one(&mut *tx)
                .await?;
            fields.push(row);
        }

        tx.commit().await?;
        Ok(DashboardWithFields { dashboard, fields })
    }

    /// Find a dashboard with its ordered fields.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DashboardWithFields>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dashboards WHERE id = $1");
        let Some(dashboard) = sqlx::query_as::<_, Dashboard>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let fields = Self::fields_for(pool, id).await?;
        Ok(Some(DashboardWithFields { dashboard, fields }))
    }

    /// List all dashboards, newest first, without their fields.
    pub async fn list(pool: &PgPool) -> Result<Vec<Dashboard>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dashboards ORDER BY created_at DESC");
        sqlx::query_as::<_, Dashboard>(&query)
            .fetch_all(pool)
            .await
    }

    /// Get the ordered field definitions for a dashboard.
    pub async fn fields_for(
        pool: &PgPool,
        dashboard_id: DbId,
    ) -> Result<Vec<DashboardField>, sqlx::Error> {
        let query = format!(
            "SELECT {FIELD_COLUMNS} FROM dashboard_fields \
             WHERE dashboard_id = $1 ORDER BY position"
        );
        sqlx::query_as::<_, DashboardField>(&query)
            .bind(dashboard_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a dashboard by ID. Field rows cascade. Returns true if a
    /// row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dashboards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
