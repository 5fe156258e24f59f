use rezervo_core::models::{Tenant, TenantSettings, TenantStatus};
use rezervo_core::AppError;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Row shape for the tenants table; settings live in a jsonb column.
#[derive(sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    status: TenantStatus,
    settings: Json<TenantSettings>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TenantRow {
    fn into_tenant(self) -> Tenant {
        Tenant {
            id: self.id,
            name: self.name,
            status: self.status,
            settings: self.settings.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenants", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        let row: Option<TenantRow> =
            sqlx::query_as::<Postgres, TenantRow>("SELECT * FROM tenants WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(TenantRow::into_tenant))
    }
}
