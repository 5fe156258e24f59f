use rezervo_core::models::Guest;
use rezervo_core::{AppError, TenantScope};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct GuestRepository {
    pool: PgPool,
}

impl GuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "guests", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, scope: TenantScope, id: Uuid) -> Result<Option<Guest>, AppError> {
        let row: Option<Guest> = match scope.tenant_filter() {
            Some(tenant_id) => {
                sqlx::query_as::<Postgres, Guest>(
                    "SELECT * FROM guests WHERE tenant_id = $1 AND id = $2",
                )
                .bind(tenant_id)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<Postgres, Guest>("SELECT * FROM guests WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(row)
    }
}
