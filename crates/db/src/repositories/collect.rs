use sqlx::Row;

use agrimall_core::domain::collection::Collection;
use agrimall_core::domain::product::ProductId;
use agrimall_core::domain::user::UserId;

use super::{CollectRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCollectRepository {
    pool: DbPool,
}

impl SqlCollectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_collection(row: &sqlx::sqlite::SqliteRow) -> Result<Collection, RepositoryError> {
    let user_id: Option<i64> =
        row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let product_id: Option<i64> =
        row.try_get("product_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Collection { user_id: user_id.map(UserId), product_id: product_id.map(ProductId) })
}

#[async_trait::async_trait]
impl CollectRepository for SqlCollectRepository {
    async fn list_all(&self) -> Result<Vec<Collection>, RepositoryError> {
        let rows = sqlx::query("SELECT user_id, product_id FROM collect ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_collection).collect::<Result<Vec<_>, _>>()
    }

    async fn save(&self, collection: Collection) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO collect (user_id, product_id) VALUES (?, ?)")
            .bind(collection.user_id.map(|user| user.0))
            .bind(collection.product_id.map(|product| product.0))
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
