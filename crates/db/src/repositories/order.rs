use sqlx::{QueryBuilder, Row, Sqlite};

use agrimall_core::domain::order::{OrderHeader, OrderId, OrderItem};
use agrimall_core::domain::product::ProductId;
use agrimall_core::domain::user::UserId;

use super::{OrderRepository, RepositoryError, BIND_CHUNK_SIZE};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_header(row: &sqlx::sqlite::SqliteRow) -> Result<OrderHeader, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let user_id: Option<i64> =
        row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(OrderHeader { id: OrderId(id), user_id: user_id.map(UserId) })
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<OrderItem, RepositoryError> {
    let order_id: i64 =
        row.try_get("order_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let product_id: Option<i64> =
        row.try_get("product_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(OrderItem { order_id: OrderId(order_id), product_id: product_id.map(ProductId) })
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn list_all(&self) -> Result<Vec<OrderHeader>, RepositoryError> {
        let rows = sqlx::query("SELECT id, user_id FROM orders ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_header).collect::<Result<Vec<_>, _>>()
    }

    async fn list_items_by_order_ids(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut items = Vec::new();

        for chunk in order_ids.chunks(BIND_CHUNK_SIZE) {
            let mut builder: QueryBuilder<'_, Sqlite> =
                QueryBuilder::new("SELECT order_id, product_id FROM order_item WHERE order_id IN (");
            let mut separated = builder.separated(", ");
            for order_id in chunk {
                separated.push_bind(order_id.0);
            }
            separated.push_unseparated(")");
            builder.push(" ORDER BY id ASC");

            let rows = builder.build().fetch_all(&self.pool).await?;
            for row in &rows {
                items.push(row_to_item(row)?);
            }
        }

        Ok(items)
    }

    async fn save(&self, order: OrderHeader, items: Vec<OrderItem>) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, user_id, state) VALUES (?, ?, 0)
             ON CONFLICT(id) DO UPDATE SET user_id = excluded.user_id",
        )
        .bind(order.id.0)
        .bind(order.user_id.map(|user| user.0))
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM order_item WHERE order_id = ?")
            .bind(order.id.0)
            .execute(&mut *tx)
            .await?;

        for item in items {
            sqlx::query("INSERT INTO order_item (order_id, product_id, quantity) VALUES (?, ?, 1)")
                .bind(order.id.0)
                .bind(item.product_id.map(|product| product.0))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
