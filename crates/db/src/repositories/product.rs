use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{QueryBuilder, Row, Sqlite};

use agrimall_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError, BIND_CHUNK_SIZE};
use crate::DbPool;

const PRODUCT_COLUMNS: &str = "id, product_name, info, product_pic, price, stock, sell_num";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String =
        row.try_get("product_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let info: String = row.try_get("info").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let picture: Option<String> =
        row.try_get("product_pic").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price_str: String =
        row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let stock: i64 = row.try_get("stock").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let sales_count: i64 =
        row.try_get("sell_num").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let price = Decimal::from_str(&price_str).map_err(|e| {
        RepositoryError::Decode(format!("product {id} has invalid price `{price_str}`: {e}"))
    })?;

    Ok(Product { id: ProductId(id), name, info, picture, price, stock, sales_count })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let mut products = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(BIND_CHUNK_SIZE) {
            let mut builder: QueryBuilder<'_, Sqlite> =
                QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id IN ("));
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(id.0);
            }
            separated.push_unseparated(")");

            let rows = builder.build().fetch_all(&self.pool).await?;
            for row in &rows {
                products.push(row_to_product(row)?);
            }
        }

        Ok(products)
    }

    async fn top_selling(&self, limit: usize) -> Result<Vec<Product>, RepositoryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY sell_num DESC, id ASC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product (id, product_name, info, product_pic, price, stock, sell_num)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 product_name = excluded.product_name,
                 info = excluded.info,
                 product_pic = excluded.product_pic,
                 price = excluded.price,
                 stock = excluded.stock,
                 sell_num = excluded.sell_num",
        )
        .bind(product.id.0)
        .bind(&product.name)
        .bind(&product.info)
        .bind(&product.picture)
        .bind(product.price.to_string())
        .bind(product.stock)
        .bind(product.sales_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
