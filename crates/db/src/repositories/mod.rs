use async_trait::async_trait;
use thiserror::Error;

use agrimall_core::domain::collection::Collection;
use agrimall_core::domain::order::{OrderHeader, OrderId, OrderItem};
use agrimall_core::domain::product::{Product, ProductId};

pub mod collect;
pub mod memory;
pub mod order;
pub mod product;

pub use collect::SqlCollectRepository;
pub use memory::{InMemoryCollectRepository, InMemoryOrderRepository, InMemoryProductRepository};
pub use order::SqlOrderRepository;
pub use product::SqlProductRepository;

/// SQLite caps bound parameters per statement; id batches are split to stay under it.
pub(crate) const BIND_CHUNK_SIZE: usize = 500;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<OrderHeader>, RepositoryError>;

    async fn list_items_by_order_ids(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<OrderItem>, RepositoryError>;

    /// Writes the order header and replaces its lines.
    async fn save(&self, order: OrderHeader, items: Vec<OrderItem>) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CollectRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Collection>, RepositoryError>;
    async fn save(&self, collection: Collection) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Unordered; ids with no product are absent from the result.
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    /// Highest `sales_count` first, ties by ascending id.
    async fn top_selling(&self, limit: usize) -> Result<Vec<Product>, RepositoryError>;

    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
}
