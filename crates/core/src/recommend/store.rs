use async_trait::async_trait;

use crate::domain::collection::Collection;
use crate::domain::order::{OrderHeader, OrderId, OrderItem};
use crate::domain::product::{Product, ProductId};
use crate::errors::ApplicationError;

/// Read-only feeds the engine pulls from on every call.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn list_all_orders(&self) -> Result<Vec<OrderHeader>, ApplicationError>;

    async fn list_order_items_by_order_ids(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<OrderItem>, ApplicationError>;

    async fn list_all_collections(&self) -> Result<Vec<Collection>, ApplicationError>;

    /// Products for the given ids, in no particular order. Unknown ids are absent.
    async fn find_products_by_ids(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<Product>, ApplicationError>;

    /// Best sellers first, at most `limit` of them.
    async fn top_selling_products(&self, limit: usize) -> Result<Vec<Product>, ApplicationError>;
}
