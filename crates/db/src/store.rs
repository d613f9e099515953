//! Repository-backed implementation of the engine's read port.

use async_trait::async_trait;

use agrimall_core::domain::collection::Collection;
use agrimall_core::domain::order::{OrderHeader, OrderId, OrderItem};
use agrimall_core::domain::product::{Product, ProductId};
use agrimall_core::errors::ApplicationError;
use agrimall_core::recommend::RecommendationStore;

use crate::repositories::{
    CollectRepository, InMemoryCollectRepository, InMemoryOrderRepository,
    InMemoryProductRepository, OrderRepository, ProductRepository, RepositoryError,
    SqlCollectRepository, SqlOrderRepository, SqlProductRepository,
};
use crate::DbPool;

pub type SqlRecommendationStore =
    RepositoryStore<SqlOrderRepository, SqlCollectRepository, SqlProductRepository>;

pub type InMemoryRecommendationStore =
    RepositoryStore<InMemoryOrderRepository, InMemoryCollectRepository, InMemoryProductRepository>;

pub struct RepositoryStore<O, C, P> {
    orders: O,
    collections: C,
    products: P,
}

impl<O, C, P> RepositoryStore<O, C, P> {
    pub fn new(orders: O, collections: C, products: P) -> Self {
        Self { orders, collections, products }
    }

    pub fn orders(&self) -> &O {
        &self.orders
    }

    pub fn collections(&self) -> &C {
        &self.collections
    }

    pub fn products(&self) -> &P {
        &self.products
    }
}

impl SqlRecommendationStore {
    pub fn from_pool(pool: DbPool) -> Self {
        Self::new(
            SqlOrderRepository::new(pool.clone()),
            SqlCollectRepository::new(pool.clone()),
            SqlProductRepository::new(pool),
        )
    }
}

impl Default for InMemoryRecommendationStore {
    fn default() -> Self {
        Self::new(
            InMemoryOrderRepository::default(),
            InMemoryCollectRepository::default(),
            InMemoryProductRepository::default(),
        )
    }
}

fn persistence(error: RepositoryError) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

#[async_trait]
impl<O, C, P> RecommendationStore for RepositoryStore<O, C, P>
where
    O: OrderRepository,
    C: CollectRepository,
    P: ProductRepository,
{
    async fn list_all_orders(&self) -> Result<Vec<OrderHeader>, ApplicationError> {
        self.orders.list_all().await.map_err(persistence)
    }

    async fn list_order_items_by_order_ids(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<OrderItem>, ApplicationError> {
        self.orders.list_items_by_order_ids(order_ids).await.map_err(persistence)
    }

    async fn list_all_collections(&self) -> Result<Vec<Collection>, ApplicationError> {
        self.collections.list_all().await.map_err(persistence)
    }

    async fn find_products_by_ids(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<Product>, ApplicationError> {
        self.products.find_by_ids(product_ids).await.map_err(persistence)
    }

    async fn top_selling_products(&self, limit: usize) -> Result<Vec<Product>, ApplicationError> {
        self.products.top_selling(limit).await.map_err(persistence)
    }
}

#[cfg(test)]
mod tests {
    use agrimall_core::domain::product::ProductId;
    use agrimall_core::domain::user::UserId;
    use agrimall_core::errors::ApplicationError;
    use agrimall_core::recommend::{RecommendService, RecommendationPath, RecommendationStore};

    use super::SqlRecommendationStore;
    use crate::fixtures::DemoCatalog;
    use crate::{connect_with_settings, migrations};

    async fn seeded_store() -> SqlRecommendationStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        DemoCatalog::load(&pool).await.expect("seed");
        SqlRecommendationStore::from_pool(pool)
    }

    fn ids(products: &[agrimall_core::domain::product::Product]) -> Vec<i64> {
        products.iter().map(|product| product.id.0).collect()
    }

    #[tokio::test]
    async fn personalised_list_from_seeded_catalog() {
        let service = RecommendService::new(seeded_store().await);

        let recommendation =
            service.recommend(Some(UserId(1)), 6, 0).await.expect("recommendation");

        assert_eq!(recommendation.path, RecommendationPath::Personalized);
        // product 99 ranks but is delisted, so it drops out before backfill
        assert_eq!(recommendation.personalized_count, 3);
        assert_eq!(ids(&recommendation.products), vec![5, 3, 6, 1, 2, 4]);
    }

    #[tokio::test]
    async fn popular_list_from_seeded_catalog() {
        let service = RecommendService::new(seeded_store().await);

        let first = service.popular(5, 0).await.expect("page 0");
        let second = service.popular(5, 1).await.expect("page 1");

        assert_eq!(ids(&first), vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(&second), vec![6, 7, 8, 9, 10]);
    }

    #[tokio::test]
    async fn unknown_user_is_served_from_popularity() {
        let service = RecommendService::new(seeded_store().await);

        let recommendation = service.recommend(Some(UserId(777)), 4, 0).await.expect("cold start");
        assert_eq!(recommendation.path, RecommendationPath::ColdStart);
        assert_eq!(recommendation.products, service.popular(4, 0).await.expect("popular"));
    }

    #[tokio::test]
    async fn store_keeps_null_rows_and_drops_unknown_products() {
        let store = seeded_store().await;
        let collections = store.list_all_collections().await.expect("collections");
        assert_eq!(collections.len(), 6);

        let found = store
            .find_products_by_ids(&[ProductId(99), ProductId(12)])
            .await
            .expect("products");
        assert_eq!(ids(&found), vec![12]);
    }

    #[tokio::test]
    async fn missing_tables_surface_as_persistence_errors() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        let store = SqlRecommendationStore::from_pool(pool);

        let error = store.list_all_orders().await.expect_err("no schema");
        assert!(matches!(error, ApplicationError::Persistence(_)));
    }
}
