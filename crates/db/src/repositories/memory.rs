use std::collections::HashMap;

use tokio::sync::RwLock;

use agrimall_core::domain::collection::Collection;
use agrimall_core::domain::order::{OrderHeader, OrderId, OrderItem};
use agrimall_core::domain::product::{Product, ProductId};

use super::{CollectRepository, OrderRepository, ProductRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, (OrderHeader, Vec<OrderItem>)>>,
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn list_all(&self) -> Result<Vec<OrderHeader>, RepositoryError> {
        let orders = self.orders.read().await;
        let mut headers: Vec<OrderHeader> = orders.values().map(|(header, _)| *header).collect();
        headers.sort_by_key(|header| header.id);
        Ok(headers)
    }

    async fn list_items_by_order_ids(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(order_ids
            .iter()
            .filter_map(|id| orders.get(id))
            .flat_map(|(_, items)| items.iter().copied())
            .collect())
    }

    async fn save(&self, order: OrderHeader, items: Vec<OrderItem>) -> Result<(), RepositoryError> {
        let items = items.into_iter().map(|item| OrderItem { order_id: order.id, ..item }).collect();
        let mut orders = self.orders.write().await;
        orders.insert(order.id, (order, items));
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCollectRepository {
    collections: RwLock<Vec<Collection>>,
}

#[async_trait::async_trait]
impl CollectRepository for InMemoryCollectRepository {
    async fn list_all(&self) -> Result<Vec<Collection>, RepositoryError> {
        Ok(self.collections.read().await.clone())
    }

    async fn save(&self, collection: Collection) -> Result<(), RepositoryError> {
        self.collections.write().await.push(collection);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<ProductId, Product>>,
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn top_selling(&self, limit: usize) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        let mut ranked: Vec<Product> = products.values().cloned().collect();
        ranked.sort_by(|a, b| b.sales_count.cmp(&a.sales_count).then(a.id.cmp(&b.id)));
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products.insert(product.id, product);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use agrimall_core::domain::order::{OrderHeader, OrderId, OrderItem};
    use agrimall_core::domain::product::{Product, ProductId};
    use agrimall_core::domain::user::UserId;

    use crate::repositories::{
        InMemoryOrderRepository, InMemoryProductRepository, OrderRepository, ProductRepository,
    };

    fn product(id: i64, sales_count: i64) -> Product {
        Product {
            id: ProductId(id),
            name: "Mulch film".to_string(),
            info: String::new(),
            picture: None,
            price: Decimal::new(500, 2),
            stock: 1,
            sales_count,
        }
    }

    #[tokio::test]
    async fn in_memory_order_repo_round_trip() {
        let repo = InMemoryOrderRepository::default();
        let header = OrderHeader { id: OrderId(1), user_id: Some(UserId(3)) };
        let item = OrderItem { order_id: OrderId(1), product_id: Some(ProductId(8)) };

        repo.save(header, vec![item]).await.expect("save order");

        assert_eq!(repo.list_all().await.expect("list"), vec![header]);
        assert_eq!(
            repo.list_items_by_order_ids(&[OrderId(1), OrderId(2)]).await.expect("items"),
            vec![item]
        );
    }

    #[tokio::test]
    async fn in_memory_top_selling_breaks_ties_by_id() {
        let repo = InMemoryProductRepository::default();
        for (id, sales) in [(4, 10), (2, 30), (3, 30), (1, 5)] {
            repo.save(product(id, sales)).await.expect("save product");
        }

        let top = repo.top_selling(3).await.expect("top selling");
        let ids: Vec<i64> = top.iter().map(|product| product.id.0).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }
}
