use agrimall_core::domain::product::ProductId;
use agrimall_db::repositories::{
    CollectRepository, OrderRepository, ProductRepository, SqlCollectRepository,
    SqlOrderRepository, SqlProductRepository,
};
use agrimall_db::{connect_with_settings, migrations, DemoCatalog, DbPool};

type ContractResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

async fn seeded_pool() -> ContractResult<DbPool> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect failed: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrations failed: {error}"))?;
    DemoCatalog::load(&pool).await.map_err(|error| format!("seed failed: {error}"))?;
    Ok(pool)
}

#[tokio::test]
async fn every_seeded_product_decodes() -> ContractResult {
    let pool = seeded_pool().await?;
    let repo = SqlProductRepository::new(pool);

    let ids: Vec<ProductId> = (1..=12).map(ProductId).collect();
    let products = repo.find_by_ids(&ids).await.map_err(|error| error.to_string())?;
    require!(products.len() == 12, "expected 12 products, found {}", products.len());

    for product in &products {
        require!(!product.name.trim().is_empty(), "product {} has no name", product.id);
        require!(product.price.is_sign_positive(), "product {} has a negative price", product.id);
    }
    Ok(())
}

#[tokio::test]
async fn top_sellers_are_ranked_by_sales_then_id() -> ContractResult {
    let pool = seeded_pool().await?;
    let repo = SqlProductRepository::new(pool);

    let ranked = repo.top_selling(12).await.map_err(|error| error.to_string())?;
    for pair in ranked.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let ordered = a.sales_count > b.sales_count
            || (a.sales_count == b.sales_count && a.id < b.id);
        require!(ordered, "products {} and {} are out of order", a.id, b.id);
    }
    Ok(())
}

#[tokio::test]
async fn history_references_only_known_or_delisted_products() -> ContractResult {
    let pool = seeded_pool().await?;
    let orders = SqlOrderRepository::new(pool.clone());
    let collections = SqlCollectRepository::new(pool);

    let headers = orders.list_all().await.map_err(|error| error.to_string())?;
    let order_ids: Vec<_> = headers.iter().map(|header| header.id).collect();
    let items =
        orders.list_items_by_order_ids(&order_ids).await.map_err(|error| error.to_string())?;
    require!(items.len() == 12, "expected 12 order lines, found {}", items.len());

    for product_id in items.iter().filter_map(|item| item.product_id) {
        require!(
            (1..=12).contains(&product_id.0) || product_id.0 == 99,
            "order line references unexpected product {product_id}"
        );
    }

    let saved = collections.list_all().await.map_err(|error| error.to_string())?;
    require!(
        saved.iter().any(|row| row.user_id.is_none()),
        "demo catalog should include an ownerless collection"
    );
    Ok(())
}
