use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Expected row counts for each seeded table.
const SEED_TABLES: &[SeedTableContract] = &[
    SeedTableContract { table: "product", label: "products", expected_rows: 12 },
    SeedTableContract { table: "orders", label: "orders", expected_rows: 6 },
    SeedTableContract { table: "order_item", label: "order-items", expected_rows: 12 },
    SeedTableContract { table: "collect", label: "collections", expected_rows: 6 },
];

/// Rows the aggregator has to tolerate: an ownerless order, a delisted product
/// line, a line without a product and a collection without a user.
const SEED_EDGE_ROWS: &[(&str, &str)] = &[
    ("ownerless-order", "SELECT EXISTS(SELECT 1 FROM orders WHERE id = 1006 AND user_id IS NULL)"),
    (
        "delisted-product-line",
        "SELECT EXISTS(SELECT 1 FROM order_item oi LEFT JOIN product p ON p.id = oi.product_id
                       WHERE oi.product_id = 99 AND p.id IS NULL)",
    ),
    ("null-product-line", "SELECT EXISTS(SELECT 1 FROM order_item WHERE product_id IS NULL)"),
    ("ownerless-collection", "SELECT EXISTS(SELECT 1 FROM collect WHERE user_id IS NULL)"),
];

/// Demo storefront catalog with purchase and collection history.
pub struct DemoCatalog;

impl DemoCatalog {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_catalog.sql");

    /// Loads the catalog. Re-running replaces the seeded rows in place.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let tables_seeded = SEED_TABLES
            .iter()
            .map(|contract| TableSeedInfo { table: contract.table, rows: contract.expected_rows })
            .collect();

        Ok(SeedResult { tables_seeded })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(SEED_TABLES.len() + SEED_EDGE_ROWS.len());

        for contract in SEED_TABLES {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(1) FROM {}", contract.table))
                .fetch_one(pool)
                .await?;
            checks.push((contract.label, count == contract.expected_rows));
        }

        for (label, sql) in SEED_EDGE_ROWS {
            let present: i64 = sqlx::query_scalar(sql).fetch_one(pool).await?;
            checks.push((*label, present == 1));
        }

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes every row from the catalog tables.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;
        for table in ["order_item", "orders", "collect", "product"] {
            sqlx::query(&format!("DELETE FROM {table}")).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedTableContract {
    table: &'static str,
    label: &'static str,
    expected_rows: i64,
}

#[derive(Debug)]
pub struct SeedResult {
    pub tables_seeded: Vec<TableSeedInfo>,
}

#[derive(Debug)]
pub struct TableSeedInfo {
    pub table: &'static str,
    pub rows: i64,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl VerificationResult {
    pub fn failed_checks(&self) -> Vec<&'static str> {
        self.checks.iter().filter(|(_, ok)| !ok).map(|(label, _)| *label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::DemoCatalog;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn load_then_verify_passes() {
        let pool = setup().await;

        let seeded = DemoCatalog::load(&pool).await.expect("load");
        assert_eq!(seeded.tables_seeded.len(), 4);

        let verification = DemoCatalog::verify(&pool).await.expect("verify");
        assert!(verification.all_present, "failed: {:?}", verification.failed_checks());
    }

    #[tokio::test]
    async fn load_is_repeatable() {
        let pool = setup().await;
        DemoCatalog::load(&pool).await.expect("first load");
        DemoCatalog::load(&pool).await.expect("second load");

        let verification = DemoCatalog::verify(&pool).await.expect("verify");
        assert!(verification.all_present, "failed: {:?}", verification.failed_checks());
    }

    #[tokio::test]
    async fn verify_reports_missing_rows_after_clean() {
        let pool = setup().await;
        DemoCatalog::load(&pool).await.expect("load");
        DemoCatalog::clean(&pool).await.expect("clean");

        let verification = DemoCatalog::verify(&pool).await.expect("verify");
        assert!(!verification.all_present);
        assert!(verification.failed_checks().contains(&"products"));
    }
}
