use std::sync::Arc;

use agrimall_core::config::{AppConfig, ConfigError, LoadOptions};
use agrimall_core::recommend::RecommendService;
use agrimall_db::{connect_with_settings, migrations, DbPool, SqlRecommendationStore};
use thiserror::Error;
use tracing::info;

pub type StorefrontRecommender = RecommendService<SqlRecommendationStore>;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub recommender: Arc<StorefrontRecommender>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let settings = config.recommend.settings()?;

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let recommender = Arc::new(RecommendService::with_settings(
        SqlRecommendationStore::from_pool(db_pool.clone()),
        settings,
    ));
    info!(
        event_name = "system.bootstrap.recommender_ready",
        correlation_id = "bootstrap",
        default_limit = settings.default_limit,
        purchase_weight = settings.weights.purchase,
        collect_weight = settings.weights.collect,
        "recommendation service configured"
    );

    Ok(Application { config, db_pool, recommender })
}
