use std::future::Future;
use std::sync::Arc;

use agrimall_core::domain::product::Product;
use agrimall_core::domain::user::UserId;
use agrimall_core::recommend::{RecommendService, Recommendation};
use agrimall_db::{connect_with_settings, SqlRecommendationStore};
use serde::Serialize;

use crate::commands::{
    build_runtime, load_config, CommandResult, StepFailure, EXIT_CONFIG, EXIT_DB_CONNECTIVITY,
    EXIT_EXECUTION,
};

#[derive(Debug, Serialize)]
struct RecommendOutput {
    user_id: Option<i64>,
    #[serde(flatten)]
    recommendation: Recommendation,
}

#[derive(Debug, Serialize)]
struct PopularOutput {
    products: Vec<Product>,
}

/// `agrimall recommend --user <id>`: the personalised list the storefront would serve.
pub fn run(user: Option<i64>, size: i64, page: i64) -> CommandResult {
    let outcome = with_service("recommend", |service| async move {
        service
            .recommend(user.map(UserId), size, page)
            .await
            .map_err(|error| ("query", error.to_string(), EXIT_EXECUTION))
    });

    match outcome {
        Ok(recommendation) => {
            let message = format!(
                "{} products via {} path ({} personalised)",
                recommendation.products.len(),
                recommendation.path.as_str(),
                recommendation.personalized_count
            );
            CommandResult::success_with_data(
                "recommend",
                message,
                RecommendOutput { user_id: user, recommendation },
            )
        }
        Err(failure) => failure,
    }
}

/// `agrimall popular`: the best-seller window for a page.
pub fn run_popular(size: i64, page: i64) -> CommandResult {
    let outcome = with_service("popular", |service| async move {
        service
            .popular(size, page)
            .await
            .map_err(|error| ("query", error.to_string(), EXIT_EXECUTION))
    });

    match outcome {
        Ok(products) => CommandResult::success_with_data(
            "popular",
            format!("{} products", products.len()),
            PopularOutput { products },
        ),
        Err(failure) => failure,
    }
}

type CliRecommender = RecommendService<SqlRecommendationStore>;

/// Loads config, opens the pool and hands a configured service to `query`.
fn with_service<T, F, Fut>(command: &str, query: F) -> Result<T, CommandResult>
where
    F: FnOnce(Arc<CliRecommender>) -> Fut,
    Fut: Future<Output = Result<T, StepFailure>>,
{
    let config = load_config(command)?;
    let settings = config.recommend.settings().map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    })?;
    let runtime = build_runtime(command)?;

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;

        let service = Arc::new(RecommendService::with_settings(
            SqlRecommendationStore::from_pool(pool.clone()),
            settings,
        ));
        let output = query(service).await;
        pool.close().await;
        output
    });

    result.map_err(|(error_class, message, exit_code)| {
        CommandResult::failure(command, error_class, message, exit_code)
    })
}
