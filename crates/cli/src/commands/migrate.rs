use agrimall_db::{connect_with_settings, migrations, DbPool};

use crate::commands::{
    build_runtime, load_config, CommandResult, StepFailure, EXIT_DB_CONNECTIVITY, EXIT_EXECUTION,
};

pub fn run() -> CommandResult {
    let config = match load_config("migrate") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("migrate") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_EXECUTION))?;
        let tables = catalog_table_count(&pool).await.map_err(|error| {
            ("migration", format!("failed to inspect catalog schema: {error}"), EXIT_EXECUTION)
        })?;
        pool.close().await;
        Ok::<usize, StepFailure>(tables)
    });

    match result {
        Ok(tables) => CommandResult::success(
            "migrate",
            format!(
                "applied pending migrations; {tables} of {} catalog tables present",
                migrations::CATALOG_TABLES.len()
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}

async fn catalog_table_count(pool: &DbPool) -> Result<usize, String> {
    let mut present = 0;
    for table in migrations::CATALOG_TABLES {
        if migrations::table_exists(pool, table).await.map_err(|error| error.to_string())? {
            present += 1;
        }
    }
    Ok(present)
}
