use agrimall_db::{connect_with_settings, migrations, DemoCatalog, VerificationResult};

use crate::commands::{
    build_runtime, load_config, CommandResult, StepFailure, EXIT_DB_CONNECTIVITY, EXIT_EXECUTION,
};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("seed") {
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

        let seeded = DemoCatalog::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_EXECUTION))?;

        let verification = DemoCatalog::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), EXIT_EXECUTION))?;

        pool.close().await;

        if !verification.all_present {
            return Err(("seed_verification", verification_failure_message(&verification), EXIT_EXECUTION));
        }

        let tables = seeded
            .tables_seeded
            .iter()
            .map(|table| format!("  - {}: {} rows", table.table, table.rows))
            .collect::<Vec<_>>();
        Ok::<Vec<String>, StepFailure>(tables)
    });

    match result {
        Ok(tables) => CommandResult::success(
            "seed",
            format!("demo storefront catalog loaded:\n{}", tables.join("\n")),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn verification_failure_message(verification: &VerificationResult) -> String {
    let failed_checks = verification.failed_checks();
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}
