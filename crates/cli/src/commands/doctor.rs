use agrimall_core::config::{AppConfig, LoadOptions};
use agrimall_db::{connect_with_settings, migrations};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_DB_CONNECTIVITY, EXIT_EXECUTION};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

/// Runs every readiness check. The first failing check decides the exit code;
/// `human` swaps the JSON outcome for a plain checklist.
pub fn run(human: bool) -> CommandResult {
    let report = build_report();
    let failure = report.checks.iter().find_map(failure_class);

    if human {
        let exit_code = failure.map_or(0, |(_, exit_code)| exit_code);
        return CommandResult { exit_code, output: render_human(&report) };
    }

    match failure {
        None => CommandResult::success_with_data("doctor", report.summary.clone(), &report),
        Some((error_class, exit_code)) => CommandResult::failure_with_data(
            "doctor",
            error_class,
            report.summary.clone(),
            exit_code,
            &report,
        ),
    }
}

/// Error class and exit code for a failed check, `None` for passing or skipped ones.
fn failure_class(check: &DoctorCheck) -> Option<(&'static str, u8)> {
    if check.status != CheckStatus::Fail {
        return None;
    }
    match check.name {
        "config_validation" | "recommend_settings" => Some(("config_validation", EXIT_CONFIG)),
        "database_connectivity" => Some(("db_connectivity", EXIT_DB_CONNECTIVITY)),
        _ => Some((check.name, EXIT_EXECUTION)),
    }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_recommend_settings(&config));
            checks.extend(check_database(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["recommend_settings", "database_connectivity", "catalog_schema"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_recommend_settings(config: &AppConfig) -> DoctorCheck {
    match config.recommend.settings() {
        Ok(settings) => DoctorCheck {
            name: "recommend_settings",
            status: CheckStatus::Pass,
            details: format!(
                "default_limit={} purchase_weight={} collect_weight={} popular_pool_factor={}",
                settings.default_limit,
                settings.weights.purchase,
                settings.weights.collect,
                settings.popular_pool_factor
            ),
        },
        Err(error) => DoctorCheck {
            name: "recommend_settings",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

/// Connectivity first; the schema check only runs against a reachable database.
fn check_database(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![
                DoctorCheck {
                    name: "database_connectivity",
                    status: CheckStatus::Fail,
                    details: format!("failed to initialize async runtime: {error}"),
                },
                skipped_schema_check(),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    DoctorCheck {
                        name: "database_connectivity",
                        status: CheckStatus::Fail,
                        details: format!("failed to connect to database: {error}"),
                    },
                    skipped_schema_check(),
                ];
            }
        };

        let connectivity = DoctorCheck {
            name: "database_connectivity",
            status: CheckStatus::Pass,
            details: format!("connected using `{}`", config.database.url),
        };

        let mut missing = Vec::new();
        let mut lookup_error = None;
        for table in migrations::CATALOG_TABLES {
            match migrations::table_exists(&pool, table).await {
                Ok(true) => {}
                Ok(false) => missing.push(*table),
                Err(error) => {
                    lookup_error = Some(error.to_string());
                    break;
                }
            }
        }
        pool.close().await;

        let schema = match (lookup_error, missing.is_empty()) {
            (Some(error), _) => DoctorCheck {
                name: "catalog_schema",
                status: CheckStatus::Fail,
                details: format!("failed to inspect schema: {error}"),
            },
            (None, true) => DoctorCheck {
                name: "catalog_schema",
                status: CheckStatus::Pass,
                details: "catalog tables present".to_string(),
            },
            (None, false) => DoctorCheck {
                name: "catalog_schema",
                status: CheckStatus::Fail,
                details: format!(
                    "missing tables: {}; run `agrimall migrate`",
                    missing.join(", ")
                ),
            },
        };

        vec![connectivity, schema]
    })
}

fn skipped_schema_check() -> DoctorCheck {
    DoctorCheck {
        name: "catalog_schema",
        status: CheckStatus::Skipped,
        details: "skipped because the database is unreachable".to_string(),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
