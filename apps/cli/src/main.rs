//! Scopegate operator CLI for inspecting custom scope resolution.

#![forbid(unsafe_code)]

mod cli_config;

use std::env;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use scopegate_application::CustomScopeService;
use scopegate_core::{AppError, AppResult};
use scopegate_domain::{UserId, format_scope_parameter};
use scopegate_infrastructure::{PostgresCustomScopeRepository, PostgresTransactionalClaimReader};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::cli_config::{CliConfig, Command, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = Command::parse(&args)?;
    let config = CliConfig::load()?;
    let pool = connect_pool(&config).await?;

    let service = CustomScopeService::new(Arc::new(PostgresCustomScopeRepository::new(
        pool.clone(),
    )));

    match command {
        Command::Migrate => run_migrations(&pool).await,
        Command::ListAllScopes => {
            let scopes =
                with_deadline(config.query_timeout, service.list_all_scopes()).await?;
            info!(scope_count = scopes.len(), "listed known custom scopes");
            print_scopes(&scopes);
            Ok(())
        }
        Command::ListUserScopes { user_id } => {
            let mut scopes = with_deadline(
                config.query_timeout,
                service.list_user_scopes(user_id, None),
            )
            .await?;
            scopes.sort();
            info!(%user_id, scope_count = scopes.len(), "listed user custom scopes");
            print_scopes(&scopes);
            Ok(())
        }
        Command::ValidateScopes {
            user_id,
            scope_parameter,
        } => {
            let granted = validate_in_transaction(
                &pool,
                &service,
                user_id,
                scope_parameter.as_str(),
                config.query_timeout,
            )
            .await?;
            println!("{}", format_scope_parameter(&granted));
            Ok(())
        }
    }
}

async fn connect_pool(config: &CliConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.query_timeout)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    info!("database migrations applied");
    Ok(())
}

async fn validate_in_transaction(
    pool: &PgPool,
    service: &CustomScopeService,
    user_id: UserId,
    scope_parameter: &str,
    deadline: Duration,
) -> AppResult<Vec<String>> {
    let transaction = pool
        .begin()
        .await
        .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;
    let reader = PostgresTransactionalClaimReader::new(transaction);

    let granted = with_deadline(
        deadline,
        service.validate_scope_parameter(user_id, scope_parameter, Some(&reader)),
    )
    .await?;

    reader
        .into_inner()
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))?;

    info!(
        %user_id,
        requested = %scope_parameter,
        granted = granted.len(),
        "validated requested scopes"
    );

    Ok(granted)
}

async fn with_deadline<T>(
    deadline: Duration,
    operation: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    tokio::time::timeout(deadline, operation)
        .await
        .map_err(|_| {
            AppError::Internal(format!(
                "scope lookup timed out after {}ms",
                deadline.as_millis()
            ))
        })?
}

fn print_scopes(scopes: &[String]) {
    for scope in scopes {
        println!("{scope}");
    }
}
