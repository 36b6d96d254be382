use async_trait::async_trait;
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

use scopegate_application::{ClaimKeyUsage, CustomClaimReader, CustomScopeRepository};
use scopegate_core::{AppError, AppResult};
use scopegate_domain::{ClaimOwner, CustomClaim, UserGroup, UserGroupId, UserId};

/// PostgreSQL-backed repository for custom claim lookups.
#[derive(Clone)]
pub struct PostgresCustomScopeRepository {
    pool: PgPool,
}

impl PostgresCustomScopeRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Claim reader that runs every query inside a caller-owned transaction.
///
/// Isolation is whatever the caller's transaction provides. Reads are
/// serialized on the transaction's connection.
pub struct PostgresTransactionalClaimReader {
    transaction: Mutex<Transaction<'static, Postgres>>,
}

impl PostgresTransactionalClaimReader {
    /// Wraps an open transaction.
    #[must_use]
    pub fn new(transaction: Transaction<'static, Postgres>) -> Self {
        Self {
            transaction: Mutex::new(transaction),
        }
    }

    /// Returns the transaction so the caller can commit or roll back.
    #[must_use]
    pub fn into_inner(self) -> Transaction<'static, Postgres> {
        self.transaction.into_inner()
    }
}

#[derive(Debug, FromRow)]
struct UserClaimRow {
    key: String,
    value: String,
}

#[derive(Debug, FromRow)]
struct GroupClaimRow {
    group_id: uuid::Uuid,
    group_name: String,
    claim_key: Option<String>,
    claim_value: Option<String>,
}

#[derive(Debug, FromRow)]
struct ClaimKeyUsageRow {
    key: String,
    claim_count: i64,
}

#[async_trait]
impl CustomClaimReader for PostgresCustomScopeRepository {
    async fn list_claims_for_user(&self, user_id: UserId) -> AppResult<Vec<CustomClaim>> {
        fetch_claims_for_user(&self.pool, user_id).await
    }

    async fn list_groups_for_user(&self, user_id: UserId) -> AppResult<Vec<UserGroup>> {
        fetch_groups_for_user(&self.pool, user_id).await
    }
}

#[async_trait]
impl CustomScopeRepository for PostgresCustomScopeRepository {
    async fn list_claim_key_usage(&self) -> AppResult<Vec<ClaimKeyUsage>> {
        let rows = sqlx::query_as::<_, ClaimKeyUsageRow>(
            r#"
            SELECT key, COUNT(*) AS claim_count
            FROM custom_claims
            GROUP BY key
            ORDER BY claim_count DESC, key ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load claim key usage: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| ClaimKeyUsage {
                key: row.key,
                claim_count: row.claim_count,
            })
            .collect())
    }
}

#[async_trait]
impl CustomClaimReader for PostgresTransactionalClaimReader {
    async fn list_claims_for_user(&self, user_id: UserId) -> AppResult<Vec<CustomClaim>> {
        let mut transaction = self.transaction.lock().await;
        fetch_claims_for_user(&mut **transaction, user_id).await
    }

    async fn list_groups_for_user(&self, user_id: UserId) -> AppResult<Vec<UserGroup>> {
        let mut transaction = self.transaction.lock().await;
        fetch_groups_for_user(&mut **transaction, user_id).await
    }
}

async fn fetch_claims_for_user<'e, E>(executor: E, user_id: UserId) -> AppResult<Vec<CustomClaim>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, UserClaimRow>(
        r#"
        SELECT key, value
        FROM custom_claims
        WHERE user_id = $1
        ORDER BY key
        "#,
    )
    .bind(user_id.as_uuid())
    .fetch_all(executor)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to load custom claims for user '{user_id}': {error}"
        ))
    })?;

    Ok(rows
        .into_iter()
        .map(|row| CustomClaim::new(row.key, row.value, ClaimOwner::User(user_id)))
        .collect())
}

async fn fetch_groups_for_user<'e, E>(executor: E, user_id: UserId) -> AppResult<Vec<UserGroup>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, GroupClaimRow>(
        r#"
        SELECT
            user_groups.id AS group_id,
            user_groups.name AS group_name,
            custom_claims.key AS claim_key,
            custom_claims.value AS claim_value
        FROM user_groups
        INNER JOIN user_groups_users
            ON user_groups_users.user_group_id = user_groups.id
        LEFT JOIN custom_claims
            ON custom_claims.user_group_id = user_groups.id
        WHERE user_groups_users.user_id = $1
        ORDER BY user_groups.name, user_groups.id, custom_claims.key
        "#,
    )
    .bind(user_id.as_uuid())
    .fetch_all(executor)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to load user groups for user '{user_id}': {error}"
        ))
    })?;

    let groups = aggregate_groups(rows);
    debug!(%user_id, group_count = groups.len(), "loaded user groups");
    Ok(groups)
}

fn aggregate_groups(rows: Vec<GroupClaimRow>) -> Vec<UserGroup> {
    let mut groups: Vec<(UserGroupId, String, Vec<CustomClaim>)> = Vec::new();

    for row in rows {
        let group_id = UserGroupId::from_uuid(row.group_id);
        let is_new_group = groups
            .last()
            .is_none_or(|(current_id, _, _)| *current_id != group_id);
        if is_new_group {
            groups.push((group_id, row.group_name, Vec::new()));
        }

        if let (Some(key), Some(value), Some((_, _, claims))) =
            (row.claim_key, row.claim_value, groups.last_mut())
        {
            claims.push(CustomClaim::new(key, value, ClaimOwner::Group(group_id)));
        }
    }

    groups
        .into_iter()
        .map(|(id, name, claims)| UserGroup::new(id, name, claims))
        .collect()
}
