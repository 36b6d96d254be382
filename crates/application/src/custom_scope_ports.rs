use async_trait::async_trait;
use scopegate_core::AppResult;
use scopegate_domain::{CustomClaim, UserGroup, UserId};

/// Number of custom claims that use one key across the whole system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimKeyUsage {
    /// Claim key, which is also the scope name.
    pub key: String,
    /// Number of claim rows carrying the key.
    pub claim_count: i64,
}

/// Read port for the claims that contribute to one user's scopes.
///
/// Implemented both by primary-store repositories and by readers bound to a
/// caller-owned transaction.
#[async_trait]
pub trait CustomClaimReader: Send + Sync {
    /// Lists claims owned directly by the user.
    async fn list_claims_for_user(&self, user_id: UserId) -> AppResult<Vec<CustomClaim>>;

    /// Lists groups the user belongs to, each with its own claims.
    async fn list_groups_for_user(&self, user_id: UserId) -> AppResult<Vec<UserGroup>>;
}

/// Repository port over the primary claim store.
#[async_trait]
pub trait CustomScopeRepository: CustomClaimReader {
    /// Lists every distinct claim key with its usage count, most used first.
    async fn list_claim_key_usage(&self) -> AppResult<Vec<ClaimKeyUsage>>;
}
