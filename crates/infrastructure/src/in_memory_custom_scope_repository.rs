use std::collections::HashMap;

use async_trait::async_trait;
use scopegate_application::{ClaimKeyUsage, CustomClaimReader, CustomScopeRepository};
use scopegate_core::{AppError, AppResult};
use scopegate_domain::{ClaimOwner, CustomClaim, UserGroup, UserGroupId, UserId};
use tokio::sync::RwLock;

/// In-memory custom claim repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryCustomScopeRepository {
    claims: RwLock<Vec<CustomClaim>>,
    groups: RwLock<HashMap<UserGroupId, String>>,
    memberships: RwLock<HashMap<UserId, Vec<UserGroupId>>>,
}

impl InMemoryCustomScopeRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            claims: RwLock::new(Vec::new()),
            groups: RwLock::new(HashMap::new()),
            memberships: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a claim for its owner.
    pub async fn save_claim(&self, claim: CustomClaim) {
        self.claims.write().await.push(claim);
    }

    /// Stores or renames a group.
    pub async fn save_group(&self, group_id: UserGroupId, name: impl Into<String>) {
        self.groups.write().await.insert(group_id, name.into());
    }

    /// Adds a user to an existing group.
    pub async fn add_group_member(&self, group_id: UserGroupId, user_id: UserId) -> AppResult<()> {
        if !self.groups.read().await.contains_key(&group_id) {
            return Err(AppError::Validation(format!(
                "group '{group_id}' does not exist"
            )));
        }

        let mut memberships = self.memberships.write().await;
        let group_ids = memberships.entry(user_id).or_default();
        if !group_ids.contains(&group_id) {
            group_ids.push(group_id);
        }

        Ok(())
    }
}

#[async_trait]
impl CustomClaimReader for InMemoryCustomScopeRepository {
    async fn list_claims_for_user(&self, user_id: UserId) -> AppResult<Vec<CustomClaim>> {
        Ok(self
            .claims
            .read()
            .await
            .iter()
            .filter(|claim| claim.owner() == ClaimOwner::User(user_id))
            .cloned()
            .collect())
    }

    async fn list_groups_for_user(&self, user_id: UserId) -> AppResult<Vec<UserGroup>> {
        let group_ids = self
            .memberships
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        let groups = self.groups.read().await;
        let claims = self.claims.read().await;

        let mut values: Vec<UserGroup> = group_ids
            .into_iter()
            .filter_map(|group_id| {
                let name = groups.get(&group_id)?;
                let group_claims = claims
                    .iter()
                    .filter(|claim| claim.owner() == ClaimOwner::Group(group_id))
                    .cloned()
                    .collect();
                Some(UserGroup::new(group_id, name.clone(), group_claims))
            })
            .collect();
        values.sort_by(|left, right| left.name().cmp(right.name()));

        Ok(values)
    }
}

#[async_trait]
impl CustomScopeRepository for InMemoryCustomScopeRepository {
    async fn list_claim_key_usage(&self) -> AppResult<Vec<ClaimKeyUsage>> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for claim in self.claims.read().await.iter() {
            *counts.entry(claim.key().to_owned()).or_default() += 1;
        }

        let mut usage: Vec<ClaimKeyUsage> = counts
            .into_iter()
            .map(|(key, claim_count)| ClaimKeyUsage { key, claim_count })
            .collect();
        usage.sort_by(|left, right| {
            right
                .claim_count
                .cmp(&left.claim_count)
                .then_with(|| left.key.cmp(&right.key))
        });

        Ok(usage)
    }
}
