use std::collections::HashSet;
use std::sync::Arc;

use scopegate_core::AppResult;
use scopegate_domain::{CustomClaim, StandardScope, UserId, parse_scope_parameter};
use tracing::debug;

use crate::custom_scope_ports::{CustomClaimReader, CustomScopeRepository};

/// Application service resolving which scopes a user may request.
#[derive(Clone)]
pub struct CustomScopeService {
    repository: Arc<dyn CustomScopeRepository>,
}

impl CustomScopeService {
    /// Creates a new scope service backed by the primary claim repository.
    #[must_use]
    pub fn new(repository: Arc<dyn CustomScopeRepository>) -> Self {
        Self { repository }
    }

    /// Lists the custom scopes available to a user.
    ///
    /// The result is the set of claim keys owned by the user or by any group
    /// the user belongs to. Order is unspecified. Reads go through `reader`
    /// when one is supplied, otherwise through the primary repository.
    pub async fn list_user_scopes(
        &self,
        user_id: UserId,
        reader: Option<&dyn CustomClaimReader>,
    ) -> AppResult<Vec<String>> {
        let scopes = self.collect_user_scopes(user_id, reader).await?;
        Ok(scopes.into_iter().collect())
    }

    /// Lists every custom scope known to the system, most used first.
    ///
    /// Keys with equal usage are ordered lexicographically. Always reads the
    /// primary repository.
    pub async fn list_all_scopes(&self) -> AppResult<Vec<String>> {
        let mut usage = self.repository.list_claim_key_usage().await?;
        usage.sort_by(|left, right| {
            right
                .claim_count
                .cmp(&left.claim_count)
                .then_with(|| left.key.cmp(&right.key))
        });

        Ok(usage.into_iter().map(|entry| entry.key).collect())
    }

    /// Filters requested scopes down to those the user may be granted.
    ///
    /// Standard scopes are always granted. Request order and duplicates are
    /// preserved; unknown scopes are dropped without error.
    pub async fn validate_scopes(
        &self,
        user_id: UserId,
        requested_scopes: &[String],
        reader: Option<&dyn CustomClaimReader>,
    ) -> AppResult<Vec<String>> {
        let mut available = self.collect_user_scopes(user_id, reader).await?;
        available.extend(
            StandardScope::all()
                .iter()
                .map(|scope| scope.as_str().to_owned()),
        );

        let granted: Vec<String> = requested_scopes
            .iter()
            .filter(|scope| available.contains(scope.as_str()))
            .cloned()
            .collect();

        debug!(
            %user_id,
            requested = requested_scopes.len(),
            granted = granted.len(),
            "validated requested scopes"
        );

        Ok(granted)
    }

    /// Validates a space-delimited OAuth `scope` parameter.
    pub async fn validate_scope_parameter(
        &self,
        user_id: UserId,
        scope_parameter: &str,
        reader: Option<&dyn CustomClaimReader>,
    ) -> AppResult<Vec<String>> {
        let requested_scopes = parse_scope_parameter(scope_parameter);
        self.validate_scopes(user_id, &requested_scopes, reader)
            .await
    }

    async fn collect_user_scopes(
        &self,
        user_id: UserId,
        reader: Option<&dyn CustomClaimReader>,
    ) -> AppResult<HashSet<String>> {
        let reader: &dyn CustomClaimReader = match reader {
            Some(reader) => reader,
            None => self.repository.as_ref(),
        };

        let claims = reader.list_claims_for_user(user_id).await?;
        let groups = reader.list_groups_for_user(user_id).await?;

        let mut scopes = HashSet::new();
        scopes.extend(claims.into_iter().map(CustomClaim::into_key));
        for group in groups {
            scopes.extend(
                group
                    .into_custom_claims()
                    .into_iter()
                    .map(CustomClaim::into_key),
            );
        }

        debug!(%user_id, scope_count = scopes.len(), "resolved user scopes");

        Ok(scopes)
    }
}
