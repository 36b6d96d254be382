use serde::{Deserialize, Serialize};

use crate::{UserGroupId, UserId};

/// Owner of a custom claim. A claim belongs to exactly one user or one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ClaimOwner {
    /// Claim attached directly to a user.
    User(UserId),
    /// Claim attached to a user group.
    Group(UserGroupId),
}

/// Custom claim whose key doubles as a requestable scope name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomClaim {
    key: String,
    value: String,
    owner: ClaimOwner,
}

impl CustomClaim {
    /// Creates a claim for the given owner.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>, owner: ClaimOwner) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            owner,
        }
    }

    /// Returns the claim key, which is the scope name it contributes.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the claim value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Returns the owning user or group.
    #[must_use]
    pub fn owner(&self) -> ClaimOwner {
        self.owner
    }

    /// Consumes the claim and returns its key.
    #[must_use]
    pub fn into_key(self) -> String {
        self.key
    }
}

/// User group together with the custom claims it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    id: UserGroupId,
    name: String,
    custom_claims: Vec<CustomClaim>,
}

impl UserGroup {
    /// Creates a group projection with its claims.
    #[must_use]
    pub fn new(id: UserGroupId, name: impl Into<String>, custom_claims: Vec<CustomClaim>) -> Self {
        Self {
            id,
            name: name.into(),
            custom_claims,
        }
    }

    /// Returns the group identifier.
    #[must_use]
    pub fn id(&self) -> UserGroupId {
        self.id
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the claims owned by the group.
    #[must_use]
    pub fn custom_claims(&self) -> &[CustomClaim] {
        self.custom_claims.as_slice()
    }

    /// Consumes the group and returns its claims.
    #[must_use]
    pub fn into_custom_claims(self) -> Vec<CustomClaim> {
        self.custom_claims
    }
}
