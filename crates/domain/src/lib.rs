//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod claim;
mod scope;
mod user;

pub use claim::{ClaimOwner, CustomClaim, UserGroup};
pub use scope::{StandardScope, format_scope_parameter, parse_scope_parameter};
pub use user::{UserGroupId, UserId};
