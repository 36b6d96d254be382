//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_custom_scope_repository;
mod postgres_custom_scope_repository;

pub use in_memory_custom_scope_repository::InMemoryCustomScopeRepository;
pub use postgres_custom_scope_repository::{
    PostgresCustomScopeRepository, PostgresTransactionalClaimReader,
};
