//! Application services and ports.

#![forbid(unsafe_code)]

mod custom_scope_ports;
mod custom_scope_service;

pub use custom_scope_ports::{ClaimKeyUsage, CustomClaimReader, CustomScopeRepository};
pub use custom_scope_service::CustomScopeService;
