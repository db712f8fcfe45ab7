//! Backend gateway for the Lumin client
//!
//! [`BackendGateway`] is the only way the rest of the workspace talks to the
//! backend. [`SupabaseGateway`] implements it over the REST and storage APIs;
//! with the `test-util` feature, [`memory::MemoryGateway`] implements it in
//! process memory.

pub mod error;
pub mod gateway;
pub mod models;
pub mod rest;
pub mod token;

#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use gateway::BackendGateway;
pub use rest::SupabaseGateway;
pub use token::BearerToken;
