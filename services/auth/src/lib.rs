//! Authentication for the Lumin client
//!
//! Talks to the identity service, persists the session between runs and
//! exposes the signed-in user to the rest of the client.

pub mod client;
pub mod jwt;
pub mod manager;
pub mod models;
pub mod session;
pub mod validation;

pub use client::{GoTrueClient, IdentityClient};
pub use manager::AuthManager;
pub use models::{AuthState, SignUpOutcome};
