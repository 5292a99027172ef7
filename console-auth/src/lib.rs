//! Multi-tenant authentication core for the console.
//!
//! Implements the email-first login flow: tenant lookup → tenant selection →
//! credential or federated-SSO authentication → session hydration → route
//! authorization. The identity provider (hosted login, token issuance) and
//! the backend tenant/identity APIs are external collaborators reached
//! through the seams in [`provider`] and [`services`].
pub mod config;
pub mod error;
pub mod flow;
pub mod guards;
pub mod models;
pub mod provider;
pub mod services;

pub use error::{AuthError, AuthErrorKind};
pub use models::session::{Role, Session, SessionStore};
pub use models::tenant::{TenantInfo, TenantLookupResult, TenantType};
