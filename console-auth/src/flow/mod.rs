pub mod authenticator;
pub mod callback;
pub mod hydrator;
pub mod login;

/// Transient-store key for the tenant id persisted across the federated
/// redirect round trip. Consumed exactly once by the callback reconciler.
pub const PENDING_TENANT_KEY: &str = "pendingSsoTenantId";

pub use authenticator::{Authenticator, LoginWithTenantInput};
pub use callback::{AuthEvent, CallbackOutcome, CallbackReconciler};
pub use hydrator::SessionHydrator;
pub use login::{EmailOutcome, LoginFlow, LoginStep, PasswordOutcome, SelectOutcome};
