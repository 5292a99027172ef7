use crate::models::tenant::TenantType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Role within the active tenant (or the platform, for super-admins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Viewer,
    Member,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Parse a backend role string. Unknown values map to the
    /// least-privileged role.
    pub fn parse(s: &str) -> Self {
        match s {
            "super-admin" | "super_admin" => Role::SuperAdmin,
            "admin" | "owner" => Role::Admin,
            "member" => Role::Member,
            _ => Role::Viewer,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

/// Fully resolved identity for the active credential.
///
/// Carries exactly one tenant context. Written only by the session hydrator,
/// destroyed on logout or hydration failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub tenant_id: String,
    pub role: Role,
    pub tenant_type: TenantType,
    pub email_verified: bool,
}

/// The single source of mutable authentication state.
///
/// Mutation is deliberately narrow: `replace` and `clear` are crate-private
/// so only the hydrator and logout can write; everything else reads a
/// snapshot.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current session, if authenticated.
    pub async fn current(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|s| !s.user_id.is_empty())
            .unwrap_or(false)
    }

    /// Atomically install a fully resolved session. Partial state is never
    /// observable: callers must build the complete `Session` first.
    pub(crate) async fn replace(&self, session: Session) {
        *self.inner.write().await = Some(session);
    }

    pub(crate) async fn clear(&self) {
        *self.inner.write().await = None;
    }
}
