use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of tenant workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantType {
    #[default]
    Personal,
    Organization,
}

/// One membership of a principal, as returned by the lookup API.
///
/// Read-only to the client; refreshed on every lookup call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantInfo {
    pub tenant_id: String,
    pub tenant_name: String,
    pub tenant_type: TenantType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub sso_enabled: bool,
    /// SSO provider type (OKTA, AZURE_AD, ...) if enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_provider: Option<String>,
    /// Identity-pool provider name used for the federated redirect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cognito_provider_name: Option<String>,
    /// Role hint in this tenant (owner, admin, member, guest).
    pub role_hint: String,
    pub is_owner: bool,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl TenantInfo {
    /// Provider name for the federated redirect, defaulting to the
    /// deterministic `OKTA-{tenantId}` convention when not configured.
    pub fn provider_name(&self) -> String {
        self.cognito_provider_name
            .clone()
            .unwrap_or_else(|| format!("OKTA-{}", self.tenant_id))
    }
}

/// Result of looking up which tenants a principal belongs to.
///
/// Ephemeral: exists only for the duration of one login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantLookupResult {
    pub email: String,
    pub tenants: Vec<TenantInfo>,
    pub requires_selection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_tenant_id: Option<String>,
}

impl TenantLookupResult {
    /// Build a result enforcing the selection invariants:
    /// `requires_selection` iff more than one tenant, and the default tenant
    /// id is the single tenant's id when exactly one exists.
    pub fn resolve(email: String, tenants: Vec<TenantInfo>) -> Self {
        let requires_selection = tenants.len() > 1;
        let default_tenant_id = if tenants.len() == 1 {
            Some(tenants[0].tenant_id.clone())
        } else {
            None
        };
        Self {
            email,
            tenants,
            requires_selection,
            default_tenant_id,
        }
    }

    /// Degraded result used when the lookup call fails: the flow treats it
    /// as "no tenants found" rather than an error.
    pub fn empty(email: String) -> Self {
        Self {
            email,
            tenants: Vec::new(),
            requires_selection: false,
            default_tenant_id: None,
        }
    }
}
