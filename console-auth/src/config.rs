use console_core::error::CoreError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub identity: IdentitySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Base URL of the auth backend (lookup, me, invitations, ...).
    pub auth_url: String,
    /// Base URL of the platform/tenant-directory service.
    pub platform_url: String,
}

/// Hosted identity-provider settings, used for the manual authorize-URL
/// fallback when the managed redirect fails.
#[derive(Debug, Deserialize, Clone)]
pub struct IdentitySettings {
    /// Hosted UI domain, e.g. `https://auth.example.com`.
    pub domain: String,
    pub client_id: String,
    /// Callback URL registered with the provider.
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_scopes() -> Vec<String> {
    vec![
        "openid".to_string(),
        "email".to_string(),
        "profile".to_string(),
    ]
}

pub fn get_configuration(path: &Path) -> Result<Settings, CoreError> {
    console_core::config::load(path)
}
