//! Route authorization guards.
//!
//! Each guard is a pure function of (session view, requested path) deciding
//! allow or redirect; the single exception is [`require_auth`], which embeds
//! the session hydration call. Insufficient role always redirects to a safe
//! dashboard, never to an error page that implies the route does not exist.

use crate::flow::hydrator::SessionHydrator;
use crate::models::session::Session;

/// Client route surface.
pub mod routes {
    pub const LOGIN: &str = "/auth/login";
    pub const SIGNUP_PERSONAL: &str = "/auth/signup/personal";
    pub const SIGNUP_ORGANIZATION: &str = "/auth/signup/organization";
    pub const VERIFY_EMAIL: &str = "/auth/verify-email";
    pub const JOIN: &str = "/auth/join";
    pub const APP_ROOT: &str = "/app";
    pub const DASHBOARD: &str = "/app/dashboard";
    pub const ADMIN_DASHBOARD: &str = "/app/admin/dashboard";
    pub const ADMIN_TENANTS: &str = "/app/admin/tenants";
    pub const ADMIN_USERS: &str = "/app/admin/users";
    pub const ADMIN_ROLES: &str = "/app/admin/roles";
    pub const ACCOUNT_SETTINGS: &str = "/app/settings/account";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect {
        path: String,
        query: Vec<(String, String)>,
    },
}

impl GuardOutcome {
    fn redirect(path: &str) -> Self {
        GuardOutcome::Redirect {
            path: path.to_string(),
            query: Vec::new(),
        }
    }
}

/// Authenticated-required guard. Hydrates the session; unauthenticated
/// navigation is redirected to login with the originally requested path
/// preserved as the return target. A super-admin requesting the tenant
/// dashboard (or the app root that resolves to it) is sent to the platform
/// dashboard instead.
pub async fn require_auth(hydrator: &SessionHydrator, requested_path: &str) -> GuardOutcome {
    if !hydrator.check_auth().await {
        return GuardOutcome::Redirect {
            path: routes::LOGIN.to_string(),
            query: vec![("returnUrl".to_string(), requested_path.to_string())],
        };
    }

    if let Some(session) = hydrator.store().current().await {
        if session.role.is_super_admin() && is_tenant_dashboard_path(requested_path) {
            return GuardOutcome::redirect(routes::ADMIN_DASHBOARD);
        }
    }

    GuardOutcome::Allow
}

fn is_tenant_dashboard_path(path: &str) -> bool {
    path == routes::APP_ROOT || path == "/app/" || path.starts_with(routes::DASHBOARD)
}

/// Admin-required guard: admin and super-admin pass.
pub fn require_admin(session: Option<&Session>) -> GuardOutcome {
    match session {
        Some(s) if s.role.is_admin() => GuardOutcome::Allow,
        _ => GuardOutcome::redirect(routes::DASHBOARD),
    }
}

/// Super-admin-required guard for platform-level routes.
pub fn require_super_admin(session: Option<&Session>) -> GuardOutcome {
    match session {
        Some(s) if s.role.is_super_admin() => GuardOutcome::Allow,
        _ => GuardOutcome::redirect(routes::DASHBOARD),
    }
}

/// Tenant-scope exclusivity: super-admins are structurally barred from
/// tenant-scoped routes and sent to the platform dashboard.
pub fn tenant_user_only(session: Option<&Session>) -> GuardOutcome {
    match session {
        Some(s) if s.role.is_super_admin() => GuardOutcome::redirect(routes::ADMIN_DASHBOARD),
        _ => GuardOutcome::Allow,
    }
}

/// Guest-only guard for the auth pages: authenticated users are redirected
/// into the app.
pub fn guest_only(session: Option<&Session>) -> GuardOutcome {
    match session {
        Some(s) if s.role.is_super_admin() => GuardOutcome::redirect(routes::ADMIN_DASHBOARD),
        Some(_) => GuardOutcome::redirect(routes::DASHBOARD),
        None => GuardOutcome::Allow,
    }
}
