use crate::error::{AuthError, AuthErrorKind};
use crate::flow::authenticator::{Authenticator, LoginWithTenantInput};
use crate::models::tenant::{TenantInfo, TenantLookupResult};
use crate::services::AuthApiClient;
use secrecy::Secret;
use std::sync::Arc;

/// Steps of the email-first login flow. Strictly linear forward/backward;
/// the only other edge is the SSO exit, which abandons the machine and hands
/// control to the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    Email,
    SelectTenant,
    Password,
}

/// Result of submitting an email.
#[derive(Debug)]
pub enum EmailOutcome {
    /// No memberships: stay on the email step and prompt signup.
    NoTenantsFound,
    /// Single password tenant preselected: straight to the password step.
    PasswordStep,
    /// Single SSO tenant: the federated redirect was initiated.
    SsoRedirect(TenantInfo),
    /// Multiple memberships: explicit selection required.
    SelectTenant,
    /// An attempt is already in flight; the submission was ignored.
    Busy,
}

#[derive(Debug)]
pub enum SelectOutcome {
    PasswordStep,
    /// The chosen tenant uses SSO; the redirect was initiated and the
    /// machine is abandoned.
    SsoRedirect(TenantInfo),
}

#[derive(Debug)]
pub enum PasswordOutcome {
    SignedIn,
    /// Unconfirmed user: the caller should navigate to the verification
    /// step, carrying this email forward.
    VerifyEmailRedirect { email: String },
    Failed(AuthError),
    Busy,
}

/// The login flow state machine.
///
/// One instance per login attempt surface. The `loading` flag suppresses
/// resubmission while a backend call is in flight (advisory only; there is
/// no server-side mutual exclusion).
pub struct LoginFlow {
    auth_api: Arc<AuthApiClient>,
    authenticator: Arc<Authenticator>,
    step: LoginStep,
    email: String,
    lookup: Option<TenantLookupResult>,
    selected: Option<TenantInfo>,
    loading: bool,
}

impl LoginFlow {
    pub fn new(auth_api: Arc<AuthApiClient>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            auth_api,
            authenticator,
            step: LoginStep::Email,
            email: String::new(),
            lookup: None,
            selected: None,
            loading: false,
        }
    }

    pub fn step(&self) -> LoginStep {
        self.step
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Tenants available for selection, empty before lookup.
    pub fn tenants(&self) -> &[TenantInfo] {
        self.lookup.as_ref().map(|l| l.tenants.as_slice()).unwrap_or(&[])
    }

    pub fn selected_tenant(&self) -> Option<&TenantInfo> {
        self.selected.as_ref()
    }

    /// Submit the email and run the tenant lookup. Lookup failures degrade
    /// to "no tenants found" inside the client; this method never errors on
    /// transport problems.
    pub async fn submit_email(&mut self, email: &str) -> Result<EmailOutcome, AuthError> {
        if self.loading {
            return Ok(EmailOutcome::Busy);
        }
        self.loading = true;

        self.email = email.to_string();
        let lookup = self.auth_api.lookup_tenants(email).await;
        // The flag stays set through the SSO branch so the redirect
        // initiation is covered too.
        let outcome = self.resolve_lookup(lookup).await;
        self.loading = false;
        outcome
    }

    async fn resolve_lookup(
        &mut self,
        lookup: TenantLookupResult,
    ) -> Result<EmailOutcome, AuthError> {
        match lookup.tenants.len() {
            0 => {
                self.lookup = Some(lookup);
                Ok(EmailOutcome::NoTenantsFound)
            }
            1 => {
                // Preselected: the SSO/password branch decision happens
                // immediately, without a selection step.
                let tenant = lookup.tenants[0].clone();
                self.lookup = Some(lookup);
                if tenant.sso_enabled {
                    self.authenticator.login_with_sso(&tenant).await?;
                    Ok(EmailOutcome::SsoRedirect(tenant))
                } else {
                    self.selected = Some(tenant);
                    self.step = LoginStep::Password;
                    Ok(EmailOutcome::PasswordStep)
                }
            }
            _ => {
                self.lookup = Some(lookup);
                self.step = LoginStep::SelectTenant;
                Ok(EmailOutcome::SelectTenant)
            }
        }
    }

    /// Choose a tenant on the selection step.
    pub async fn select_tenant(&mut self, tenant_id: &str) -> Result<SelectOutcome, AuthError> {
        let tenant = self
            .tenants()
            .iter()
            .find(|t| t.tenant_id == tenant_id)
            .cloned()
            .ok_or(AuthErrorKind::NoTenantsFound)?;

        if tenant.sso_enabled {
            self.authenticator.login_with_sso(&tenant).await?;
            return Ok(SelectOutcome::SsoRedirect(tenant));
        }

        self.selected = Some(tenant);
        self.step = LoginStep::Password;
        Ok(SelectOutcome::PasswordStep)
    }

    /// Submit the password for the selected tenant.
    pub async fn submit_password(&mut self, password: Secret<String>) -> PasswordOutcome {
        if self.loading {
            return PasswordOutcome::Busy;
        }
        let Some(tenant) = self.selected.clone() else {
            return PasswordOutcome::Failed(AuthError::new(AuthErrorKind::NoTenantsFound));
        };
        self.loading = true;

        let result = self
            .authenticator
            .login_with_tenant(LoginWithTenantInput {
                email: self.email.clone(),
                password,
                selected_tenant_id: tenant.tenant_id,
            })
            .await;
        self.loading = false;

        match result {
            Ok(()) => PasswordOutcome::SignedIn,
            Err(e) if e.kind == AuthErrorKind::UserNotConfirmed => {
                PasswordOutcome::VerifyEmailRedirect {
                    email: self.email.clone(),
                }
            }
            Err(e) => PasswordOutcome::Failed(e),
        }
    }

    /// Step backwards: password returns to selection when selection was
    /// required, otherwise to the email step.
    pub fn back(&mut self) {
        self.step = match self.step {
            LoginStep::Password
                if self
                    .lookup
                    .as_ref()
                    .map(|l| l.requires_selection)
                    .unwrap_or(false) =>
            {
                self.selected = None;
                LoginStep::SelectTenant
            }
            LoginStep::Password | LoginStep::SelectTenant => {
                self.selected = None;
                self.lookup = None;
                LoginStep::Email
            }
            LoginStep::Email => LoginStep::Email,
        };
    }
}
