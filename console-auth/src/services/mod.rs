pub mod auth_api;
pub mod platform_api;

pub use auth_api::{
    AuthApiClient, InvitationDetails, MeResponse, ProvisionOutcome, SsoCompleteRequest,
};
pub use platform_api::PlatformApiClient;
