//! Session identity for report submission
//!
//! An identity is established once at startup and never persisted. Sign-in
//! failures are absorbed: the portal keeps working against the synthetic
//! offline identity so drafting is never blocked by the auth boundary.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Uid of the synthetic offline identity
pub const OFFLINE_UID: &str = "demo-user";

/// Errors from the identity boundary
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// The provider failed to answer
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// The provider rejected the presented token
    #[error("Token sign-in rejected: {0}")]
    TokenRejected(String),
}

/// The identity a submission is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    /// Provider-issued uid, stamped onto submitted documents
    pub uid: String,
    /// Whether the identity came from anonymous sign-in
    pub is_anonymous: bool,
}

impl SessionIdentity {
    /// The synthetic identity used when no provider is reachable
    pub fn offline() -> Self {
        Self {
            uid: OFFLINE_UID.to_string(),
            is_anonymous: true,
        }
    }

    /// A fresh anonymous identity
    pub fn anonymous() -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            is_anonymous: true,
        }
    }
}

/// Boundary to the authentication provider
///
/// The portal only ever needs the two sign-in paths; session refresh and
/// sign-out stay on the provider's side of the boundary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in without credentials
    async fn sign_in_anonymously(&self) -> Result<SessionIdentity, IdentityError>;

    /// Sign in with a deployment-issued token
    async fn sign_in_with_token(&self, token: &str) -> Result<SessionIdentity, IdentityError>;
}

/// Provider that issues local anonymous identities
///
/// Used when the deployment has no external auth service. Tokens are not
/// accepted; configuring one together with this provider is a deployment
/// mistake and surfaces as the offline fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousIdentityProvider;

#[async_trait]
impl IdentityProvider for AnonymousIdentityProvider {
    async fn sign_in_anonymously(&self) -> Result<SessionIdentity, IdentityError> {
        Ok(SessionIdentity::anonymous())
    }

    async fn sign_in_with_token(&self, _token: &str) -> Result<SessionIdentity, IdentityError> {
        Err(IdentityError::TokenRejected(
            "anonymous provider does not accept tokens".to_string(),
        ))
    }
}

/// Establish the session identity for this process
///
/// Prefers token sign-in when a token is configured, otherwise signs in
/// anonymously. Any failure is logged and replaced by the synthetic offline
/// identity; this function never blocks the portal from starting.
pub async fn establish_identity(
    provider: &dyn IdentityProvider,
    auth_token: Option<&str>,
) -> SessionIdentity {
    let attempt = match auth_token {
        Some(token) => provider.sign_in_with_token(token).await,
        None => provider.sign_in_anonymously().await,
    };

    match attempt {
        Ok(identity) => {
            debug!(uid = %identity.uid, anonymous = identity.is_anonymous, "Session identity established");
            identity
        }
        Err(err) => {
            warn!("Sign-in failed, continuing with offline identity: {err}");
            SessionIdentity::offline()
        }
    }
}
