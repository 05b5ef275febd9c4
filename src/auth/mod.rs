//! Identity provider abstraction layer.
//!
//! This module defines the capability interfaces the session controller relies on
//! (a password identity provider and the federated sign-in clients), along with
//! the common data types and error handling shared by every provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub mod memory;

/// Federated sign-in providers supported next to email/password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalProvider {
    Google,
    Facebook,
}

impl ExternalProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            ExternalProvider::Google => "Google",
            ExternalProvider::Facebook => "Facebook",
        }
    }
}

impl fmt::Display for ExternalProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Common error types for identity provider operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidCredential(String),

    #[error("{0}")]
    NetworkOrProviderFailure(String),

    #[error("{0} sign-in was cancelled")]
    ExternalSignInCancelled(ExternalProvider),

    #[error("{0} sign-in returned an unusable result: {1}")]
    ExternalSignInMalformedResult(ExternalProvider, String),
}

/// Opaque identifier of an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityId(pub String);

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Internal credential produced from a federated sign-in result.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Google { id_token: String },
    Facebook { access_token: String },
}

impl Credential {
    pub fn provider(&self) -> ExternalProvider {
        match self {
            Credential::Google { .. } => ExternalProvider::Google,
            Credential::Facebook { .. } => ExternalProvider::Facebook,
        }
    }

    pub fn token(&self) -> &str {
        match self {
            Credential::Google { id_token } => id_token,
            Credential::Facebook { access_token } => access_token,
        }
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider())
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Outcome reported by a federated sign-in flow started outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalOutcome {
    /// The flow produced a token to exchange.
    Token(String),
    /// The user backed out of the flow.
    Cancelled,
    /// The provider reported an error.
    Failed(String),
    /// The flow finished without an account or token.
    Missing,
}

/// Completion object delivered by a federated sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalSignInResult {
    pub provider: ExternalProvider,
    pub outcome: ExternalOutcome,
}

impl ExternalSignInResult {
    pub fn token(provider: ExternalProvider, token: impl Into<String>) -> Self {
        Self {
            provider,
            outcome: ExternalOutcome::Token(token.into()),
        }
    }

    pub fn cancelled(provider: ExternalProvider) -> Self {
        Self {
            provider,
            outcome: ExternalOutcome::Cancelled,
        }
    }

    pub fn failed(provider: ExternalProvider, reason: impl Into<String>) -> Self {
        Self {
            provider,
            outcome: ExternalOutcome::Failed(reason.into()),
        }
    }

    pub fn missing(provider: ExternalProvider) -> Self {
        Self {
            provider,
            outcome: ExternalOutcome::Missing,
        }
    }

    /// Turn the flow result into a credential, or the error describing why it can't be used.
    pub fn into_credential(self) -> Result<Credential, AuthError> {
        match self.outcome {
            ExternalOutcome::Token(token) if token.trim().is_empty() => Err(AuthError::ExternalSignInMalformedResult(
                self.provider,
                "empty token".to_string(),
            )),
            ExternalOutcome::Token(token) => Ok(match self.provider {
                ExternalProvider::Google => Credential::Google { id_token: token },
                ExternalProvider::Facebook => Credential::Facebook { access_token: token },
            }),
            ExternalOutcome::Cancelled => Err(AuthError::ExternalSignInCancelled(self.provider)),
            ExternalOutcome::Failed(reason) => Err(AuthError::NetworkOrProviderFailure(reason)),
            ExternalOutcome::Missing => Err(AuthError::ExternalSignInMalformedResult(
                self.provider,
                "no account returned".to_string(),
            )),
        }
    }
}

/// Notification pushed by an identity provider when its current identity changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityChange {
    pub identity: Option<IdentityId>,
    pub error: Option<String>,
}

impl IdentityChange {
    pub fn signed_in(identity: IdentityId) -> Self {
        Self {
            identity: Some(identity),
            error: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            identity: None,
            error: None,
        }
    }
}

/// Handle returned by [`IdentityProvider::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked for every identity change.
pub type IdentityListener = Arc<dyn Fn(IdentityChange) + Send + Sync>;

/// Password identity provider that every deployment must supply.
///
/// Credential operations are network-backed and therefore async; sign-out and
/// listener management are immediate.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the provider identifier (e.g., "memory", "firebase").
    fn provider_name(&self) -> &str;

    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityId, AuthError>;
    async fn create_identity(&self, email: &str, password: &str) -> Result<IdentityId, AuthError>;
    async fn sign_in_with_credential(&self, credential: Credential) -> Result<IdentityId, AuthError>;

    fn sign_out(&self) -> Result<(), AuthError>;
    fn current_identity(&self) -> Option<IdentityId>;

    fn subscribe(&self, listener: IdentityListener) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);
}

/// Client for a federated sign-in SDK. Only revocation goes through the core;
/// the sign-in flow itself runs outside and reports an [`ExternalSignInResult`].
pub trait ExternalSignInClient: Send + Sync {
    fn provider(&self) -> ExternalProvider;
    fn sign_out(&self) -> Result<(), AuthError>;
}

/// The full set of providers a session controller talks to.
#[derive(Clone)]
pub struct Providers {
    pub identity: Arc<dyn IdentityProvider>,
    pub google: Arc<dyn ExternalSignInClient>,
    pub facebook: Arc<dyn ExternalSignInClient>,
}

impl Providers {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        google: Arc<dyn ExternalSignInClient>,
        facebook: Arc<dyn ExternalSignInClient>,
    ) -> Self {
        Self {
            identity,
            google,
            facebook,
        }
    }
}
