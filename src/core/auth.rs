//! Authentication boundary
//!
//! The service never knows where user secrets live. It receives a
//! [`CredentialVerifier`] and asks it a yes/no question. [`Authenticator`]
//! adds the fixed response delay and turns a "no" into a generic error.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::AuthError;

/// Default delay applied to every login attempt
pub const DEFAULT_LOGIN_DELAY: Duration = Duration::from_millis(500);

/// Capability that checks an identifier/secret pair
///
/// Implementations compare case-sensitively and must not reveal which of the
/// two values was wrong.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, identifier: &str, secret: &str) -> bool;
}

/// Verifier that rejects everyone
///
/// Used when no user store is configured.
pub struct DenyAllVerifier;

#[async_trait]
impl CredentialVerifier for DenyAllVerifier {
    async fn verify(&self, _: &str, _: &str) -> bool {
        false
    }
}

/// Login gate around an injected verifier
#[derive(Clone)]
pub struct Authenticator {
    verifier: Arc<dyn CredentialVerifier>,
    delay: Duration,
}

impl Authenticator {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            verifier,
            delay: DEFAULT_LOGIN_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Check a login attempt
    ///
    /// Always waits the configured delay first, whatever the outcome.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<(), AuthError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.verifier.verify(identifier, secret).await {
            tracing::info!(user = %identifier, "login succeeded");
            Ok(())
        } else {
            tracing::warn!("login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }
}
