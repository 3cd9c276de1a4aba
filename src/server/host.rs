//! Server host holding the service state
//!
//! The host is transport-agnostic: it owns the configuration, the session
//! store and the login gate. The REST exposure turns it into an Axum router.

use crate::config::AppConfig;
use crate::core::auth::{Authenticator, CredentialVerifier};
use crate::core::service::SessionStore;
use std::sync::Arc;

/// Host context containing all service state
pub struct ServerHost {
    /// Loaded configuration
    pub config: Arc<AppConfig>,

    /// Live workflow sessions
    pub sessions: Arc<dyn SessionStore>,

    /// Login gate wrapping the injected credential verifier
    pub authenticator: Authenticator,
}

impl ServerHost {
    pub fn new(
        config: AppConfig,
        sessions: Arc<dyn SessionStore>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Self {
        let authenticator = Authenticator::new(verifier).with_delay(config.login_delay());
        Self {
            config: Arc::new(config),
            sessions,
            authenticator,
        }
    }
}
