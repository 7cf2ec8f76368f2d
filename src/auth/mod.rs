//! API-key authentication for the HTTP surface.
//!
//! Identity is ambient only: the agenda logic itself never consults it,
//! it just runs in an authenticated context when auth is enabled.

mod middleware;

pub use middleware::{AuthLayer, AuthMiddleware};

use crate::config::AuthConfig;
use crate::error::AuthError;

/// The authenticated (or anonymous) identity attached to a request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// True when no valid credentials accompanied the request.
    pub anonymous: bool,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { anonymous: true }
    }

    pub fn authenticated() -> Self {
        Self { anonymous: false }
    }
}

/// Validates request credentials against the configured API keys.
pub struct Authenticator {
    config: AuthConfig,
}

impl Authenticator {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Whether authentication is required at all.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Authenticate from an `Authorization: Bearer` header or an
    /// `x-api-key` header.
    pub fn authenticate(
        &self,
        auth_header: Option<&str>,
        api_key_header: Option<&str>,
    ) -> Result<AuthContext, AuthError> {
        if !self.config.enabled {
            return Ok(AuthContext::anonymous());
        }

        let key = auth_header
            .and_then(|value| value.strip_prefix("Bearer "))
            .or(api_key_header);

        match key {
            Some(key) if self.config.api_keys.iter().any(|k| k == key) => {
                Ok(AuthContext::authenticated())
            }
            Some(_) => Err(AuthError::InvalidApiKey),
            None => Err(AuthError::MissingCredentials),
        }
    }
}
