//! Executor configuration and credential resolution.

use crate::error::{ApiError, Result};
use std::fmt;

/// Production base address of the Bugcrowd REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.bugcrowd.com";

/// Protocol revision sent with every request in [`VERSION_HEADER`].
pub const DEFAULT_API_VERSION: &str = "2025-04-23";

/// Versioned JSON media type the API requires in `Accept`.
pub const ACCEPT_MEDIA_TYPE: &str = "application/vnd.bugcrowd.v4+json";

pub const VERSION_HEADER: &str = "Bugcrowd-Version";

/// Prefix of the `Authorization` value: `Token <identifier>:<secret>`.
pub const AUTH_SCHEME: &str = "Token";

pub const IDENTIFIER_ENV: &str = "BUGCROWD_API_USERNAME";
pub const SECRET_ENV: &str = "BUGCROWD_API_PASSWORD";

/// An (identifier, secret) pair. Both halves are non-empty once constructed through
/// [`Credentials::new`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    identifier: String,
    secret: String,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if either value is empty or whitespace-only.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        let identifier = identifier.into();
        let secret = secret.into();
        let mut missing = Vec::new();
        if identifier.trim().is_empty() {
            missing.push("identifier");
        }
        if secret.trim().is_empty() {
            missing.push("secret");
        }
        if !missing.is_empty() {
            return Err(ApiError::Configuration(format!(
                "API credentials are empty: {}",
                missing.join(", ")
            )));
        }
        Ok(Self { identifier, secret })
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Value of the `Authorization` header.
    #[must_use]
    pub fn authorization_value(&self) -> String {
        format!("{AUTH_SCHEME} {}:{}", self.identifier, self.secret)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Where credentials come from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Read from the process environment on every call, so rotated secrets are picked up
    /// without a restart.
    Env {
        identifier_var: String,
        secret_var: String,
    },
    /// Fixed credentials resolved once at construction.
    Static(Credentials),
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self::Env {
            identifier_var: IDENTIFIER_ENV.to_string(),
            secret_var: SECRET_ENV.to_string(),
        }
    }
}

impl CredentialSource {
    /// Resolve the current credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if either value is absent or empty.
    pub fn resolve(&self) -> Result<Credentials> {
        match self {
            Self::Static(creds) => Ok(creds.clone()),
            Self::Env {
                identifier_var,
                secret_var,
            } => {
                let identifier = read_env(identifier_var);
                let secret = read_env(secret_var);
                let missing: Vec<&str> = [(identifier_var, &identifier), (secret_var, &secret)]
                    .into_iter()
                    .filter(|(_, v)| v.is_none())
                    .map(|(k, _)| k.as_str())
                    .collect();
                match (identifier, secret) {
                    (Some(identifier), Some(secret)) => Credentials::new(identifier, secret),
                    _ => Err(ApiError::Configuration(format!(
                        "{} must be set in environment variables",
                        missing.join(" and ")
                    ))),
                }
            }
        }
    }
}

fn read_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Static settings of the request executor.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_version: String,
    pub credentials: CredentialSource,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            credentials: CredentialSource::default(),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialSource) -> Self {
        self.credentials = credentials;
        self
    }
}
